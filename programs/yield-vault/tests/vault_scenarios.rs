/// Scenario Tests for the Yield Vault
///
/// These tests drive the accounting core end to end over in-memory state,
/// the same path every instruction handler takes after Anchor has
/// validated and deserialized its accounts.
///
/// Security coverage:
///  PDA validation
///  Allocation-aware withdrawal limits
///  Share transfer restriction
///  Allowance checks
///  Strategy caps and pause switches
///  Fee crystallization and high-water mark
///  Math safety and rounding direction
mod common;

use anchor_lang::prelude::*;
use common::*;
use yield_vault::{
    config::{ConfigUpdate, VaultParams},
    constants::*,
    errors::VaultError,
    state::{Beneficiary, DirectPosition, YieldStrategy},
};

// =============================================================================
// SECURITY TESTS - PDA Validation (Section 2)
// =============================================================================

#[test]
fn test_pda_seed_collision_protection() {
    // Security: Account ownership validation (Section 2)
    let program_id = yield_vault::id();
    let asset_mint_1 = Pubkey::new_unique();
    let asset_mint_2 = Pubkey::new_unique();

    let (vault_1, _) =
        Pubkey::find_program_address(&[VAULT_SEED, asset_mint_1.as_ref()], &program_id);
    let (vault_2, _) =
        Pubkey::find_program_address(&[VAULT_SEED, asset_mint_2.as_ref()], &program_id);
    assert_ne!(vault_1, vault_2, "Vaults should be unique per mint");

    let (router_1, _) = Pubkey::find_program_address(&[ROUTER_SEED, vault_1.as_ref()], &program_id);
    let (router_2, _) = Pubkey::find_program_address(&[ROUTER_SEED, vault_2.as_ref()], &program_id);
    assert_ne!(router_1, router_2, "Routers should be unique per vault");
}

#[test]
fn test_pda_uniqueness_across_seeds() {
    // Security: Account ownership validation (Section 2)
    let program_id = yield_vault::id();
    let asset_mint = Pubkey::new_unique();
    let user = Pubkey::new_unique();

    let (vault_state, _) =
        Pubkey::find_program_address(&[VAULT_SEED, asset_mint.as_ref()], &program_id);
    let (vault_authority, _) =
        Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED, asset_mint.as_ref()], &program_id);
    let (router, _) =
        Pubkey::find_program_address(&[ROUTER_SEED, vault_state.as_ref()], &program_id);

    assert_ne!(vault_state, vault_authority);
    assert_ne!(vault_state, router);
    assert_ne!(vault_authority, router);

    // a user's vault allocation and their direct router position never alias
    let (allocation, _) = Pubkey::find_program_address(
        &[ALLOCATION_SEED, router.as_ref(), user.as_ref()],
        &program_id,
    );
    let (position, _) = Pubkey::find_program_address(
        &[ROUTER_POSITION_SEED, router.as_ref(), user.as_ref()],
        &program_id,
    );
    assert_ne!(allocation, position);

    let (shares, _) = Pubkey::find_program_address(
        &[SHARES_SEED, vault_state.as_ref(), user.as_ref()],
        &program_id,
    );
    assert_ne!(shares, allocation);
}

#[test]
fn test_strategy_pdas_unique_per_id() {
    // Security: Account ownership validation (Section 2)
    let program_id = yield_vault::id();
    let router = Pubkey::new_unique();

    let (strategy_0, _) =
        Pubkey::find_program_address(&[STRATEGY_SEED, router.as_ref(), &[0]], &program_id);
    let (strategy_1, _) =
        Pubkey::find_program_address(&[STRATEGY_SEED, router.as_ref(), &[1]], &program_id);
    assert_ne!(strategy_0, strategy_1);
}

#[test]
fn test_allowance_pda_is_directional() {
    // Security: Authority checks (Section 3)
    let program_id = yield_vault::id();
    let vault = Pubkey::new_unique();
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();

    let (alice_to_bob, _) = Pubkey::find_program_address(
        &[ALLOWANCE_SEED, vault.as_ref(), alice.as_ref(), bob.as_ref()],
        &program_id,
    );
    let (bob_to_alice, _) = Pubkey::find_program_address(
        &[ALLOWANCE_SEED, vault.as_ref(), bob.as_ref(), alice.as_ref()],
        &program_id,
    );
    assert_ne!(alice_to_bob, bob_to_alice);
}

// =============================================================================
// BUSINESS LOGIC - Allocation-aware withdrawals
// =============================================================================

#[test]
fn test_vault_allocation_earns_yield_and_limits_buffer() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, u64::MAX);
    let mut alice = h.holder();

    assert_eq!(h.deposit(&mut alice, 5_000).unwrap(), 5_000);
    h.ledger().allocate(0, 3_500).unwrap();
    assert_eq!(h.vault.buffer, 1_500);
    assert_eq!(h.total_assets(), 5_000, "allocation must not move total assets");

    h.advance(YEAR);
    assert_eq!(h.strategies[0].total_assets(h.now).unwrap(), 3_675);
    assert_eq!(h.total_assets(), 5_175);
    assert_eq!(h.max_withdraw(&alice), 1_500, "buffer bounds the withdrawal");

    assert_vault_err(h.withdraw(&mut alice, 2_000), VaultError::CapExceeded);
    assert_eq!(alice.shares.shares, 5_000);

    // 1_500 / 1.035 per share, rounded up
    assert_eq!(h.withdraw(&mut alice, 1_500).unwrap(), 1_450);
    assert_eq!(h.vault.buffer, 0);
    assert_eq!(alice.shares.shares, 3_550);
    let left = h.ledger().convert_to_assets(alice.shares.shares).unwrap();
    assert!(left >= 3_675, "remaining shares worth {left}");
}

#[test]
fn test_user_allocation_reduces_max_withdraw() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.allocate_for_user(&mut alice, 0, 6_000).unwrap();

    assert_eq!(alice.allocation.total, 6_000);
    assert_eq!(alice.allocation.strategy_allocation(0), 6_000);
    assert_eq!(h.router.slot(0).unwrap().allocated, 6_000);
    assert_eq!(h.router.slot(0).unwrap().vault_allocated, 0);
    assert_eq!(h.vault.buffer, 4_000);
    assert_eq!(h.max_withdraw(&alice), 4_000);

    assert_vault_err(h.withdraw(&mut alice, 4_001), VaultError::CapExceeded);
    assert_eq!(h.withdraw(&mut alice, 4_000).unwrap(), 4_000);
    assert_eq!(alice.shares.shares, 6_000);
}

#[test]
fn test_full_allocation_then_release() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 5_000).unwrap();
    h.allocate_for_user(&mut alice, 0, 5_000).unwrap();
    assert_eq!(h.unallocated(&alice), 0);
    assert_eq!(h.max_withdraw(&alice), 0);

    // releasing works even with nothing unallocated
    assert_eq!(h.unallocate_for_user(&mut alice, 0, 5_000).unwrap(), 5_000);
    assert_eq!(alice.allocation.total, 0);
    assert_eq!(h.vault.buffer, 5_000);
    assert_eq!(h.router.slot(0).unwrap().allocated, 0);

    assert_eq!(h.withdraw(&mut alice, 5_000).unwrap(), 5_000);
    assert_eq!(h.vault.total_shares, 0);
}

#[test]
fn test_allocate_beyond_unallocated_fails() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 5_000).unwrap();
    h.allocate_for_user(&mut alice, 0, 3_000).unwrap();
    assert_vault_err(
        h.allocate_for_user(&mut alice, 0, 2_001),
        VaultError::InsufficientUnallocated,
    );
    assert_eq!(alice.allocation.total, 3_000);
}

#[test]
fn test_unallocate_is_bounded_by_recorded_allocation() {
    let mut h = Harness::new();
    h.add_strategy(0, 1_000, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.allocate_for_user(&mut alice, 0, 4_000).unwrap();
    h.advance(YEAR);

    assert_vault_err(
        h.unallocate_for_user(&mut alice, 0, 4_001),
        VaultError::AllocationExceeded,
    );
    assert_eq!(h.unallocate_for_user(&mut alice, 0, 4_000).unwrap(), 4_000);
    // the strategy checkpointed 400 of yield; 4_000 at accumulator 1.0
    // retires 4_000 of principal and leaves the yield behind
    assert_eq!(alice.allocation.total, 0);
    assert_eq!(h.strategies[0].principal, 400);
}

#[test]
fn test_router_cap_rejects_and_leaves_state_unchanged() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, 1_000_000);
    let mut alice = h.holder();

    h.deposit(&mut alice, 2_000_000).unwrap();
    assert_vault_err(
        h.ledger().allocate(0, 1_000_001),
        VaultError::StrategyCapExceeded,
    );
    assert_eq!(h.vault.buffer, 2_000_000);
    assert_eq!(h.router.slot(0).unwrap().allocated, 0);
    assert_eq!(h.strategies[0].principal, 0);

    h.ledger().allocate(0, 1_000_000).unwrap();
    assert_eq!(h.router.slot(0).unwrap().allocated, 1_000_000);
}

#[test]
fn test_strategy_own_cap_is_enforced() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, u64::MAX);
    h.strategies[0].cap = 1_000;
    let mut alice = h.holder();

    h.deposit(&mut alice, 5_000).unwrap();
    assert_vault_err(
        h.allocate_for_user(&mut alice, 0, 1_001),
        VaultError::StrategyCapExceeded,
    );
    assert_eq!(alice.allocation.total, 0);
    assert_eq!(h.router.slot(0).unwrap().allocated, 0);
}

#[test]
fn test_paused_strategy_rejects_allocation() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 5_000).unwrap();
    h.strategies[0].set_paused(true);

    assert_vault_err(
        h.allocate_for_user(&mut alice, 0, 1_000),
        VaultError::StrategyPaused,
    );
    assert_eq!(alice.allocation.total, 0);
    assert_eq!(h.vault.buffer, 5_000);
    assert_eq!(h.router.slot(0).unwrap().allocated, 0);
}

#[test]
fn test_inactive_and_paused_strategies_leave_total_assets() {
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    h.add_strategy(3, 0, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 9_000).unwrap();
    h.ledger().allocate(0, 3_000).unwrap();
    h.ledger().allocate(3, 3_000).unwrap();
    assert_eq!(h.total_assets(), 9_000);

    h.router.set_strategy_active(0, false).unwrap();
    assert_eq!(h.total_assets(), 6_000);
    assert_vault_err(h.ledger().allocate(0, 100), VaultError::StrategyInactive);

    h.strategies[1].set_paused(true);
    assert_eq!(h.total_assets(), 3_000);

    h.router.set_strategy_active(0, true).unwrap();
    h.strategies[1].set_paused(false);
    assert_eq!(h.total_assets(), 9_000);
}

#[test]
fn test_strategy_accounts_must_match_registry() {
    let mut h = Harness::new();
    h.add_strategy(0, 500, u64::MAX);
    h.add_strategy(1, 500, u64::MAX);
    let mut alice = h.holder();
    h.strategies.pop();

    assert_vault_err(
        h.ledger().deposit(1_000, &mut alice.shares),
        VaultError::StrategyAccountsMismatch,
    );
}

// =============================================================================
// BUSINESS LOGIC - Capital supplied directly through the router
// =============================================================================

#[test]
fn test_direct_supply_leaves_share_price_unchanged() {
    // Security: Direct router capital must not be redeemable by vault holders
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    let mut alice = h.holder();
    let mut carol = h.holder();
    h.deposit(&mut alice, 1_000).unwrap();
    h.deposit(&mut carol, 1_000).unwrap();
    let price = h.ledger().price_per_share().unwrap();

    let mut bob = DirectPosition::new(h.vault.router, Pubkey::new_unique());
    let now = h.now;
    h.router
        .deposit_to_strategy(&mut h.strategies[0], 0, 1_000, Beneficiary::Direct(&mut bob), now)
        .unwrap();

    assert_eq!(h.total_assets(), 2_000);
    assert_eq!(h.ledger().price_per_share().unwrap(), price);
    assert_eq!(h.redeem(&mut alice, 1_000).unwrap(), 1_000);

    h.router
        .withdraw_from_strategy(
            &mut h.strategies[0],
            0,
            1_000,
            0,
            Beneficiary::Direct(&mut bob),
            now,
        )
        .unwrap();
    assert_eq!(h.ledger().convert_to_assets(carol.shares.shares).unwrap(), 1_000);
    assert_eq!(h.vault.buffer, 1_000);
}

#[test]
fn test_direct_supplier_keeps_yield_on_their_capital() {
    let mut h = Harness::new();
    h.add_strategy(0, 1_000, u64::MAX);
    let mut alice = h.holder();
    h.deposit(&mut alice, 2_000).unwrap();
    h.ledger().allocate(0, 1_000).unwrap();

    let mut bob = DirectPosition::new(h.vault.router, Pubkey::new_unique());
    let now = h.now;
    h.router
        .deposit_to_strategy(&mut h.strategies[0], 0, 1_000, Beneficiary::Direct(&mut bob), now)
        .unwrap();

    h.advance(YEAR);
    assert_eq!(h.strategies[0].total_assets(h.now).unwrap(), 2_200);
    assert_eq!(h.total_assets(), 2_100, "vault side earns only on its own 1_000");
    let claim = h
        .router
        .direct_withdrawable(0, &h.strategies[0], &bob, h.now)
        .unwrap();
    assert_eq!(claim, 1_100);

    let now = h.now;
    let w = h
        .router
        .withdraw_from_strategy(
            &mut h.strategies[0],
            0,
            claim,
            0,
            Beneficiary::Direct(&mut bob),
            now,
        )
        .unwrap();
    assert_eq!(w.received, 1_100);
    assert_eq!(h.total_assets(), 2_100);
    assert_eq!(h.ledger().convert_to_assets(alice.shares.shares).unwrap(), 2_100);
}

// =============================================================================
// BUSINESS LOGIC - Redeem waterfall
// =============================================================================

#[test]
fn test_redeem_pulls_shortfall_from_vault_positions() {
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.ledger().allocate(0, 8_000).unwrap();
    assert_eq!(h.vault.buffer, 2_000);

    let key = alice.key();
    let outcome = h
        .ledger()
        .redeem(&key, 5_000, &key, &mut alice.shares, &alice.allocation, None)
        .unwrap();

    assert_eq!(outcome.assets, 5_000);
    assert_eq!(outcome.pulls.len(), 1);
    assert_eq!(outcome.pulls[0].strategy_id, 0);
    assert_eq!(outcome.pulls[0].amount, 3_000);
    assert_eq!(outcome.buffer, 0);
    assert_eq!(h.vault.buffer, 0);
    assert_eq!(h.router.slot(0).unwrap().vault_allocated, 5_000);
    assert_eq!(h.strategies[0].principal, 5_000);
    assert_eq!(alice.shares.shares, 5_000);
}

#[test]
fn test_redeem_never_touches_user_allocated_capital() {
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    let mut alice = h.holder();
    let mut bob = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.deposit(&mut bob, 10_000).unwrap();
    h.allocate_for_user(&mut bob, 0, 8_000).unwrap();
    h.ledger().allocate(0, 10_000).unwrap();
    assert_eq!(h.vault.buffer, 2_000);

    assert_eq!(h.redeem(&mut alice, 10_000).unwrap(), 10_000);
    let slot = h.router.slot(0).unwrap();
    assert_eq!(slot.vault_allocated, 2_000);
    assert_eq!(slot.user_allocated(), 8_000);
    assert_eq!(bob.allocation.total, 8_000);
}

#[test]
fn test_redeem_respects_unallocated_value() {
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.allocate_for_user(&mut alice, 0, 6_000).unwrap();

    assert_vault_err(
        h.redeem(&mut alice, 4_001),
        VaultError::InsufficientUnallocated,
    );
    assert_eq!(h.redeem(&mut alice, 4_000).unwrap(), 4_000);
}

#[test]
fn test_deallocate_only_unwinds_vault_positions() {
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.allocate_for_user(&mut alice, 0, 4_000).unwrap();
    h.ledger().allocate(0, 3_000).unwrap();

    assert_vault_err(
        h.ledger().deallocate(0, 3_001, 0),
        VaultError::AllocationExceeded,
    );
    let withdrawal = h.ledger().deallocate(0, 3_000, 0).unwrap();
    assert_eq!(withdrawal.received, 3_000);
    assert_eq!(h.vault.buffer, 6_000);
    assert_eq!(h.router.slot(0).unwrap().allocated, 4_000);
}

// =============================================================================
// BUSINESS LOGIC - Share transfers and allowances
// =============================================================================

#[test]
fn test_transfer_blocked_below_allocation() {
    // Security: Business logic (Section 7)
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    let mut alice = h.holder();
    let mut bob = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.allocate_for_user(&mut alice, 0, 6_000).unwrap();

    assert_vault_err(
        h.transfer(&mut alice, &mut bob, 4_001),
        VaultError::AllocationTransferRestriction,
    );
    assert_eq!(alice.shares.shares, 10_000);
    assert_eq!(bob.shares.shares, 0);

    h.transfer(&mut alice, &mut bob, 4_000).unwrap();
    assert_eq!(alice.shares.shares, 6_000);
    assert_eq!(bob.shares.shares, 4_000);
}

#[test]
fn test_transfer_rejects_self_and_zero() {
    let mut h = Harness::new();
    let mut alice = h.holder();
    h.deposit(&mut alice, 1_000).unwrap();

    let mut nobody = h.holder();
    nobody.shares.holder = Pubkey::default();
    assert_vault_err(
        h.transfer(&mut alice, &mut nobody, 10),
        VaultError::ZeroAddress,
    );

    let mut same = h.holder();
    same.shares.holder = alice.key();
    assert_vault_err(
        h.transfer(&mut alice, &mut same, 10),
        VaultError::SelfTransfer,
    );
    assert_vault_err(h.transfer(&mut alice, &mut nobody, 0), VaultError::InvalidAmount);
}

#[test]
fn test_spender_needs_allowance() {
    // Security: Authority checks (Section 3)
    let mut h = Harness::new();
    let mut alice = h.holder();
    let bob = h.holder();
    let mut carol = h.holder();

    h.deposit(&mut alice, 1_000).unwrap();

    let bob_key = bob.key();
    let alice_key = alice.key();
    let result = h.ledger().withdraw(
        &bob_key,
        100,
        &bob_key,
        &mut alice.shares,
        &alice.allocation,
        None,
    );
    assert_vault_err(result, VaultError::InsufficientAllowance);

    let mut allowance = h.allowance(&alice, &bob, 150);
    let outcome = h
        .ledger()
        .withdraw(
            &bob_key,
            100,
            &bob_key,
            &mut alice.shares,
            &alice.allocation,
            Some(&mut allowance),
        )
        .unwrap();
    assert_eq!(outcome.shares, 100);
    assert_eq!(allowance.amount, 50);
    assert_eq!(alice.shares.shares, 900);

    // transferFrom spends the same allowance
    let result = h.ledger().transfer_shares(
        &bob_key,
        &mut alice.shares,
        &mut carol.shares,
        &alice.allocation,
        Some(&mut allowance),
        51,
    );
    assert_vault_err(result, VaultError::InsufficientAllowance);
    h.ledger()
        .transfer_shares(
            &bob_key,
            &mut alice.shares,
            &mut carol.shares,
            &alice.allocation,
            Some(&mut allowance),
            50,
        )
        .unwrap();
    assert_eq!(allowance.amount, 0);
    assert_eq!(carol.shares.shares, 50);

    // an allowance granted by someone else is useless
    let mut foreign = h.allowance(&carol, &bob, 1_000);
    let result = h.ledger().redeem(
        &bob_key,
        10,
        &alice_key,
        &mut alice.shares,
        &alice.allocation,
        Some(&mut foreign),
    );
    assert_vault_err(result, VaultError::InsufficientAllowance);
}

// =============================================================================
// BUSINESS LOGIC - Fees and high-water mark
// =============================================================================

#[test]
fn test_fee_taken_only_above_high_water_mark() {
    let mut h = Harness::new();
    h.add_strategy(0, 1_000, u64::MAX);
    let mut alice = h.holder();
    let mut recipient = h.fee_recipient();

    h.deposit(&mut alice, 10_000).unwrap();
    h.ledger().allocate(0, 10_000).unwrap();

    assert_vault_err(
        h.ledger().crystallize_fees(&mut recipient),
        VaultError::EpochNotComplete,
    );

    h.advance(YEAR);
    assert_eq!(h.total_assets(), 11_000);

    let outcome = h.ledger().crystallize_fees(&mut recipient).unwrap();
    assert_eq!(outcome.price_per_share, SCALE * 11 / 10);
    assert_eq!(outcome.fee_assets, 200);
    // 200 * 10_000 / 10_800
    assert_eq!(outcome.fee_shares, 185);
    assert_eq!(recipient.shares, 185);
    assert_eq!(h.vault.total_shares, 10_185);
    assert_eq!(h.vault.high_water_mark, SCALE * 11 / 10);
    assert_eq!(h.vault.last_epoch_ts, YEAR);

    // diluted price sits below the mark: the next epoch takes nothing
    h.advance(DAY);
    let outcome = h.ledger().crystallize_fees(&mut recipient).unwrap();
    assert_eq!(outcome.fee_shares, 0);
    assert_eq!(h.vault.high_water_mark, SCALE * 11 / 10);
    assert_eq!(h.vault.last_epoch_ts, YEAR + DAY);
}

#[test]
fn test_fee_crystallization_runs_while_paused() {
    let mut h = Harness::new();
    h.add_strategy(0, 1_000, u64::MAX);
    let mut alice = h.holder();
    let mut recipient = h.fee_recipient();

    h.deposit(&mut alice, 10_000).unwrap();
    h.ledger().allocate(0, 10_000).unwrap();
    h.vault.apply_config(ConfigUpdate::Paused(true)).unwrap();
    h.advance(YEAR);

    assert_vault_err(h.deposit(&mut alice, 1), VaultError::Paused);
    assert_vault_err(h.withdraw(&mut alice, 1), VaultError::Paused);
    assert_vault_err(h.ledger().allocate(0, 1), VaultError::Paused);

    let outcome = h.ledger().crystallize_fees(&mut recipient).unwrap();
    assert_eq!(outcome.fee_shares, 185);

    // transfers are not gated by the pause switch
    let mut bob = h.holder();
    h.transfer(&mut alice, &mut bob, 1).unwrap();
}

#[test]
fn test_fee_requires_configured_recipient() {
    let mut h = Harness::new();
    let mut alice = h.holder();
    h.deposit(&mut alice, 1_000).unwrap();
    h.advance(DAY);

    let mut impostor = h.holder();
    assert_vault_err(
        h.ledger().crystallize_fees(&mut impostor.shares),
        VaultError::InvalidOwner,
    );
}

#[test]
fn test_zero_fee_still_advances_epoch_and_mark() {
    let mut h = Harness::new();
    h.vault
        .apply_config(ConfigUpdate::PerformanceFeeBps(0))
        .unwrap();
    h.add_strategy(0, 1_000, u64::MAX);
    let mut alice = h.holder();
    let mut recipient = h.fee_recipient();

    h.deposit(&mut alice, 10_000).unwrap();
    h.ledger().allocate(0, 10_000).unwrap();
    h.advance(YEAR);

    let outcome = h.ledger().crystallize_fees(&mut recipient).unwrap();
    assert_eq!(outcome.fee_shares, 0);
    assert_eq!(h.vault.high_water_mark, SCALE * 11 / 10);
    assert_eq!(h.vault.total_shares, 10_000);
}

// =============================================================================
// SECURITY TESTS - Math Safety (Section 6)
// =============================================================================

#[test]
fn test_previews_round_against_the_caller() {
    // Security: Math safety (Section 6)
    let mut h = Harness::new();
    h.add_strategy(0, 1_000, u64::MAX);
    let mut alice = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.ledger().allocate(0, 10_000).unwrap();
    h.advance(YEAR);

    // 11_000 assets backing 10_000 shares
    let ledger = h.ledger();
    assert_eq!(ledger.preview_deposit(1).unwrap(), 0);
    assert_eq!(ledger.preview_mint(1).unwrap(), 2);
    assert_eq!(ledger.preview_mint(3).unwrap(), 4);
    assert_eq!(ledger.preview_withdraw(11).unwrap(), 10);
    assert_eq!(ledger.preview_withdraw(12).unwrap(), 11);
    assert_eq!(ledger.preview_redeem(10).unwrap(), 11);
}

#[test]
fn test_dust_deposit_is_rejected() {
    // Security: Math safety (Section 6)
    let mut h = Harness::new();
    h.add_strategy(0, 1_000, u64::MAX);
    let mut alice = h.holder();
    let mut bob = h.holder();

    h.deposit(&mut alice, 10_000).unwrap();
    h.ledger().allocate(0, 10_000).unwrap();
    h.advance(YEAR);

    assert_vault_err(h.deposit(&mut bob, 1), VaultError::InvalidAmount);
    assert_eq!(h.vault.buffer, 0);

    let outcome = h.ledger().mint(3, &mut bob.shares).unwrap();
    assert_eq!(outcome.assets, 4);
    assert_eq!(bob.shares.shares, 3);
}

#[test]
fn test_deposit_caps() {
    let mut h = Harness::with_params(VaultParams {
        buffer_target_bps: 1_000,
        per_tx_cap: 5_000,
        tvl_cap: 8_000,
        performance_fee_bps: 0,
        epoch_duration: DAY,
        fee_recipient: Pubkey::new_unique(),
    });
    let mut alice = h.holder();

    assert_vault_err(h.deposit(&mut alice, 5_001), VaultError::CapExceeded);
    h.deposit(&mut alice, 5_000).unwrap();
    assert_eq!(h.ledger().max_deposit().unwrap(), 3_000);
    assert_vault_err(h.deposit(&mut alice, 3_001), VaultError::CapExceeded);
    h.deposit(&mut alice, 3_000).unwrap();
    assert_eq!(h.ledger().max_deposit().unwrap(), 0);
    assert_eq!(h.ledger().max_mint().unwrap(), 0);
}

#[test]
fn test_deposit_rejects_zero_and_default_receiver() {
    let mut h = Harness::new();
    let mut alice = h.holder();
    assert_vault_err(h.deposit(&mut alice, 0), VaultError::InvalidAmount);

    let mut nobody = h.holder();
    nobody.shares.holder = Pubkey::default();
    assert_vault_err(h.deposit(&mut nobody, 100), VaultError::ZeroAddress);
    assert_eq!(h.vault.total_shares, 0);
}

#[test]
fn test_buffer_target_is_reported_not_enforced() {
    let mut h = Harness::new();
    h.add_strategy(0, 0, u64::MAX);
    let mut alice = h.holder();

    let outcome = h.ledger().deposit(10_000, &mut alice.shares).unwrap();
    assert_eq!(outcome.target_buffer, 2_000);
    assert_eq!(outcome.buffer, 10_000);
    assert_eq!(h.vault.buffer_surplus(h.vault.buffer).unwrap(), 8_000);
    // nothing moved until the owner allocates
    assert_eq!(h.router.slot(0).unwrap().allocated, 0);
}
