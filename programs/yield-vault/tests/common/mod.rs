//! In-memory vault fixture shared by the integration test files
//!
//! Drives `VaultLedger` over plain state structs, the same code path the
//! instruction handlers take once accounts are deserialized.

#![allow(dead_code)]

use anchor_lang::prelude::*;
use yield_vault::{
    config::VaultParams,
    constants::*,
    errors::VaultError,
    ledger::VaultLedger,
    state::{ShareAccount, ShareAllowance, StrategyRouter, StrategyState, UserAllocation, VaultState},
};

pub const YEAR: i64 = YEAR_SECONDS as i64;
pub const DAY: i64 = 86_400;

/// Share balance plus allocation record of one holder
pub struct Holder {
    pub shares: ShareAccount,
    pub allocation: UserAllocation,
}

impl Holder {
    pub fn key(&self) -> Pubkey {
        self.shares.holder
    }
}

pub struct Harness {
    pub vault: VaultState,
    pub router: StrategyRouter,
    pub strategies: Vec<StrategyState>,
    pub now: i64,
}

impl Harness {
    /// Vault with no caps in the way, 20% buffer target and a 20% fee
    pub fn new() -> Self {
        Self::with_params(VaultParams {
            buffer_target_bps: 2_000,
            per_tx_cap: u64::MAX,
            tvl_cap: u64::MAX,
            performance_fee_bps: 2_000,
            epoch_duration: DAY,
            fee_recipient: Pubkey::new_unique(),
        })
    }

    pub fn with_params(params: VaultParams) -> Self {
        let vault_key = Pubkey::new_unique();
        let router_key = Pubkey::new_unique();

        let mut vault = VaultState {
            authority: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            router: router_key,
            ..Default::default()
        };
        vault.configure(&params, 0).unwrap();

        let router = StrategyRouter {
            vault: vault_key,
            authority: vault.authority,
            ..Default::default()
        };

        Self {
            vault,
            router,
            strategies: Vec::new(),
            now: 0,
        }
    }

    pub fn ledger(&mut self) -> VaultLedger<'_, StrategyState> {
        VaultLedger::new(
            &mut self.vault,
            &mut self.router,
            &mut self.strategies,
            self.now,
        )
    }

    /// Register a constant-APR strategy under `id`, keeping `strategies`
    /// in registered order
    pub fn add_strategy(&mut self, id: u8, apr_bps: u16, router_cap: u64) -> usize {
        let address = Pubkey::new_unique();
        self.router
            .register_strategy(id, address, router_cap)
            .unwrap();
        let index = self.router.index_of(id).unwrap();
        self.strategies.insert(
            index,
            StrategyState {
                owner: Pubkey::new_unique(),
                router: self.vault.router,
                id,
                accumulator: SCALE,
                last_accrual_ts: self.now,
                apr_bps,
                cap: u64::MAX,
                ..Default::default()
            },
        );
        index
    }

    pub fn holder(&self) -> Holder {
        let key = Pubkey::new_unique();
        Holder {
            shares: ShareAccount {
                vault: self.router.vault,
                holder: key,
                ..Default::default()
            },
            allocation: UserAllocation::new(self.vault.router, key),
        }
    }

    pub fn fee_recipient(&self) -> ShareAccount {
        ShareAccount {
            vault: self.router.vault,
            holder: self.vault.fee_recipient,
            ..Default::default()
        }
    }

    pub fn allowance(&self, owner: &Holder, spender: &Holder, amount: u64) -> ShareAllowance {
        ShareAllowance {
            vault: self.router.vault,
            owner: owner.key(),
            spender: spender.key(),
            amount,
            ..Default::default()
        }
    }

    pub fn advance(&mut self, seconds: i64) {
        self.now += seconds;
    }

    pub fn deposit(&mut self, holder: &mut Holder, assets: u64) -> Result<u64> {
        Ok(self.ledger().deposit(assets, &mut holder.shares)?.shares)
    }

    pub fn withdraw(&mut self, holder: &mut Holder, assets: u64) -> Result<u64> {
        let key = holder.key();
        let outcome = self.ledger().withdraw(
            &key,
            assets,
            &key,
            &mut holder.shares,
            &holder.allocation,
            None,
        )?;
        Ok(outcome.shares)
    }

    pub fn redeem(&mut self, holder: &mut Holder, shares: u64) -> Result<u64> {
        let key = holder.key();
        let outcome = self.ledger().redeem(
            &key,
            shares,
            &key,
            &mut holder.shares,
            &holder.allocation,
            None,
        )?;
        Ok(outcome.assets)
    }

    pub fn allocate_for_user(&mut self, holder: &mut Holder, id: u8, amount: u64) -> Result<()> {
        self.ledger()
            .allocate_for_user(id, amount, &holder.shares, &mut holder.allocation)
    }

    pub fn unallocate_for_user(&mut self, holder: &mut Holder, id: u8, amount: u64) -> Result<u64> {
        let withdrawal = self
            .ledger()
            .unallocate_for_user(id, amount, 0, &mut holder.allocation)?;
        Ok(withdrawal.received)
    }

    pub fn transfer(&mut self, from: &mut Holder, to: &mut Holder, shares: u64) -> Result<()> {
        let caller = from.key();
        self.ledger().transfer_shares(
            &caller,
            &mut from.shares,
            &mut to.shares,
            &from.allocation,
            None,
            shares,
        )
    }

    pub fn total_assets(&mut self) -> u64 {
        self.ledger().total_assets().unwrap()
    }

    pub fn max_withdraw(&mut self, holder: &Holder) -> u64 {
        self.ledger()
            .max_withdraw(&holder.shares, &holder.allocation)
            .unwrap()
    }

    pub fn unallocated(&mut self, holder: &Holder) -> u64 {
        self.ledger()
            .unallocated(&holder.shares, &holder.allocation)
            .unwrap()
    }
}

/// Assert that `result` failed with exactly `expected`
pub fn assert_vault_err<T: std::fmt::Debug>(result: Result<T>, expected: VaultError) {
    match result {
        Err(anchor_lang::error::Error::AnchorError(e)) => assert_eq!(
            e.error_code_number,
            u32::from(expected),
            "expected {:?}, got {}",
            expected,
            e.error_name
        ),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}
