// Yield Vault - ERC-4626-style vault with a strategy router on Solana
// Security: Seeds, has_one and token account constraints on every instruction; checked math in the core
// Architecture: Liquid buffer + registry of pluggable strategies + per-user allocation ledger

use anchor_lang::prelude::*;

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod math;
pub mod state;

use config::{ConfigUpdate, VaultParams};
use instructions::*;

declare_id!("sG2n3PdMwKHDUK9QGGmVBwASFM4APYb3qGZ27n6zXKW");

#[program]
pub mod yield_vault {
    use super::*;

    /// Initialize a new vault and its strategy router for a given asset token
    ///
    /// Security considerations:
    /// - Validates authority is signer
    /// - Rejects out-of-range bps, non-positive epoch and null fee recipient
    /// - Buffer token account owned by the vault authority PDA
    pub fn initialize_vault(ctx: Context<InitializeVault>, params: VaultParams) -> Result<()> {
        instructions::initialize_vault::handler(ctx, params)
    }

    /// Deposit exactly `assets` and credit the resulting shares to `receiver`
    ///
    /// Remaining accounts: registered strategies as
    /// `[strategy_state, strategy_token_account]` pairs in id order.
    /// Returns the shares minted.
    pub fn deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
        assets: u64,
        receiver: Pubkey,
    ) -> Result<u64> {
        let outcome =
            instructions::deposit::handler(ctx, DepositKind::Assets, assets, receiver)?;
        Ok(outcome.shares)
    }

    /// Mint exactly `shares` to `receiver`, charging the rounded-up asset cost
    ///
    /// Returns the assets pulled from the caller.
    pub fn mint<'info>(
        ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
        shares: u64,
        receiver: Pubkey,
    ) -> Result<u64> {
        let outcome =
            instructions::deposit::handler(ctx, DepositKind::Shares, shares, receiver)?;
        Ok(outcome.assets)
    }

    /// Withdraw exactly `assets` of `owner`'s unallocated value to `receiver`
    ///
    /// Security considerations:
    /// - Bounded by unallocated share value, buffer and per-tx cap
    /// - A caller other than `owner` spends the share allowance
    ///
    /// Returns the shares burned.
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        assets: u64,
        receiver: Pubkey,
        owner: Pubkey,
    ) -> Result<u64> {
        let outcome = instructions::withdraw::handler(
            ctx,
            WithdrawKind::Assets,
            assets,
            receiver,
            owner,
        )?;
        Ok(outcome.shares)
    }

    /// Redeem `shares` of `owner` for assets paid to `receiver`
    ///
    /// Tops the buffer up from vault-level strategy positions if needed.
    /// Returns the assets paid.
    pub fn redeem<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        shares: u64,
        receiver: Pubkey,
        owner: Pubkey,
    ) -> Result<u64> {
        let outcome = instructions::withdraw::handler(
            ctx,
            WithdrawKind::Shares,
            shares,
            receiver,
            owner,
        )?;
        Ok(outcome.assets)
    }

    /// Move buffer capital into a strategy as a vault-level position
    ///
    /// Security considerations:
    /// - Authority-only function (has_one constraint)
    /// - Total assets and price-per-share unchanged
    pub fn allocate<'info>(
        ctx: Context<'_, '_, '_, 'info, Allocate<'info>>,
        strategy_id: u8,
        amount: u64,
    ) -> Result<()> {
        instructions::allocate::allocate_handler(ctx, strategy_id, amount)
    }

    /// Unwind vault-level strategy capital back into the buffer
    ///
    /// Returns the assets received.
    pub fn deallocate<'info>(
        ctx: Context<'_, '_, '_, 'info, Allocate<'info>>,
        strategy_id: u8,
        amount: u64,
        max_slippage_bps: u16,
    ) -> Result<u64> {
        instructions::allocate::deallocate_handler(ctx, strategy_id, amount, max_slippage_bps)
    }

    /// Commit part of the caller's unallocated value to a strategy
    pub fn allocate_for_user<'info>(
        ctx: Context<'_, '_, '_, 'info, AllocateForUser<'info>>,
        strategy_id: u8,
        amount: u64,
    ) -> Result<()> {
        instructions::allocate_for_user::allocate_handler(ctx, strategy_id, amount)
    }

    /// Release the caller's allocation in a strategy back into the buffer
    ///
    /// Returns the assets received.
    pub fn unallocate_for_user<'info>(
        ctx: Context<'_, '_, '_, 'info, AllocateForUser<'info>>,
        strategy_id: u8,
        amount: u64,
        max_slippage_bps: u16,
    ) -> Result<u64> {
        instructions::allocate_for_user::unallocate_handler(
            ctx,
            strategy_id,
            amount,
            max_slippage_bps,
        )
    }

    /// Move shares from `from` to `to`, as `from` or as an approved spender
    ///
    /// Security considerations:
    /// - Fails if the sender's remaining shares no longer cover their allocations
    pub fn transfer_shares<'info>(
        ctx: Context<'_, '_, '_, 'info, TransferShares<'info>>,
        from: Pubkey,
        to: Pubkey,
        shares: u64,
    ) -> Result<()> {
        instructions::transfer_shares::handler(ctx, from, to, shares)
    }

    /// Set the share allowance of `spender` over the caller's shares
    pub fn approve_shares(ctx: Context<ApproveShares>, spender: Pubkey, amount: u64) -> Result<()> {
        instructions::approve_shares::handler(ctx, spender, amount)
    }

    /// Take the performance fee for a completed epoch
    ///
    /// Permissionless, time-gated, runs while paused. Returns fee shares minted.
    pub fn crystallize_fees<'info>(
        ctx: Context<'_, '_, '_, 'info, CrystallizeFees<'info>>,
    ) -> Result<u64> {
        let outcome = instructions::crystallize_fees::handler(ctx)?;
        Ok(outcome.fee_shares)
    }

    /// Change one vault parameter (owner-only)
    pub fn update_config(ctx: Context<UpdateConfig>, update: ConfigUpdate) -> Result<()> {
        instructions::update_config::handler(ctx, update)
    }

    /// Create a reference constant-APR strategy bound to the router
    pub fn initialize_strategy(
        ctx: Context<InitializeStrategy>,
        strategy_id: u8,
        owner: Pubkey,
        apr_bps: u16,
        cap: u64,
    ) -> Result<()> {
        instructions::initialize_strategy::handler(ctx, strategy_id, owner, apr_bps, cap)
    }

    /// Add a strategy to the router registry
    ///
    /// Security considerations:
    /// - Authority-only function
    /// - Rejects taken ids and addresses already registered
    pub fn register_strategy(
        ctx: Context<RegisterStrategy>,
        strategy_id: u8,
        cap: u64,
    ) -> Result<()> {
        instructions::register_strategy::handler(ctx, strategy_id, cap)
    }

    /// Toggle a registered strategy on/off
    pub fn set_strategy_active(
        ctx: Context<ManageStrategy>,
        strategy_id: u8,
        active: bool,
    ) -> Result<()> {
        instructions::manage_strategy::set_active_handler(ctx, strategy_id, active)
    }

    /// Change a strategy's router-level cap; never below committed capital
    pub fn set_strategy_cap(ctx: Context<ManageStrategy>, strategy_id: u8, cap: u64) -> Result<()> {
        instructions::manage_strategy::set_cap_handler(ctx, strategy_id, cap)
    }

    /// Strategy owner: new rate and cap from now on
    pub fn set_strategy_params(ctx: Context<StrategyAdmin>, apr_bps: u16, cap: u64) -> Result<()> {
        instructions::strategy_admin::set_params_handler(ctx, apr_bps, cap)
    }

    /// Strategy owner: pause switch
    pub fn pause_strategy(ctx: Context<StrategyAdmin>, paused: bool) -> Result<()> {
        instructions::strategy_admin::pause_handler(ctx, paused)
    }

    /// Strategy owner: realize accrued yield into principal
    pub fn report_strategy(ctx: Context<StrategyAdmin>) -> Result<u64> {
        instructions::strategy_admin::report_handler(ctx)
    }

    /// Supply capital to a strategy directly through the router
    pub fn router_deposit(ctx: Context<RouterPosition>, strategy_id: u8, amount: u64) -> Result<()> {
        instructions::router_position::deposit_handler(ctx, strategy_id, amount)
    }

    /// Take directly supplied capital back out of a strategy
    pub fn router_withdraw(
        ctx: Context<RouterPosition>,
        strategy_id: u8,
        amount: u64,
        max_slippage_bps: u16,
    ) -> Result<u64> {
        instructions::router_position::withdraw_handler(ctx, strategy_id, amount, max_slippage_bps)
    }

    /// ERC-4626 previews through return data
    pub fn preview(
        ctx: Context<VaultView>,
        holder: Pubkey,
        kind: PreviewKind,
        amount: u64,
    ) -> Result<u64> {
        instructions::views::preview_handler(ctx, holder, kind, amount)
    }

    pub fn vault_snapshot(ctx: Context<VaultView>, holder: Pubkey) -> Result<VaultSnapshot> {
        instructions::views::vault_snapshot_handler(ctx, holder)
    }

    /// Share value, allocations and withdrawal limits of `holder`
    pub fn holder_snapshot(ctx: Context<VaultView>, holder: Pubkey) -> Result<HolderSnapshot> {
        instructions::views::holder_snapshot_handler(ctx, holder)
    }
}
