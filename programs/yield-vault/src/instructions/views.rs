use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::*,
    instructions::shared::StrategyAccounts,
    ledger::VaultLedger,
    state::*,
};

/// ERC-4626 preview selector
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewKind {
    /// Shares for depositing `amount` assets, rounded down
    Deposit,
    /// Assets owed for minting `amount` shares, rounded up
    Mint,
    /// Shares burned to withdraw `amount` assets, rounded up
    Withdraw,
    /// Assets paid for redeeming `amount` shares, rounded down
    Redeem,
}

/// Vault-wide figures at the current instant
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VaultSnapshot {
    pub total_assets: u64,
    pub total_shares: u64,
    pub buffer: u64,
    pub router_assets: u64,
    pub price_per_share: u128,
    pub target_buffer: u64,
    pub buffer_surplus: u64,
    pub max_deposit: u64,
    pub max_mint: u64,
}

/// One holder's position at the current instant
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HolderSnapshot {
    pub shares: u64,
    pub assets: u64,
    pub total_allocated: u64,
    pub per_strategy: [u64; MAX_STRATEGIES],
    pub unallocated: u64,
    pub max_withdraw: u64,
    pub max_redeem: u64,
}

/// Read-only vault queries, answered through return data
#[derive(Accounts)]
#[instruction(holder: Pubkey)]
pub struct VaultView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = router @ VaultError::RouterMismatch,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    #[account(
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Absent for holders that never received shares
    #[account(
        seeds = [SHARES_SEED, vault_state.key().as_ref(), holder.as_ref()],
        bump = holder_shares.bump,
    )]
    pub holder_shares: Option<Box<Account<'info, ShareAccount>>>,

    /// Absent for holders that never allocated
    #[account(
        seeds = [ALLOCATION_SEED, router.key().as_ref(), holder.as_ref()],
        bump = holder_allocation.bump,
    )]
    pub holder_allocation: Option<Box<Account<'info, UserAllocation>>>,
}

fn with_ledger<T>(
    ctx: &Context<VaultView>,
    query: impl FnOnce(&VaultLedger<StrategyState>) -> Result<T>,
) -> Result<T> {
    let router_key = ctx.accounts.router.key();
    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();
    let mut vault = (**ctx.accounts.vault_state).clone();
    let mut router = (**ctx.accounts.router).clone();
    let ledger = VaultLedger::new(
        &mut vault,
        &mut router,
        &mut states,
        Clock::get()?.unix_timestamp,
    );
    query(&ledger)
}

pub fn preview_handler(
    ctx: Context<VaultView>,
    _holder: Pubkey,
    kind: PreviewKind,
    amount: u64,
) -> Result<u64> {
    with_ledger(&ctx, |ledger| match kind {
        PreviewKind::Deposit => ledger.preview_deposit(amount),
        PreviewKind::Mint => ledger.preview_mint(amount),
        PreviewKind::Withdraw => ledger.preview_withdraw(amount),
        PreviewKind::Redeem => ledger.preview_redeem(amount),
    })
}

pub fn vault_snapshot_handler(ctx: Context<VaultView>, _holder: Pubkey) -> Result<VaultSnapshot> {
    with_ledger(&ctx, |ledger| {
        let total_assets = ledger.total_assets()?;
        Ok(VaultSnapshot {
            total_assets,
            total_shares: ledger.vault.total_shares,
            buffer: ledger.vault.buffer,
            router_assets: ledger.router_assets()?,
            price_per_share: ledger.price_per_share()?,
            target_buffer: ledger.vault.target_buffer(total_assets)?,
            buffer_surplus: ledger.vault.buffer_surplus(total_assets)?,
            max_deposit: ledger.max_deposit()?,
            max_mint: ledger.max_mint()?,
        })
    })
}

pub fn holder_snapshot_handler(ctx: Context<VaultView>, holder: Pubkey) -> Result<HolderSnapshot> {
    let shares = ctx
        .accounts
        .holder_shares
        .as_ref()
        .map(|account| (***account).clone())
        .unwrap_or_else(|| ShareAccount {
            holder,
            ..Default::default()
        });
    let allocation = ctx
        .accounts
        .holder_allocation
        .as_ref()
        .map(|account| (***account).clone())
        .unwrap_or_else(|| UserAllocation::new(ctx.accounts.router.key(), holder));

    with_ledger(&ctx, |ledger| {
        Ok(HolderSnapshot {
            shares: shares.shares,
            assets: ledger.convert_to_assets(shares.shares)?,
            total_allocated: allocation.total,
            per_strategy: allocation.per_strategy,
            unallocated: ledger.unallocated(&shares, &allocation)?,
            max_withdraw: ledger.max_withdraw(&shares, &allocation)?,
            max_redeem: ledger.max_redeem(&shares, &allocation)?,
        })
    })
}
