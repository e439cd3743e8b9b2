use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::*,
    events::*,
    instructions::shared::StrategyAccounts,
    ledger::VaultLedger,
    state::*,
};

/// Move shares from `from` to `to`
///
/// The caller is either `from` or a spender holding an allowance from `from`.
///
/// Security:
/// - The sender must keep enough share value to back their allocations
/// - Share records validated by seeds; self-transfers rejected up front
#[derive(Accounts)]
#[instruction(from: Pubkey, to: Pubkey)]
pub struct TransferShares<'info> {
    /// Holder or approved spender
    /// Security: Must be signer, pays for new records
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = router @ VaultError::RouterMismatch,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    /// Read for total assets
    #[account(
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    #[account(
        mut,
        seeds = [SHARES_SEED, vault_state.key().as_ref(), from.as_ref()],
        bump = from_shares.bump,
        constraint = from != to @ VaultError::SelfTransfer,
    )]
    pub from_shares: Box<Account<'info, ShareAccount>>,

    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + ShareAccount::INIT_SPACE,
        seeds = [SHARES_SEED, vault_state.key().as_ref(), to.as_ref()],
        bump
    )]
    pub to_shares: Box<Account<'info, ShareAccount>>,

    /// Sender's allocation record, empty if they never allocated
    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + UserAllocation::INIT_SPACE,
        seeds = [ALLOCATION_SEED, router.key().as_ref(), from.as_ref()],
        bump
    )]
    pub from_allocation: Box<Account<'info, UserAllocation>>,

    /// Required when the caller is not `from`
    #[account(
        mut,
        seeds = [ALLOWANCE_SEED, vault_state.key().as_ref(), from.as_ref(), caller.key().as_ref()],
        bump = allowance.bump,
    )]
    pub allowance: Option<Box<Account<'info, ShareAllowance>>>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, TransferShares<'info>>,
    from: Pubkey,
    to: Pubkey,
    shares: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.caller.key();
    let vault_key = ctx.accounts.vault_state.key();
    let router_key = ctx.accounts.router.key();

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();

    let accounts = &mut *ctx.accounts;
    accounts
        .to_shares
        .open(vault_key, to, ctx.bumps.to_shares);
    accounts
        .from_allocation
        .open(router_key, from, ctx.bumps.from_allocation);

    {
        let allowance = accounts.allowance.as_mut().map(|a| &mut ***a);
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        ledger.transfer_shares(
            &caller,
            &mut accounts.from_shares,
            &mut accounts.to_shares,
            &accounts.from_allocation,
            allowance,
            shares,
        )?;
    }

    emit!(SharesTransferred {
        vault: vault_key,
        from,
        to,
        caller,
        shares,
        timestamp: now,
    });

    Ok(())
}
