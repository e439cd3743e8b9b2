use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    constants::*,
    errors::*,
    events::*,
    instructions::shared::{
        emit_strategy_deposited, emit_strategy_withdrawn, transfer_from_vault, StrategyAccounts,
    },
    ledger::VaultLedger,
    state::*,
};

/// A shareholder commits (or releases) part of their own position to a strategy
///
/// The router move and the allocation record update succeed or fail together.
#[derive(Accounts)]
pub struct AllocateForUser<'info> {
    /// Shareholder acting on their own position
    /// Security: Must be signer, pays for the allocation record
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = router @ VaultError::RouterMismatch,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    #[account(
        mut,
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Caller's share balance
    #[account(
        seeds = [SHARES_SEED, vault_state.key().as_ref(), caller.key().as_ref()],
        bump = caller_shares.bump,
    )]
    pub caller_shares: Box<Account<'info, ShareAccount>>,

    /// Caller's allocation record
    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + UserAllocation::INIT_SPACE,
        seeds = [ALLOCATION_SEED, router.key().as_ref(), caller.key().as_ref()],
        bump
    )]
    pub caller_allocation: Box<Account<'info, UserAllocation>>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Buffer token account
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn allocate_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, AllocateForUser<'info>>,
    strategy_id: u8,
    amount: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.caller.key();
    let router_key = ctx.accounts.router.key();

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();
    let index = ctx.accounts.router.index_of(strategy_id)?;

    let accounts = &mut *ctx.accounts;
    accounts
        .caller_allocation
        .open(router_key, caller, ctx.bumps.caller_allocation);

    {
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        ledger.allocate_for_user(
            strategy_id,
            amount,
            &accounts.caller_shares,
            &mut accounts.caller_allocation,
        )?;
    }
    strategies.commit(&states)?;

    transfer_from_vault(
        &accounts.token_program,
        &accounts.vault_state,
        accounts.vault_authority.to_account_info(),
        accounts.vault_token_account.to_account_info(),
        strategies.token_account(index)?,
        amount,
    )?;
    emit_strategy_deposited(strategies.key(index)?, &states[index], amount, now)?;

    emit!(UserAllocated {
        vault: accounts.vault_state.key(),
        user: caller,
        strategy_id,
        amount,
        user_total_allocated: accounts.caller_allocation.total,
        buffer: accounts.vault_state.buffer,
        timestamp: now,
    });

    Ok(())
}

pub fn unallocate_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, AllocateForUser<'info>>,
    strategy_id: u8,
    amount: u64,
    max_slippage_bps: u16,
) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.caller.key();
    let router_key = ctx.accounts.router.key();

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();
    let index = ctx.accounts.router.index_of(strategy_id)?;

    let accounts = &mut *ctx.accounts;
    accounts
        .caller_allocation
        .open(router_key, caller, ctx.bumps.caller_allocation);

    let withdrawal = {
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        ledger.unallocate_for_user(
            strategy_id,
            amount,
            max_slippage_bps,
            &mut accounts.caller_allocation,
        )?
    };
    strategies.commit(&states)?;

    strategies.pay_out(
        index,
        accounts.vault_token_account.to_account_info(),
        &accounts.token_program,
        withdrawal.received,
    )?;
    emit_strategy_withdrawn(strategies.key(index)?, &states[index], withdrawal.received, now)?;

    emit!(UserUnallocated {
        vault: accounts.vault_state.key(),
        user: caller,
        strategy_id,
        requested: amount,
        received: withdrawal.received,
        user_total_allocated: accounts.caller_allocation.total,
        buffer: accounts.vault_state.buffer,
        timestamp: now,
    });

    Ok(withdrawal.received)
}
