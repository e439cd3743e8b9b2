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

/// Vault-level rebalancing between the buffer and one strategy
///
/// Architecture: capital relocates, total assets and price-per-share stay put
/// - `allocate` moves buffer into the strategy as a vault-level position
/// - `deallocate` unwinds vault-level capital, never user allocations
#[derive(Accounts)]
pub struct Allocate<'info> {
    /// Vault owner
    /// Security: Must be signer and match vault_state.authority
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: has_one constraint validates authority from state
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::NotOwner,
        has_one = router @ VaultError::RouterMismatch,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    #[account(
        mut,
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

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
}

pub fn allocate_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Allocate<'info>>,
    strategy_id: u8,
    amount: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let router_key = ctx.accounts.router.key();

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();
    let index = ctx.accounts.router.index_of(strategy_id)?;

    let accounts = &mut *ctx.accounts;
    {
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        ledger.allocate(strategy_id, amount)?;
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

    emit!(Allocated {
        vault: accounts.vault_state.key(),
        strategy_id,
        amount: amount as i128,
        buffer: accounts.vault_state.buffer,
        timestamp: now,
    });

    Ok(())
}

pub fn deallocate_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Allocate<'info>>,
    strategy_id: u8,
    amount: u64,
    max_slippage_bps: u16,
) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let router_key = ctx.accounts.router.key();

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();
    let index = ctx.accounts.router.index_of(strategy_id)?;

    let accounts = &mut *ctx.accounts;
    let withdrawal = {
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        ledger.deallocate(strategy_id, amount, max_slippage_bps)?
    };
    strategies.commit(&states)?;

    strategies.pay_out(
        index,
        accounts.vault_token_account.to_account_info(),
        &accounts.token_program,
        withdrawal.received,
    )?;
    emit_strategy_withdrawn(strategies.key(index)?, &states[index], withdrawal.received, now)?;

    emit!(Allocated {
        vault: accounts.vault_state.key(),
        strategy_id,
        amount: -(withdrawal.received as i128),
        buffer: accounts.vault_state.buffer,
        timestamp: now,
    });

    Ok(withdrawal.received)
}
