use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    constants::*,
    errors::*,
    events::*,
    instructions::shared::{transfer_from_user, StrategyAccounts},
    ledger::{DepositOutcome, VaultLedger},
    state::*,
};

/// Deposit assets into the vault and credit shares to `receiver`
///
/// Shared by `deposit` (exact assets in) and `mint` (exact shares out).
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Caller must be signer and funds the deposit
/// ✅ 2. ACCOUNT OWNERSHIP: Vault, router and share record validated with seeds
/// ✅ 6. MATH SAFETY: Checked operations in the accounting core
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Checks-effects-interactions pattern
/// ✅ 10. EVENTS: Emits Deposited event
#[derive(Accounts)]
#[instruction(amount: u64, receiver: Pubkey)]
pub struct Deposit<'info> {
    /// Depositor
    /// Security: Must be signer, pays for the receiver's share record
    #[account(mut)]
    pub caller: Signer<'info>,

    /// Vault state PDA
    /// Security: Validated by seeds, router bound by has_one
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = router @ VaultError::RouterMismatch,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    /// Strategy router, read for total assets
    #[account(
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Asset mint
    /// Security: Must match vault_state.asset_mint
    #[account(address = vault_state.asset_mint @ VaultError::InvalidMint)]
    pub asset_mint: Account<'info, Mint>,

    /// Receiver's share balance, created on first deposit
    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + ShareAccount::INIT_SPACE,
        seeds = [SHARES_SEED, vault_state.key().as_ref(), receiver.as_ref()],
        bump
    )]
    pub receiver_shares: Box<Account<'info, ShareAccount>>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Caller's asset token account (source)
    /// Security: Must be owned by caller and correct mint
    #[account(
        mut,
        constraint = caller_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = caller_asset_account.owner == caller.key() @ VaultError::InvalidOwner,
    )]
    pub caller_asset_account: Account<'info, TokenAccount>,

    /// Buffer token account
    /// Security: Must be correct mint and owned by vault_authority
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Which side of the deposit the caller fixed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepositKind {
    Assets,
    Shares,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
    kind: DepositKind,
    amount: u64,
    receiver: Pubkey,
) -> Result<DepositOutcome> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault_state.key();
    let router_key = ctx.accounts.router.key();

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();

    let accounts = &mut *ctx.accounts;
    accounts
        .receiver_shares
        .open(vault_key, receiver, ctx.bumps.receiver_shares);

    // CHECKS + EFFECTS: price the deposit and credit shares before moving tokens
    let outcome = {
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        match kind {
            DepositKind::Assets => ledger.deposit(amount, &mut accounts.receiver_shares)?,
            DepositKind::Shares => ledger.mint(amount, &mut accounts.receiver_shares)?,
        }
    };

    // INTERACTIONS: pull the assets into the buffer
    transfer_from_user(
        &accounts.token_program,
        accounts.caller_asset_account.to_account_info(),
        accounts.vault_token_account.to_account_info(),
        accounts.caller.to_account_info(),
        outcome.assets,
    )?;

    if outcome.buffer > outcome.target_buffer {
        msg!(
            "Buffer {} above target {}; surplus stays liquid until allocated",
            outcome.buffer,
            outcome.target_buffer
        );
    }

    emit!(Deposited {
        vault: vault_key,
        caller: accounts.caller.key(),
        receiver,
        assets: outcome.assets,
        shares: outcome.shares,
        buffer: outcome.buffer,
        target_buffer: outcome.target_buffer,
        total_assets: outcome.total_assets,
        total_shares: accounts.vault_state.total_shares,
        timestamp: now,
    });

    Ok(outcome)
}
