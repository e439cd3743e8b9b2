use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    constants::*,
    errors::*,
    events::*,
    instructions::shared::{emit_strategy_withdrawn, transfer_from_vault, StrategyAccounts},
    ledger::{VaultLedger, WithdrawOutcome},
    state::*,
};

/// Burn `owner`'s shares and pay assets to `receiver`
///
/// Shared by `withdraw` (exact assets out) and `redeem` (exact shares in).
/// A caller other than `owner` spends the owner's share allowance.
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Caller must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Share, allocation and allowance records validated with seeds
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Receiver account must belong to receiver
/// ✅ 8. BUSINESS LOGIC: Allocation-aware limits, checks-effects-interactions
/// ✅ 10. EVENTS: Emits Withdrawn and WithdrawnFromStrategy events
#[derive(Accounts)]
#[instruction(amount: u64, receiver: Pubkey, owner: Pubkey)]
pub struct Withdraw<'info> {
    /// Owner or an approved spender
    /// Security: Must be signer
    #[account(mut)]
    pub caller: Signer<'info>,

    /// Vault state PDA
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = router @ VaultError::RouterMismatch,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    /// Strategy router, mutated when the buffer is topped up from strategies
    #[account(
        mut,
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Owner's share balance
    #[account(
        mut,
        seeds = [SHARES_SEED, vault_state.key().as_ref(), owner.as_ref()],
        bump = owner_shares.bump,
    )]
    pub owner_shares: Box<Account<'info, ShareAccount>>,

    /// Owner's allocation record, empty if they never allocated
    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + UserAllocation::INIT_SPACE,
        seeds = [ALLOCATION_SEED, router.key().as_ref(), owner.as_ref()],
        bump
    )]
    pub owner_allocation: Box<Account<'info, UserAllocation>>,

    /// Required when the caller is not the owner
    #[account(
        mut,
        seeds = [ALLOWANCE_SEED, vault_state.key().as_ref(), owner.as_ref(), caller.key().as_ref()],
        bump = allowance.bump,
    )]
    pub allowance: Option<Box<Account<'info, ShareAllowance>>>,

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

    /// Receiver's asset token account (destination)
    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = receiver_asset_account.owner == receiver @ VaultError::InvalidOwner,
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Which side of the exit the caller fixed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawKind {
    Assets,
    Shares,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    kind: WithdrawKind,
    amount: u64,
    receiver: Pubkey,
    owner: Pubkey,
) -> Result<WithdrawOutcome> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.caller.key();
    let vault_key = ctx.accounts.vault_state.key();
    let router_key = ctx.accounts.router.key();

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();

    let accounts = &mut *ctx.accounts;
    accounts
        .owner_allocation
        .open(router_key, owner, ctx.bumps.owner_allocation);

    // CHECKS + EFFECTS: limits, allowance, buffer waterfall and burn
    let outcome = {
        let allowance = accounts.allowance.as_mut().map(|a| &mut ***a);
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        match kind {
            WithdrawKind::Assets => ledger.withdraw(
                &caller,
                amount,
                &receiver,
                &mut accounts.owner_shares,
                &accounts.owner_allocation,
                allowance,
            )?,
            WithdrawKind::Shares => ledger.redeem(
                &caller,
                amount,
                &receiver,
                &mut accounts.owner_shares,
                &accounts.owner_allocation,
                allowance,
            )?,
        }
    };
    strategies.commit(&states)?;

    // INTERACTIONS: refill the buffer from strategies, then pay the receiver
    for pull in &outcome.pulls {
        strategies.pay_out(
            pull.index,
            accounts.vault_token_account.to_account_info(),
            &accounts.token_program,
            pull.amount,
        )?;
        emit_strategy_withdrawn(
            strategies.key(pull.index)?,
            &states[pull.index],
            pull.amount,
            now,
        )?;
        emit!(WithdrawnFromStrategy {
            vault: vault_key,
            strategy_id: pull.strategy_id,
            amount: pull.amount,
            timestamp: now,
        });
    }

    transfer_from_vault(
        &accounts.token_program,
        &accounts.vault_state,
        accounts.vault_authority.to_account_info(),
        accounts.vault_token_account.to_account_info(),
        accounts.receiver_asset_account.to_account_info(),
        outcome.assets,
    )?;

    emit!(Withdrawn {
        vault: vault_key,
        caller,
        receiver,
        owner,
        assets: outcome.assets,
        shares: outcome.shares,
        buffer: outcome.buffer,
        total_shares: accounts.vault_state.total_shares,
        timestamp: now,
    });

    Ok(outcome)
}
