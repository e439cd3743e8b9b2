use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    constants::*,
    errors::*,
    events::*,
    instructions::shared::{
        emit_strategy_deposited, emit_strategy_withdrawn, transfer_from_strategy,
        transfer_from_user,
    },
    state::*,
};

/// Capital a user supplies to one strategy through the router, bypassing the
/// vault share ledger
///
/// Held as slot claim units in a `DirectPosition`, so neither the capital
/// nor its yield is priced into vault shares.
#[derive(Accounts)]
#[instruction(strategy_id: u8)]
pub struct RouterPosition<'info> {
    /// Capital supplier
    /// Security: Must be signer, pays for the position record
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [ROUTER_SEED, router.vault.as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Strategy registered under `strategy_id`
    #[account(
        mut,
        constraint = router.slot(strategy_id)?.address == strategy.key() @ VaultError::StrategyAccountsMismatch,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,

    #[account(
        mut,
        address = strategy.token_account @ VaultError::StrategyAccountsMismatch,
    )]
    pub strategy_token_account: Account<'info, TokenAccount>,

    /// User's asset token account
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_asset_account.mint == strategy.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// User's direct position, separate from vault allocations
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + DirectPosition::INIT_SPACE,
        seeds = [ROUTER_POSITION_SEED, router.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, DirectPosition>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn deposit_handler(ctx: Context<RouterPosition>, strategy_id: u8, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();
    let router_key = ctx.accounts.router.key();

    let accounts = &mut *ctx.accounts;
    accounts
        .position
        .open(router_key, user, ctx.bumps.position);

    // CHECKS + EFFECTS
    accounts.router.deposit_to_strategy(
        &mut **accounts.strategy,
        strategy_id,
        amount,
        Beneficiary::Direct(&mut **accounts.position),
        now,
    )?;

    // INTERACTIONS
    transfer_from_user(
        &accounts.token_program,
        accounts.user_asset_account.to_account_info(),
        accounts.strategy_token_account.to_account_info(),
        accounts.user.to_account_info(),
        amount,
    )?;
    emit_strategy_deposited(accounts.strategy.key(), &accounts.strategy, amount, now)?;

    emit!(RouterDeposited {
        router: router_key,
        user,
        strategy_id,
        amount,
        allocated: accounts.position.strategy_principal(strategy_id),
        timestamp: now,
    });

    Ok(())
}

/// Unwind up to the current value of the user's claim, yield included
pub fn withdraw_handler(
    ctx: Context<RouterPosition>,
    strategy_id: u8,
    amount: u64,
    max_slippage_bps: u16,
) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();
    let router_key = ctx.accounts.router.key();

    let accounts = &mut *ctx.accounts;
    accounts
        .position
        .open(router_key, user, ctx.bumps.position);
    let claim = accounts.router.direct_withdrawable(
        strategy_id,
        &**accounts.strategy,
        &accounts.position,
        now,
    )?;
    require!(amount <= claim, VaultError::AllocationExceeded);

    let withdrawal = accounts.router.withdraw_from_strategy(
        &mut **accounts.strategy,
        strategy_id,
        amount,
        max_slippage_bps,
        Beneficiary::Direct(&mut **accounts.position),
        now,
    )?;

    transfer_from_strategy(
        &accounts.token_program,
        &accounts.strategy,
        accounts.strategy.to_account_info(),
        accounts.strategy_token_account.to_account_info(),
        accounts.user_asset_account.to_account_info(),
        withdrawal.received,
    )?;
    emit_strategy_withdrawn(accounts.strategy.key(), &accounts.strategy, withdrawal.received, now)?;

    emit!(RouterWithdrawn {
        router: router_key,
        user,
        strategy_id,
        requested: amount,
        received: withdrawal.received,
        allocated: accounts.position.strategy_principal(strategy_id),
        timestamp: now,
    });

    Ok(withdrawal.received)
}
