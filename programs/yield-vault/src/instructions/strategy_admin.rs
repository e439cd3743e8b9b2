use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Strategy-owner operations: rate and cap, pause, yield realization
#[derive(Accounts)]
pub struct StrategyAdmin<'info> {
    /// Strategy owner
    /// Security: Must be signer and match strategy.owner
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.router.as_ref(), &strategy.id.to_le_bytes()],
        bump = strategy.bump,
        has_one = owner @ VaultError::NotOwner,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,
}

pub fn set_params_handler(ctx: Context<StrategyAdmin>, apr_bps: u16, cap: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let strategy = &mut ctx.accounts.strategy;
    strategy.set_params(apr_bps, cap, now)?;

    emit!(StrategyParamsSet {
        strategy: strategy.key(),
        apr_bps,
        cap,
        timestamp: now,
    });

    Ok(())
}

pub fn pause_handler(ctx: Context<StrategyAdmin>, paused: bool) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    strategy.set_paused(paused);

    emit!(StrategyPauseSet {
        strategy: strategy.key(),
        paused,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn report_handler(ctx: Context<StrategyAdmin>) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let strategy = &mut ctx.accounts.strategy;
    let realized = strategy.report(now)?;

    emit!(StrategyReported {
        strategy: strategy.key(),
        realized,
        principal: strategy.principal,
        timestamp: now,
    });

    Ok(realized)
}
