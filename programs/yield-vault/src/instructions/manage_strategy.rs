use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Toggle a registered strategy or change its router-level cap
#[derive(Accounts)]
pub struct ManageStrategy<'info> {
    /// Router owner - only they can manage strategies
    pub authority: Signer<'info>,

    /// Router PDA
    #[account(
        mut,
        seeds = [ROUTER_SEED, router.vault.as_ref()],
        bump = router.bump,
        has_one = authority @ VaultError::NotOwner,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,
}

/// Deactivation blocks new deposits and withdrawals; existing positions stay
pub fn set_active_handler(ctx: Context<ManageStrategy>, strategy_id: u8, active: bool) -> Result<()> {
    let router = &mut ctx.accounts.router;
    router.set_strategy_active(strategy_id, active)?;

    emit!(StrategyActiveSet {
        router: router.key(),
        strategy_id,
        active,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_cap_handler(ctx: Context<ManageStrategy>, strategy_id: u8, cap: u64) -> Result<()> {
    let router = &mut ctx.accounts.router;
    let old_cap = router.slot(strategy_id)?.cap;
    router.set_strategy_cap(strategy_id, cap)?;

    emit!(StrategyCapSet {
        router: router.key(),
        strategy_id,
        old_cap,
        new_cap: cap,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
