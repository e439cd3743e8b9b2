use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Add a strategy to the router registry under `strategy_id`
#[derive(Accounts)]
#[instruction(strategy_id: u8)]
pub struct RegisterStrategy<'info> {
    /// Router owner - only they can manage strategies
    /// Security: Must be signer and match router.authority
    pub authority: Signer<'info>,

    /// Router PDA
    /// Security: has_one constraint validates authority from state
    #[account(
        mut,
        seeds = [ROUTER_SEED, router.vault.as_ref()],
        bump = router.bump,
        has_one = authority @ VaultError::NotOwner,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Vault served by the router
    #[account(address = router.vault @ VaultError::RouterMismatch)]
    pub vault_state: Box<Account<'info, VaultState>>,

    /// Strategy being registered
    /// Security: Must be bound to this router, hold the vault's asset and
    /// carry the id it is registered under
    #[account(
        constraint = strategy.router == router.key() @ VaultError::RouterMismatch,
        constraint = strategy.asset_mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = strategy.id == strategy_id @ VaultError::InvalidStrategyId,
    )]
    pub strategy: Box<Account<'info, StrategyState>>,
}

pub fn handler(ctx: Context<RegisterStrategy>, strategy_id: u8, cap: u64) -> Result<()> {
    let strategy = ctx.accounts.strategy.key();
    let router = &mut ctx.accounts.router;

    router.register_strategy(strategy_id, strategy, cap)?;

    emit!(StrategyRegistered {
        router: router.key(),
        strategy_id,
        strategy,
        cap,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
