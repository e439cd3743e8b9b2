use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

/// Create a constant-APR reference strategy bound to a router
///
/// The strategy PDA owns its token account, so only this program can move
/// deployed capital. Registration with the router is a separate step.
#[derive(Accounts)]
#[instruction(strategy_id: u8)]
pub struct InitializeStrategy<'info> {
    /// Router owner
    /// Security: Must be signer and match router.authority
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [ROUTER_SEED, router.vault.as_ref()],
        bump = router.bump,
        has_one = authority @ VaultError::NotOwner,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    #[account(address = router.vault @ VaultError::RouterMismatch)]
    pub vault_state: Box<Account<'info, VaultState>>,

    #[account(address = vault_state.asset_mint @ VaultError::InvalidMint)]
    pub asset_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = 8 + StrategyState::INIT_SPACE,
        seeds = [STRATEGY_SEED, router.key().as_ref(), &strategy_id.to_le_bytes()],
        bump
    )]
    pub strategy: Box<Account<'info, StrategyState>>,

    /// Capital deployed to the strategy
    /// Security: Owned by the strategy PDA, correct mint
    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = strategy,
    )]
    pub strategy_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeStrategy>,
    strategy_id: u8,
    owner: Pubkey,
    apr_bps: u16,
    cap: u64,
) -> Result<()> {
    require!(
        (strategy_id as usize) < MAX_STRATEGIES,
        VaultError::InvalidStrategyId
    );
    require!(owner != Pubkey::default(), VaultError::ZeroAddress);

    let now = Clock::get()?.unix_timestamp;
    let router_key = ctx.accounts.router.key();

    let strategy = &mut ctx.accounts.strategy;
    strategy.owner = owner;
    strategy.router = router_key;
    strategy.asset_mint = ctx.accounts.asset_mint.key();
    strategy.token_account = ctx.accounts.strategy_token_account.key();
    strategy.id = strategy_id;
    strategy.principal = 0;
    strategy.accumulator = SCALE;
    strategy.last_accrual_ts = now;
    strategy.apr_bps = apr_bps;
    strategy.cap = cap;
    strategy.paused = false;
    strategy.bump = ctx.bumps.strategy;

    emit!(StrategyInitialized {
        strategy: strategy.key(),
        router: router_key,
        owner,
        strategy_id,
        apr_bps,
        cap,
        timestamp: now,
    });

    Ok(())
}
