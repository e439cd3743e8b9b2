use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{config::VaultParams, constants::*, events::*, state::*};

/// Initialize a new vault and its strategy router for a given asset token
#[derive(Accounts)]
pub struct InitializeVault<'info> {
    /// Vault owner - configures the vault, registers strategies, rebalances
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: One vault per asset mint
    #[account(
        init,
        payer = authority,
        space = 8 + VaultState::INIT_SPACE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    /// Strategy router PDA serving this vault
    #[account(
        init,
        payer = authority,
        space = 8 + StrategyRouter::INIT_SPACE,
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Asset token mint (the underlying token users deposit)
    /// Security: No constraints needed - any valid mint can have a vault
    pub asset_mint: Account<'info, Mint>,

    /// Vault authority PDA - signs for the buffer token account
    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Buffer token account
    /// Security: Owned by vault_authority PDA, correct mint
    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeVault>, params: VaultParams) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault_state.key();
    let router_key = ctx.accounts.router.key();

    // CHECKS + EFFECTS: validate and copy the parameter set
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.configure(&params, now)?;
    vault_state.authority = ctx.accounts.authority.key();
    vault_state.asset_mint = ctx.accounts.asset_mint.key();
    vault_state.router = router_key;
    vault_state.buffer = 0;
    vault_state.total_shares = 0;
    vault_state.bump = ctx.bumps.vault_state;
    vault_state.authority_bump = ctx.bumps.vault_authority;

    let router = &mut ctx.accounts.router;
    router.vault = vault_key;
    router.authority = ctx.accounts.authority.key();
    router.bump = ctx.bumps.router;

    emit!(VaultInitialized {
        vault: vault_key,
        authority: vault_state.authority,
        asset_mint: vault_state.asset_mint,
        router: router_key,
        timestamp: now,
    });

    Ok(())
}
