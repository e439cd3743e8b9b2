use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::*,
    events::*,
    instructions::shared::StrategyAccounts,
    ledger::{FeeOutcome, VaultLedger},
    state::*,
};

/// Take the performance fee for the finished epoch
///
/// Permissionless and time-gated; keeps running while the vault is paused.
#[derive(Accounts)]
pub struct CrystallizeFees<'info> {
    /// Anyone may crank the epoch
    /// Security: Must be signer, pays for the recipient's share record
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = router @ VaultError::RouterMismatch,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    /// Read for total assets
    #[account(
        seeds = [ROUTER_SEED, vault_state.key().as_ref()],
        bump = router.bump,
    )]
    pub router: Box<Account<'info, StrategyRouter>>,

    /// Share record of the configured fee recipient
    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + ShareAccount::INIT_SPACE,
        seeds = [SHARES_SEED, vault_state.key().as_ref(), vault_state.fee_recipient.as_ref()],
        bump
    )]
    pub fee_recipient_shares: Box<Account<'info, ShareAccount>>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, CrystallizeFees<'info>>,
) -> Result<FeeOutcome> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault_state.key();
    let router_key = ctx.accounts.router.key();
    let fee_recipient = ctx.accounts.vault_state.fee_recipient;

    let strategies = StrategyAccounts::load(&ctx.accounts.router, router_key, ctx.remaining_accounts)?;
    let mut states = strategies.snapshot();

    let accounts = &mut *ctx.accounts;
    accounts
        .fee_recipient_shares
        .open(vault_key, fee_recipient, ctx.bumps.fee_recipient_shares);

    let outcome = {
        let mut ledger = VaultLedger::new(
            &mut accounts.vault_state,
            &mut accounts.router,
            &mut states,
            now,
        );
        ledger.crystallize_fees(&mut accounts.fee_recipient_shares)?
    };

    if outcome.fee_shares == 0 {
        msg!(
            "No fee: price per share {} at or below high-water mark",
            outcome.price_per_share
        );
    }

    emit!(FeesCrystallized {
        vault: vault_key,
        fee_recipient,
        price_per_share: outcome.price_per_share,
        high_water_mark: outcome.high_water_mark,
        fee_assets: outcome.fee_assets,
        fee_shares: outcome.fee_shares,
        timestamp: now,
    });

    Ok(outcome)
}
