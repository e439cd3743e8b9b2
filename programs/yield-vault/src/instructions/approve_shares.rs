use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Set how many of the owner's shares `spender` may move or redeem
#[derive(Accounts)]
#[instruction(spender: Pubkey)]
pub struct ApproveShares<'info> {
    /// Share owner
    /// Security: Must be signer, pays for the allowance record
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + ShareAllowance::INIT_SPACE,
        seeds = [ALLOWANCE_SEED, vault_state.key().as_ref(), owner.key().as_ref(), spender.as_ref()],
        bump
    )]
    pub allowance: Box<Account<'info, ShareAllowance>>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<ApproveShares>, spender: Pubkey, amount: u64) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let owner = ctx.accounts.owner.key();

    let allowance = &mut ctx.accounts.allowance;
    allowance.open(vault_key, owner, spender, ctx.bumps.allowance);
    // overwrite, not increment
    allowance.amount = amount;

    emit!(SharesApproved {
        vault: vault_key,
        owner,
        spender,
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
