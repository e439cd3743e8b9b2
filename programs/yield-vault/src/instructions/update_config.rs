use anchor_lang::prelude::*;

use crate::{
    config::{ConfigChange, ConfigUpdate},
    constants::*,
    errors::*,
    events::*,
    state::*,
};

/// Change one vault parameter
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    /// Vault owner
    /// Security: Must be signer and match vault_state.authority
    pub authority: Signer<'info>,

    /// Security: has_one constraint validates authority from state
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::NotOwner,
    )]
    pub vault_state: Box<Account<'info, VaultState>>,
}

pub fn handler(ctx: Context<UpdateConfig>, update: ConfigUpdate) -> Result<()> {
    let vault = ctx.accounts.vault_state.key();
    let timestamp = Clock::get()?.unix_timestamp;

    match ctx.accounts.vault_state.apply_config(update)? {
        ConfigChange::Value {
            key,
            old_value,
            new_value,
        } => emit!(ConfigChanged {
            vault,
            key,
            old_value,
            new_value,
            timestamp,
        }),
        ConfigChange::FeeRecipient { old, new } => emit!(FeeRecipientChanged {
            vault,
            old_recipient: old,
            new_recipient: new,
            timestamp,
        }),
    }

    Ok(())
}
