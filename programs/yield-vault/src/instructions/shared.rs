use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, Transfer};

use crate::{constants::*, errors::VaultError, events::*, state::*};

/// Registered strategies taken from `remaining_accounts`
///
/// Layout: one `[strategy_state, strategy_token_account]` pair per registered
/// id, in ascending id order.
///
/// Security:
/// - Count, addresses and ids must match the router registry exactly
/// - State accounts must be owned by this program and bound to the router
/// - Token accounts must be the ones recorded at strategy initialization
pub struct StrategyAccounts<'a, 'info> {
    pairs: Vec<&'a [AccountInfo<'info>]>,
    loaded: Vec<StrategyState>,
}

impl<'a, 'info> StrategyAccounts<'a, 'info> {
    pub fn load(
        router: &StrategyRouter,
        router_key: Pubkey,
        remaining: &'a [AccountInfo<'info>],
    ) -> Result<Self> {
        let expected = router.registered_count();
        require!(
            remaining.len() == expected * 2,
            VaultError::StrategyAccountsMismatch
        );

        let mut pairs = Vec::with_capacity(expected);
        let mut loaded = Vec::with_capacity(expected);
        for ((id, slot), pair) in router.registered().zip(remaining.chunks(2)) {
            let (state_info, token_info) = (&pair[0], &pair[1]);
            require_keys_eq!(
                state_info.key(),
                slot.address,
                VaultError::StrategyAccountsMismatch
            );
            require_keys_eq!(*state_info.owner, crate::ID, VaultError::InvalidOwner);

            let state = StrategyState::try_deserialize(&mut &state_info.try_borrow_data()?[..])?;
            require_keys_eq!(state.router, router_key, VaultError::RouterMismatch);
            require!(state.id == id, VaultError::StrategyAccountsMismatch);
            require_keys_eq!(
                token_info.key(),
                state.token_account,
                VaultError::StrategyAccountsMismatch
            );

            pairs.push(pair);
            loaded.push(state);
        }

        Ok(Self { pairs, loaded })
    }

    /// Working copies for the accounting core
    pub fn snapshot(&self) -> Vec<StrategyState> {
        self.loaded.clone()
    }

    /// Write back every state the core changed
    pub fn commit(&self, updated: &[StrategyState]) -> Result<()> {
        require!(
            updated.len() == self.loaded.len(),
            VaultError::StrategyAccountsMismatch
        );
        for ((pair, before), after) in self.pairs.iter().zip(&self.loaded).zip(updated) {
            if before == after {
                continue;
            }
            let info = &pair[0];
            require!(info.is_writable, VaultError::StrategyAccountsMismatch);
            let mut data = info.try_borrow_mut_data()?;
            after.try_serialize(&mut &mut data[..])?;
        }
        Ok(())
    }

    pub fn key(&self, index: usize) -> Result<Pubkey> {
        self.pairs
            .get(index)
            .map(|pair| pair[0].key())
            .ok_or_else(|| error!(VaultError::StrategyAccountsMismatch))
    }

    pub fn token_account(&self, index: usize) -> Result<AccountInfo<'info>> {
        self.pairs
            .get(index)
            .map(|pair| pair[1].clone())
            .ok_or_else(|| error!(VaultError::StrategyAccountsMismatch))
    }

    /// Move `amount` out of the strategy at `index`, signed by its state PDA
    pub fn pay_out(
        &self,
        index: usize,
        to: AccountInfo<'info>,
        token_program: &Program<'info, Token>,
        amount: u64,
    ) -> Result<()> {
        let pair = self
            .pairs
            .get(index)
            .ok_or(VaultError::StrategyAccountsMismatch)?;
        transfer_from_strategy(
            token_program,
            &self.loaded[index],
            pair[0].clone(),
            pair[1].clone(),
            to,
            amount,
        )
    }
}

/// Transfer signed by the caller
pub fn transfer_from_user<'info>(
    token_program: &Program<'info, Token>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let transfer_ctx = CpiContext::new(
        token_program.to_account_info(),
        Transfer {
            from,
            to,
            authority,
        },
    );
    token::transfer(transfer_ctx, amount)
}

/// Transfer out of the buffer, signed by the vault authority PDA
pub fn transfer_from_vault<'info>(
    token_program: &Program<'info, Token>,
    vault_state: &VaultState,
    vault_authority: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let asset_mint_key = vault_state.asset_mint;
    let authority_bump = vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        Transfer {
            from,
            to,
            authority: vault_authority,
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)
}

/// Transfer out of a strategy token account, signed by the strategy state PDA
pub fn transfer_from_strategy<'info>(
    token_program: &Program<'info, Token>,
    strategy: &StrategyState,
    strategy_info: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let router_key = strategy.router;
    let id = [strategy.id];
    let bump = [strategy.bump];
    let strategy_seeds: &[&[u8]] = &[STRATEGY_SEED, router_key.as_ref(), &id, &bump];
    let signer_seeds = &[&strategy_seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        Transfer {
            from,
            to,
            authority: strategy_info,
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)
}

/// Strategy-level record of capital moving in
pub fn emit_strategy_deposited(
    strategy: Pubkey,
    state: &StrategyState,
    amount: u64,
    now: i64,
) -> Result<()> {
    emit!(StrategyDeposited {
        strategy,
        amount,
        new_principal: state.principal,
        new_total_assets: state.total_assets(now)?,
        timestamp: now,
    });
    Ok(())
}

/// Strategy-level record of capital moving out
pub fn emit_strategy_withdrawn(
    strategy: Pubkey,
    state: &StrategyState,
    amount: u64,
    now: i64,
) -> Result<()> {
    emit!(StrategyWithdrawn {
        strategy,
        amount,
        new_principal: state.principal,
        new_total_assets: state.total_assets(now)?,
        timestamp: now,
    });
    Ok(())
}
