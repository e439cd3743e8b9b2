use anchor_lang::prelude::*;

use crate::config::ConfigKey;

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub router: Pubkey,
    pub timestamp: i64,
}

/// Event emitted on deposit and mint
#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub buffer: u64,
    pub target_buffer: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted on withdraw and redeem
#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub buffer: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a withdrawal had to pull capital out of a strategy
#[event]
pub struct WithdrawnFromStrategy {
    pub vault: Pubkey,
    pub strategy_id: u8,
    pub amount: u64,
    pub timestamp: i64,
}

/// Event emitted on vault-level allocate and deallocate
#[event]
pub struct Allocated {
    pub vault: Pubkey,
    pub strategy_id: u8,
    /// Positive when capital moved into the strategy
    pub amount: i128,
    pub buffer: u64,
    pub timestamp: i64,
}

#[event]
pub struct UserAllocated {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub strategy_id: u8,
    pub amount: u64,
    pub user_total_allocated: u64,
    pub buffer: u64,
    pub timestamp: i64,
}

#[event]
pub struct UserUnallocated {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub strategy_id: u8,
    pub requested: u64,
    pub received: u64,
    pub user_total_allocated: u64,
    pub buffer: u64,
    pub timestamp: i64,
}

#[event]
pub struct SharesTransferred {
    pub vault: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub caller: Pubkey,
    pub shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct SharesApproved {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct FeesCrystallized {
    pub vault: Pubkey,
    pub fee_recipient: Pubkey,
    pub price_per_share: u128,
    pub high_water_mark: u128,
    pub fee_assets: u64,
    pub fee_shares: u64,
    pub timestamp: i64,
}

/// Generic configuration change carrying old and new values
#[event]
pub struct ConfigChanged {
    pub vault: Pubkey,
    pub key: ConfigKey,
    pub old_value: i128,
    pub new_value: i128,
    pub timestamp: i64,
}

#[event]
pub struct FeeRecipientChanged {
    pub vault: Pubkey,
    pub old_recipient: Pubkey,
    pub new_recipient: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a strategy is added to the router registry
#[event]
pub struct StrategyRegistered {
    pub router: Pubkey,
    pub strategy_id: u8,
    pub strategy: Pubkey,
    pub cap: u64,
    pub timestamp: i64,
}

/// Event emitted when a strategy is toggled
#[event]
pub struct StrategyActiveSet {
    pub router: Pubkey,
    pub strategy_id: u8,
    pub active: bool,
    pub timestamp: i64,
}

#[event]
pub struct StrategyCapSet {
    pub router: Pubkey,
    pub strategy_id: u8,
    pub old_cap: u64,
    pub new_cap: u64,
    pub timestamp: i64,
}

/// Direct capital supplied through the router, outside the vault
#[event]
pub struct RouterDeposited {
    pub router: Pubkey,
    pub user: Pubkey,
    pub strategy_id: u8,
    pub amount: u64,
    pub allocated: u64,
    pub timestamp: i64,
}

#[event]
pub struct RouterWithdrawn {
    pub router: Pubkey,
    pub user: Pubkey,
    pub strategy_id: u8,
    pub requested: u64,
    pub received: u64,
    pub allocated: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyInitialized {
    pub strategy: Pubkey,
    pub router: Pubkey,
    pub owner: Pubkey,
    pub strategy_id: u8,
    pub apr_bps: u16,
    pub cap: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyDeposited {
    pub strategy: Pubkey,
    pub amount: u64,
    pub new_principal: u64,
    pub new_total_assets: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyWithdrawn {
    pub strategy: Pubkey,
    pub amount: u64,
    pub new_principal: u64,
    pub new_total_assets: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyReported {
    pub strategy: Pubkey,
    pub realized: u64,
    pub principal: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyParamsSet {
    pub strategy: Pubkey,
    pub apr_bps: u16,
    pub cap: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyPauseSet {
    pub strategy: Pubkey,
    pub paused: bool,
    pub timestamp: i64,
}
