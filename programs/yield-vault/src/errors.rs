use anchor_lang::prelude::*;

/// Custom error codes for the Yield Vault program
///
/// Every failure maps to one kind so callers can tell a liquidity
/// shortfall (retry later) from a request that is simply invalid.
#[error_code]
pub enum VaultError {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Receiver or owner must not be the default address")]
    ZeroAddress,

    #[msg("Amount exceeds the deposit, withdraw, buffer or unallocated limit")]
    CapExceeded,

    #[msg("Vault buffer cannot cover the requested amount")]
    InsufficientLiquidity,

    #[msg("Amount exceeds the caller's unallocated position")]
    InsufficientUnallocated,

    #[msg("Share balance too low")]
    InsufficientShares,

    #[msg("Share allowance too low")]
    InsufficientAllowance,

    #[msg("Transfer would leave an active allocation undercollateralized")]
    AllocationTransferRestriction,

    #[msg("Fee epoch has not elapsed yet")]
    EpochNotComplete,

    #[msg("Vault is paused")]
    Paused,

    #[msg("Unauthorized - only the owner can perform this action")]
    NotOwner,

    #[msg("Deposit would push the strategy past its cap")]
    StrategyCapExceeded,

    #[msg("Strategy balance insufficient for this request")]
    InsufficientBalance,

    #[msg("Strategy is paused")]
    StrategyPaused,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero - vault has shares but no assets")]
    DivisionByZero,

    #[msg("Basis points must not exceed 10000")]
    InvalidBps,

    #[msg("Epoch duration must be positive")]
    InvalidEpochDuration,

    #[msg("Strategy id out of range")]
    InvalidStrategyId,

    #[msg("Strategy not registered")]
    StrategyNotFound,

    #[msg("Strategy is inactive")]
    StrategyInactive,

    #[msg("Strategy id already registered")]
    StrategyAlreadyRegistered,

    #[msg("Strategy address already registered under another id")]
    StrategyAddressInUse,

    #[msg("Cap cannot be set below allocated capital")]
    CapBelowAllocated,

    #[msg("Amount exceeds the caller's recorded allocation")]
    AllocationExceeded,

    #[msg("Received amount fell short of the slippage tolerance")]
    SlippageExceeded,

    #[msg("Strategy accounts do not match the router registry")]
    StrategyAccountsMismatch,

    #[msg("Invalid token mint - does not match vault asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Strategy belongs to a different router")]
    RouterMismatch,

    #[msg("Cannot transfer shares to the same account")]
    SelfTransfer,
}
