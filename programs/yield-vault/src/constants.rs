// Constants for the Yield Vault program

/// Seed for vault state PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for the PDA that owns the buffer token account
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for the strategy router PDA
pub const ROUTER_SEED: &[u8] = b"router";

/// Seed for reference strategy state PDAs. The state PDA also owns the
/// strategy token account.
pub const STRATEGY_SEED: &[u8] = b"strategy";

/// Seed for per-holder share balances
pub const SHARES_SEED: &[u8] = b"shares";

/// Seed for share allowances
pub const ALLOWANCE_SEED: &[u8] = b"allowance";

/// Seed for per-user allocation records made through the vault
pub const ALLOCATION_SEED: &[u8] = b"allocation";

/// Seed for capital a user supplies to the router directly
pub const ROUTER_POSITION_SEED: &[u8] = b"router_position";

/// Basis-point denominator (100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Fixed-point scale used by price-per-share and the strategy accumulator
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Seconds in a 365-day year
pub const YEAR_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Number of strategy slots in the router arena. Ids are `0..MAX_STRATEGIES`.
pub const MAX_STRATEGIES: usize = 8;

/// Strategy pulls made on behalf of a redeem must return the full amount
pub const REDEEM_MAX_SLIPPAGE_BPS: u16 = 0;
