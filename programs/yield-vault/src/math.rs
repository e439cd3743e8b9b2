//! Checked fixed-point helpers.
//!
//! All products are taken in `u128`. Division floors unless the function
//! name says otherwise; callers pick the direction that favors the vault.

use anchor_lang::prelude::*;

use crate::{constants::BPS_DENOMINATOR, errors::VaultError};

/// `a * b / denominator`, rounding down
pub fn mul_div_down(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, VaultError::DivisionByZero);
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or_else(|| error!(VaultError::MathOverflow))
}

/// `a * b / denominator`, rounding up
pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, VaultError::DivisionByZero);
    let product = a.checked_mul(b).ok_or(VaultError::MathOverflow)?;
    let quotient = product / denominator;
    if product % denominator == 0 {
        Ok(quotient)
    } else {
        quotient
            .checked_add(1)
            .ok_or_else(|| error!(VaultError::MathOverflow))
    }
}

/// Narrow a `u128` intermediate back to a token amount
pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}

/// `amount * bps / 10000`, rounding down
pub fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    to_u64(mul_div_down(
        amount as u128,
        bps as u128,
        BPS_DENOMINATOR as u128,
    )?)
}

pub fn require_bps(bps: u16) -> Result<()> {
    require!(bps as u64 <= BPS_DENOMINATOR, VaultError::InvalidBps);
    Ok(())
}

/// True when `received` falls short of `requested` by more than `max_bps`
pub fn exceeds_slippage(requested: u64, received: u64, max_bps: u16) -> bool {
    let shortfall = requested.saturating_sub(received) as u128;
    shortfall * BPS_DENOMINATOR as u128 > requested as u128 * max_bps as u128
}
