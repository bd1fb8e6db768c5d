//! Mathematical Utilities for the Staking Contracts
//!
//! Safe arithmetic helpers. All share/coin conversions use floor
//! division; residue from flooring is swept at settlement, never
//! discarded.

use crate::errors::{StakingError, StakingResult};

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> StakingResult<u64> {
    a.checked_add(b).ok_or(StakingError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> StakingResult<u64> {
    a.checked_sub(b).ok_or(StakingError::Underflow)
}

/// floor(a * b / c) computed in u128 to avoid intermediate overflow
pub fn mul_div(a: u64, b: u64, c: u64) -> StakingResult<u64> {
    if c == 0 {
        return Err(StakingError::DivisionByZero);
    }
    let result = (a as u128)
        .checked_mul(b as u128)
        .ok_or(StakingError::Overflow)?
        / c as u128;
    if result > u64::MAX as u128 {
        return Err(StakingError::Overflow);
    }
    Ok(result as u64)
}

/// floor(a * b / c) over wide integers, for share arithmetic
pub fn mul_div_u128(a: u128, b: u128, c: u128) -> StakingResult<u128> {
    if c == 0 {
        return Err(StakingError::DivisionByZero);
    }
    let result = a.checked_mul(b).ok_or(StakingError::Overflow)? / c;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_add_sub() {
        assert_eq!(safe_add(2, 3).unwrap(), 5);
        assert_eq!(safe_add(u64::MAX, 1), Err(StakingError::Overflow));
        assert_eq!(safe_sub(5, 3).unwrap(), 2);
        assert_eq!(safe_sub(3, 5), Err(StakingError::Underflow));
    }

    #[test]
    fn test_mul_div_floors() {
        // 7 * 3 / 2 = 10.5 -> 10
        assert_eq!(mul_div(7, 3, 2).unwrap(), 10);
        // exact division
        assert_eq!(mul_div(100, 50, 100).unwrap(), 50);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // a * b overflows u64 but not u128
        assert_eq!(mul_div(u64::MAX, 2, 4).unwrap(), u64::MAX / 2);
    }

    #[test]
    fn test_mul_div_zero_divisor() {
        assert_eq!(mul_div(1, 1, 0), Err(StakingError::DivisionByZero));
        assert_eq!(mul_div_u128(1, 1, 0), Err(StakingError::DivisionByZero));
    }

    #[test]
    fn test_mul_div_result_overflow() {
        assert_eq!(mul_div(u64::MAX, 2, 1), Err(StakingError::Overflow));
    }
}
