//! Expected-value arithmetic for the deposit/withdraw cycle.
//!
//! Everything here is pure: the inputs come from the pool's own view
//! functions, so the numbers can be checked without a node.

use alloy::primitives::{Address, U256};

use crate::error::HarnessError;

/// `get_virtual_price` and friends are scaled by 1e18.
pub const PRECISION: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Deposits must mint more than this share of `calc_token_amount`'s estimate.
pub const DEPOSIT_FLOOR_PCT: u64 = 95;

/// Value of the whole pool in LP-token units: `virtual_price * total_supply / 1e18`.
pub fn pool_value(virtual_price: U256, total_supply: U256) -> U256 {
    virtual_price.saturating_mul(total_supply) / PRECISION
}

/// Position of `token` in the pool's coin list. The last match wins.
pub fn token_index(coins: &[Address], token: Address) -> Option<usize> {
    coins.iter().rposition(|c| *c == token)
}

/// Amount vector for `calc_token_amount`: the whole balance of `token`
/// capped at the pool's value, zero for every other coin.
pub fn deposit_amounts(coins: &[Address; 2], token: Address, balance: U256, pool_value: U256) -> [U256; 2] {
    let mut amounts = [U256::ZERO; 2];
    for (amount, coin) in amounts.iter_mut().zip(coins) {
        if *coin == token {
            *amount = balance.min(pool_value);
        }
    }
    amounts
}

pub fn deposit_floor(expected: U256) -> U256 {
    expected.saturating_mul(U256::from(DEPOSIT_FLOOR_PCT)) / U256::from(100u64)
}

pub fn check_above_floor(check: &'static str, actual: U256, expected: U256) -> Result<(), HarnessError> {
    let floor = deposit_floor(expected);
    if actual > floor {
        Ok(())
    } else {
        Err(HarnessError::BelowFloor { check, actual, floor })
    }
}

pub fn check_equal(check: &'static str, actual: U256, expected: U256) -> Result<(), HarnessError> {
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::Mismatch {
            check,
            expected,
            actual,
        })
    }
}

/// `10^decimals`, i.e. one whole token in base units.
pub fn one_token(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Human-readable `amount` scaled to base units.
pub fn scale(amount: u64, decimals: u8) -> U256 {
    U256::from(amount).saturating_mul(one_token(decimals))
}

/// Amount a whale hands over: a millionth of a token, never less than one unit.
pub fn whale_transfer_amount(decimals: u8) -> U256 {
    one_token(decimals.saturating_sub(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    #[test]
    fn pool_value_scales_by_virtual_price() {
        let vp = U256::from(1_015_000_000_000_000_000u128); // 1.015
        let supply = U256::from(2_000_000u64) * PRECISION;
        assert_eq!(pool_value(vp, supply), U256::from(2_030_000u64) * PRECISION);
        assert_eq!(pool_value(U256::ZERO, supply), U256::ZERO);
    }

    #[test]
    fn token_index_takes_last_match() {
        let coins = [addr(1), addr(2), addr(1)];
        assert_eq!(token_index(&coins, addr(1)), Some(2));
        assert_eq!(token_index(&coins, addr(2)), Some(1));
        assert_eq!(token_index(&coins, addr(9)), None);
    }

    #[test]
    fn deposit_amounts_cap_at_pool_value() {
        let coins = [addr(1), addr(2)];
        let amounts = deposit_amounts(&coins, addr(1), U256::from(500u64), U256::from(100u64));
        assert_eq!(amounts, [U256::from(100u64), U256::ZERO]);

        let amounts = deposit_amounts(&coins, addr(2), U256::from(40u64), U256::from(100u64));
        assert_eq!(amounts, [U256::ZERO, U256::from(40u64)]);
    }

    #[test]
    fn deposit_amounts_for_unknown_token_are_zero() {
        let coins = [addr(1), addr(2)];
        let amounts = deposit_amounts(&coins, addr(3), U256::from(40u64), U256::from(100u64));
        assert_eq!(amounts, [U256::ZERO; 2]);
    }

    #[test]
    fn floor_is_strict() {
        let expected = U256::from(1000u64);
        assert_eq!(deposit_floor(expected), U256::from(950u64));
        assert!(check_above_floor("lp after deposit", U256::from(951u64), expected).is_ok());

        let err = check_above_floor("lp after deposit", U256::from(950u64), expected).unwrap_err();
        assert!(matches!(err, HarnessError::BelowFloor { floor, .. } if floor == U256::from(950u64)));
    }

    #[test]
    fn equality_reports_both_sides() {
        assert!(check_equal("lp balance", U256::from(7u64), U256::from(7u64)).is_ok());
        let err = check_equal("lp balance", U256::from(6u64), U256::from(7u64)).unwrap_err();
        assert_eq!(err.to_string(), "lp balance: expected 7, got 6");
    }

    #[test]
    fn token_scaling() {
        assert_eq!(one_token(6), U256::from(1_000_000u64));
        assert_eq!(scale(10_000, 18), U256::from(10_000u64) * PRECISION);
        assert_eq!(whale_transfer_amount(18), U256::from(1_000_000_000_000u64));
        assert_eq!(whale_transfer_amount(6), U256::from(1u64));
        assert_eq!(whale_transfer_amount(2), U256::from(1u64));
    }
}
