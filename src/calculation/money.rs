//! Monetary rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places money is stored with.
pub const MONEY_DP: u32 = 2;

/// Rounds an amount to cents, half away from zero.
///
/// # Example
///
/// ```
/// use people360::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_money(Decimal::from_str("10.004").unwrap()), Decimal::from_str("10.00").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    // Pad whole amounts so every stored value carries two places.
    rounded.rescale(MONEY_DP);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rounds_repeating_fraction() {
        // 1000 / 30
        assert_eq!(round_money(dec("1000") / dec("30")), dec("33.33"));
    }

    #[test]
    fn test_negative_midpoint_rounds_away_from_zero() {
        assert_eq!(round_money(dec("-2.345")), dec("-2.35"));
    }

    #[test]
    fn test_whole_amount_gets_two_places() {
        assert_eq!(round_money(dec("3000")).to_string(), "3000.00");
    }
}
