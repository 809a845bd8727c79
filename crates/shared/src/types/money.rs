//! SAR money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary values flow through `rust_decimal::Decimal`. Intermediate
//! results keep full precision; figures are truncated to two fractional
//! digits only at the point of persistence.

use rust_decimal::Decimal;

/// Truncates a monetary value to two fractional digits.
///
/// Truncation (toward zero), not banker's rounding, so repeated
/// recalculation of the same figures can never drift.
#[must_use]
pub fn to_money_2dp(amount: Decimal) -> Decimal {
    amount.trunc_with_scale(2)
}

/// Returns true if the amount is negative.
#[must_use]
pub fn is_negative(amount: Decimal) -> bool {
    amount.is_sign_negative() && !amount.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_money_2dp_truncates() {
        assert_eq!(to_money_2dp(dec!(10.999)), dec!(10.99));
        assert_eq!(to_money_2dp(dec!(10.991)), dec!(10.99));
        assert_eq!(to_money_2dp(dec!(10.9)), dec!(10.90));
        assert_eq!(to_money_2dp(dec!(10)), dec!(10.00));
    }

    #[test]
    fn test_to_money_2dp_negative_truncates_toward_zero() {
        assert_eq!(to_money_2dp(dec!(-10.999)), dec!(-10.99));
    }

    #[test]
    fn test_is_negative() {
        assert!(is_negative(dec!(-0.01)));
        assert!(!is_negative(dec!(0)));
        assert!(!is_negative(dec!(-0.00)));
        assert!(!is_negative(dec!(0.01)));
    }
}
