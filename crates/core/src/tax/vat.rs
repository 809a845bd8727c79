//! Saudi VAT derivation.

use muhasib_shared::types::money::{is_negative, to_money_2dp};
use rust_decimal::Decimal;

use super::TaxError;

/// The standard Saudi VAT rate, in percent.
#[must_use]
pub fn saudi_vat_rate() -> Decimal {
    Decimal::new(1500, 2) // 15.00
}

/// VAT amount and grand total derived from a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatBreakdown {
    /// VAT amount: `subtotal * rate / 100`.
    pub vat_amount: Decimal,
    /// Grand total: `subtotal + vat_amount`.
    pub total_amount: Decimal,
}

/// Computes VAT amount and total for a subtotal at the given percent rate.
///
/// Both figures are truncated to two fractional digits so the persisted
/// total always equals subtotal plus the persisted VAT amount.
///
/// # Errors
///
/// Returns `TaxError::NegativeInput` if `subtotal` or `rate` is negative.
pub fn compute_vat(subtotal: Decimal, rate: Decimal) -> Result<VatBreakdown, TaxError> {
    if is_negative(subtotal) {
        return Err(TaxError::NegativeInput("subtotal"));
    }
    if is_negative(rate) {
        return Err(TaxError::NegativeInput("vat rate"));
    }

    let vat_amount = to_money_2dp(subtotal * rate / Decimal::ONE_HUNDRED);
    let total_amount = to_money_2dp(subtotal + vat_amount);

    Ok(VatBreakdown {
        vat_amount,
        total_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_standard_saudi_invoice() {
        let breakdown = compute_vat(dec!(1000.00), dec!(15.00)).unwrap();
        assert_eq!(breakdown.vat_amount, dec!(150.00));
        assert_eq!(breakdown.total_amount, dec!(1150.00));
    }

    #[test]
    fn test_zero_subtotal() {
        let breakdown = compute_vat(dec!(0), dec!(15.00)).unwrap();
        assert_eq!(breakdown.vat_amount, dec!(0));
        assert_eq!(breakdown.total_amount, dec!(0));
    }

    #[test]
    fn test_zero_rate() {
        let breakdown = compute_vat(dec!(250.50), dec!(0)).unwrap();
        assert_eq!(breakdown.vat_amount, dec!(0));
        assert_eq!(breakdown.total_amount, dec!(250.50));
    }

    #[test]
    fn test_fractional_vat_truncated() {
        // 33.33 * 15% = 4.9995 -> 4.99 truncated, never 5.00
        let breakdown = compute_vat(dec!(33.33), dec!(15.00)).unwrap();
        assert_eq!(breakdown.vat_amount, dec!(4.99));
        assert_eq!(breakdown.total_amount, dec!(38.32));
    }

    #[test]
    fn test_negative_subtotal_rejected() {
        assert_eq!(
            compute_vat(dec!(-1), dec!(15)),
            Err(TaxError::NegativeInput("subtotal"))
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert_eq!(
            compute_vat(dec!(100), dec!(-15)),
            Err(TaxError::NegativeInput("vat rate"))
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    // For all subtotal >= 0 and rate >= 0, the breakdown satisfies
    // vat = trunc2(subtotal * rate / 100) and total = subtotal + vat.
    proptest! {
        #[test]
        fn prop_vat_matches_definition(
            cents in 0i64..1_000_000_000,
            rate_bp in 0i64..10_000,
        ) {
            let subtotal = Decimal::new(cents, 2);
            let rate = Decimal::new(rate_bp, 2);

            let breakdown = compute_vat(subtotal, rate).unwrap();

            let expected_vat = (subtotal * rate / Decimal::ONE_HUNDRED).trunc_with_scale(2);
            prop_assert_eq!(breakdown.vat_amount, expected_vat);
            prop_assert_eq!(breakdown.total_amount, subtotal + expected_vat);
        }
    }

    // Computing twice from the same subtotal yields identical figures.
    proptest! {
        #[test]
        fn prop_vat_deterministic(cents in 0i64..1_000_000_000) {
            let subtotal = Decimal::new(cents, 2);
            let rate = saudi_vat_rate();

            let first = compute_vat(subtotal, rate).unwrap();
            let second = compute_vat(subtotal, rate).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
