//! Zakat assessment.
//!
//! Zakat is due at 2.5% of net wealth (assets minus liabilities) when the
//! net wealth meets or exceeds the nisab threshold. Below nisab no zakat
//! is due, regardless of the wealth.

use chrono::{Datelike, Utc};
use muhasib_shared::types::money::{is_negative, to_money_2dp};
use rust_decimal::Decimal;

use super::TaxError;

/// The Zakat rate applied above nisab: 2.5%.
#[must_use]
pub fn zakat_rate() -> Decimal {
    Decimal::new(25, 3) // 0.025
}

/// Default nisab threshold in SAR: 85 grams of gold at 595.05 SAR/gram.
#[must_use]
pub fn default_nisab_sar() -> Decimal {
    Decimal::new(50_579_25, 2) // 50579.25
}

/// Result of a Zakat computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZakatAssessment {
    /// Net wealth: `assets - liabilities`. May be negative.
    pub net_wealth: Decimal,
    /// Zakat due: `net_wealth * 0.025` above nisab, zero below.
    pub zakat_due: Decimal,
    /// Whether the net wealth met the nisab threshold.
    pub above_nisab: bool,
}

/// Computes the Zakat due for the given assets and liabilities.
///
/// Net wealth is `assets - liabilities` and may be negative. When it is
/// at or above `nisab` the amount due is `net_wealth * 2.5%`, truncated
/// to two fractional digits; otherwise zero.
///
/// # Errors
///
/// Returns `TaxError::NegativeInput` if `assets`, `liabilities`, or
/// `nisab` is negative.
pub fn compute_zakat(
    assets: Decimal,
    liabilities: Decimal,
    nisab: Decimal,
) -> Result<ZakatAssessment, TaxError> {
    if is_negative(assets) {
        return Err(TaxError::NegativeInput("assets"));
    }
    if is_negative(liabilities) {
        return Err(TaxError::NegativeInput("liabilities"));
    }
    if is_negative(nisab) {
        return Err(TaxError::NegativeInput("nisab"));
    }

    let net_wealth = to_money_2dp(assets - liabilities);
    let above_nisab = net_wealth >= nisab;
    let zakat_due = if above_nisab {
        to_money_2dp(net_wealth * zakat_rate())
    } else {
        Decimal::ZERO
    };

    Ok(ZakatAssessment {
        net_wealth,
        zakat_due,
        above_nisab,
    })
}

/// Sums the zakatable asset categories into a single assets figure.
///
/// # Errors
///
/// Returns `TaxError::NegativeInput` if any category is negative.
pub fn zakat_asset_total(
    cash_and_deposits: Decimal,
    trade_goods: Decimal,
    receivables: Decimal,
    investments: Decimal,
) -> Result<Decimal, TaxError> {
    for (name, value) in [
        ("cash and deposits", cash_and_deposits),
        ("trade goods", trade_goods),
        ("receivables", receivables),
        ("investments", investments),
    ] {
        if is_negative(value) {
            return Err(TaxError::NegativeInput(name));
        }
    }
    Ok(cash_and_deposits + trade_goods + receivables + investments)
}

/// Approximates the current Hijri year from the Gregorian calendar.
///
/// Uses the civil approximation `(G - 622) * 33 / 32`, accurate enough
/// for labelling an annual declaration period.
#[must_use]
pub fn current_hijri_year() -> i32 {
    let gregorian = Utc::now().year();
    (gregorian - 622) * 33 / 32
}

/// Renders a Hijri year as a declaration period label, e.g. `1447H`.
#[must_use]
pub fn hijri_year_label(year: i32) -> String {
    format!("{year}H")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_above_nisab() {
        let assessment =
            compute_zakat(dec!(100000.00), dec!(10000.00), default_nisab_sar()).unwrap();
        assert_eq!(assessment.net_wealth, dec!(90000.00));
        assert_eq!(assessment.zakat_due, dec!(2250.00));
        assert!(assessment.above_nisab);
    }

    #[test]
    fn test_below_nisab_no_zakat() {
        let assessment =
            compute_zakat(dec!(60000.00), dec!(10000.00), default_nisab_sar()).unwrap();
        assert_eq!(assessment.net_wealth, dec!(50000.00));
        assert_eq!(assessment.zakat_due, dec!(0));
        assert!(!assessment.above_nisab);
    }

    #[test]
    fn test_exactly_at_nisab_is_due() {
        let nisab = default_nisab_sar();
        let assessment = compute_zakat(nisab, dec!(0), nisab).unwrap();
        assert!(assessment.above_nisab);
        // 50579.25 * 0.025 = 1264.48125 -> 1264.48
        assert_eq!(assessment.zakat_due, dec!(1264.48));
    }

    #[test]
    fn test_liabilities_exceed_assets() {
        let assessment =
            compute_zakat(dec!(1000.00), dec!(5000.00), default_nisab_sar()).unwrap();
        assert_eq!(assessment.net_wealth, dec!(-4000.00));
        assert_eq!(assessment.zakat_due, dec!(0));
        assert!(!assessment.above_nisab);
    }

    #[test]
    fn test_negative_assets_rejected() {
        assert_eq!(
            compute_zakat(dec!(-1), dec!(0), default_nisab_sar()),
            Err(TaxError::NegativeInput("assets"))
        );
    }

    #[test]
    fn test_asset_total_sums_categories() {
        let total = zakat_asset_total(dec!(1000), dec!(500), dec!(250.50), dec!(0)).unwrap();
        assert_eq!(total, dec!(1750.50));
    }

    #[test]
    fn test_asset_total_rejects_negative_category() {
        assert_eq!(
            zakat_asset_total(dec!(0), dec!(-5), dec!(0), dec!(0)),
            Err(TaxError::NegativeInput("trade goods"))
        );
    }

    #[test]
    fn test_hijri_year_label() {
        assert_eq!(hijri_year_label(1447), "1447H");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    // Below nisab the amount is always zero; at or above it is exactly
    // trunc2(net_wealth * 0.025).
    proptest! {
        #[test]
        fn prop_nisab_gate(
            asset_cents in 0i64..100_000_000_000,
            liability_cents in 0i64..100_000_000_000,
        ) {
            let assets = Decimal::new(asset_cents, 2);
            let liabilities = Decimal::new(liability_cents, 2);
            let nisab = default_nisab_sar();

            let assessment = compute_zakat(assets, liabilities, nisab).unwrap();

            prop_assert_eq!(assessment.net_wealth, assets - liabilities);
            if assessment.net_wealth < nisab {
                prop_assert_eq!(assessment.zakat_due, Decimal::ZERO);
                prop_assert!(!assessment.above_nisab);
            } else {
                let expected =
                    (assessment.net_wealth * zakat_rate()).trunc_with_scale(2);
                prop_assert_eq!(assessment.zakat_due, expected);
                prop_assert!(assessment.above_nisab);
            }
        }
    }
}
