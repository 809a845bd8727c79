//! Invoice total aggregation and status derivation.

use chrono::NaiveDate;
use muhasib_shared::types::money::{is_negative, to_money_2dp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tax::{TaxError, compute_vat};

/// Errors raised by invoice aggregation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    /// A line item quantity or unit price was negative.
    #[error("{0} cannot be negative")]
    NegativeInput(&'static str),
    /// VAT derivation failed.
    #[error(transparent)]
    Tax(#[from] TaxError),
}

/// Stored payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    /// Returns the lowercase wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

/// Monetary figures of an invoice, recalculated after every item change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    /// VAT rate in percent, e.g. 15.00.
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
}

/// Computes a line item total: `quantity * unit_price`, truncated to 2 dp.
///
/// # Errors
///
/// Returns `InvoiceError::NegativeInput` if either factor is negative.
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, InvoiceError> {
    if is_negative(quantity) {
        return Err(InvoiceError::NegativeInput("quantity"));
    }
    if is_negative(unit_price) {
        return Err(InvoiceError::NegativeInput("unit price"));
    }
    Ok(to_money_2dp(quantity * unit_price))
}

/// Recalculates an invoice's figures from its line item totals.
///
/// When at least one item exists the subtotal becomes the sum of the item
/// totals; with no items the subtotal is left as entered. VAT amount and
/// grand total are then rederived from the subtotal at the invoice's rate.
/// Running this again without item changes produces identical figures.
///
/// # Errors
///
/// Returns an error if the resulting subtotal or the stored rate is
/// negative.
pub fn recalculate(
    totals: &mut InvoiceTotals,
    item_totals: &[Decimal],
) -> Result<(), InvoiceError> {
    if !item_totals.is_empty() {
        totals.subtotal = to_money_2dp(item_totals.iter().copied().sum());
    }
    let breakdown = compute_vat(totals.subtotal, totals.vat_rate)?;
    totals.vat_amount = breakdown.vat_amount;
    totals.total_amount = breakdown.total_amount;
    Ok(())
}

/// Derives the status an invoice reports as, honouring lapsed due dates.
///
/// Paid invoices always report Paid. An unpaid invoice whose due date has
/// passed reports Overdue even when the stored status still says unpaid.
#[must_use]
pub fn effective_status(
    status: InvoiceStatus,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> InvoiceStatus {
    match status {
        InvoiceStatus::Paid => InvoiceStatus::Paid,
        InvoiceStatus::Unpaid | InvoiceStatus::Overdue => match due_date {
            Some(due) if due < today => InvoiceStatus::Overdue,
            _ => status,
        },
    }
}

/// Suggests the next invoice number for a sequence position, e.g. `INV-000042`.
#[must_use]
pub fn suggest_invoice_number(sequence: u64) -> String {
    format!("INV-{sequence:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn totals(subtotal: Decimal) -> InvoiceTotals {
        InvoiceTotals {
            subtotal,
            vat_rate: dec!(15.00),
            vat_amount: dec!(0),
            total_amount: dec!(0),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec!(3), dec!(99.99)).unwrap(), dec!(299.97));
    }

    #[test]
    fn test_line_total_rejects_negative() {
        assert_eq!(
            line_total(dec!(-1), dec!(10)),
            Err(InvoiceError::NegativeInput("quantity"))
        );
        assert_eq!(
            line_total(dec!(1), dec!(-10)),
            Err(InvoiceError::NegativeInput("unit price"))
        );
    }

    #[test]
    fn test_recalculate_sums_items() {
        let mut t = totals(dec!(999.00));
        recalculate(&mut t, &[dec!(100.00), dec!(250.50)]).unwrap();
        assert_eq!(t.subtotal, dec!(350.50));
        assert_eq!(t.vat_amount, dec!(52.57));
        assert_eq!(t.total_amount, dec!(403.07));
    }

    #[test]
    fn test_recalculate_keeps_manual_subtotal_without_items() {
        let mut t = totals(dec!(1000.00));
        recalculate(&mut t, &[]).unwrap();
        assert_eq!(t.subtotal, dec!(1000.00));
        assert_eq!(t.vat_amount, dec!(150.00));
        assert_eq!(t.total_amount, dec!(1150.00));
    }

    #[test]
    fn test_recalculate_idempotent() {
        let mut t = totals(dec!(0));
        let items = [dec!(33.33), dec!(66.67)];
        recalculate(&mut t, &items).unwrap();
        let first = t;
        recalculate(&mut t, &items).unwrap();
        assert_eq!(t, first);
    }

    #[test]
    fn test_paid_never_reports_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let lapsed = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(
            effective_status(InvoiceStatus::Paid, Some(lapsed), today),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_unpaid_lapsed_reports_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let lapsed = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(
            effective_status(InvoiceStatus::Unpaid, Some(lapsed), today),
            InvoiceStatus::Overdue
        );
    }

    #[test]
    fn test_unpaid_due_today_not_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            effective_status(InvoiceStatus::Unpaid, Some(today), today),
            InvoiceStatus::Unpaid
        );
        assert_eq!(
            effective_status(InvoiceStatus::Unpaid, None, today),
            InvoiceStatus::Unpaid
        );
    }

    #[test]
    fn test_suggest_invoice_number() {
        assert_eq!(suggest_invoice_number(42), "INV-000042");
        assert_eq!(suggest_invoice_number(1_234_567), "INV-1234567");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    // With items present, subtotal always equals the item sum and the
    // recalculation is a fixed point.
    proptest! {
        #[test]
        fn prop_recalculate_fixed_point(
            item_cents in proptest::collection::vec(0i64..10_000_000, 1..20),
        ) {
            let items: Vec<Decimal> =
                item_cents.into_iter().map(|c| Decimal::new(c, 2)).collect();
            let mut totals = InvoiceTotals {
                subtotal: Decimal::ZERO,
                vat_rate: Decimal::new(1500, 2),
                vat_amount: Decimal::ZERO,
                total_amount: Decimal::ZERO,
            };

            recalculate(&mut totals, &items).unwrap();
            let expected_subtotal: Decimal = items.iter().copied().sum();
            prop_assert_eq!(totals.subtotal, expected_subtotal.trunc_with_scale(2));

            let first = totals;
            recalculate(&mut totals, &items).unwrap();
            prop_assert_eq!(totals, first);
        }
    }
}
