//! VAT and Zakat calculation.
//!
//! All arithmetic uses exact decimal representation. Intermediate values
//! keep full precision; figures destined for persistence are truncated to
//! two fractional digits via `muhasib_shared::types::money::to_money_2dp`.

mod filing;
mod vat;
mod zakat;

pub use filing::{FilingError, FilingStatus};
pub use vat::{VatBreakdown, compute_vat, saudi_vat_rate};
pub use zakat::{
    ZakatAssessment, compute_zakat, current_hijri_year, default_nisab_sar, hijri_year_label,
    zakat_asset_total, zakat_rate,
};

use thiserror::Error;

/// Errors produced by the tax calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxError {
    /// An input amount was negative.
    #[error("{0} cannot be negative")]
    NegativeInput(&'static str),
}
