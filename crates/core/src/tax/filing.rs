//! Filing lifecycle for VAT returns and Zakat declarations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a tax filing.
///
/// Filings start as drafts, are submitted to the authority, and are
/// finally marked paid. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    Draft,
    Submitted,
    Paid,
}

/// Errors raised by filing transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilingError {
    /// The filing is not in a state that permits the transition.
    #[error("cannot move filing from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl FilingStatus {
    /// Returns the lowercase wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Paid => "paid",
        }
    }

    /// Transitions a draft filing to submitted.
    ///
    /// # Errors
    ///
    /// Returns `FilingError::InvalidTransition` unless the filing is a draft.
    pub fn submit(self) -> Result<Self, FilingError> {
        match self {
            Self::Draft => Ok(Self::Submitted),
            other => Err(FilingError::InvalidTransition {
                from: other.as_str(),
                to: "submitted",
            }),
        }
    }

    /// Transitions a submitted filing to paid.
    ///
    /// # Errors
    ///
    /// Returns `FilingError::InvalidTransition` unless the filing is submitted.
    pub fn mark_paid(self) -> Result<Self, FilingError> {
        match self {
            Self::Submitted => Ok(Self::Paid),
            other => Err(FilingError::InvalidTransition {
                from: other.as_str(),
                to: "paid",
            }),
        }
    }

    /// Whether the figures on the filing may still be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_draft_submits() {
        assert_eq!(FilingStatus::Draft.submit(), Ok(FilingStatus::Submitted));
    }

    #[test]
    fn test_submitted_pays() {
        assert_eq!(FilingStatus::Submitted.mark_paid(), Ok(FilingStatus::Paid));
    }

    #[rstest]
    #[case(FilingStatus::Submitted)]
    #[case(FilingStatus::Paid)]
    fn test_only_drafts_submit(#[case] status: FilingStatus) {
        assert!(status.submit().is_err());
    }

    #[rstest]
    #[case(FilingStatus::Draft)]
    #[case(FilingStatus::Paid)]
    fn test_only_submitted_pays(#[case] status: FilingStatus) {
        assert!(status.mark_paid().is_err());
    }

    #[test]
    fn test_only_drafts_editable() {
        assert!(FilingStatus::Draft.is_editable());
        assert!(!FilingStatus::Submitted.is_editable());
        assert!(!FilingStatus::Paid.is_editable());
    }
}
