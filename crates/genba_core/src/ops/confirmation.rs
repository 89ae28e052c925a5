//! Confirmation token for destructive actions.

use crate::error::{RosterError, RosterResult};

/// Phrase the user must type verbatim to delete a record.
pub const DELETE_CONFIRMATION_PHRASE: &str = "DELETE";

/// Proof that the user typed the confirmation phrase.
///
/// Delete planners take this by value so an unconfirmed delete cannot be
/// planned at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfirmation {
    _private: (),
}

impl DeleteConfirmation {
    /// Accepts only the exact phrase; no trimming, no case folding.
    pub fn parse(input: &str) -> RosterResult<Self> {
        if input == DELETE_CONFIRMATION_PHRASE {
            Ok(Self { _private: () })
        } else {
            Err(RosterError::NotConfirmed)
        }
    }
}
