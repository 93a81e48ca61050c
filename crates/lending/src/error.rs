//! Lending service error model.

use chrono::{DateTime, Utc};
use thiserror::Error;

use libris_catalog::{BookItemId, StockError};
use libris_core::DomainError;

use crate::borrower::BorrowerId;
use crate::loan::LoanError;

/// Failures of [`LendingService`](crate::LendingService) operations.
///
/// Every check runs before any state changes, so a returned error means
/// nothing was modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LendingError {
    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Loan(#[from] LoanError),

    #[error("item {0} is not in stock")]
    ItemNotFound(BookItemId),

    #[error("item {0} is not available for lending")]
    ItemUnavailable(BookItemId),

    #[error("borrower {0} is not registered")]
    BorrowerNotFound(BorrowerId),

    #[error("borrower {0} is already registered")]
    DuplicateBorrower(BorrowerId),

    #[error("borrower {borrower_id} already holds {limit} items")]
    LoanLimitReached { borrower_id: BorrowerId, limit: usize },

    #[error("item {0} has no open loan")]
    NoOpenLoan(BookItemId),

    /// The loan period pushes the due date past the representable range.
    #[error("due date for a loan starting at {0} is out of range")]
    DueDateOutOfRange(DateTime<Utc>),

    #[error("invalid lending configuration: {0}")]
    InvalidConfig(DomainError),

    /// Restored or added state would break the copy/loan agreement.
    #[error("inconsistent lending state: {0}")]
    Inconsistent(String),

    #[error("lending state lock poisoned")]
    LockPoisoned,
}

impl LendingError {
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::Inconsistent(msg.into())
    }
}

impl From<LendingError> for DomainError {
    fn from(value: LendingError) -> Self {
        match value {
            LendingError::Stock(e) => e.into(),
            LendingError::Loan(e) => e.into(),
            LendingError::ItemNotFound(_) | LendingError::BorrowerNotFound(_) => {
                DomainError::not_found()
            }
            LendingError::InvalidConfig(e) => e,
            LendingError::DuplicateBorrower(_) => DomainError::conflict(value.to_string()),
            LendingError::DueDateOutOfRange(_) => DomainError::validation(value.to_string()),
            LendingError::ItemUnavailable(_)
            | LendingError::LoanLimitReached { .. }
            | LendingError::NoOpenLoan(_)
            | LendingError::Inconsistent(_)
            | LendingError::LockPoisoned => DomainError::invariant(value.to_string()),
        }
    }
}
