use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use libris_catalog::BookItemId;
use libris_core::{DomainError, Entity};

use crate::borrower::BorrowerId;

libris_core::string_id!(
    /// Identifier of a loan record.
    LoanId,
    "LoanId"
);

/// Failures of [`Loan`] transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoanError {
    #[error("loan {0} was already returned")]
    AlreadyReturned(LoanId),

    #[error("loan {0} cannot be returned before it was made")]
    ReturnBeforeLoan(LoanId),
}

impl From<LoanError> for DomainError {
    fn from(value: LoanError) -> Self {
        match value {
            LoanError::AlreadyReturned(_) => DomainError::conflict(value.to_string()),
            LoanError::ReturnBeforeLoan(_) => DomainError::validation(value.to_string()),
        }
    }
}

/// A loan: one copy lent to one borrower for a time window.
///
/// Loans are never deleted; a returned loan stays as history. The only
/// mutation is the one-way [`Loan::return_at`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    book_item_id: BookItemId,
    borrower_id: BorrowerId,
    loaned_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn new(
        id: LoanId,
        book_item_id: BookItemId,
        borrower_id: BorrowerId,
        loaned_at: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            book_item_id,
            borrower_id,
            loaned_at,
            due_date,
            returned_at: None,
        }
    }

    pub fn id(&self) -> &LoanId {
        &self.id
    }

    pub fn book_item_id(&self) -> &BookItemId {
        &self.book_item_id
    }

    pub fn borrower_id(&self) -> &BorrowerId {
        &self.borrower_id
    }

    pub fn loaned_at(&self) -> DateTime<Utc> {
        self.loaned_at
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    /// `None` while the copy is still out.
    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }

    /// Open and past its due date at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && now > self.due_date
    }

    /// Close the loan at `at`.
    ///
    /// A loan closes exactly once, and never before it was made.
    pub fn return_at(&mut self, at: DateTime<Utc>) -> Result<(), LoanError> {
        if self.returned_at.is_some() {
            return Err(LoanError::AlreadyReturned(self.id.clone()));
        }
        if at < self.loaned_at {
            return Err(LoanError::ReturnBeforeLoan(self.id.clone()));
        }

        self.returned_at = Some(at);
        Ok(())
    }
}

impl Entity for Loan {
    type Id = LoanId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn loaned_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap()
    }

    fn test_loan() -> Loan {
        Loan::new(
            LoanId::new("loan-1"),
            BookItemId::new("copy-1"),
            BorrowerId::new("member-1"),
            loaned_at(),
            loaned_at() + Duration::days(14),
        )
    }

    #[test]
    fn new_loan_is_open() {
        let loan = test_loan();
        assert_eq!(loan.id().as_str(), "loan-1");
        assert_eq!(loan.book_item_id().as_str(), "copy-1");
        assert_eq!(loan.borrower_id().as_str(), "member-1");
        assert_eq!(loan.loaned_at(), loaned_at());
        assert_eq!(loan.due_date(), loaned_at() + Duration::days(14));
        assert_eq!(loan.returned_at(), None);
        assert!(loan.is_open());
    }

    #[test]
    fn return_sets_exact_timestamp() {
        let mut loan = test_loan();
        let at = loaned_at() + Duration::days(3) + Duration::minutes(17);

        loan.return_at(at).unwrap();
        assert_eq!(loan.returned_at(), Some(at));
        assert!(!loan.is_open());
    }

    #[test]
    fn return_at_loan_time_is_allowed() {
        let mut loan = test_loan();
        loan.return_at(loaned_at()).unwrap();
        assert_eq!(loan.returned_at(), Some(loaned_at()));
    }

    #[test]
    fn second_return_is_rejected_and_keeps_first_timestamp() {
        let mut loan = test_loan();
        let first = loaned_at() + Duration::days(2);
        loan.return_at(first).unwrap();

        let err = loan.return_at(first + Duration::days(1)).unwrap_err();
        assert_eq!(err, LoanError::AlreadyReturned(LoanId::new("loan-1")));
        assert_eq!(loan.returned_at(), Some(first));
    }

    #[test]
    fn return_before_loan_is_rejected() {
        let mut loan = test_loan();
        let err = loan.return_at(loaned_at() - Duration::seconds(1)).unwrap_err();
        assert!(matches!(err, LoanError::ReturnBeforeLoan(_)));
        assert!(loan.is_open());
    }

    #[test]
    fn overdue_only_while_open_and_past_due() {
        let mut loan = test_loan();
        let due = loan.due_date();

        assert!(!loan.is_overdue(due));
        assert!(loan.is_overdue(due + Duration::seconds(1)));

        loan.return_at(due + Duration::days(1)).unwrap();
        assert!(!loan.is_overdue(due + Duration::days(2)));
    }

    #[test]
    fn loan_errors_map_to_domain_errors() {
        let err: DomainError = LoanError::AlreadyReturned(LoanId::new("l")).into();
        assert!(matches!(err, DomainError::Conflict(_)));

        let err: DomainError = LoanError::ReturnBeforeLoan(LoanId::new("l")).into();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn open_loan_serializes_null_return() {
        let value = serde_json::to_value(test_loan()).unwrap();
        assert!(value["returned_at"].is_null());
        assert_eq!(value["book_item_id"], "copy-1");
    }
}
