//! Facts emitted by the lending service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use libris_catalog::BookItemId;
use libris_events::Event;

use crate::borrower::BorrowerId;
use crate::loan::{Loan, LoanId};

/// Event: LoanOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOpened {
    pub loan_id: LoanId,
    pub book_item_id: BookItemId,
    pub borrower_id: BorrowerId,
    pub occurred_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Event: LoanClosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanClosed {
    pub loan_id: LoanId,
    pub book_item_id: BookItemId,
    pub borrower_id: BorrowerId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingEvent {
    LoanOpened(LoanOpened),
    LoanClosed(LoanClosed),
}

impl LendingEvent {
    pub(crate) fn opened(loan: &Loan) -> Self {
        LendingEvent::LoanOpened(LoanOpened {
            loan_id: loan.id().clone(),
            book_item_id: loan.book_item_id().clone(),
            borrower_id: loan.borrower_id().clone(),
            occurred_at: loan.loaned_at(),
            due_date: loan.due_date(),
        })
    }

    pub(crate) fn closed(loan: &Loan, returned_at: DateTime<Utc>) -> Self {
        LendingEvent::LoanClosed(LoanClosed {
            loan_id: loan.id().clone(),
            book_item_id: loan.book_item_id().clone(),
            borrower_id: loan.borrower_id().clone(),
            occurred_at: returned_at,
        })
    }

    pub fn loan_id(&self) -> &LoanId {
        match self {
            LendingEvent::LoanOpened(e) => &e.loan_id,
            LendingEvent::LoanClosed(e) => &e.loan_id,
        }
    }
}

impl Event for LendingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LendingEvent::LoanOpened(_) => "lending.loan.opened",
            LendingEvent::LoanClosed(_) => "lending.loan.closed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LendingEvent::LoanOpened(e) => e.occurred_at,
            LendingEvent::LoanClosed(e) => e.occurred_at,
        }
    }
}
