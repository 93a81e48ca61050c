//! Lending domain module: loans, borrowers and the service that keeps copy
//! state and loan records in agreement.
//!
//! [`Loan`] and [`Borrower`] are plain domain records with no IO. The
//! [`LendingService`] coordinates them with the catalog [`Stock`] under a
//! single lock.
//!
//! [`Stock`]: libris_catalog::Stock

pub mod borrower;
pub mod config;
pub mod error;
pub mod events;
pub mod loan;
pub mod service;

pub use borrower::{Borrower, BorrowerId};
pub use config::LendingConfig;
pub use error::LendingError;
pub use events::{LendingEvent, LoanClosed, LoanOpened};
pub use loan::{Loan, LoanError, LoanId};
pub use service::LendingService;
