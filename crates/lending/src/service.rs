//! Lending coordination.
//!
//! `Stock` owns copy availability and `Loan` records who has a copy; neither
//! knows about the other. [`LendingService`] keeps them in agreement:
//!
//! ```text
//! lend:    Stock::find → BookItem::to_borrow → Loan::new → Borrower::borrow → LoanOpened
//! return:  Loan::return_at → BookItem::to_in_stock → Borrower::give_back → LoanClosed
//! ```
//!
//! Every operation validates first and mutates second, all under one lock, so
//! a copy is `Borrowed` exactly when one open loan references it and that
//! loan's borrower lists the copy among their holdings.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use libris_catalog::{BookItem, BookItemId, Stock};
use libris_events::{Event, EventBus, InMemoryEventBus, Subscription};

use crate::borrower::{Borrower, BorrowerId};
use crate::config::LendingConfig;
use crate::error::LendingError;
use crate::events::LendingEvent;
use crate::loan::{Loan, LoanId};

#[derive(Debug, Default)]
struct LendingState {
    stock: Stock,
    /// Full loan history in creation order.
    loans: Vec<Loan>,
    borrowers: BTreeMap<BorrowerId, Borrower>,
}

impl LendingState {
    fn open_loan_index(&self, item_id: &BookItemId) -> Option<usize> {
        self.loans
            .iter()
            .rposition(|loan| loan.is_open() && loan.book_item_id() == item_id)
    }

    /// Checks the copy/loan/borrower agreement over the whole state.
    fn check_consistency(&self) -> Result<(), LendingError> {
        if let Some(id) = self.stock.duplicate_id() {
            return Err(LendingError::inconsistent(format!(
                "item {id} appears more than once in stock"
            )));
        }

        let mut loan_ids = BTreeSet::new();
        for loan in &self.loans {
            if !loan_ids.insert(loan.id()) {
                return Err(LendingError::inconsistent(format!(
                    "loan {} appears more than once",
                    loan.id()
                )));
            }
            if loan.returned_at().is_some_and(|at| at < loan.loaned_at()) {
                return Err(LendingError::inconsistent(format!(
                    "loan {} was returned before it was lent",
                    loan.id()
                )));
            }
        }

        let mut open_by_item: BTreeMap<&BookItemId, &Loan> = BTreeMap::new();

        for loan in self.loans.iter().filter(|loan| loan.is_open()) {
            if open_by_item.insert(loan.book_item_id(), loan).is_some() {
                return Err(LendingError::inconsistent(format!(
                    "item {} has more than one open loan",
                    loan.book_item_id()
                )));
            }

            match self.stock.find(loan.book_item_id()) {
                Some(item) if item.is_borrowed() => {}
                Some(_) => {
                    return Err(LendingError::inconsistent(format!(
                        "loan {} is open but item {} is in stock",
                        loan.id(),
                        loan.book_item_id()
                    )));
                }
                None => {
                    return Err(LendingError::inconsistent(format!(
                        "loan {} references unknown item {}",
                        loan.id(),
                        loan.book_item_id()
                    )));
                }
            }

            let holds = self
                .borrowers
                .get(loan.borrower_id())
                .is_some_and(|b| b.holds(loan.book_item_id()));
            if !holds {
                return Err(LendingError::inconsistent(format!(
                    "borrower {} does not hold item {} of open loan {}",
                    loan.borrower_id(),
                    loan.book_item_id(),
                    loan.id()
                )));
            }
        }

        for item in self.stock.list() {
            if item.is_borrowed() && !open_by_item.contains_key(item.id()) {
                return Err(LendingError::inconsistent(format!(
                    "item {} is borrowed without an open loan",
                    item.id()
                )));
            }
        }

        for borrower in self.borrowers.values() {
            for held in borrower.items() {
                let matches = open_by_item
                    .get(held)
                    .is_some_and(|loan| loan.borrower_id() == borrower.id());
                if !matches {
                    return Err(LendingError::inconsistent(format!(
                        "borrower {} lists item {} without an open loan",
                        borrower.id(),
                        held
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Lends and takes back copies, keeping stock, loans and borrowers in step.
///
/// The service is `Send + Sync`; share it behind an `Arc`. Events are
/// published after the state change is committed, while the lock is still
/// held, so subscribers see them in commit order.
#[derive(Debug)]
pub struct LendingService<B = InMemoryEventBus<LendingEvent>> {
    state: Mutex<LendingState>,
    config: LendingConfig,
    bus: B,
}

impl LendingService {
    /// Empty library with an in-memory event bus.
    pub fn new(config: LendingConfig) -> Result<Self, LendingError> {
        Self::with_bus(config, InMemoryEventBus::new())
    }
}

impl<B> LendingService<B>
where
    B: EventBus<LendingEvent>,
{
    /// Empty library publishing to `bus`.
    ///
    /// Fails with [`LendingError::InvalidConfig`] if `config` does not
    /// validate.
    pub fn with_bus(config: LendingConfig, bus: B) -> Result<Self, LendingError> {
        config.validate().map_err(LendingError::InvalidConfig)?;
        Ok(Self {
            state: Mutex::new(LendingState::default()),
            config,
            bus,
        })
    }

    /// Rebuild a service from previously stored state.
    ///
    /// Fails with [`LendingError::Inconsistent`] unless every borrowed copy has
    /// exactly one open loan held by a registered borrower, and vice versa.
    /// Item and loan ids must be unique, and no loan may be returned before
    /// it was lent.
    pub fn restore(
        config: LendingConfig,
        bus: B,
        stock: Stock,
        loans: Vec<Loan>,
        borrowers: Vec<Borrower>,
    ) -> Result<Self, LendingError> {
        config.validate().map_err(LendingError::InvalidConfig)?;

        let mut by_id = BTreeMap::new();
        for borrower in borrowers {
            let id = borrower.id().clone();
            if by_id.insert(id.clone(), borrower).is_some() {
                return Err(LendingError::DuplicateBorrower(id));
            }
        }

        let state = LendingState {
            stock,
            loans,
            borrowers: by_id,
        };
        state.check_consistency()?;

        tracing::info!(
            items = state.stock.len(),
            loans = state.loans.len(),
            borrowers = state.borrowers.len(),
            "lending state restored"
        );

        Ok(Self {
            state: Mutex::new(state),
            config,
            bus,
        })
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    /// Subscribe to loan events published from now on.
    pub fn subscribe(&self) -> Subscription<LendingEvent> {
        self.bus.subscribe()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LendingState>, LendingError> {
        self.state.lock().map_err(|_| LendingError::LockPoisoned)
    }

    fn publish(&self, event: LendingEvent) {
        let event_type = event.event_type();
        if let Err(err) = self.bus.publish(event) {
            tracing::warn!(event_type, error = %err, "failed to publish lending event");
        }
    }

    pub fn register_borrower(&self, borrower: Borrower) -> Result<(), LendingError> {
        let mut state = self.lock()?;
        if state.borrowers.contains_key(borrower.id()) {
            return Err(LendingError::DuplicateBorrower(borrower.id().clone()));
        }
        if !borrower.items().is_empty() {
            return Err(LendingError::inconsistent(format!(
                "new borrower {} cannot already hold items",
                borrower.id()
            )));
        }

        tracing::debug!(borrower_id = %borrower.id(), "borrower registered");
        state.borrowers.insert(borrower.id().clone(), borrower);
        Ok(())
    }

    pub fn borrower(&self, id: &BorrowerId) -> Result<Option<Borrower>, LendingError> {
        Ok(self.lock()?.borrowers.get(id).cloned())
    }

    /// Add a copy to the stock. Copies must arrive on the shelf.
    pub fn add_item(&self, item: BookItem) -> Result<(), LendingError> {
        if item.is_borrowed() {
            return Err(LendingError::inconsistent(format!(
                "item {} is borrowed without an open loan",
                item.id()
            )));
        }
        self.lock()?.stock.add(item)?;
        Ok(())
    }

    /// Remove a copy from the stock; borrowed copies stay.
    pub fn remove_item(&self, id: &BookItemId) -> Result<(), LendingError> {
        self.lock()?.stock.remove(id)?;
        Ok(())
    }

    pub fn find_item(&self, id: &BookItemId) -> Result<Option<BookItem>, LendingError> {
        Ok(self.lock()?.stock.find(id).cloned())
    }

    pub fn list_items(&self) -> Result<Vec<BookItem>, LendingError> {
        Ok(self.lock()?.stock.list())
    }

    /// Lend `item_id` to `borrower_id` at `now`, due after the loan period.
    pub fn lend(
        &self,
        item_id: &BookItemId,
        borrower_id: &BorrowerId,
        now: DateTime<Utc>,
    ) -> Result<Loan, LendingError> {
        let mut state = self.lock()?;

        match state.stock.find(item_id) {
            None => return Err(LendingError::ItemNotFound(item_id.clone())),
            Some(item) if !item.is_in_stock() => {
                return Err(LendingError::ItemUnavailable(item_id.clone()));
            }
            Some(_) => {}
        }

        let Some(borrower) = state.borrowers.get(borrower_id) else {
            return Err(LendingError::BorrowerNotFound(borrower_id.clone()));
        };
        if borrower.holding_count() >= self.config.max_loans_per_borrower {
            return Err(LendingError::LoanLimitReached {
                borrower_id: borrower_id.clone(),
                limit: self.config.max_loans_per_borrower,
            });
        }

        let due_date = self
            .config
            .loan_period()
            .and_then(|period| now.checked_add_signed(period))
            .ok_or_else(|| LendingError::DueDateOutOfRange(now))?;
        let loan = Loan::new(
            LoanId::generate(),
            item_id.clone(),
            borrower_id.clone(),
            now,
            due_date,
        );

        // Validated above; from here on nothing can fail.
        if let Some(item) = state.stock.find_mut(item_id) {
            item.to_borrow();
        }
        if let Some(borrower) = state.borrowers.get_mut(borrower_id) {
            borrower.borrow(item_id.clone());
        }
        state.loans.push(loan.clone());

        tracing::info!(
            loan_id = %loan.id(),
            item_id = %item_id,
            borrower_id = %borrower_id,
            due_date = %loan.due_date(),
            "item lent"
        );
        self.publish(LendingEvent::opened(&loan));

        Ok(loan)
    }

    /// Take `item_id` back at `now`, closing its open loan.
    pub fn return_item(
        &self,
        item_id: &BookItemId,
        now: DateTime<Utc>,
    ) -> Result<Loan, LendingError> {
        let mut state = self.lock()?;

        let Some(index) = state.open_loan_index(item_id) else {
            return Err(LendingError::NoOpenLoan(item_id.clone()));
        };
        if state.stock.find(item_id).is_none() {
            return Err(LendingError::ItemNotFound(item_id.clone()));
        }

        state.loans[index].return_at(now)?;
        let loan = state.loans[index].clone();

        if let Some(item) = state.stock.find_mut(item_id) {
            item.to_in_stock();
        }
        if let Some(borrower) = state.borrowers.get_mut(loan.borrower_id()) {
            borrower.give_back(item_id);
        }

        let overdue = now > loan.due_date();
        tracing::info!(
            loan_id = %loan.id(),
            item_id = %item_id,
            borrower_id = %loan.borrower_id(),
            overdue,
            "item returned"
        );
        self.publish(LendingEvent::closed(&loan, now));

        Ok(loan)
    }

    pub fn loan(&self, id: &LoanId) -> Result<Option<Loan>, LendingError> {
        Ok(self.lock()?.loans.iter().find(|loan| loan.id() == id).cloned())
    }

    pub fn open_loan_for(&self, item_id: &BookItemId) -> Result<Option<Loan>, LendingError> {
        let state = self.lock()?;
        Ok(state
            .open_loan_index(item_id)
            .map(|index| state.loans[index].clone()))
    }

    /// Every loan of one copy, oldest first, returned or not.
    pub fn loan_history(&self, item_id: &BookItemId) -> Result<Vec<Loan>, LendingError> {
        Ok(self
            .lock()?
            .loans
            .iter()
            .filter(|loan| loan.book_item_id() == item_id)
            .cloned()
            .collect())
    }

    pub fn loans_for_borrower(&self, borrower_id: &BorrowerId) -> Result<Vec<Loan>, LendingError> {
        Ok(self
            .lock()?
            .loans
            .iter()
            .filter(|loan| loan.borrower_id() == borrower_id)
            .cloned()
            .collect())
    }

    pub fn overdue_loans(&self, now: DateTime<Utc>) -> Result<Vec<Loan>, LendingError> {
        Ok(self
            .lock()?
            .loans
            .iter()
            .filter(|loan| loan.is_overdue(now))
            .cloned()
            .collect())
    }
}
