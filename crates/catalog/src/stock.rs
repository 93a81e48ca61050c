//! The library stock: every physical copy the library currently owns.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use libris_core::DomainError;

use crate::book::BookId;
use crate::item::{BookItem, BookItemId};

/// Failures of [`Stock`] mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// A copy with this id is already in stock.
    #[error("item {0} already exists")]
    DuplicateItem(BookItemId),

    /// The copy is lent out and cannot be removed.
    #[error("item {0} is already borrowed")]
    ItemBorrowed(BookItemId),
}

impl From<StockError> for DomainError {
    fn from(value: StockError) -> Self {
        match value {
            StockError::DuplicateItem(_) => DomainError::conflict(value.to_string()),
            StockError::ItemBorrowed(_) => DomainError::invariant(value.to_string()),
        }
    }
}

/// Aggregate root: Stock.
///
/// Owns the authoritative [`BookItem`]s. Invariants:
/// - no two items share an id
/// - a borrowed item is never removed
///
/// Item state is the only record of availability; `Stock` keeps no separate
/// counters. Deserialization goes through [`Stock::try_new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StockRecord")]
pub struct Stock {
    items: Vec<BookItem>,
}

#[derive(Deserialize)]
struct StockRecord {
    items: Vec<BookItem>,
}

impl TryFrom<StockRecord> for Stock {
    type Error = StockError;

    fn try_from(record: StockRecord) -> Result<Self, Self::Error> {
        Stock::try_new(record.items)
    }
}

impl Stock {
    /// Build a stock from an initial set of copies, keeping their order.
    ///
    /// Ids are not checked; use [`Stock::try_new`] for copies from outside
    /// the process.
    pub fn new(items: Vec<BookItem>) -> Self {
        Self { items }
    }

    /// Like [`Stock::new`], but fails with [`StockError::DuplicateItem`] on
    /// the first id seen twice.
    pub fn try_new(items: Vec<BookItem>) -> Result<Self, StockError> {
        if let Some(id) = first_duplicate(&items) {
            return Err(StockError::DuplicateItem(id.clone()));
        }
        Ok(Self { items })
    }

    /// First id held by more than one copy, if any.
    pub fn duplicate_id(&self) -> Option<&BookItemId> {
        first_duplicate(&self.items)
    }

    /// Snapshot of the current items in insertion order.
    ///
    /// The returned copies are detached: changing them does not touch the
    /// stock.
    pub fn list(&self) -> Vec<BookItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a copy to the stock.
    pub fn add(&mut self, item: BookItem) -> Result<(), StockError> {
        if self.find(item.id()).is_some() {
            return Err(StockError::DuplicateItem(item.id().clone()));
        }

        tracing::debug!(item_id = %item.id(), book_id = %item.book_id(), "item added to stock");
        self.items.push(item);
        Ok(())
    }

    /// Remove a copy from the stock.
    ///
    /// Removing an unknown id does nothing. Removing a borrowed copy fails
    /// with [`StockError::ItemBorrowed`].
    pub fn remove(&mut self, id: &BookItemId) -> Result<(), StockError> {
        let Some(position) = self.position(id) else {
            return Ok(());
        };

        if !self.items[position].is_in_stock() {
            return Err(StockError::ItemBorrowed(id.clone()));
        }

        self.items.remove(position);
        tracing::debug!(item_id = %id, "item removed from stock");
        Ok(())
    }

    /// Look up a copy by id.
    pub fn find(&self, id: &BookItemId) -> Option<&BookItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Mutable lookup, for coordinators that flip a copy's state.
    pub fn find_mut(&mut self, id: &BookItemId) -> Option<&mut BookItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Copies of `book_id` that are currently on the shelf.
    pub fn available_copies(&self, book_id: &BookId) -> Vec<&BookItem> {
        self.items
            .iter()
            .filter(|item| item.book_id() == book_id && item.is_in_stock())
            .collect()
    }

    fn position(&self, id: &BookItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

fn first_duplicate(items: &[BookItem]) -> Option<&BookItemId> {
    let mut seen = BTreeSet::new();
    items
        .iter()
        .map(BookItem::id)
        .find(|id| !seen.insert(*id))
}
