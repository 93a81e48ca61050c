use serde::{Deserialize, Serialize};

use libris_core::Entity;

use crate::book::BookId;

libris_core::string_id!(
    /// Identifier of one physical copy (e.g. a barcode). Copies of the same
    /// work each get their own id.
    BookItemId,
    "BookItemId"
);

/// Availability of a physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookItemState {
    InStock,
    Borrowed,
}

/// One physical copy of a work held by the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookItem {
    id: BookItemId,
    book_id: BookId,
    state: BookItemState,
}

impl BookItem {
    /// New copies start on the shelf.
    pub fn new(id: BookItemId, book_id: BookId) -> Self {
        Self {
            id,
            book_id,
            state: BookItemState::InStock,
        }
    }

    pub fn id(&self) -> &BookItemId {
        &self.id
    }

    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub fn state(&self) -> BookItemState {
        self.state
    }

    pub fn is_in_stock(&self) -> bool {
        self.state == BookItemState::InStock
    }

    pub fn is_borrowed(&self) -> bool {
        self.state == BookItemState::Borrowed
    }

    /// Mark the copy as lent out.
    ///
    /// Unguarded: whoever lends the copy checks availability first.
    pub fn to_borrow(&mut self) {
        self.state = BookItemState::Borrowed;
    }

    /// Mark the copy as back on the shelf.
    pub fn to_in_stock(&mut self) {
        self.state = BookItemState::InStock;
    }
}

impl Entity for BookItem {
    type Id = BookItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
