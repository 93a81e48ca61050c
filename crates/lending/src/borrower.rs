use serde::{Deserialize, Serialize};

use libris_catalog::BookItemId;
use libris_core::Entity;

libris_core::string_id!(
    /// Identifier of a library member.
    BorrowerId,
    "BorrowerId"
);

/// A library member and the copies they currently hold.
///
/// Holdings are bookkeeping only; loan records are the authority on who has
/// what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    id: BorrowerId,
    items: Vec<BookItemId>,
}

impl Borrower {
    pub fn new(id: BorrowerId, items: Vec<BookItemId>) -> Self {
        Self { id, items }
    }

    pub fn id(&self) -> &BorrowerId {
        &self.id
    }

    /// Held copies, in the order they were borrowed.
    pub fn items(&self) -> &[BookItemId] {
        &self.items
    }

    pub fn holding_count(&self) -> usize {
        self.items.len()
    }

    pub fn holds(&self, item_id: &BookItemId) -> bool {
        self.items.contains(item_id)
    }

    /// Record a copy as held. Recording the same copy twice keeps one entry.
    pub fn borrow(&mut self, item_id: BookItemId) {
        if !self.holds(&item_id) {
            self.items.push(item_id);
        }
    }

    /// Drop a copy from the holdings; returns whether it was held.
    pub fn give_back(&mut self, item_id: &BookItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|held| held != item_id);
        self.items.len() != before
    }
}

impl Entity for Borrower {
    type Id = BorrowerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_borrower_keeps_initial_holdings() {
        let borrower = Borrower::new(
            BorrowerId::new("member-1"),
            vec![BookItemId::new("a"), BookItemId::new("b")],
        );
        assert_eq!(borrower.id().as_str(), "member-1");
        assert_eq!(borrower.holding_count(), 2);
        assert!(borrower.holds(&BookItemId::new("a")));
    }

    #[test]
    fn borrow_appends_once() {
        let mut borrower = Borrower::new(BorrowerId::new("member-1"), Vec::new());
        borrower.borrow(BookItemId::new("a"));
        borrower.borrow(BookItemId::new("b"));
        borrower.borrow(BookItemId::new("a"));

        assert_eq!(
            borrower.items(),
            &[BookItemId::new("a"), BookItemId::new("b")]
        );
    }

    #[test]
    fn give_back_reports_whether_item_was_held() {
        let mut borrower = Borrower::new(BorrowerId::new("member-1"), vec![BookItemId::new("a")]);

        assert!(borrower.give_back(&BookItemId::new("a")));
        assert!(!borrower.give_back(&BookItemId::new("a")));
        assert_eq!(borrower.holding_count(), 0);
    }
}
