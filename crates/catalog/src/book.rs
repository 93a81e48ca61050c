use serde::{Deserialize, Serialize};

use libris_core::ValueObject;

libris_core::string_id!(
    /// Catalog identifier of a work (e.g. an ISBN), shared by all its copies.
    BookId,
    "BookId"
);

/// Title of a work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookTitle {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A work in the catalog.
///
/// This is the work itself, not a physical copy: every [`BookItem`] of the
/// same work points back here through its `book_id`.
///
/// [`BookItem`]: crate::item::BookItem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    title: BookTitle,
}

impl Book {
    pub fn new(id: BookId, title: BookTitle) -> Self {
        Self { id, title }
    }

    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &BookTitle {
        &self.title
    }
}

impl ValueObject for Book {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_constructor_values() {
        let book = Book::new(
            BookId::new("978-4-7981-2196-3"),
            BookTitle::new("Domain-Driven Design"),
        );
        assert_eq!(book.id().as_str(), "978-4-7981-2196-3");
        assert_eq!(book.title().as_str(), "Domain-Driven Design");
    }

    #[test]
    fn books_compare_by_value() {
        let a = Book::new(BookId::new("isbn-1"), BookTitle::new("Dune"));
        let b = Book::new(BookId::new("isbn-1"), BookTitle::new("Dune"));
        let c = Book::new(BookId::new("isbn-1"), BookTitle::new("Dune Messiah"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
