//! Catalog domain module: works, physical copies and the library stock.
//!
//! This crate contains business rules for the library's physical inventory,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod book;
pub mod item;
pub mod stock;

pub use book::{Book, BookId, BookTitle};
pub use item::{BookItem, BookItemId, BookItemState};
pub use stock::{Stock, StockError};
