//! Shelfnet Catalog — books, genre lists, JSON loading, batch discovery.

pub mod batch;
pub mod catalog;
pub mod item;

pub use batch::{load_batches, Batch};
pub use catalog::ItemCatalog;
pub use item::Item;
