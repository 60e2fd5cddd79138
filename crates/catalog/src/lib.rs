//! Catalog domain module.
//!
//! Products, equivalence pairs and the paginated search result shapes. Pure
//! value logic only (no IO, no HTTP, no storage).

pub mod equivalence;
pub mod page;
pub mod product;

pub use equivalence::EquivalencePair;
pub use page::{Page, PageRequest};
pub use product::{Price, Product, SearchResult, Stock};
