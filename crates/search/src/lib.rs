//! Equivalence-aware product search.
//!
//! - `store`: read contracts the search core needs from persistence
//! - `resolver`: one-hop equivalence resolution
//! - `orchestrator`: direct match + expansion, dedupe, sort, paginate

pub mod orchestrator;
pub mod resolver;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{SearchConfig, SearchOrchestrator, merge_by_code};
pub use resolver::EquivalenceResolver;
pub use store::{EquivalenceStore, ProductStore, StoreError, bounded};
