//! Catalog store adapters (products + equivalences).
//!
//! Both adapters implement the search crate's `ProductStore` and
//! `EquivalenceStore` contracts; the search core never sees raw rows.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryEquivalenceStore, InMemoryProductStore};
pub use postgres::PostgresCatalogStore;

/// Escape `%`, `_` and `\` so user input is matched literally by `LIKE`/`ILIKE
/// ... ESCAPE '\'`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
