//! One-hop equivalence resolution.
//!
//! Given a code, return every code stored opposite it in an equivalence pair.
//! Resolution never follows chains: with A-B and B-C stored, A resolves to
//! `{B}` only.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::store::{EquivalenceStore, StoreError, bounded};

#[derive(Debug, Clone)]
pub struct EquivalenceResolver<E> {
    store: E,
    timeout: Duration,
}

impl<E> EquivalenceResolver<E>
where
    E: EquivalenceStore,
{
    /// `timeout` bounds every store call the resolver makes.
    pub fn new(store: E, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// One-hop equivalents of `code`, degrading to an empty set on store failure.
    pub async fn resolve(&self, code: &str) -> BTreeSet<String> {
        match self.try_resolve(code).await {
            Ok(codes) => codes,
            Err(e) => {
                tracing::warn!(code, error = %e, "equivalence lookup failed; continuing without equivalents");
                BTreeSet::new()
            }
        }
    }

    /// One-hop equivalents of `code`, excluding `code` itself.
    ///
    /// Blank input resolves to the empty set without touching the store.
    pub async fn try_resolve(&self, code: &str) -> Result<BTreeSet<String>, StoreError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(BTreeSet::new());
        }

        let pairs = bounded(
            "equivalences.find_by_either_code",
            self.timeout,
            self.store.find_by_either_code(code),
        )
        .await?;

        Ok(pairs
            .iter()
            .filter_map(|pair| pair.counterpart(code))
            .map(str::to_string)
            .collect())
    }

    /// Union of the one-hop equivalents of every code in `codes`, excluding the
    /// input codes themselves. Issued as one batched store call.
    pub async fn try_resolve_all(
        &self,
        codes: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, StoreError> {
        if codes.is_empty() {
            return Ok(BTreeSet::new());
        }

        let pairs = bounded(
            "equivalences.find_by_any_code",
            self.timeout,
            self.store.find_by_any_code(codes),
        )
        .await?;

        let mut related = BTreeSet::new();
        for pair in &pairs {
            if codes.contains(pair.product_code()) {
                related.insert(pair.equivalent_code().to_string());
            }
            if codes.contains(pair.equivalent_code()) {
                related.insert(pair.product_code().to_string());
            }
        }
        related.retain(|code| !codes.contains(code));

        Ok(related)
    }
}
