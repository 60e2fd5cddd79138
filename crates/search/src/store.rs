//! Store contracts consumed by the search core.
//!
//! Adapters (in-memory, Postgres) live in the infra crate. Each adapter maps
//! its raw rows into catalog types before they cross this boundary.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use stocklookup_catalog::{EquivalencePair, Product};

/// Store operation error.
///
/// Absence is never an error: a lookup that finds nothing returns an empty
/// collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection failure or deadline exceeded.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the query, or returned a row that failed translation.
    #[error("store query failed: {0}")]
    Query(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn timed_out(operation: &str, limit: Duration) -> Self {
        Self::Unavailable(format!(
            "{operation} timed out after {}ms",
            limit.as_millis()
        ))
    }
}

/// Read access to catalog products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Products whose code contains `needle`, case-insensitively.
    ///
    /// Implementations must treat `needle` literally (no wildcard syntax).
    async fn find_by_code_substring(&self, needle: &str) -> Result<Vec<Product>, StoreError>;

    /// Products whose code is exactly one of `codes`.
    async fn find_by_codes(&self, codes: &BTreeSet<String>) -> Result<Vec<Product>, StoreError>;
}

/// Read access to stored equivalence pairs.
#[async_trait]
pub trait EquivalenceStore: Send + Sync {
    /// Pairs where `code` appears in either column.
    async fn find_by_either_code(&self, code: &str) -> Result<Vec<EquivalencePair>, StoreError>;

    /// Pairs where any of `codes` appears in either column.
    ///
    /// The default issues one lookup per code; backends that can filter on a
    /// set should override it with a single query.
    async fn find_by_any_code(
        &self,
        codes: &BTreeSet<String>,
    ) -> Result<Vec<EquivalencePair>, StoreError> {
        let mut pairs = Vec::new();
        for code in codes {
            pairs.extend(self.find_by_either_code(code).await?);
        }
        Ok(pairs)
    }
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn find_by_code_substring(&self, needle: &str) -> Result<Vec<Product>, StoreError> {
        (**self).find_by_code_substring(needle).await
    }

    async fn find_by_codes(&self, codes: &BTreeSet<String>) -> Result<Vec<Product>, StoreError> {
        (**self).find_by_codes(codes).await
    }
}

#[async_trait]
impl<S> EquivalenceStore for Arc<S>
where
    S: EquivalenceStore + ?Sized,
{
    async fn find_by_either_code(&self, code: &str) -> Result<Vec<EquivalencePair>, StoreError> {
        (**self).find_by_either_code(code).await
    }

    async fn find_by_any_code(
        &self,
        codes: &BTreeSet<String>,
    ) -> Result<Vec<EquivalencePair>, StoreError> {
        (**self).find_by_any_code(codes).await
    }
}

/// Run a store call under a deadline.
///
/// An elapsed deadline becomes `StoreError::Unavailable`, so callers handle it
/// like any other store failure. The inner future is dropped on timeout.
pub async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::timed_out(operation, limit)),
    }
}
