//! Store fakes shared by this crate's unit tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use stocklookup_catalog::{EquivalencePair, Price, Product, Stock};
use stocklookup_core::ProductId;

use crate::store::{EquivalenceStore, ProductStore, StoreError};

pub(crate) fn product(code: &str) -> Product {
    Product::new(ProductId::new(), code, Stock::ZERO, Price::ZERO, None).unwrap()
}

/// In-process catalog with the same matching rules real stores follow.
#[derive(Debug, Default)]
pub(crate) struct FakeCatalog {
    products: Vec<Product>,
    pairs: Vec<EquivalencePair>,
    equivalence_lookups: AtomicUsize,
}

impl FakeCatalog {
    pub(crate) fn with_products(codes: &[&str]) -> Self {
        Self {
            products: codes.iter().map(|c| product(c)).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn from_parts(products: Vec<Product>, pairs: Vec<EquivalencePair>) -> Self {
        Self {
            products,
            pairs,
            ..Default::default()
        }
    }

    pub(crate) fn pair(mut self, product_code: &str, equivalent_code: &str) -> Self {
        self.pairs
            .push(EquivalencePair::new(product_code, equivalent_code).unwrap());
        self
    }

    pub(crate) fn equivalence_lookups(&self) -> usize {
        self.equivalence_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductStore for FakeCatalog {
    async fn find_by_code_substring(&self, needle: &str) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.code_contains(needle))
            .cloned()
            .collect())
    }

    async fn find_by_codes(&self, codes: &BTreeSet<String>) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .products
            .iter()
            .filter(|p| codes.contains(p.code()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EquivalenceStore for FakeCatalog {
    async fn find_by_either_code(&self, code: &str) -> Result<Vec<EquivalencePair>, StoreError> {
        self.equivalence_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pairs
            .iter()
            .filter(|p| p.involves(code))
            .cloned()
            .collect())
    }
}

/// Every call fails as if the backend were down.
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

#[async_trait]
impl ProductStore for FailingStore {
    async fn find_by_code_substring(&self, _needle: &str) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn find_by_codes(&self, _codes: &BTreeSet<String>) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }
}

#[async_trait]
impl EquivalenceStore for FailingStore {
    async fn find_by_either_code(&self, _code: &str) -> Result<Vec<EquivalencePair>, StoreError> {
        Err(StoreError::query("relation \"equivalences\" does not exist"))
    }
}

/// Every call sleeps for `delay` before answering with nothing.
#[derive(Debug)]
pub(crate) struct SlowStore {
    delay: Duration,
}

impl SlowStore {
    pub(crate) fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ProductStore for SlowStore {
    async fn find_by_code_substring(&self, _needle: &str) -> Result<Vec<Product>, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn find_by_codes(&self, _codes: &BTreeSet<String>) -> Result<Vec<Product>, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

#[async_trait]
impl EquivalenceStore for SlowStore {
    async fn find_by_either_code(&self, _code: &str) -> Result<Vec<EquivalencePair>, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}
