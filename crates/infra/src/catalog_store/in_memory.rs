use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;

use stocklookup_catalog::{EquivalencePair, Product};
use stocklookup_search::{EquivalenceStore, ProductStore, StoreError};

/// In-memory product store for tests/dev.
///
/// `insert`/`extend` stand in for the bulk import path.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        if let Ok(mut products) = self.inner.write() {
            products.push(product);
        }
    }

    pub fn extend(&self, products: impl IntoIterator<Item = Product>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.extend(products);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filtered(&self, keep: impl Fn(&Product) -> bool) -> Result<Vec<Product>, StoreError> {
        let products = self
            .inner
            .read()
            .map_err(|_| StoreError::unavailable("product store lock poisoned"))?;

        let mut found: Vec<Product> = products.iter().filter(|p| keep(p)).cloned().collect();
        // Same ordering the Postgres adapter asks for.
        found.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(found)
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find_by_code_substring(&self, needle: &str) -> Result<Vec<Product>, StoreError> {
        self.filtered(|p| p.code_contains(needle))
    }

    async fn find_by_codes(&self, codes: &BTreeSet<String>) -> Result<Vec<Product>, StoreError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        self.filtered(|p| codes.contains(p.code()))
    }
}

/// In-memory equivalence store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryEquivalenceStore {
    inner: RwLock<Vec<EquivalencePair>>,
}

impl InMemoryEquivalenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a pair; self-pairs and empty codes are rejected.
    ///
    /// Duplicates are kept, as a plain table without a unique constraint would.
    pub fn insert(&self, product_code: &str, equivalent_code: &str) -> Result<(), StoreError> {
        let pair = EquivalencePair::new(product_code, equivalent_code)
            .map_err(|e| StoreError::query(e.to_string()))?;
        let mut pairs = self
            .inner
            .write()
            .map_err(|_| StoreError::unavailable("equivalence store lock poisoned"))?;
        pairs.push(pair);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filtered(&self, keep: impl Fn(&EquivalencePair) -> bool) -> Result<Vec<EquivalencePair>, StoreError> {
        let pairs = self
            .inner
            .read()
            .map_err(|_| StoreError::unavailable("equivalence store lock poisoned"))?;
        Ok(pairs.iter().filter(|p| keep(p)).cloned().collect())
    }
}

#[async_trait]
impl EquivalenceStore for InMemoryEquivalenceStore {
    async fn find_by_either_code(&self, code: &str) -> Result<Vec<EquivalencePair>, StoreError> {
        self.filtered(|p| p.involves(code))
    }

    async fn find_by_any_code(
        &self,
        codes: &BTreeSet<String>,
    ) -> Result<Vec<EquivalencePair>, StoreError> {
        self.filtered(|p| codes.contains(p.product_code()) || codes.contains(p.equivalent_code()))
    }
}
