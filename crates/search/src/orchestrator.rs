//! Search orchestration: direct matches, one-hop expansion, merge, paginate.
//!
//! ## Ordering of operations
//!
//! 1. Substring match of the query over the **whole** catalog
//! 2. Expansion through equivalences (from every direct-match code, or from the
//!    query itself when nothing matched directly)
//! 3. Union, dedupe by code (direct matches first), stable sort by code
//! 4. Slice the requested page out of the merged set
//! 5. Attach each page item's own equivalents
//!
//! Pagination happens only after the merge, so `total_count` always describes
//! the deduplicated union.
//!
//! ## Failure policy
//!
//! A store error or timeout in steps 1-2 turns the whole call into an empty
//! page. Nothing partially merged is ever returned. A failure in step 5 only
//! costs that item its related codes.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use futures::future::join_all;

use stocklookup_catalog::{Page, PageRequest, Product, SearchResult};

use crate::resolver::EquivalenceResolver;
use crate::store::{EquivalenceStore, ProductStore, StoreError, bounded};

/// Search tuning.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Deadline applied to each individual store call.
    pub store_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOrchestrator<P, E> {
    products: P,
    resolver: EquivalenceResolver<E>,
    config: SearchConfig,
}

impl<P, E> SearchOrchestrator<P, E>
where
    P: ProductStore,
    E: EquivalenceStore,
{
    pub fn new(products: P, equivalences: E, config: SearchConfig) -> Self {
        Self {
            products,
            resolver: EquivalenceResolver::new(equivalences, config.store_timeout),
            config,
        }
    }

    pub fn resolver(&self) -> &EquivalenceResolver<E> {
        &self.resolver
    }

    /// Search the catalog for `query` and return the requested page.
    ///
    /// Never fails: blank queries and store failures both yield an empty page
    /// that echoes `request`.
    pub async fn search(&self, query: &str, request: PageRequest) -> Page<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Page::empty(request);
        }

        let merged = match self.collect(query).await {
            Ok(merged) => merged,
            Err(e) => {
                tracing::warn!(query, error = %e, "search degraded to no results");
                return Page::empty(request);
            }
        };

        let page = Page::slice(merged, request);
        tracing::debug!(
            query,
            total_count = page.total_count,
            page = page.page,
            returned = page.items.len(),
            "search merged"
        );

        let related = join_all(page.items.iter().map(|p| self.resolver.resolve(p.code()))).await;
        let mut related = related.into_iter();
        page.map(|product| SearchResult::new(product, related.next().unwrap_or_default()))
    }

    /// Steps 1-3: the full merged, deduplicated, sorted result set.
    async fn collect(&self, query: &str) -> Result<Vec<Product>, StoreError> {
        // The query-as-code lookup only matters when nothing matches directly,
        // but it is independent of the substring match, so both go out together.
        let (direct, query_equivalents) = tokio::join!(
            bounded(
                "products.find_by_code_substring",
                self.config.store_timeout,
                self.products.find_by_code_substring(query),
            ),
            self.resolver.try_resolve(query),
        );
        let direct = direct?;

        let related = if direct.is_empty() {
            query_equivalents?
        } else {
            let direct_codes: BTreeSet<String> =
                direct.iter().map(|p| p.code().to_string()).collect();
            self.resolver.try_resolve_all(&direct_codes).await?
        };

        let expanded = if related.is_empty() {
            Vec::new()
        } else {
            bounded(
                "products.find_by_codes",
                self.config.store_timeout,
                self.products.find_by_codes(&related),
            )
            .await?
        };

        Ok(merge_by_code(direct, expanded))
    }
}

/// Union `direct` then `expanded`, keep the first product seen per code, and
/// sort by code (byte order). The sort is stable, so union order breaks ties.
pub fn merge_by_code(direct: Vec<Product>, expanded: Vec<Product>) -> Vec<Product> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Product> = direct
        .into_iter()
        .chain(expanded)
        .filter(|p| seen.insert(p.code().to_string()))
        .collect();

    merged.sort_by(|a, b| a.code().cmp(b.code()));
    merged
}
