//! Postgres-backed catalog store.
//!
//! Reads the `products` and `equivalences` tables created by
//! `migrations/0001_catalog.sql`. Products are matched on the `product` (code)
//! column only; `price` is `numeric(10,2)` and is read back as integer cents.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use stocklookup_catalog::{EquivalencePair, Price, Product, Stock};
use stocklookup_core::ProductId;
use stocklookup_search::{EquivalenceStore, ProductStore, StoreError};

use super::escape_like;

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

const PRODUCT_COLUMNS: &str =
    "id, product AS code, stock, (price * 100)::bigint AS price_cents, application";

/// Create the catalog tables if they do not exist yet. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

/// Catalog reads over a shared connection pool.
///
/// One instance serves both contracts; the HTTP layer hands the same
/// `Arc` to the orchestrator as product store and as equivalence store.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn products_from_rows(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<Product>, StoreError> {
        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let row = ProductRow::from_row(&row)
                .map_err(|e| StoreError::query(format!("failed to read product row: {e}")))?;
            products.push(Product::try_from(row)?);
        }
        Ok(products)
    }

    fn pairs_from_rows(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<EquivalencePair>, StoreError> {
        let mut pairs = Vec::with_capacity(rows.len());
        for row in rows {
            let row = EquivalenceRow::from_row(&row)
                .map_err(|e| StoreError::query(format!("failed to read equivalence row: {e}")))?;
            match EquivalencePair::new(&row.product_code, &row.equivalent_code) {
                Ok(pair) => pairs.push(pair),
                // Legacy rows may pair a code with itself; such a row adds nothing.
                Err(err) => tracing::debug!(
                    product_code = %row.product_code,
                    equivalent_code = %row.equivalent_code,
                    error = %err,
                    "skipping invalid equivalence row"
                ),
            }
        }
        Ok(pairs)
    }
}

#[async_trait]
impl ProductStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(row_count = tracing::field::Empty))]
    async fn find_by_code_substring(&self, needle: &str) -> Result<Vec<Product>, StoreError> {
        let pattern = format!("%{}%", escape_like(needle));
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product ILIKE $1 ESCAPE '\\' ORDER BY product"
        );

        let rows = sqlx::query(&sql)
            .bind(pattern)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_code_substring", e))?;

        Span::current().record("row_count", rows.len());
        Self::products_from_rows(rows)
    }

    #[instrument(skip(self, codes), fields(code_count = codes.len(), row_count = tracing::field::Empty))]
    async fn find_by_codes(&self, codes: &BTreeSet<String>) -> Result<Vec<Product>, StoreError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product = ANY($1) ORDER BY product");

        let rows = sqlx::query(&sql)
            .bind(codes)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_codes", e))?;

        Span::current().record("row_count", rows.len());
        Self::products_from_rows(rows)
    }
}

#[async_trait]
impl EquivalenceStore for PostgresCatalogStore {
    #[instrument(skip(self))]
    async fn find_by_either_code(&self, code: &str) -> Result<Vec<EquivalencePair>, StoreError> {
        let rows = sqlx::query(
            "SELECT product_code, equivalent_code FROM equivalences \
             WHERE product_code = $1 OR equivalent_code = $1",
        )
        .bind(code)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_either_code", e))?;

        Self::pairs_from_rows(rows)
    }

    #[instrument(skip(self, codes), fields(code_count = codes.len()))]
    async fn find_by_any_code(
        &self,
        codes: &BTreeSet<String>,
    ) -> Result<Vec<EquivalencePair>, StoreError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let codes: Vec<&str> = codes.iter().map(String::as_str).collect();

        let rows = sqlx::query(
            "SELECT product_code, equivalent_code FROM equivalences \
             WHERE product_code = ANY($1) OR equivalent_code = ANY($1)",
        )
        .bind(codes)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_any_code", e))?;

        Self::pairs_from_rows(rows)
    }
}

/// Map sqlx errors: connectivity problems are `Unavailable`, the rest `Query`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(e) => StoreError::unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::PoolTimedOut => {
            StoreError::unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::WorkerCrashed => {
            StoreError::unavailable(format!("database worker crashed in {operation}"))
        }
        sqlx::Error::Database(db_err) => {
            StoreError::query(format!("database error in {operation}: {}", db_err.message()))
        }
        other => StoreError::query(format!("{operation} failed: {other}")),
    }
}

struct ProductRow {
    id: Uuid,
    code: String,
    stock: i32,
    price_cents: i64,
    application: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            stock: row.try_get("stock")?,
            price_cents: row.try_get("price_cents")?,
            application: row.try_get("application")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let invalid = |e: stocklookup_core::DomainError| {
            StoreError::query(format!("invalid product row {}: {e}", row.id))
        };
        let stock = Stock::new(i64::from(row.stock)).map_err(invalid)?;
        let price = Price::from_cents(row.price_cents).map_err(invalid)?;
        Product::new(
            ProductId::from_uuid(row.id),
            row.code.clone(),
            stock,
            price,
            row.application.clone(),
        )
        .map_err(invalid)
    }
}

struct EquivalenceRow {
    product_code: String,
    equivalent_code: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for EquivalenceRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EquivalenceRow {
            product_code: row.try_get("product_code")?,
            equivalent_code: row.try_get("equivalent_code")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_errors_are_unavailable() {
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn other_errors_are_query_errors() {
        let err = map_sqlx_error("find_by_codes", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Query(ref m) if m.contains("find_by_codes")));
    }

    #[test]
    fn negative_stock_row_is_rejected() {
        let row = ProductRow {
            id: Uuid::nil(),
            code: "13E".to_string(),
            stock: -1,
            price_cents: 100,
            application: None,
        };
        assert!(matches!(Product::try_from(row), Err(StoreError::Query(_))));
    }

    #[test]
    fn valid_row_translates_to_product() {
        let row = ProductRow {
            id: Uuid::nil(),
            code: " 13E ".to_string(),
            stock: 4,
            price_cents: 1205,
            application: Some("".to_string()),
        };
        let product = Product::try_from(row).unwrap();
        assert_eq!(product.code(), "13E");
        assert_eq!(product.price().cents(), 1205);
        assert_eq!(product.application(), None);
    }

    #[test]
    fn schema_declares_all_tables() {
        for table in ["products", "equivalences", "users"] {
            assert!(SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")));
        }
    }

    #[test]
    fn schema_backfills_the_password_change_flag() {
        assert!(SCHEMA.contains("ADD COLUMN IF NOT EXISTS must_change_password"));
    }
}
