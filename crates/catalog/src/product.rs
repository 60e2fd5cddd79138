use std::collections::BTreeSet;

use stocklookup_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

/// Non-negative stock quantity, bounded to the 32-bit signed range the
/// catalog table uses.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stock(i32);

impl Stock {
    pub const ZERO: Stock = Stock(0);

    pub fn new(quantity: i64) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        let quantity = i32::try_from(quantity)
            .map_err(|_| DomainError::validation(format!("stock exceeds {}", i32::MAX)))?;
        Ok(Self(quantity))
    }

    pub fn get(&self) -> i32 {
        self.0
    }

    pub fn is_available(&self) -> bool {
        self.0 > 0
    }
}

impl ValueObject for Stock {}

/// Non-negative unit price with two fractional digits, held as integer cents.
///
/// Upper bound is 99,999,999.99 (a `numeric(10, 2)` column).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);
    pub const MAX_CENTS: i64 = 9_999_999_999;

    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        if cents < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if cents > Self::MAX_CENTS {
            return Err(DomainError::validation("price exceeds 99999999.99"));
        }
        Ok(Self(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A catalog product as seen by the search core.
///
/// Products are created and updated only by the bulk import path; search never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    code: String,
    stock: Stock,
    price: Price,
    application: Option<String>,
}

impl Product {
    /// Build a validated product.
    ///
    /// The code is trimmed and must not be empty. A blank application is
    /// stored as `None`.
    pub fn new(
        id: ProductId,
        code: impl Into<String>,
        stock: Stock,
        price: Price,
        application: Option<String>,
    ) -> DomainResult<Self> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(DomainError::validation("product code cannot be empty"));
        }

        let application = application
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Ok(Self {
            id,
            code,
            stock,
            price,
            application,
        })
    }

    /// Model/display code; the primary searchable field. Not unique.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn stock(&self) -> Stock {
        self.stock
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn application(&self) -> Option<&str> {
        self.application.as_deref()
    }

    /// Case-insensitive substring match against the code.
    pub fn code_contains(&self, needle: &str) -> bool {
        self.code.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A product enriched with its one-hop equivalent codes.
///
/// Built per query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    product: Product,
    related_codes: BTreeSet<String>,
}

impl SearchResult {
    /// The product's own code is always dropped from `related_codes`.
    pub fn new(product: Product, mut related_codes: BTreeSet<String>) -> Self {
        related_codes.remove(product.code());
        Self {
            product,
            related_codes,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn related_codes(&self) -> &BTreeSet<String> {
        &self.related_codes
    }

    pub fn into_parts(self) -> (Product, BTreeSet<String>) {
        (self.product, self.related_codes)
    }
}
