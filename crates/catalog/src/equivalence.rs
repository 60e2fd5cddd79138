//! Equivalence pairs: interchangeable part codes.

use stocklookup_core::{DomainError, DomainResult, ValueObject};

/// A stored association saying two product codes are interchangeable.
///
/// Directional as stored (`product_code` is the catalog side), symmetric for
/// resolution. Both sides reference `Product::code` by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquivalencePair {
    product_code: String,
    equivalent_code: String,
}

impl EquivalencePair {
    /// Build a pair, trimming both codes.
    ///
    /// Self-pairs and empty codes are rejected; this is the only constructor,
    /// so no store can hold one.
    pub fn new(
        product_code: impl Into<String>,
        equivalent_code: impl Into<String>,
    ) -> DomainResult<Self> {
        let product_code = product_code.into().trim().to_string();
        let equivalent_code = equivalent_code.into().trim().to_string();

        if product_code.is_empty() || equivalent_code.is_empty() {
            return Err(DomainError::validation("equivalence codes cannot be empty"));
        }
        if product_code == equivalent_code {
            return Err(DomainError::validation(format!(
                "code '{product_code}' cannot be equivalent to itself"
            )));
        }

        Ok(Self {
            product_code,
            equivalent_code,
        })
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn equivalent_code(&self) -> &str {
        &self.equivalent_code
    }

    /// True if `code` appears in either column.
    pub fn involves(&self, code: &str) -> bool {
        self.product_code == code || self.equivalent_code == code
    }

    /// The code on the opposite side from `code`, if `code` is part of this pair.
    pub fn counterpart(&self, code: &str) -> Option<&str> {
        if self.product_code == code {
            Some(&self.equivalent_code)
        } else if self.equivalent_code == code {
            Some(&self.product_code)
        } else {
            None
        }
    }
}

impl ValueObject for EquivalencePair {}
