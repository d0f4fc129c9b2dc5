//! Product identity.
//!
//! Products are identified by the opaque string embedded in the product page
//! (`data-product-id`). The cart merges line items by this value, so it is a
//! distinct type rather than a bare `String`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A product identifier.
///
/// Construction never fails; emptiness is checked when a line item is
/// validated, so stored carts with bad IDs can still be decoded and dropped.
///
/// ```
/// use bms_core::ProductId;
///
/// let id = ProductId::new("A1");
/// assert_eq!(id.as_str(), "A1");
/// assert!(!id.is_blank());
/// assert!(ProductId::new("  ").is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the ID is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
