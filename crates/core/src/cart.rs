//! The shopper's cart.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s with at most one entry per
//! product. Insertion order is preserved for display. Operations here are
//! pure: they never touch storage, and a rejected operation leaves the cart
//! exactly as it was.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{LineItem, LineItemError, Price, ProductId};

/// Errors surfaced to the caller by cart operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The item cannot be added.
    #[error("invalid item: {0}")]
    InvalidItem(#[from] LineItemError),

    /// A positional removal fell outside the cart.
    #[error("index {index} out of range for cart with {len} items")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of entries in the cart.
        len: usize,
    },
}

/// An ordered collection of line items.
///
/// ## Example
///
/// ```
/// use bms_core::{Cart, LineItem, Price};
///
/// let mut cart = Cart::new();
/// cart.add_or_merge(LineItem::new("A1", "Screen", Price::from(1500), 2)).unwrap();
/// cart.add_or_merge(LineItem::new("A1", "Screen", Price::from(1500), 1)).unwrap();
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.item_count(), 3);
/// assert_eq!(cart.total().to_string(), "$4500.00");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item, merging quantities with an existing entry for the same
    /// product.
    ///
    /// An existing entry keeps its name and unit price; only the quantity
    /// grows. New products are appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidItem`] if the item fails validation or the
    /// merged quantity would overflow. The cart is unchanged on error.
    pub fn add_or_merge(&mut self, item: LineItem) -> Result<(), CartError> {
        item.validate()?;

        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or(LineItemError::QuantityOverflow { id: item.id })?;
        } else {
            self.items.push(item);
        }

        Ok(())
    }

    /// Remove the entry for `id`. Returns whether an entry was removed;
    /// removing an absent product is not an error.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.id != id);
        self.items.len() != before
    }

    /// Remove the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<LineItem, CartError> {
        if index >= self.items.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Sum of every entry's subtotal, unrounded.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Sum of quantities, as shown on the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Entries in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Cart {
    type Item = LineItem;
    type IntoIter = std::vec::IntoIter<LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
