//! Cart line items.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Display name used when a product page does not provide one.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Reasons a line item is rejected by the cart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// The product ID is empty or whitespace only.
    #[error("product id cannot be empty")]
    EmptyId,
    /// The unit price is zero or negative.
    #[error("unit price must be greater than zero (got {price})")]
    NonPositivePrice {
        /// The rejected price.
        price: Price,
    },
    /// The quantity is zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// Merging would push the quantity past `u32::MAX`.
    #[error("quantity for {id} would exceed the maximum")]
    QuantityOverflow {
        /// The product whose quantity overflowed.
        id: ProductId,
    },
}

/// One product entry in the cart.
///
/// Field names match the persisted layout: `id`, `name`, `price`, `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identity; the cart holds at most one entry per ID.
    pub id: ProductId,
    /// Display name.
    #[serde(default = "unknown_product_name")]
    pub name: String,
    /// Price of a single unit.
    #[serde(rename = "price")]
    pub unit_price: Price,
    /// Number of units.
    pub quantity: u32,
}

fn unknown_product_name() -> String {
    UNKNOWN_PRODUCT_NAME.to_string()
}

impl LineItem {
    /// Create a line item. Call [`LineItem::validate`] (or add it to a cart)
    /// to check it.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Check the item can be placed in a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is blank, the unit price is not positive,
    /// or the quantity is zero.
    pub fn validate(&self) -> Result<(), LineItemError> {
        if self.id.is_blank() {
            return Err(LineItemError::EmptyId);
        }

        if !self.unit_price.is_positive() {
            return Err(LineItemError::NonPositivePrice {
                price: self.unit_price,
            });
        }

        if self.quantity == 0 {
            return Err(LineItemError::ZeroQuantity);
        }

        Ok(())
    }

    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}
