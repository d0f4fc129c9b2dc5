//! Product detail page: quantity stepper and add-to-cart.

use std::time::Duration;

use bms_core::{LineItem, Price, UNKNOWN_PRODUCT_NAME};
use tracing::instrument;

use super::PageUpdate;
use crate::cart_store::CartStore;
use crate::error::{AppError, Result};
use crate::notification::Notification;
use crate::pages::chrome::CartBadge;
use crate::storage::KeyValueStore;

/// Product details embedded in the page (`data-product-*` attributes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductAttributes {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
}

impl ProductAttributes {
    /// Build the line item for `quantity` units of this product.
    ///
    /// A missing or blank name falls back to `Unknown Product`; a missing or
    /// unparseable price becomes zero, which the cart then rejects.
    #[must_use]
    pub fn to_line_item(&self, quantity: u32) -> LineItem {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_PRODUCT_NAME);
        let price = self
            .price
            .as_deref()
            .and_then(|raw| raw.parse::<Price>().ok())
            .unwrap_or(Price::ZERO);

        LineItem::new(self.id.clone().unwrap_or_default(), name, price, quantity)
    }
}

/// The `- n +` quantity selector. Never goes below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityStepper {
    value: u32,
}

impl Default for QuantityStepper {
    fn default() -> Self {
        Self { value: 1 }
    }
}

impl QuantityStepper {
    /// Start from the quantity shown in the page; anything that is not a
    /// positive number starts at one.
    #[must_use]
    pub fn from_display(text: &str) -> Self {
        let value = text
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(1);
        Self { value }
    }

    pub const fn increment(&mut self) -> u32 {
        self.value = self.value.saturating_add(1);
        self.value
    }

    pub const fn decrement(&mut self) -> u32 {
        if self.value > 1 {
            self.value -= 1;
        }
        self.value
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// A product detail page bound to the cart store.
#[derive(Debug, Clone)]
pub struct ProductPage<S> {
    store: CartStore<S>,
    product: Option<ProductAttributes>,
    stepper: QuantityStepper,
    notification_duration: Duration,
}

impl<S: KeyValueStore> ProductPage<S> {
    /// `product` is `None` when the page has no product details container.
    #[must_use]
    pub const fn new(
        store: CartStore<S>,
        product: Option<ProductAttributes>,
        stepper: QuantityStepper,
    ) -> Self {
        Self {
            store,
            product,
            stepper,
            notification_duration: Notification::DEFAULT_DURATION,
        }
    }

    /// Set how long notifications from this page stay visible.
    #[must_use]
    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    #[must_use]
    pub const fn stepper(&self) -> &QuantityStepper {
        &self.stepper
    }

    pub const fn stepper_mut(&mut self) -> &mut QuantityStepper {
        &mut self.stepper
    }

    /// Handle the add-to-cart button.
    ///
    /// Always produces a notification and a fresh badge. Success is only
    /// reported once the cart has been saved; on failure the persisted cart
    /// is left untouched.
    #[instrument(skip(self))]
    pub fn add_to_cart(&self) -> PageUpdate {
        let notification = match self.try_add_to_cart() {
            Ok(item) => Notification::success(format!(
                "{} x \"{}\" added to cart.",
                item.quantity, item.name
            )),
            Err(e) => {
                tracing::debug!(error = %e, "Add to cart rejected");
                e.notification()
            }
        };

        PageUpdate {
            notification: notification.with_duration(self.notification_duration),
            badge: CartBadge::from_store(&self.store),
        }
    }

    fn try_add_to_cart(&self) -> Result<LineItem> {
        let product = self.product.as_ref().ok_or(AppError::ProductDetailsMissing)?;
        let item = product.to_line_item(self.stepper.value());
        self.store.try_add(item.clone())?;
        Ok(item)
    }
}
