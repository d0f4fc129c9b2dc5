//! Storefront state shared by every page.

use std::sync::Arc;

use crate::cart_store::CartStore;
use crate::config::StorefrontConfig;
use crate::pages::{
    CartBadge, CartPage, HeaderState, NavOverlay, ProductAttributes, ProductPage, QuantityStepper,
};
use crate::storage::{FileStorage, KeyValueStore};

/// Configuration plus the storage backend, handed to each page.
///
/// This struct is cheaply cloneable via `Arc`. Every page built from it gets
/// its own [`CartStore`] over the same backend, so pages never share an
/// in-memory cart.
#[derive(Debug)]
pub struct Storefront<S> {
    inner: Arc<StorefrontInner<S>>,
}

#[derive(Debug)]
struct StorefrontInner<S> {
    config: StorefrontConfig,
    storage: S,
}

impl<S> Clone for Storefront<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Storefront<FileStorage> {
    /// Build a storefront over file-backed storage in the configured
    /// directory, with the configured quota.
    #[must_use]
    pub fn open(config: StorefrontConfig) -> Self {
        let storage = FileStorage::with_quota(&config.storage_dir, config.storage_quota_bytes);
        tracing::info!(dir = %config.storage_dir.display(), "Using file storage");
        Self::new(config, storage)
    }
}

impl<S: KeyValueStore + Clone> Storefront<S> {
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: S) -> Self {
        Self {
            inner: Arc::new(StorefrontInner { config, storage }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// A fresh cart store handle.
    #[must_use]
    pub fn cart_store(&self) -> CartStore<S> {
        CartStore::with_key(
            self.inner.storage.clone(),
            self.inner.config.cart_storage_key.clone(),
        )
    }

    /// Header state using the configured scroll threshold.
    #[must_use]
    pub fn header(&self) -> HeaderState {
        HeaderState::new(self.inner.config.ui.scroll_threshold_px)
    }

    #[must_use]
    pub const fn nav_overlay(&self) -> NavOverlay {
        NavOverlay::new()
    }

    /// Badge for the current cart.
    #[must_use]
    pub fn badge(&self) -> CartBadge {
        CartBadge::from_store(&self.cart_store())
    }

    /// A product page for `product`, starting from the quantity shown in the
    /// page.
    #[must_use]
    pub fn product_page(
        &self,
        product: Option<ProductAttributes>,
        quantity_text: &str,
    ) -> ProductPage<S> {
        ProductPage::new(
            self.cart_store(),
            product,
            QuantityStepper::from_display(quantity_text),
        )
        .with_notification_duration(self.inner.config.ui.notification_timeout)
    }

    /// The cart page.
    #[must_use]
    pub fn cart_page(&self) -> CartPage<S> {
        CartPage::new(self.cart_store(), self.inner.config.messaging.clone())
            .with_notification_duration(self.inner.config.ui.notification_timeout)
    }
}
