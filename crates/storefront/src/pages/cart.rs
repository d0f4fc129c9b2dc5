//! Cart page: item list, removal, and the WhatsApp order action.

use std::time::Duration;

use askama::Template;
use bms_core::{Cart, LineItem, ProductId};
use tracing::instrument;
use url::Url;

use crate::cart_store::CartStore;
use crate::config::MessagingConfig;
use crate::error::{AppError, Result};
use crate::notification::Notification;
use crate::order;
use crate::pages::chrome::CartBadge;
use crate::storage::KeyValueStore;

/// Cart item display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&Cart::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.iter().map(CartItemView::from).collect(),
            subtotal: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

impl From<&LineItem> for CartItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.unit_price.to_string(),
            line_price: line.subtotal().to_string(),
        }
    }
}

/// Cart items fragment template.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate<'a> {
    pub cart: &'a CartView,
}

/// What the cart page shows after a removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPageUpdate {
    pub notification: Notification,
    pub badge: CartBadge,
    pub cart: CartView,
}

/// The cart page bound to the cart store.
#[derive(Debug, Clone)]
pub struct CartPage<S> {
    store: CartStore<S>,
    messaging: MessagingConfig,
    notification_duration: Duration,
}

impl<S: KeyValueStore> CartPage<S> {
    #[must_use]
    pub const fn new(store: CartStore<S>, messaging: MessagingConfig) -> Self {
        Self {
            store,
            messaging,
            notification_duration: Notification::DEFAULT_DURATION,
        }
    }

    /// Set how long notifications from this page stay visible.
    #[must_use]
    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    /// Current cart contents for display.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::from(&self.store.load())
    }

    /// Render the cart items fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String> {
        let cart = self.view();
        Ok(CartItemsTemplate { cart: &cart }.render()?)
    }

    /// Handle a remove button carrying a product ID.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &ProductId) -> CartPageUpdate {
        self.removal_update(self.store.try_remove(id))
    }

    /// Handle a remove button carrying a list position.
    #[instrument(skip(self))]
    pub fn remove_at(&self, index: usize) -> CartPageUpdate {
        self.removal_update(self.store.try_remove_at(index))
    }

    /// Handle the order button: the deep link to open.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyCart`] when there is nothing to order, or an
    /// error if the link cannot be built.
    #[instrument(skip(self))]
    pub fn order(&self) -> Result<Url> {
        let cart = self.store.load();
        if cart.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let url = order::order_link(&self.messaging, &cart)?;
        tracing::info!(items = cart.len(), total = %cart.total(), "Order link created");
        Ok(url)
    }

    /// On failure the page shows whatever is still saved.
    fn removal_update(&self, result: Result<Cart>) -> CartPageUpdate {
        match result {
            Ok(cart) => self.page_update(&cart, Notification::info("Item removed from cart.")),
            Err(e) => self.page_update(&self.store.load(), e.notification()),
        }
    }

    fn page_update(&self, cart: &Cart, notification: Notification) -> CartPageUpdate {
        CartPageUpdate {
            notification: notification.with_duration(self.notification_duration),
            badge: CartBadge {
                count: cart.item_count(),
            },
            cart: CartView::from(cart),
        }
    }
}
