//! Page collaborators.
//!
//! Each page turns a UI event into one cart store call and returns what the
//! page should show next. Nothing here touches storage directly.
//!
//! - [`chrome`] - Header scroll state, navigation overlay, back button, cart badge
//! - [`product`] - Quantity stepper and add-to-cart
//! - [`cart`] - Cart list, removal, WhatsApp order link

pub mod cart;
pub mod chrome;
pub mod product;

pub use cart::{CartItemView, CartPage, CartPageUpdate, CartView};
pub use chrome::{BackButton, CartBadge, HeaderState, NavOverlay, Navigation};
pub use product::{ProductAttributes, ProductPage, QuantityStepper};

use crate::notification::Notification;

/// What a page shows after an action: a notification and the new badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate {
    pub notification: Notification,
    pub badge: CartBadge,
}
