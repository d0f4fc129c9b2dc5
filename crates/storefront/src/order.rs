//! Order submission over WhatsApp.
//!
//! There is no checkout: an order is a pre-filled chat message listing the
//! cart, opened through a `https://<host>/<recipient>?text=<message>` deep
//! link.

use bms_core::Cart;
use thiserror::Error;
use url::Url;

use crate::config::MessagingConfig;

/// First line of every order message.
pub const ORDER_GREETING: &str = "Hello! I would like to place an order:";

/// Errors building the order link.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The configured host or recipient does not form a valid URL.
    #[error("invalid order link: {0}")]
    InvalidLink(#[from] url::ParseError),
}

/// Build the human-readable order summary.
///
/// ```text
/// Hello! I would like to place an order:
///
/// 1. Screen x 3 - $4500.00
/// 2. Battery x 1 - $800.00
///
/// Total: $5300.00
/// ```
///
/// An empty cart yields the greeting and `Total: $0.00` with no item lines.
#[must_use]
pub fn format_order_message(cart: &Cart) -> String {
    let mut lines = vec![ORDER_GREETING.to_string(), String::new()];

    for (position, item) in cart.iter().enumerate() {
        lines.push(format!(
            "{}. {} x {} - {}",
            position + 1,
            item.name,
            item.quantity,
            item.subtotal()
        ));
    }
    if !cart.is_empty() {
        lines.push(String::new());
    }

    lines.push(format!("Total: {}", cart.total()));
    lines.join("\n")
}

/// Build the deep link that opens a chat with the shop, pre-filled with the
/// order message for `cart`.
///
/// # Errors
///
/// Returns an error if the configured host or recipient produce an invalid
/// URL.
pub fn order_link(config: &MessagingConfig, cart: &Cart) -> Result<Url, OrderError> {
    message_link(config, &format_order_message(cart))
}

/// Build a deep link carrying an arbitrary pre-filled message.
///
/// # Errors
///
/// Returns an error if the configured host or recipient produce an invalid
/// URL.
pub fn message_link(config: &MessagingConfig, message: &str) -> Result<Url, OrderError> {
    let link = format!(
        "https://{}/{}?text={}",
        config.host,
        config.recipient,
        urlencoding::encode(message)
    );
    Ok(Url::parse(&link)?)
}
