//! Unified error handling for page actions.
//!
//! Provides a unified `AppError` type for everything a page action can fail
//! with. Errors are turned into user-facing notifications with
//! [`AppError::notification`], which logs the details and keeps internal
//! messages off the page.

use bms_core::CartError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::notification::Notification;
use crate::order::OrderError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Persistent storage failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The order link could not be built.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// The page carries no product details.
    #[error("Product details not found")]
    ProductDetailsMissing,

    /// An order was requested for an empty cart.
    #[error("Cart is empty")]
    EmptyCart,
}

impl AppError {
    /// The notification shown to the shopper for this error.
    ///
    /// Internal failures are logged here; their details never reach the page.
    #[must_use]
    pub fn notification(&self) -> Notification {
        if matches!(
            self,
            Self::StorageUnavailable(_) | Self::Config(_) | Self::Order(_) | Self::Render(_)
        ) {
            tracing::error!(error = %self, "Page action failed");
        }

        let message = match self {
            Self::Cart(CartError::InvalidItem(_)) => "Invalid product data.",
            Self::Cart(CartError::IndexOutOfRange { .. }) => "That item is no longer in your cart.",
            Self::ProductDetailsMissing => "Product details not found.",
            Self::EmptyCart => "Your cart is empty.",
            Self::StorageUnavailable(_) => "Your cart could not be saved.",
            Self::Config(_) | Self::Order(_) | Self::Render(_) => {
                "Something went wrong. Please try again."
            }
        };

        Notification::error(message)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use bms_core::LineItemError;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(CartError::IndexOutOfRange { index: 2, len: 1 });
        assert_eq!(
            err.to_string(),
            "Cart error: index 2 out of range for cart with 1 items"
        );

        assert_eq!(
            AppError::ProductDetailsMissing.to_string(),
            "Product details not found"
        );
    }

    #[test]
    fn test_notifications_are_errors() {
        let errors = [
            AppError::from(CartError::from(LineItemError::EmptyId)),
            AppError::from(CartError::IndexOutOfRange { index: 0, len: 0 }),
            AppError::ProductDetailsMissing,
            AppError::EmptyCart,
            AppError::from(StorageError::Unavailable("disabled".to_string())),
        ];

        for err in &errors {
            assert!(err.notification().is_error(), "{err} should notify as error");
        }
    }

    #[test]
    fn test_notification_messages() {
        assert_eq!(
            AppError::from(CartError::from(LineItemError::ZeroQuantity))
                .notification()
                .message,
            "Invalid product data."
        );
        assert_eq!(
            AppError::ProductDetailsMissing.notification().message,
            "Product details not found."
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::from(StorageError::Unavailable("disk /dev/sda1 gone".to_string()));
        assert!(!err.notification().message.contains("sda1"));
    }
}
