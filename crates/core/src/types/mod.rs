//! Core types for the BMS showroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod line_item;
pub mod price;

pub use id::ProductId;
pub use line_item::{LineItem, LineItemError, UNKNOWN_PRODUCT_NAME};
pub use price::Price;
