//! BMS Core - Shared cart types library.
//!
//! This crate provides the types and pure cart operations used by the
//! storefront library:
//! - `storefront` - Storage backends, the cart store, page collaborators
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no storage, no
//! templates, no configuration. Every cart operation is a plain function of
//! the current cart and its input.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, and line items
//! - [`cart`] - The ordered cart and its add/merge/remove/total operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError};
pub use types::*;
