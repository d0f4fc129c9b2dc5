//! BMS Showroom storefront library.
//!
//! Everything the showroom pages do beyond static markup: the persisted cart,
//! the page collaborators that drive it, and the WhatsApp order link.
//!
//! # Architecture
//!
//! - [`storage`] - Local key-value storage backends (memory, files)
//! - [`cart_store`] - Load/mutate/save transactions over the persisted cart
//! - [`pages`] - Header, navigation, product page, cart page
//! - [`order`] - Order message and deep link
//! - [`state`] - Configuration and storage shared by the pages
//!
//! Pages never read the storage key themselves; every cart access goes
//! through [`cart_store::CartStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart_store;
pub mod config;
pub mod error;
pub mod notification;
pub mod order;
pub mod pages;
pub mod state;
pub mod storage;

pub use cart_store::CartStore;
pub use config::StorefrontConfig;
pub use error::AppError;
pub use state::Storefront;
