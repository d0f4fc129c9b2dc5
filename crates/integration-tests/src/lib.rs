//! Integration tests for the BMS showroom.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bms-integration-tests
//! RUST_LOG=bms_storefront=debug cargo test -p bms-integration-tests -- --nocapture
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart store against file-backed storage
//! - `checkout_flow` - Product page to cart page to order link

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::path::Path;
use std::time::Duration;

use bms_storefront::config::{MessagingConfig, UiConfig};
use bms_storefront::storage::{DEFAULT_QUOTA_BYTES, FileStorage};
use bms_storefront::{CartStore, Storefront, StorefrontConfig};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Recipient used by every test configuration.
pub const TEST_RECIPIENT: &str = "263771234567";

/// Install a test-writer subscriber once per test binary.
///
/// Filter with `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A storage directory that lives as long as the context.
pub struct TestContext {
    dir: TempDir,
    quota: usize,
}

impl TestContext {
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> io::Result<Self> {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn with_quota(quota: usize) -> io::Result<Self> {
        init_tracing();
        Ok(Self {
            dir: tempfile::tempdir()?,
            quota,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A fresh storage handle over the shared directory, as a new tab would
    /// open it.
    #[must_use]
    pub fn storage(&self) -> FileStorage {
        FileStorage::with_quota(self.dir.path(), self.quota)
    }

    #[must_use]
    pub fn cart_store(&self) -> CartStore<FileStorage> {
        CartStore::new(self.storage())
    }

    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            storage_dir: self.dir.path().to_path_buf(),
            cart_storage_key: bms_storefront::cart_store::DEFAULT_CART_KEY.to_string(),
            storage_quota_bytes: self.quota,
            messaging: MessagingConfig {
                host: "wa.me".to_string(),
                recipient: TEST_RECIPIENT.to_string(),
            },
            ui: UiConfig {
                scroll_threshold_px: 80,
                notification_timeout: Duration::from_millis(3000),
            },
        }
    }

    #[must_use]
    pub fn storefront(&self) -> Storefront<FileStorage> {
        Storefront::open(self.config())
    }
}
