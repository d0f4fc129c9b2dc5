//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BMS_WHATSAPP_NUMBER` - Shop's WhatsApp number in international format
//!
//! ## Optional
//! - `BMS_WHATSAPP_HOST` - Deep link host (default: wa.me)
//! - `BMS_STORAGE_DIR` - Directory for file-backed storage (default: .bms-storage)
//! - `BMS_CART_STORAGE_KEY` - Key the cart is stored under (default: shoppingCart);
//!   letters, digits, `-`, `_` and `.` only, since it doubles as a file name
//! - `BMS_STORAGE_QUOTA_BYTES` - Storage quota in bytes (default: 5 MiB)
//! - `BMS_SCROLL_THRESHOLD_PX` - Scroll offset that restyles the header (default: 80)
//! - `BMS_NOTIFICATION_TIMEOUT_MS` - How long notifications stay visible (default: 3000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cart_store::DEFAULT_CART_KEY;
use crate::storage::{DEFAULT_QUOTA_BYTES, validate_key};

const MIN_PHONE_DIGITS: usize = 7;
/// E.164 maximum.
const MAX_PHONE_DIGITS: usize = 15;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory used by file-backed storage
    pub storage_dir: PathBuf,
    /// Key the cart blob is stored under
    pub cart_storage_key: String,
    /// Byte quota for the storage backend
    pub storage_quota_bytes: usize,
    /// Order messaging configuration
    pub messaging: MessagingConfig,
    /// Page behaviour configuration
    pub ui: UiConfig,
}

/// Order messaging (WhatsApp deep link) configuration.
///
/// Implements `Debug` manually to mask the phone number.
#[derive(Clone, PartialEq, Eq)]
pub struct MessagingConfig {
    /// Deep link host (e.g., wa.me)
    pub host: String,
    /// Recipient number, digits only
    pub recipient: String,
}

impl std::fmt::Debug for MessagingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingConfig")
            .field("host", &self.host)
            .field("recipient", &mask_phone(&self.recipient))
            .finish()
    }
}

/// Page behaviour configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiConfig {
    /// Scroll offset in pixels past which the header is styled as scrolled
    pub scroll_threshold_px: u32,
    /// How long a notification stays on screen
    pub notification_timeout: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 80,
            notification_timeout: Duration::from_millis(3000),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let storage_dir = PathBuf::from(env.get_or_default("BMS_STORAGE_DIR", ".bms-storage"));
        let cart_storage_key = env.get_or_default("BMS_CART_STORAGE_KEY", DEFAULT_CART_KEY);
        validate_key(&cart_storage_key).map_err(|e| {
            ConfigError::InvalidEnvVar("BMS_CART_STORAGE_KEY".to_string(), e.to_string())
        })?;
        let storage_quota_bytes = env.parse_or("BMS_STORAGE_QUOTA_BYTES", DEFAULT_QUOTA_BYTES)?;

        let messaging = MessagingConfig::from_env(&env)?;
        let ui = UiConfig::from_env(&env)?;

        Ok(Self {
            storage_dir,
            cart_storage_key,
            storage_quota_bytes,
            messaging,
            ui,
        })
    }
}

impl MessagingConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let raw = env.get_required("BMS_WHATSAPP_NUMBER")?;
        let recipient = normalize_phone(&raw)
            .map_err(|reason| ConfigError::InvalidEnvVar("BMS_WHATSAPP_NUMBER".to_string(), reason))?;

        Ok(Self {
            host: env.get_or_default("BMS_WHATSAPP_HOST", "wa.me"),
            recipient,
        })
    }
}

impl UiConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_ms = env.parse_or(
            "BMS_NOTIFICATION_TIMEOUT_MS",
            u64::try_from(defaults.notification_timeout.as_millis()).unwrap_or(u64::MAX),
        )?;

        Ok(Self {
            scroll_threshold_px: env
                .parse_or("BMS_SCROLL_THRESHOLD_PX", defaults.scroll_threshold_px)?,
            notification_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/default helpers.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get a required variable.
    fn get_required(&self, key: &str) -> Result<String, ConfigError> {
        (self.0)(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        (self.0)(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Reduce a phone number to the digits a deep link expects.
///
/// Accepts an optional leading `+` and ignores spaces, dashes, dots and
/// parentheses.
fn normalize_phone(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            other => return Err(format!("unexpected character {other:?}")),
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(format!(
            "must have {MIN_PHONE_DIGITS}-{MAX_PHONE_DIGITS} digits (got {})",
            digits.len()
        ));
    }
    Ok(digits)
}

/// Mask all but the last four digits.
fn mask_phone(phone: &str) -> String {
    let visible = phone.len().saturating_sub(4);
    phone
        .char_indices()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}
