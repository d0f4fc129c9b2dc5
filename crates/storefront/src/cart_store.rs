//! The cart store service.
//!
//! [`CartStore`] is the only access point to the persisted cart. Every
//! operation loads the cart fresh from storage, applies one change, and
//! writes it back. Nothing is cached between operations, so several stores
//! over the same backend (several open tabs) always see the latest saved
//! cart - and whichever saves last wins.
//!
//! Reads fail soft: missing, unreadable, or malformed data loads as an empty
//! cart. Writes fail soft too: a failed save is logged and the previously
//! saved cart stays in place. The `try_` variants of the mutations report a
//! failed save instead, for callers that must tell the shopper.

use bms_core::{Cart, CartError, LineItem, Price, ProductId};
use serde_json::Value;
use tracing::instrument;

use crate::error::Result as AppResult;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key the cart is persisted under.
pub const DEFAULT_CART_KEY: &str = "shoppingCart";

/// Persisted cart access over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a store using the default cart key.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_CART_KEY)
    }

    /// Create a store persisting under a custom key.
    #[must_use]
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the persisted cart. Never fails; see the module docs.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> Cart {
        match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => decode_cart(&raw),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Cart storage unavailable, using empty cart");
                Cart::new()
            }
        }
    }

    /// Persist `cart`, overwriting what was stored. A failed write is logged
    /// and dropped.
    pub fn save(&self, cart: &Cart) {
        if let Err(e) = self.try_save(cart) {
            tracing::warn!(key = %self.key, error = %e, "Failed to save cart, keeping previous state");
        }
    }

    /// Persist `cart`, reporting storage failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be encoded or the write fails.
    pub fn try_save(&self, cart: &Cart) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(cart)?;
        self.storage.set_item(&self.key, &encoded)
    }

    /// Add an item, merging with an existing entry for the same product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidItem`] if the item is rejected; nothing
    /// is written in that case.
    #[instrument(skip(self, item), fields(key = %self.key, product_id = %item.id, quantity = item.quantity))]
    pub fn add(&self, item: LineItem) -> Result<Cart, CartError> {
        let mut cart = self.load();
        if let Err(e) = cart.add_or_merge(item) {
            tracing::debug!(error = %e, "Rejected cart item");
            return Err(e);
        }
        self.save(&cart);
        tracing::debug!(items = cart.len(), "Added item to cart");
        Ok(cart)
    }

    /// Remove the entry for `id`. Removing an absent product is a no-op and
    /// does not write.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn remove(&self, id: &ProductId) -> Cart {
        let mut cart = self.load();
        if cart.remove(id) {
            self.save(&cart);
            tracing::debug!(items = cart.len(), "Removed item from cart");
        }
        cart
    }

    /// Remove the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such entry;
    /// nothing is written in that case.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn remove_at(&self, index: usize) -> Result<Cart, CartError> {
        let mut cart = self.load();
        match cart.remove_at(index) {
            Ok(removed) => {
                self.save(&cart);
                tracing::debug!(product_id = %removed.id, "Removed item from cart");
                Ok(cart)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected cart removal");
                Err(e)
            }
        }
    }

    /// Add an item like [`add`](Self::add), reporting a failed save.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cart`](crate::error::AppError::Cart) if the item is rejected, or
    /// [`AppError::StorageUnavailable`](crate::error::AppError::StorageUnavailable) if the merged cart could not be saved.
    /// The previously saved cart stays in place in both cases.
    #[instrument(skip(self, item), fields(key = %self.key, product_id = %item.id, quantity = item.quantity))]
    pub fn try_add(&self, item: LineItem) -> AppResult<Cart> {
        let mut cart = self.load();
        cart.add_or_merge(item)?;
        self.try_save(&cart)?;
        tracing::debug!(items = cart.len(), "Added item to cart");
        Ok(cart)
    }

    /// Remove the entry for `id` like [`remove`](Self::remove), reporting a
    /// failed save.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`](crate::error::AppError::StorageUnavailable) if the updated cart could not
    /// be saved.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn try_remove(&self, id: &ProductId) -> AppResult<Cart> {
        let mut cart = self.load();
        if cart.remove(id) {
            self.try_save(&cart)?;
        }
        Ok(cart)
    }

    /// Remove the entry at `index` like [`remove_at`](Self::remove_at),
    /// reporting a failed save.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cart`](crate::error::AppError::Cart) if there is no such entry, or
    /// [`AppError::StorageUnavailable`](crate::error::AppError::StorageUnavailable) if the updated cart could not be
    /// saved.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn try_remove_at(&self, index: usize) -> AppResult<Cart> {
        let mut cart = self.load();
        cart.remove_at(index)?;
        self.try_save(&cart)?;
        Ok(cart)
    }

    /// Empty the cart.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            tracing::warn!(error = %e, "Failed to clear cart");
        }
    }

    /// Sum of quantities in the persisted cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.load().item_count()
    }

    /// Total of the persisted cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.load().total()
    }
}

/// Decode a persisted blob.
///
/// Anything other than a JSON array is an empty cart. Array entries are
/// decoded one at a time: entries that do not decode or validate are
/// dropped, and repeated IDs are merged so the decoded cart keeps one entry
/// per product.
fn decode_cart(raw: &str) -> Cart {
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(Value::Null) => return Cart::new(),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Stored cart is not an array, using empty cart");
            return Cart::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored cart is malformed, using empty cart");
            return Cart::new();
        }
    };

    let mut cart = Cart::new();
    for (position, entry) in entries.into_iter().enumerate() {
        let item = match serde_json::from_value::<LineItem>(entry) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(position, error = %e, "Dropping undecodable cart entry");
                continue;
            }
        };
        if let Err(e) = cart.add_or_merge(item) {
            tracing::warn!(position, error = %e, "Dropping invalid cart entry");
        }
    }
    cart
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::MemoryStorage;

    fn screen(quantity: u32) -> LineItem {
        LineItem::new("A1", "Screen", Price::from(1500), quantity)
    }

    fn battery(quantity: u32) -> LineItem {
        LineItem::new("B2", "Battery", Price::from(800), quantity)
    }

    fn store_with_raw(raw: &str) -> CartStore<MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.set_item(DEFAULT_CART_KEY, raw).unwrap();
        CartStore::new(storage)
    }

    /// Storage that fails every operation.
    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    #[test]
    fn test_empty_storage_loads_empty_cart() {
        let store = CartStore::new(MemoryStorage::new());
        let cart = store.load();

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total().to_string(), "$0.00");
    }

    #[test]
    fn test_malformed_blob_loads_empty_cart() {
        assert!(store_with_raw("not json at all").load().is_empty());
        assert!(store_with_raw("{\"id\":\"A1\"}").load().is_empty());
        assert!(store_with_raw("null").load().is_empty());
        assert!(store_with_raw("").load().is_empty());
    }

    #[test]
    fn test_loads_browser_written_blob() {
        let store = store_with_raw(
            r#"[{"id":"A1","name":"Screen","price":1500,"quantity":3},{"id":"B2","name":"Battery","price":800.5,"quantity":1}]"#,
        );
        let cart = store.load();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total().to_string(), "$5300.50");
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let store = store_with_raw(
            r#"[{"id":"A1","name":"Screen","price":1500,"quantity":1},
                {"id":"","name":"Blank","price":5,"quantity":1},
                {"id":"Z9","name":"Free","price":0,"quantity":1},
                {"id":"Q1","name":"Negative","price":5,"quantity":-2},
                "garbage",
                {"id":"B2","price":800,"quantity":2}]"#,
        );
        let cart = store.load();

        let ids: Vec<&str> = cart.iter().map(|line| line.id.as_str()).collect();
        assert_eq!(ids, ["A1", "B2"]);
        assert_eq!(cart.get(&ProductId::new("B2")).unwrap().name, "Unknown Product");
    }

    #[test]
    fn test_duplicate_stored_ids_are_merged() {
        let store = store_with_raw(
            r#"[{"id":"A1","name":"Screen","price":1500,"quantity":1},
                {"id":"A1","name":"Other","price":1,"quantity":2}]"#,
        );
        let cart = store.load();

        assert_eq!(cart.len(), 1);
        let line = cart.get(&ProductId::new("A1")).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.name, "Screen");
    }

    #[test]
    fn test_add_merges_and_persists() {
        let store = CartStore::new(MemoryStorage::new());
        store.add(screen(2)).unwrap();
        let cart = store.add(screen(1)).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(store.load(), cart);
        assert_eq!(store.total().to_string(), "$4500.00");
    }

    #[test]
    fn test_rejected_add_does_not_write() {
        let store = CartStore::new(MemoryStorage::new());
        store.add(screen(1)).unwrap();
        let raw_before = store.storage().get_item(DEFAULT_CART_KEY).unwrap();

        let err = store
            .add(LineItem::new("C3", "Free", Price::ZERO, 1))
            .unwrap_err();

        assert!(matches!(err, CartError::InvalidItem(_)));
        assert_eq!(store.storage().get_item(DEFAULT_CART_KEY).unwrap(), raw_before);
    }

    #[test]
    fn test_remove_round_trips() {
        let store = CartStore::new(MemoryStorage::new());
        store.add(screen(3)).unwrap();
        store.add(battery(1)).unwrap();

        store.remove(&ProductId::new("A1"));
        let cart = store.load();
        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ProductId::new("A1")).is_none());
    }

    #[test]
    fn test_remove_absent_id_leaves_storage_untouched() {
        let store = store_with_raw("[ ]");
        let cart = store.remove(&ProductId::new("missing"));

        assert!(cart.is_empty());
        assert_eq!(
            store.storage().get_item(DEFAULT_CART_KEY).unwrap().as_deref(),
            Some("[ ]")
        );
    }

    #[test]
    fn test_remove_at_out_of_range_leaves_storage_untouched() {
        let store = CartStore::new(MemoryStorage::new());
        store.add(screen(1)).unwrap();
        let raw_before = store.storage().get_item(DEFAULT_CART_KEY).unwrap();

        assert_eq!(
            store.remove_at(5),
            Err(CartError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_eq!(store.storage().get_item(DEFAULT_CART_KEY).unwrap(), raw_before);

        assert!(store.remove_at(0).unwrap().is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let storage = MemoryStorage::with_quota(120);
        let store = CartStore::new(storage);

        store.add(screen(1)).unwrap();
        let saved = store.load();

        let long_name = "x".repeat(200);
        let returned = store
            .add(LineItem::new("C3", long_name, Price::from(5), 1))
            .unwrap();

        assert_eq!(returned.len(), 2);
        assert_eq!(store.load(), saved);
        assert!(matches!(
            store.try_save(&returned),
            Err(StorageError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn test_unavailable_storage_fails_soft() {
        let store = CartStore::new(BrokenStorage);

        assert!(store.load().is_empty());
        let cart = store.add(screen(1)).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(store.item_count(), 0);
        store.clear();
    }

    #[test]
    fn test_try_add_reports_dropped_write() {
        let store = CartStore::new(MemoryStorage::with_quota(120));
        store.add(screen(1)).unwrap();
        let saved = store.load();

        let err = store
            .try_add(LineItem::new("C3", "x".repeat(200), Price::from(5), 1))
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::StorageUnavailable(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.load(), saved);
        assert_eq!(store.try_add(screen(2)).unwrap().item_count(), 3);
    }

    #[test]
    fn test_try_add_rejects_invalid_item() {
        let store = CartStore::new(MemoryStorage::new());
        let err = store
            .try_add(LineItem::new("", "Ghost", Price::from(5), 1))
            .unwrap_err();

        assert!(matches!(err, AppError::Cart(CartError::InvalidItem(_))));
        assert_eq!(store.storage().get_item(DEFAULT_CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_try_remove_reports_unavailable_storage() {
        let store = CartStore::new(BrokenStorage);

        assert!(store.try_remove(&ProductId::new("A1")).unwrap().is_empty());
        assert!(matches!(
            store.try_remove_at(0),
            Err(AppError::Cart(CartError::IndexOutOfRange { index: 0, len: 0 }))
        ));
        assert!(matches!(
            store.try_add(screen(1)),
            Err(AppError::StorageUnavailable(StorageError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_try_remove_variants_persist() {
        let store = CartStore::new(MemoryStorage::new());
        store.add(screen(1)).unwrap();
        store.add(battery(1)).unwrap();

        assert_eq!(store.try_remove(&ProductId::new("A1")).unwrap().len(), 1);
        assert!(store.try_remove_at(0).unwrap().is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_clear() {
        let store = CartStore::new(MemoryStorage::new());
        store.add(screen(1)).unwrap();
        store.clear();

        assert!(store.load().is_empty());
        assert_eq!(store.storage().get_item(DEFAULT_CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_custom_key() {
        let storage = MemoryStorage::new();
        let store = CartStore::with_key(storage.clone(), "bmsCart");
        store.add(screen(1)).unwrap();

        assert_eq!(store.key(), "bmsCart");
        assert!(storage.get_item("bmsCart").unwrap().is_some());
        assert!(storage.get_item(DEFAULT_CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_tabs_last_write_wins() {
        let storage = MemoryStorage::new();
        let tab_a = CartStore::new(storage.clone());
        let tab_b = CartStore::new(storage);

        // Both tabs read the same starting state, then save independently.
        let mut cart_a = tab_a.load();
        let mut cart_b = tab_b.load();
        cart_a.add_or_merge(screen(1)).unwrap();
        cart_b.add_or_merge(battery(2)).unwrap();
        tab_a.save(&cart_a);
        tab_b.save(&cart_b);

        assert_eq!(tab_a.load(), cart_b);
        assert!(tab_a.load().get(&ProductId::new("A1")).is_none());
    }
}
