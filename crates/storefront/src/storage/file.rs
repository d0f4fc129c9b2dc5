//! Directory-backed storage.
//!
//! Each key is a file named after the key inside the storage directory.
//! Every write goes to its own temporary file that is renamed over the
//! target, so a reader never sees a half-written cart and concurrent writers
//! never share a temporary file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

use super::{KeyValueStore, StorageError, entry_size};

/// Maximum key length accepted as a file name.
const MAX_KEY_LENGTH: usize = 128;

/// Suffix of in-flight temporary files.
const TEMP_SUFFIX: &str = ".tmp";

/// A key-value store persisted as files in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Create a store rooted at `dir`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    /// Create a store that rejects writes beyond `quota` bytes in total.
    #[must_use]
    pub fn with_quota(dir: impl Into<PathBuf>, quota: usize) -> Self {
        Self {
            dir: dir.into(),
            quota: Some(quota),
        }
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    /// Bytes held by every key except `skip`.
    fn used_bytes_excluding(&self, skip: &str) -> Result<usize, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut total = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name == skip || name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            let len = usize::try_from(entry.metadata()?.len()).unwrap_or(usize::MAX);
            total += name.len().saturating_add(len);
        }
        Ok(total)
    }
}

/// Check that `key` can be used as a file name.
///
/// Keys become file names, so only ASCII alphanumerics, `-`, `_` and `.` are
/// allowed, up to 128 characters, with no leading `.` and no `.tmp` suffix.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] for any other key.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && !key.starts_with('.')
        && !key.ends_with(TEMP_SUFFIX)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        if let Some(quota) = self.quota {
            let required = self
                .used_bytes_excluding(key)?
                .saturating_add(entry_size(key, value));
            if required > quota {
                return Err(StorageError::QuotaExceeded { required, quota });
            }
        }

        fs::create_dir_all(&self.dir)?;
        // Removed on drop if anything below fails.
        let mut temp = Builder::new()
            .prefix(".")
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dir_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("not-created-yet"));
        assert_eq!(storage.get_item("shoppingCart").unwrap(), None);
    }

    #[test]
    fn test_set_creates_dir_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("storage");
        let storage = FileStorage::new(&dir);

        storage.set_item("shoppingCart", "[]").unwrap();
        assert_eq!(fs::read_to_string(dir.join("shoppingCart")).unwrap(), "[]");

        let reopened = FileStorage::new(&dir);
        assert_eq!(
            reopened.get_item("shoppingCart").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        storage.set_item("cart", "value").unwrap();

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["cart"]);
    }

    #[test]
    fn test_remove_item() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());

        storage.set_item("cart", "value").unwrap();
        storage.remove_item("cart").unwrap();
        assert_eq!(storage.get_item("cart").unwrap(), None);
        assert!(storage.remove_item("cart").is_ok());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());

        for key in ["", "../escape", "a/b", ".hidden", "cart.tmp", "spaced key"] {
            assert!(
                matches!(storage.set_item(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_quota_keeps_previous_value() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::with_quota(tmp.path(), 16);

        storage.set_item("cart", "[1,2]").unwrap();
        let err = storage.set_item("cart", "[1,2,3,4,5,6,7,8]").unwrap_err();

        assert!(matches!(err, StorageError::QuotaExceeded { quota: 16, .. }));
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_quota_counts_other_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::with_quota(tmp.path(), 20);

        storage.set_item("other", "0123456789").unwrap();
        assert!(storage.set_item("cart", "0123456789").is_err());
        assert!(storage.set_item("cart", "0").is_ok());
    }

    #[test]
    fn test_concurrent_writers_never_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let values: Vec<String> = (0..4).map(|n| format!("[{n},{n},{n}]")).collect();

        std::thread::scope(|scope| {
            for value in &values {
                let storage = FileStorage::new(tmp.path());
                scope.spawn(move || {
                    for _ in 0..100 {
                        storage.set_item("cart", value).unwrap();
                    }
                });
            }
        });

        let stored = FileStorage::new(tmp.path()).get_item("cart").unwrap().unwrap();
        assert!(values.contains(&stored));

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["cart"]);
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("shoppingCart").is_ok());
        assert!(validate_key("bms-cart_v2.json").is_ok());
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH)).is_ok());
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }
}
