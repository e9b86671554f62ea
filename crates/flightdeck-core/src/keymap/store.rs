use crate::{Error, Result};
use flightdeck_types::Keymap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backing storage for the keymap document.
///
/// Change notifications are not part of this trait: the host observes the
/// store however it can and forwards changes to
/// [`Session::on_keymaps_changed`](crate::Session::on_keymaps_changed).
pub trait SettingsStore {
    /// Read the stored keymap. `Ok(None)` means nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load(&self) -> Result<Option<Keymap>>;

    /// Replace the stored keymap.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&self, keymap: &Keymap) -> Result<()>;
}

/// Keymap persisted as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a keymap document. Empty or `null` documents count as "nothing stored".
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid keymap document.
    pub fn parse(content: &str) -> Result<Option<Keymap>> {
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<Option<Keymap>>(content)?)
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<Keymap>> {
        if !self.path.exists() {
            debug!("No keymap file at {:?}", self.path);
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::StoreUnavailable(format!("reading {}: {e}", self.path.display()))
        })?;
        Self::parse(&content)
    }

    fn save(&self, keymap: &Keymap) -> Result<()> {
        let content = serde_json::to_string_pretty(keymap)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StoreUnavailable(format!("creating {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(&self.path, content).map_err(|e| {
            Error::StoreUnavailable(format!("writing {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightdeck_types::KeymapEntry;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path().join("keymaps.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path().join("nested").join("keymaps.json"));
        let keymap = Keymap::new().with_entry(
            "g",
            KeymapEntry::new("Google", "https://www.google.com/search?q={{q}}"),
        );

        store.save(&keymap).unwrap();
        assert_eq!(store.load().unwrap(), Some(keymap));
    }

    #[test]
    fn test_parse_null_and_blank() {
        assert!(JsonFileStore::parse("null").unwrap().is_none());
        assert!(JsonFileStore::parse("  \n").unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_json_is_error() {
        let err = JsonFileStore::parse("{ broken").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_unreadable_path_is_store_unavailable() {
        let temp = TempDir::new().unwrap();
        // A directory where the file should be cannot be read as a string
        let path = temp.path().join("keymaps.json");
        std::fs::create_dir_all(&path).unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
    }
}
