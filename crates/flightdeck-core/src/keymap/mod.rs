//! Keymap loading, seeding and caching.

mod store;
mod validation;

pub use store::{JsonFileStore, SettingsStore};
pub use validation::{IssueKind, KeymapIssue, MAX_KEY_LEN, validate, warn_invalid_entries};

use crate::Result;
use flightdeck_types::Keymap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_KEYMAPS_JSON: &str = include_str!("../../data/default-keymaps.json");

/// The keymap bundled with the launcher, used to seed an empty store.
///
/// # Errors
///
/// Returns an error if the bundled document does not parse.
pub fn default_keymap() -> Result<Keymap> {
    Ok(serde_json::from_str(DEFAULT_KEYMAPS_JSON)?)
}

/// Read-through cache over a [`SettingsStore`].
///
/// Snapshots are handed out as `Arc<Keymap>` and never mutated; a change
/// replaces the whole snapshot.
#[derive(Debug)]
pub struct KeymapCache<S> {
    store: S,
    snapshot: Option<Arc<Keymap>>,
    /// Survives `invalidate(None)` so read failures can fall back to it
    last_known: Option<Arc<Keymap>>,
    /// Defaults are being served but were never persisted
    seed_pending: bool,
}

impl<S: SettingsStore> KeymapCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            snapshot: None,
            last_known: None,
            seed_pending: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current snapshot without touching the store.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Keymap>> {
        self.snapshot.clone()
    }

    /// Return the cached keymap, loading (and seeding) it on first use.
    ///
    /// Never fails: a store that cannot be read yields the last known keymap,
    /// or an empty one.
    pub fn get(&mut self) -> Arc<Keymap> {
        if let Some(snapshot) = &self.snapshot {
            return Arc::clone(snapshot);
        }

        match self.store.load() {
            Ok(Some(keymap)) => {
                debug!("Loaded keymap with {} entries", keymap.len());
                warn_invalid_entries(&keymap, "settings store");
                self.replace(keymap)
            }
            Ok(None) => self.seed(),
            Err(e) => {
                warn!("Failed to read keymap, using last known: {e}");
                self.fallback()
            }
        }
    }

    /// True while the served defaults still need to be written to the store.
    #[must_use]
    pub fn seed_pending(&self) -> bool {
        self.seed_pending
    }

    /// Try again to persist defaults whose first save failed.
    ///
    /// Does nothing unless a seed is pending; a further failure keeps it pending.
    pub fn retry_seed(&mut self) {
        if !self.seed_pending {
            return;
        }
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        match self.store.save(snapshot) {
            Ok(()) => {
                info!("Seeded keymap store with {} defaults", snapshot.len());
                self.seed_pending = false;
            }
            Err(e) => debug!("Keymap seed still pending: {e}"),
        }
    }

    /// Replace the snapshot after an external change. `None` drops it so the
    /// next [`get`](Self::get) reads the store again.
    pub fn invalidate(&mut self, keymap: Option<Keymap>) {
        self.seed_pending = false;
        match keymap {
            Some(keymap) => {
                debug!("Keymap replaced ({} entries)", keymap.len());
                warn_invalid_entries(&keymap, "settings store");
                self.replace(keymap);
            }
            None => {
                debug!("Keymap removed from store, will reload on next use");
                self.snapshot = None;
            }
        }
    }

    fn replace(&mut self, keymap: Keymap) -> Arc<Keymap> {
        let snapshot = Arc::new(keymap);
        self.snapshot = Some(Arc::clone(&snapshot));
        self.last_known = Some(Arc::clone(&snapshot));
        snapshot
    }

    fn seed(&mut self) -> Arc<Keymap> {
        let defaults = match default_keymap() {
            Ok(defaults) => defaults,
            Err(e) => {
                warn!("Bundled keymap is unreadable: {e}");
                return self.fallback();
            }
        };

        match self.store.save(&defaults) {
            Ok(()) => {
                info!("Seeded keymap store with {} defaults", defaults.len());
                self.replace(defaults)
            }
            Err(e) => {
                // Served from memory until retry_seed() succeeds
                warn!("Failed to seed keymap store: {e}");
                self.seed_pending = true;
                self.replace(defaults)
            }
        }
    }

    fn fallback(&self) -> Arc<Keymap> {
        self.last_known
            .clone()
            .unwrap_or_else(|| Arc::new(Keymap::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keymap_parses_and_validates() {
        let keymap = default_keymap().unwrap();
        assert!(!keymap.is_empty());
        assert!(validate(&keymap).is_empty(), "{:?}", validate(&keymap));
    }

    #[test]
    fn test_default_keys_do_not_shadow_each_other() {
        // Every default must be reachable by typing its key
        let keymap = default_keymap().unwrap();
        for key in keymap.keys() {
            let shadowing = keymap
                .keys()
                .filter(|other| *other != key && key.starts_with(*other))
                .count();
            assert_eq!(shadowing, 0, "key {key:?} is shadowed by a shorter key");
        }
    }
}
