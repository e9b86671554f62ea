//! Shared types for Flightdeck launcher components.
//!
//! This crate provides the data model used by flightdeck-core and the
//! host adapters: the keymap document, the key events a host feeds into a
//! session, and the view model the overlay renderer paints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted with the encoded query when a template is resolved.
pub const QUERY_PLACEHOLDER: &str = "{{q}}";

/// A single launch target in the keymap.
///
/// The short identifier is the map key in [`Keymap`], so it is not repeated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapEntry {
    /// Human readable name shown on the overlay card
    #[serde(default)]
    pub label: String,

    /// URL pattern containing [`QUERY_PLACEHOLDER`]
    #[serde(default)]
    pub template: String,

    /// Whether the target is meant to receive the selection as a query.
    /// Persisted as `search`.
    #[serde(default, rename = "search", alias = "searchable")]
    pub searchable: bool,
}

impl KeymapEntry {
    pub fn new(label: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            template: template.into(),
            searchable: true,
        }
    }

    #[must_use]
    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }
}

/// Mapping from short key identifiers to launch targets.
///
/// Keys iterate in lexicographic order. The core only ever replaces a keymap
/// wholesale; `insert` exists for building documents (seeding, tests).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keymap(BTreeMap<String, KeymapEntry>);

impl Keymap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: KeymapEntry) -> Option<KeymapEntry> {
        self.0.insert(key.into(), entry)
    }

    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, entry: KeymapEntry) -> Self {
        self.insert(key, entry);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KeymapEntry> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeymapEntry)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, KeymapEntry)> for Keymap {
    fn from_iter<I: IntoIterator<Item = (String, KeymapEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Logical key reported by a host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Shift,
    Escape,
    Enter,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A key producing exactly one printable character
    Char(char),
    /// Anything else (function keys, Tab, Backspace, ...)
    Other,
}

/// Modifier state accompanying a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // one flag per physical modifier
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// True when a command modifier (Ctrl, Alt or Meta) is held.
    #[must_use]
    pub fn has_command(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A key-down event as delivered to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Auto-repeat from a held key
    pub repeat: bool,
}

impl KeyInput {
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    #[must_use]
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// Whether the host surface is currently visible to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Whether the host should stop further handling of a key event
/// (the equivalent of preventing the default action).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    Ignored,
}

impl KeyDisposition {
    #[must_use]
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// One card in the overlay grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayItem {
    pub key: String,
    pub label: String,
    pub template: String,
    /// Host of the template, empty when the template is invalid
    pub domain: String,
    pub searchable: bool,
}

/// Everything a renderer needs to paint the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayView {
    /// Full selection captured for this render
    pub selected_text: String,
    /// Selection shortened for the header chip, `None` when nothing is selected
    pub selection_chip: Option<String>,
    pub items: Vec<OverlayItem>,
    pub active_index: usize,
    pub columns: usize,
    /// First grid row inside the visible scroll region
    pub scroll_row: usize,
}

impl OverlayView {
    #[must_use]
    pub fn active_item(&self) -> Option<&OverlayItem> {
        self.items.get(self.active_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_reads_persisted_search_flag() {
        let json = r#"{
            "g": {"label": "Google", "template": "https://www.google.com/search?q={{q}}", "search": true},
            "w": {"label": "Wiki", "template": "https://en.wikipedia.org/wiki/{{q}}", "searchable": false}
        }"#;
        let keymap: Keymap = serde_json::from_str(json).unwrap();

        assert_eq!(keymap.len(), 2);
        assert!(keymap.get("g").unwrap().searchable);
        assert!(!keymap.get("w").unwrap().searchable);
    }

    #[test]
    fn test_keymap_writes_search_field_name() {
        let keymap = Keymap::new().with_entry("g", KeymapEntry::new("Google", "https://g.co/{{q}}"));
        let value = serde_json::to_value(&keymap).unwrap();
        assert_eq!(value["g"]["search"], serde_json::Value::Bool(true));
        assert!(value["g"].get("searchable").is_none());
    }

    #[test]
    fn test_keymap_missing_fields_default() {
        let keymap: Keymap = serde_json::from_str(r#"{"x": {}}"#).unwrap();
        let entry = keymap.get("x").unwrap();
        assert_eq!(entry.label, "");
        assert_eq!(entry.template, "");
        assert!(!entry.searchable);
    }

    #[test]
    fn test_keymap_keys_sorted() {
        let keymap = Keymap::new()
            .with_entry("yt", KeymapEntry::new("YouTube", "https://youtube.com"))
            .with_entry("a", KeymapEntry::new("Amazon", "https://amazon.com"))
            .with_entry("gh", KeymapEntry::new("GitHub", "https://github.com"));
        let keys: Vec<&str> = keymap.keys().collect();
        assert_eq!(keys, vec!["a", "gh", "yt"]);
    }

    #[test]
    fn test_modifiers_has_command() {
        assert!(!Modifiers::default().has_command());
        let shift_only = Modifiers {
            shift: true,
            ..Default::default()
        };
        assert!(!shift_only.has_command());
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert!(ctrl.has_command());
    }

    #[test]
    fn test_active_item_out_of_range() {
        let view = OverlayView {
            active_index: 3,
            ..Default::default()
        };
        assert!(view.active_item().is_none());
    }
}
