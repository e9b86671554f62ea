//! Keymap validation - reports entries the launcher cannot use cleanly.

use crate::template;
use flightdeck_types::Keymap;
use std::fmt;
use tracing::warn;

/// Longest key identifier the keymap editor accepts.
pub const MAX_KEY_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    EmptyKey,
    KeyTooLong,
    InvalidTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapIssue {
    pub key: String,
    pub kind: IssueKind,
}

impl fmt::Display for KeymapIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::EmptyKey => write!(f, "entry with an empty key"),
            IssueKind::KeyTooLong => write!(
                f,
                "key {:?} is longer than {MAX_KEY_LEN} characters",
                self.key
            ),
            IssueKind::InvalidTemplate => {
                write!(f, "key {:?} has an invalid URL template", self.key)
            }
        }
    }
}

/// Collect every problem in `keymap`, in key order.
#[must_use]
pub fn validate(keymap: &Keymap) -> Vec<KeymapIssue> {
    let mut issues = Vec::new();

    for (key, entry) in keymap.iter() {
        let issue = |kind| KeymapIssue {
            key: key.to_string(),
            kind,
        };

        if key.trim().is_empty() {
            issues.push(issue(IssueKind::EmptyKey));
        } else if key.chars().count() > MAX_KEY_LEN {
            issues.push(issue(IssueKind::KeyTooLong));
        }

        if template::validate(&entry.template).is_err() {
            issues.push(issue(IssueKind::InvalidTemplate));
        }
    }

    issues
}

/// Log a warning for every problem in `keymap`.
pub fn warn_invalid_entries(keymap: &Keymap, source: &str) {
    for issue in validate(keymap) {
        warn!("Keymap problem in {source}: {issue}");
    }
}
