//! Type-ahead prefix matching over keymap keys.

use crate::timer::{Timer, TimerToken};
use flightdeck_types::Keymap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_IDLE_RESET: Duration = Duration::from_millis(600);

/// Candidates after a keystroke, plus the key to commit if the match is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub candidates: Vec<String>,
    pub commit: Option<String>,
}

/// Keys matching `prefix`, sorted.
///
/// An empty prefix yields every key. A prefix that matches nothing also yields
/// every key, so the overlay never goes blank.
#[must_use]
pub fn filter_keys(keymap: &Keymap, prefix: &str) -> Vec<String> {
    let all = || keymap.keys().map(str::to_string).collect::<Vec<_>>();
    if prefix.is_empty() {
        return all();
    }

    let needle = prefix.to_lowercase();
    let starts: Vec<String> = keymap
        .keys()
        .filter(|k| k.to_lowercase().starts_with(&needle))
        .map(str::to_string)
        .collect();

    if starts.is_empty() { all() } else { starts }
}

/// Key to commit for `buffer` given its candidates.
///
/// A single case-insensitive exact match wins over a single remaining candidate.
#[must_use]
pub fn auto_commit(candidates: &[String], buffer: &str) -> Option<String> {
    let needle = buffer.to_lowercase();
    let mut exact = candidates.iter().filter(|k| k.to_lowercase() == needle);
    if let (Some(only), None) = (exact.next(), exact.next()) {
        return Some(only.clone());
    }

    match candidates {
        [only] => Some(only.clone()),
        _ => None,
    }
}

#[derive(Debug)]
pub struct TypeAhead {
    buffer: String,
    idle_reset: Duration,
    timer: Timer,
}

impl TypeAhead {
    #[must_use]
    pub fn new(idle_reset: Duration) -> Self {
        Self {
            buffer: String::new(),
            idle_reset,
            timer: Timer::new(),
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    /// Clear the buffer and start the idle timer for a freshly opened overlay.
    pub fn start(&mut self, now: Instant) {
        self.buffer.clear();
        self.timer.arm(now, self.idle_reset);
    }

    pub fn on_printable_key(&mut self, c: char, keymap: &Keymap, now: Instant) -> MatchResult {
        self.buffer.push(c);
        self.timer.arm(now, self.idle_reset);

        let candidates = self.candidates(keymap);
        let commit = auto_commit(&candidates, &self.buffer);
        debug!(
            "Type-ahead buffer={:?} candidates={} commit={:?}",
            self.buffer,
            candidates.len(),
            commit
        );
        MatchResult { candidates, commit }
    }

    /// Candidates for the current buffer against `keymap`.
    #[must_use]
    pub fn candidates(&self, keymap: &Keymap) -> Vec<String> {
        filter_keys(keymap, &self.buffer)
    }

    /// Clear the buffer if it has been idle past its deadline. Returns true if cleared.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.timer.poll_expired(now) {
            self.clear_idle();
            true
        } else {
            false
        }
    }

    /// Clear the buffer for an idle-timer callback. Stale tokens are ignored.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        if self.timer.fire(token) {
            self.clear_idle();
            true
        } else {
            false
        }
    }

    fn clear_idle(&mut self) {
        if !self.buffer.is_empty() {
            debug!("Type-ahead buffer idle, clearing {:?}", self.buffer);
        }
        self.buffer.clear();
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.timer.cancel();
    }
}

impl Default for TypeAhead {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightdeck_types::KeymapEntry;

    fn keymap(keys: &[&str]) -> Keymap {
        keys.iter()
            .map(|k| {
                (
                    (*k).to_string(),
                    KeymapEntry::new(*k, format!("https://{k}.example.com/?q={{{{q}}}}")),
                )
            })
            .collect()
    }

    #[test]
    fn test_filter_empty_prefix_returns_all_sorted() {
        let km = keymap(&["yt", "g", "a"]);
        assert_eq!(filter_keys(&km, ""), vec!["a", "g", "yt"]);
    }

    #[test]
    fn test_filter_prefix() {
        let km = keymap(&["g", "gh", "w"]);
        assert_eq!(filter_keys(&km, "g"), vec!["g", "gh"]);
    }

    #[test]
    fn test_filter_case_insensitive() {
        let km = keymap(&["GH", "gl", "w"]);
        assert_eq!(filter_keys(&km, "g"), vec!["GH", "gl"]);
        assert_eq!(filter_keys(&km, "Gh"), vec!["GH"]);
    }

    #[test]
    fn test_filter_no_match_falls_back_to_all() {
        let km = keymap(&["g", "gh", "w"]);
        assert_eq!(filter_keys(&km, "z"), vec!["g", "gh", "w"]);
    }

    #[test]
    fn test_filter_empty_keymap() {
        assert!(filter_keys(&Keymap::new(), "g").is_empty());
    }

    #[test]
    fn test_auto_commit_exact_match_wins() {
        let candidates = vec!["a".to_string(), "ab".to_string()];
        assert_eq!(auto_commit(&candidates, "a"), Some("a".to_string()));
    }

    #[test]
    fn test_auto_commit_single_candidate() {
        let candidates = vec!["gh".to_string()];
        assert_eq!(auto_commit(&candidates, "g"), Some("gh".to_string()));
    }

    #[test]
    fn test_auto_commit_ambiguous() {
        let candidates = vec!["ga".to_string(), "gb".to_string()];
        assert_eq!(auto_commit(&candidates, "g"), None);
    }

    #[test]
    fn test_auto_commit_duplicate_exact_matches() {
        let candidates = vec!["G".to_string(), "g".to_string()];
        assert_eq!(auto_commit(&candidates, "g"), None);
    }

    #[test]
    fn test_typing_narrows_then_commits() {
        let km = keymap(&["g", "gh", "w"]);
        let now = Instant::now();
        let mut ta = TypeAhead::default();
        ta.start(now);

        let first = ta.on_printable_key('g', &km, now);
        assert_eq!(first.candidates, vec!["g", "gh"]);
        assert_eq!(first.commit, Some("g".to_string()));

        ta.reset();
        let km = keymap(&["ga", "gh", "w"]);
        let first = ta.on_printable_key('g', &km, now);
        assert_eq!(first.commit, None);
        let second = ta.on_printable_key('h', &km, now);
        assert_eq!(second.candidates, vec!["gh"]);
        assert_eq!(second.commit, Some("gh".to_string()));
    }

    #[test]
    fn test_buffer_preserves_case() {
        let km = keymap(&["gh"]);
        let mut ta = TypeAhead::default();
        ta.on_printable_key('G', &km, Instant::now());
        assert_eq!(ta.buffer(), "G");
    }

    #[test]
    fn test_idle_timeout_clears_buffer() {
        let km = keymap(&["ga", "gb"]);
        let now = Instant::now();
        let mut ta = TypeAhead::default();
        ta.on_printable_key('g', &km, now);

        assert!(!ta.poll(now + Duration::from_millis(599)));
        assert_eq!(ta.buffer(), "g");
        assert!(ta.poll(now + Duration::from_millis(600)));
        assert_eq!(ta.buffer(), "");
    }

    #[test]
    fn test_keystroke_restarts_idle_timer() {
        let km = keymap(&["gaa", "gab"]);
        let now = Instant::now();
        let mut ta = TypeAhead::default();
        ta.on_printable_key('g', &km, now);
        let stale = ta.timer_token().unwrap();
        ta.on_printable_key('a', &km, now + Duration::from_millis(500));

        assert!(!ta.on_timer(stale));
        assert_eq!(ta.buffer(), "ga");
        assert_eq!(ta.deadline(), Some(now + Duration::from_millis(1100)));
    }

    #[test]
    fn test_reset_cancels_timer() {
        let km = keymap(&["ga", "gb"]);
        let mut ta = TypeAhead::default();
        ta.on_printable_key('g', &km, Instant::now());
        ta.reset();
        assert_eq!(ta.buffer(), "");
        assert!(ta.deadline().is_none());
    }
}
