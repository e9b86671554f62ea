//! Test fixtures and helpers

use crate::overlay::OverlayRenderer;
use crate::{Error, Navigator, Result, SelectionSource, Session, SessionConfig, SettingsStore};
use flightdeck_types::{Key, KeyInput, Keymap, KeymapEntry, OverlayView};
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};
use url::Url;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Keymap where every key searches `https://<key>.example.com/?q={{q}}`
pub fn make_keymap(keys: &[&str]) -> Keymap {
    keys.iter()
        .map(|k| {
            (
                (*k).to_string(),
                KeymapEntry::new(
                    format!("Label {k}"),
                    format!("https://{k}.example.com/?q={{{{q}}}}"),
                ),
            )
        })
        .collect()
}

/// In-memory settings store with failure switches
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub keymap: RefCell<Option<Keymap>>,
    pub fail_load: Cell<bool>,
    pub fail_save: Cell<bool>,
    pub loads: Cell<usize>,
    pub saves: Cell<usize>,
}

impl MemoryStore {
    pub fn with_keymap(keymap: Keymap) -> Self {
        Self {
            keymap: RefCell::new(Some(keymap)),
            ..Default::default()
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Keymap>> {
        self.loads.set(self.loads.get() + 1);
        if self.fail_load.get() {
            return Err(Error::StoreUnavailable("load disabled".to_string()));
        }
        Ok(self.keymap.borrow().clone())
    }

    fn save(&self, keymap: &Keymap) -> Result<()> {
        self.saves.set(self.saves.get() + 1);
        if self.fail_save.get() {
            return Err(Error::StoreUnavailable("quota exceeded".to_string()));
        }
        *self.keymap.borrow_mut() = Some(keymap.clone());
        Ok(())
    }
}

/// Renderer that remembers every view it was asked to paint
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub views: Vec<OverlayView>,
    pub hides: usize,
}

impl RecordingRenderer {
    pub fn last(&self) -> &OverlayView {
        self.views.last().expect("nothing rendered")
    }

    pub fn last_keys(&self) -> Vec<String> {
        self.last().items.iter().map(|i| i.key.clone()).collect()
    }
}

impl OverlayRenderer for RecordingRenderer {
    fn render(&mut self, view: &OverlayView) {
        self.views.push(view.clone());
    }

    fn hide(&mut self) {
        self.hides += 1;
    }
}

/// Host with a settable selection and a navigator that records URLs
#[derive(Debug, Default)]
pub struct FakeHost {
    pub selection: String,
    pub opened: Vec<Url>,
    pub fail_navigation: bool,
}

impl SelectionSource for FakeHost {
    fn selection(&self) -> String {
        self.selection.clone()
    }
}

impl Navigator for FakeHost {
    fn open(&mut self, url: &Url) -> Result<()> {
        if self.fail_navigation {
            return Err(Error::NavigationFailed("tab creation refused".to_string()));
        }
        self.opened.push(url.clone());
        Ok(())
    }
}

pub type TestSession = Session<MemoryStore, RecordingRenderer, FakeHost>;

pub fn make_session(keys: &[&str]) -> TestSession {
    Session::new(
        MemoryStore::with_keymap(make_keymap(keys)),
        RecordingRenderer::default(),
        FakeHost::default(),
        SessionConfig::default(),
    )
}

pub fn shift() -> KeyInput {
    KeyInput::new(Key::Shift)
}

/// Double-tap Shift starting at `t0`; returns the time of the second tap.
pub fn double_tap(session: &mut TestSession, t0: Instant) -> Instant {
    session.handle_key(shift(), t0);
    let second = t0 + ms(120);
    session.handle_key(shift(), second);
    second
}

/// Type each character of `text` 50ms apart starting at `t0`.
pub fn type_text(session: &mut TestSession, text: &str, t0: Instant) -> Instant {
    let mut now = t0;
    for c in text.chars() {
        now += ms(50);
        session.handle_key(KeyInput::char(c), now);
    }
    now
}
