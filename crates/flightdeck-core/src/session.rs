//! The launcher session: one per host surface.
//!
//! A [`Session`] receives every key event before the host does anything else
//! with it, along with visibility changes, keymap change notifications and
//! timer expiries. It drives the gesture detector while closed and the
//! type-ahead matcher while open, asks the overlay controller to paint, and
//! commits picks through the host's navigator.
//!
//! Every public entry point absorbs its own errors: failures are logged and
//! leave the overlay as it was.

use crate::gesture::{GestureConfig, GestureDetector, GestureSignal, GestureState};
use crate::keymap::{KeymapCache, SettingsStore};
use crate::overlay::{
    DEFAULT_CARD_WIDTH, DEFAULT_SELECTION_PREVIEW_CHARS, OverlayController, OverlayOutcome,
    OverlayRenderer, Viewport, build_items,
};
use crate::template;
use crate::timer::TimerToken;
use crate::typeahead::{DEFAULT_IDLE_RESET, TypeAhead};
use crate::{Error, Result};
use flightdeck_types::{Key, KeyDisposition, KeyInput, Keymap, Visibility};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Opens resolved URLs in a new browsing context.
pub trait Navigator {
    /// # Errors
    ///
    /// Returns [`Error::NavigationFailed`] if the URL could not be opened.
    fn open(&mut self, url: &Url) -> Result<()>;
}

/// Provides the host's current text selection.
pub trait SelectionSource {
    fn selection(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Closed,
    Open,
}

/// Which session timer an expiry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Gesture,
    TypeAheadIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub gesture: GestureConfig,
    pub idle_reset: Duration,
    pub card_width: usize,
    pub selection_preview_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            idle_reset: DEFAULT_IDLE_RESET,
            card_width: DEFAULT_CARD_WIDTH,
            selection_preview_chars: DEFAULT_SELECTION_PREVIEW_CHARS,
        }
    }
}

pub struct Session<S, R, H> {
    keymaps: KeymapCache<S>,
    overlay: OverlayController<R>,
    host: H,
    gesture: GestureDetector,
    typeahead: TypeAhead,
    state: OverlayState,
    torn_down: bool,
}

impl<S, R, H> Session<S, R, H>
where
    S: SettingsStore,
    R: OverlayRenderer,
    H: Navigator + SelectionSource,
{
    pub fn new(store: S, renderer: R, host: H, config: SessionConfig) -> Self {
        Self {
            keymaps: KeymapCache::new(store),
            overlay: OverlayController::new(
                renderer,
                config.card_width,
                config.selection_preview_chars,
            ),
            host,
            gesture: GestureDetector::new(config.gesture),
            typeahead: TypeAhead::new(config.idle_reset),
            state: OverlayState::Closed,
            torn_down: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == OverlayState::Open
    }

    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        self.typeahead.buffer()
    }

    pub fn overlay(&self) -> &OverlayController<R> {
        &self.overlay
    }

    pub fn keymaps(&self) -> &KeymapCache<S> {
        &self.keymaps
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Earliest pending timer deadline, for hosts that sleep until the next expiry.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.gesture.deadline(), self.typeahead.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Current arming of a timer, for hosts that schedule their own callbacks.
    #[must_use]
    pub fn timer_token(&self, kind: TimerKind) -> Option<TimerToken> {
        match kind {
            TimerKind::Gesture => self.gesture.timer_token(),
            TimerKind::TypeAheadIdle => self.typeahead.timer_token(),
        }
    }

    /// Run every timer whose deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        self.gesture.poll(now);
        if self.typeahead.poll(now) {
            self.rerender();
        }
    }

    /// Deliver a timer callback. Expiries for superseded armings are ignored.
    pub fn on_timer(&mut self, kind: TimerKind, token: TimerToken) {
        if self.torn_down {
            return;
        }
        match kind {
            TimerKind::Gesture => self.gesture.on_timer(token),
            TimerKind::TypeAheadIdle => {
                if self.typeahead.on_timer(token) {
                    self.rerender();
                }
            }
        }
    }

    /// Top-level key-down entry point.
    pub fn handle_key(&mut self, input: KeyInput, now: Instant) -> KeyDisposition {
        if self.torn_down {
            return KeyDisposition::Ignored;
        }
        // Expiries that are due happened before this key
        self.tick(now);

        match self.state {
            OverlayState::Closed => self.handle_closed_key(input, now),
            OverlayState::Open => self.handle_open_key(input, now),
        }
    }

    fn handle_closed_key(&mut self, input: KeyInput, now: Instant) -> KeyDisposition {
        if input.key != Key::Shift || input.repeat {
            return KeyDisposition::Ignored;
        }

        if self.gesture.on_shift_down(now, false) == GestureSignal::DoubleTap {
            self.open(now);
        }
        KeyDisposition::Consumed
    }

    fn handle_open_key(&mut self, input: KeyInput, now: Instant) -> KeyDisposition {
        match input.key {
            Key::Escape => {
                self.close();
                KeyDisposition::Consumed
            }
            Key::Shift => KeyDisposition::Ignored,
            _ if input.modifiers.has_command() => KeyDisposition::Ignored,
            Key::Char(c) => {
                let keymap = self.keymaps.get();
                let result = self.typeahead.on_printable_key(c, &keymap, now);
                self.render_keys(&keymap, &result.candidates);
                if let Some(key) = result.commit {
                    self.commit_boundary(&key);
                }
                KeyDisposition::Consumed
            }
            Key::Enter => {
                let keymap = self.keymaps.get();
                if let Some(first) = self.typeahead.candidates(&keymap).into_iter().next() {
                    self.commit_boundary(&first);
                }
                KeyDisposition::Consumed
            }
            _ => {
                let outcome = self.overlay.handle_key(&input);
                self.apply_outcome(outcome)
            }
        }
    }

    /// Pointer entered card `index`.
    pub fn on_pointer_hover(&mut self, index: usize) {
        if self.is_open() {
            self.overlay.hover(index);
        }
    }

    /// Pointer clicked card `index`.
    pub fn on_pointer_click(&mut self, index: usize) {
        if self.is_open() {
            let outcome = self.overlay.click(index);
            self.apply_outcome(outcome);
        }
    }

    /// Backdrop click or close button.
    pub fn on_dismiss(&mut self) {
        if self.is_open() {
            let outcome = self.overlay.dismiss();
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: OverlayOutcome) -> KeyDisposition {
        match outcome {
            OverlayOutcome::Unhandled => KeyDisposition::Ignored,
            OverlayOutcome::Moved => KeyDisposition::Consumed,
            OverlayOutcome::Pick(key) => {
                self.commit_boundary(&key);
                KeyDisposition::Consumed
            }
            OverlayOutcome::Dismiss => {
                self.close();
                KeyDisposition::Consumed
            }
        }
    }

    /// Host visibility changed. Hiding disarms the gesture but leaves the overlay alone.
    pub fn on_visibility(&mut self, visibility: Visibility) {
        if visibility == Visibility::Hidden {
            debug!("Host hidden, resetting gesture detector");
            self.gesture.reset();
        }
    }

    /// The settings store reported a new keymap (or its removal).
    pub fn on_keymaps_changed(&mut self, keymap: Option<Keymap>) {
        if self.torn_down {
            return;
        }
        self.keymaps.invalidate(keymap);
        self.rerender();
    }

    /// Update the overlay's available space.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.overlay.set_viewport(viewport);
    }

    /// Open the overlay directly, bypassing the gesture.
    pub fn open(&mut self, now: Instant) {
        if self.torn_down || self.is_open() {
            return;
        }
        info!("Opening launcher overlay");
        self.keymaps.retry_seed();
        self.state = OverlayState::Open;
        self.typeahead.start(now);
        self.rerender();
    }

    /// Close the overlay and return to a clean closed state.
    pub fn close(&mut self) {
        if self.is_open() {
            info!("Closing launcher overlay");
        }
        self.overlay.hide();
        self.typeahead.reset();
        self.gesture.reset();
        self.state = OverlayState::Closed;
    }

    /// Detach from the host. Later events are ignored.
    pub fn teardown(&mut self) {
        self.close();
        self.torn_down = true;
    }

    /// Commit `key` on behalf of an event handler, absorbing failures.
    fn commit_boundary(&mut self, key: &str) {
        match self.commit(key) {
            Ok(()) => {}
            Err(e @ Error::InvalidTemplate(_)) => warn!("Not launching {key:?}: {e}"),
            Err(e) => warn!("Launch of {key:?} failed, overlay stays open: {e}"),
        }
    }

    /// Resolve the template for `key` against the current selection and navigate.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is invalid or navigation fails; the
    /// overlay is left open in both cases.
    pub fn commit(&mut self, key: &str) -> Result<()> {
        let keymap = self.keymaps.get();
        let Some(entry) = keymap.get(key) else {
            debug!("Picked key {key:?} is not in the keymap");
            return Ok(());
        };

        let url = template::resolve(&entry.template, &self.selection_text())?;
        self.host.open(&url)?;
        info!("Launched {key:?}: {url}");
        self.close();
        Ok(())
    }

    fn rerender(&mut self) {
        if !self.is_open() {
            return;
        }
        let keymap = self.keymaps.get();
        let keys = self.typeahead.candidates(&keymap);
        self.render_keys(&keymap, &keys);
    }

    fn render_keys(&mut self, keymap: &Keymap, keys: &[String]) {
        // Selection is read on every render, it may have changed since open
        let selection = self.selection_text();
        self.overlay.show(&selection, build_items(keymap, keys), 0);
    }

    fn selection_text(&self) -> String {
        self.host.selection().trim().to_string()
    }
}
