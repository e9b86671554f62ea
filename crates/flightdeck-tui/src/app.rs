//! Application state and terminal event dispatch.

use crate::host::TuiHost;
use crate::input::to_key_input;
use crate::render::{self, OverlayLayout, Screen, TuiRenderer};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use flightdeck_core::{JsonFileStore, Session, Visibility};
use ratatui::{Frame, layout::Rect};
use std::time::Instant;

pub type LauncherSession = Session<JsonFileStore, TuiRenderer, TuiHost>;

pub struct App {
    pub session: LauncherSession,
    pub layout: OverlayLayout,
    pub should_quit: bool,
    /// Terminal reports bare modifier presses (kitty keyboard protocol)
    bare_shift: bool,
}

impl App {
    pub fn new(session: LauncherSession, bare_shift: bool) -> Self {
        Self {
            session,
            layout: OverlayLayout::default(),
            should_quit: false,
            bare_shift,
        }
    }

    pub fn status(&self) -> String {
        if let Some(url) = &self.session.host().last_opened {
            return format!("Opened {url}");
        }
        if self.bare_shift {
            "Double-tap Shift to launch | Shift+arrows select | Ctrl+C quit".to_string()
        } else {
            "F2 to launch (terminal does not report bare Shift) | Ctrl+C quit".to_string()
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.session
            .set_viewport(render::viewport_for(Rect::new(0, 0, width, height)));
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let status = self.status();
        let screen = Screen {
            page: &self.session.host().page,
            buffer: self.session.buffer(),
            status: &status,
            overlay: self.session.overlay().renderer().view(),
        };
        render::draw(f, &screen, &mut self.layout);
    }

    /// Dispatch one terminal event. Returns true if a redraw is needed.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusLost => {
                self.session.on_visibility(Visibility::Hidden);
                false
            }
            Event::FocusGained => {
                self.session.on_visibility(Visibility::Visible);
                false
            }
            Event::Resize(width, height) => {
                self.resize(*width, *height);
                true
            }
            Event::Paste(text) => {
                if !self.session.is_open() {
                    let page = &mut self.session.host_mut().page;
                    text.chars().for_each(|c| page.insert_char(c));
                }
                true
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> bool {
        // The session sees every key first
        if let Some(input) = to_key_input(key)
            && self.session.handle_key(input, now).is_consumed()
        {
            return true;
        }
        if key.kind == KeyEventKind::Release || self.session.is_open() {
            return self.session.is_open();
        }

        tracing::debug!(
            "Page key: code={:?}, modifiers={:?}",
            key.code,
            key.modifiers
        );
        self.handle_page_key(key, now);
        true
    }

    fn handle_page_key(&mut self, key: &KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let page = &mut self.session.host_mut().page;

        match key.code {
            KeyCode::Char('c' | 'q') if ctrl => self.should_quit = true,
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('a') if ctrl => page.select_all(),
            KeyCode::Char(' ') if ctrl => self.session.open(now),
            KeyCode::F(2) => self.session.open(now),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                page.insert_char(c);
            }
            KeyCode::Backspace => page.backspace(),
            KeyCode::Delete => page.delete(),
            KeyCode::Left => page.move_left(shift),
            KeyCode::Right => page.move_right(shift),
            KeyCode::Home => page.home(shift),
            KeyCode::End => page.end(shift),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        if !self.session.is_open() {
            return false;
        }
        let card = self.layout.card_at(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Moved => {
                if let Some(index) = card {
                    self.session.on_pointer_hover(index);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => match card {
                Some(index) => self.session.on_pointer_click(index),
                None if !self.layout.contains(mouse.column, mouse.row) => {
                    self.session.on_dismiss();
                }
                None => {}
            },
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crossterm::event::{KeyEventState, ModifierKeyCode};
    use flightdeck_core::{Keymap, KeymapEntry, SessionConfig, SettingsStore};
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;
    use tempfile::TempDir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn shift() -> Event {
        key(
            KeyCode::Modifier(ModifierKeyCode::LeftShift),
            KeyModifiers::SHIFT,
        )
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn make_app(temp: &TempDir, text: &str) -> App {
        let store = JsonFileStore::new(temp.path().join("keymaps.json"));
        store
            .save(
                &Keymap::new()
                    .with_entry("w", KeymapEntry::new("Wiki", "https://w.example.com/{{q}}"))
                    .with_entry("ga", KeymapEntry::new("A", "https://a.example.com/{{q}}"))
                    .with_entry("gb", KeymapEntry::new("B", "https://b.example.com/{{q}}")),
            )
            .unwrap();
        let host = TuiHost::new(Page::new(text), Some("true".to_string()));
        let session = Session::new(store, TuiRenderer::default(), host, SessionConfig::default());
        let mut app = App::new(session, true);
        app.resize(100, 40);
        app
    }

    fn double_tap(app: &mut App, t0: Instant) -> Instant {
        app.handle_event(&shift(), t0);
        let second = t0 + Duration::from_millis(100);
        app.handle_event(&shift(), second);
        second
    }

    fn draw(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }

    #[test]
    fn test_typing_edits_page_while_closed() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "");
        let now = Instant::now();
        app.handle_event(&key(KeyCode::Char('h'), KeyModifiers::NONE), now);
        app.handle_event(&key(KeyCode::Char('i'), KeyModifiers::NONE), now);
        app.handle_event(&key(KeyCode::Backspace, KeyModifiers::NONE), now);

        assert_eq!(app.session.host().page.text(), "h");
        assert!(!app.session.is_open());
    }

    #[test]
    fn test_double_shift_opens_and_keys_go_to_overlay() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "rust");
        let opened = double_tap(&mut app, Instant::now());
        assert!(app.session.is_open());

        app.handle_event(
            &key(KeyCode::Char('g'), KeyModifiers::NONE),
            opened + Duration::from_millis(50),
        );
        assert_eq!(app.session.host().page.text(), "rust");
        assert_eq!(app.session.buffer(), "g");

        app.handle_event(
            &key(KeyCode::Esc, KeyModifiers::NONE),
            opened + Duration::from_millis(100),
        );
        assert!(!app.session.is_open());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_commit_opens_selected_text() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "rust lang");
        app.handle_event(&key(KeyCode::Char('a'), KeyModifiers::CONTROL), Instant::now());
        let opened = double_tap(&mut app, Instant::now());

        app.handle_event(
            &key(KeyCode::Char('w'), KeyModifiers::NONE),
            opened + Duration::from_millis(50),
        );

        assert!(!app.session.is_open());
        assert_eq!(app.status(), "Opened https://w.example.com/rust%20lang");
    }

    #[test]
    fn test_f2_opens_without_gesture() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "");
        app.handle_event(&key(KeyCode::F(2), KeyModifiers::NONE), Instant::now());
        assert!(app.session.is_open());
    }

    #[test]
    fn test_click_outside_overlay_dismisses() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "");
        double_tap(&mut app, Instant::now());
        draw(&mut app);
        assert!(app.layout.area.is_some());

        app.handle_event(&click(0, 0), Instant::now());
        assert!(!app.session.is_open());
    }

    #[test]
    fn test_click_on_card_launches() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "");
        double_tap(&mut app, Instant::now());
        draw(&mut app);

        let (rect, index) = app.layout.cards[1];
        assert_eq!(index, 1);
        app.handle_event(&click(rect.x, rect.y), Instant::now());

        assert!(!app.session.is_open());
        assert_eq!(app.status(), "Opened https://b.example.com/");
    }

    #[test]
    fn test_focus_lost_forgets_first_tap() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "");
        let t0 = Instant::now();
        app.handle_event(&shift(), t0);
        app.handle_event(&Event::FocusLost, t0 + Duration::from_millis(20));
        app.handle_event(&shift(), t0 + Duration::from_millis(100));
        assert!(!app.session.is_open());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "");
        app.handle_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(app.should_quit);
    }

    #[test]
    fn test_status_without_bare_shift_mentions_fallback() {
        let temp = TempDir::new().unwrap();
        let mut app = make_app(&temp, "");
        app.bare_shift = false;
        assert!(app.status().starts_with("F2"));
    }
}
