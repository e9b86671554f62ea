//! The editable text line the launcher sits on top of.
//!
//! Text selected here (Shift+arrows, Ctrl+A) is what gets substituted into
//! keymap templates.

use std::ops::Range;

#[derive(Debug, Clone, Default)]
pub struct Page {
    chars: Vec<char>,
    cursor: usize,
    anchor: Option<usize>,
}

impl Page {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self {
            cursor: chars.len(),
            chars,
            anchor: None,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selected char range, `None` when the selection is collapsed.
    pub fn selection_range(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let (start, end) = if anchor <= self.cursor {
            (anchor, self.cursor)
        } else {
            (self.cursor, anchor)
        };
        (start < end).then_some(start..end)
    }

    pub fn selected_text(&self) -> String {
        self.selection_range()
            .map(|r| self.chars[r].iter().collect())
            .unwrap_or_default()
    }

    pub fn insert_char(&mut self, c: char) {
        self.delete_selection();
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        self.move_to(self.cursor.saturating_sub(1), extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        self.move_to((self.cursor + 1).min(self.chars.len()), extend);
    }

    pub fn home(&mut self, extend: bool) {
        self.move_to(0, extend);
    }

    pub fn end(&mut self, extend: bool) {
        self.move_to(self.chars.len(), extend);
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.chars.len();
    }

    fn move_to(&mut self, position: usize, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = position;
    }

    fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection_range() else {
            self.anchor = None;
            return false;
        };
        self.cursor = range.start;
        self.chars.drain(range);
        self.anchor = None;
        true
    }
}
