//! Overlay grid state and in-overlay navigation.
//!
//! The controller owns what the overlay shows (items, active card, scroll
//! position) and hands a finished [`OverlayView`] to an injected
//! [`OverlayRenderer`]. It never resolves templates or navigates: picks and
//! dismissals are reported back to the session as [`OverlayOutcome`]s.

use crate::template;
use flightdeck_types::{Key, KeyInput, Keymap, OverlayItem, OverlayView};
use tracing::debug;

pub const DEFAULT_CARD_WIDTH: usize = 24;
pub const DEFAULT_SELECTION_PREVIEW_CHARS: usize = 60;

/// Paints overlay view models onto a host surface.
pub trait OverlayRenderer {
    fn render(&mut self, view: &OverlayView);
    fn hide(&mut self);
}

/// Size of the grid area the overlay may use, in the renderer's units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub visible_rows: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_CARD_WIDTH * 4,
            visible_rows: 4,
        }
    }
}

/// What an overlay interaction asks the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    /// Not an overlay key, or overlay not listening
    Unhandled,
    /// Active card changed
    Moved,
    Pick(String),
    Dismiss,
}

/// Build overlay cards for `keys`, in the given order.
#[must_use]
pub fn build_items(keymap: &Keymap, keys: &[String]) -> Vec<OverlayItem> {
    keys.iter()
        .map(|key| {
            let entry = keymap.get(key);
            let label = entry
                .map(|e| e.label.as_str())
                .filter(|l| !l.is_empty())
                .unwrap_or(key);
            let template = entry.map(|e| e.template.clone()).unwrap_or_default();
            OverlayItem {
                key: key.clone(),
                label: label.to_string(),
                domain: template::preview_host(&template),
                template,
                searchable: entry.is_some_and(|e| e.searchable),
            }
        })
        .collect()
}

fn selection_chip(selected_text: &str, max_chars: usize) -> Option<String> {
    if selected_text.is_empty() {
        None
    } else {
        Some(selected_text.chars().take(max_chars).collect())
    }
}

#[derive(Debug)]
pub struct OverlayController<R> {
    renderer: R,
    card_width: usize,
    selection_preview_chars: usize,
    viewport: Viewport,
    view: OverlayView,
    /// Surface exists; kept across hide/show
    surface_created: bool,
    visible: bool,
    /// Scoped navigation handling, installed by show and removed by hide
    listening: bool,
}

impl<R: OverlayRenderer> OverlayController<R> {
    pub fn new(renderer: R, card_width: usize, selection_preview_chars: usize) -> Self {
        Self {
            renderer,
            card_width: card_width.max(1),
            selection_preview_chars,
            viewport: Viewport::default(),
            view: OverlayView::default(),
            surface_created: false,
            visible: false,
            listening: false,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn view(&self) -> &OverlayView {
        &self.view
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub fn has_surface(&self) -> bool {
        self.surface_created
    }

    /// Columns that fit the current viewport, at least one.
    #[must_use]
    pub fn columns(&self) -> usize {
        (self.viewport.width / self.card_width).max(1)
    }

    /// Paint `items` and start handling navigation keys.
    pub fn show(&mut self, selected_text: &str, items: Vec<OverlayItem>, active_index: usize) {
        if !self.surface_created {
            debug!("Creating overlay surface");
            self.surface_created = true;
        }

        self.view = OverlayView {
            selected_text: selected_text.to_string(),
            selection_chip: selection_chip(selected_text, self.selection_preview_chars),
            active_index: active_index.min(items.len().saturating_sub(1)),
            items,
            columns: self.columns(),
            scroll_row: 0,
        };
        self.scroll_active_into_view();

        self.visible = true;
        self.listening = true;
        self.renderer.render(&self.view);
    }

    /// Hide the overlay and stop handling navigation keys. The surface is kept.
    pub fn hide(&mut self) {
        if !self.visible && !self.listening {
            return;
        }
        self.visible = false;
        self.listening = false;
        self.renderer.hide();
    }

    /// Update the available space, repainting if visible.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.view.columns = self.columns();
        self.scroll_active_into_view();
        if self.visible {
            self.renderer.render(&self.view);
        }
    }

    /// Handle a key while the overlay is listening.
    pub fn handle_key(&mut self, input: &KeyInput) -> OverlayOutcome {
        if !self.listening {
            return OverlayOutcome::Unhandled;
        }

        match input.key {
            Key::Escape => OverlayOutcome::Dismiss,
            Key::Enter => self
                .view
                .items
                .first()
                .map_or(OverlayOutcome::Unhandled, |item| {
                    OverlayOutcome::Pick(item.key.clone())
                }),
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                if let Some(next) = self.next_index(input.key) {
                    self.set_active(next);
                }
                OverlayOutcome::Moved
            }
            _ => OverlayOutcome::Unhandled,
        }
    }

    /// Pointer entered a card.
    pub fn hover(&mut self, index: usize) {
        if self.visible {
            self.set_active(index);
        }
    }

    /// Pointer clicked a card.
    pub fn click(&self, index: usize) -> OverlayOutcome {
        if !self.visible {
            return OverlayOutcome::Unhandled;
        }
        self.view
            .items
            .get(index)
            .map_or(OverlayOutcome::Unhandled, |item| {
                OverlayOutcome::Pick(item.key.clone())
            })
    }

    /// Backdrop or close button.
    #[must_use]
    pub fn dismiss(&self) -> OverlayOutcome {
        if self.visible {
            OverlayOutcome::Dismiss
        } else {
            OverlayOutcome::Unhandled
        }
    }

    fn next_index(&self, key: Key) -> Option<usize> {
        let count = self.view.items.len();
        if count == 0 {
            return None;
        }
        let last = count - 1;
        let current = self.view.active_index.min(last);
        let cols = self.columns();

        Some(match key {
            Key::ArrowRight => (current + 1).min(last),
            Key::ArrowLeft => current.saturating_sub(1),
            Key::ArrowDown => (current + cols).min(last),
            Key::ArrowUp => current.saturating_sub(cols),
            _ => current,
        })
    }

    fn set_active(&mut self, index: usize) {
        let Some(last) = self.view.items.len().checked_sub(1) else {
            return;
        };
        self.view.active_index = index.min(last);
        self.scroll_active_into_view();
        self.renderer.render(&self.view);
    }

    fn scroll_active_into_view(&mut self) {
        let cols = self.view.columns.max(1);
        let rows = self.viewport.visible_rows.max(1);
        let active_row = self.view.active_index / cols;

        if active_row < self.view.scroll_row {
            self.view.scroll_row = active_row;
        } else if active_row >= self.view.scroll_row + rows {
            self.view.scroll_row = active_row + 1 - rows;
        }
    }
}
