//! Rendering for the page and the launcher overlay.

use crate::colors;
use crate::page::Page;
use flightdeck_core::{OverlayItem, OverlayRenderer, OverlayView, Viewport};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Terminal lines used by one card (label, domain)
const LINES_PER_CARD: u16 = 2;

/// Holds the last view the session asked to paint; `None` while hidden.
#[derive(Debug, Default)]
pub struct TuiRenderer {
    view: Option<OverlayView>,
}

impl TuiRenderer {
    pub fn view(&self) -> Option<&OverlayView> {
        self.view.as_ref()
    }
}

impl OverlayRenderer for TuiRenderer {
    fn render(&mut self, view: &OverlayView) {
        self.view = Some(view.clone());
    }

    fn hide(&mut self) {
        self.view = None;
    }
}

/// Screen positions from the last draw, for pointer hit-testing.
#[derive(Debug, Default)]
pub struct OverlayLayout {
    pub area: Option<Rect>,
    pub cards: Vec<(Rect, usize)>,
}

impl OverlayLayout {
    pub fn card_at(&self, column: u16, row: u16) -> Option<usize> {
        self.cards
            .iter()
            .find(|(rect, _)| contains(*rect, column, row))
            .map(|(_, index)| *index)
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.is_some_and(|area| contains(area, column, row))
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Overlay box and its inner regions for a given screen size.
struct OverlayRegions {
    area: Rect,
    header: Rect,
    grid: Rect,
    help: Rect,
}

fn overlay_regions(screen: Rect) -> OverlayRegions {
    let width = (screen.width * 4 / 5).max(screen.width.min(30));
    let height = (screen.height * 3 / 5).max(screen.height.min(8));
    let area = Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    );
    let inner = Block::default().borders(Borders::ALL).inner(area);

    let header = Rect::new(inner.x, inner.y, inner.width, 1.min(inner.height));
    let help_y = inner.y + inner.height.saturating_sub(1);
    let grid_y = inner.y + 2.min(inner.height);
    let grid = Rect::new(inner.x, grid_y, inner.width, help_y.saturating_sub(grid_y));
    let help = Rect::new(inner.x, help_y, inner.width, 1.min(inner.height));

    OverlayRegions {
        area,
        header,
        grid,
        help,
    }
}

/// Space available to the card grid on a screen of this size.
pub fn viewport_for(screen: Rect) -> Viewport {
    let grid = overlay_regions(screen).grid;
    Viewport {
        width: usize::from(grid.width),
        visible_rows: usize::from(grid.height / LINES_PER_CARD).max(1),
    }
}

/// Truncate to `max_chars` characters with an ellipsis.
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// Everything drawn besides the overlay itself.
pub struct Screen<'a> {
    pub page: &'a Page,
    pub buffer: &'a str,
    pub status: &'a str,
    pub overlay: Option<&'a OverlayView>,
}

pub fn draw(f: &mut Frame, screen: &Screen<'_>, layout: &mut OverlayLayout) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(colors::BG)), area);

    render_page(f, screen.page, area);
    render_status(f, screen.status, area);

    layout.area = None;
    layout.cards.clear();
    if let Some(view) = screen.overlay {
        render_overlay(f, view, screen.buffer, layout);
    }
}

fn render_page(f: &mut Frame, page: &Page, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" flightdeck ")
        .style(Style::default().bg(colors::SURFACE))
        .border_style(Style::default().fg(colors::OUTLINE));
    let page_area = Rect::new(area.x, area.y, area.width, 3.min(area.height));
    let inner = block.inner(page_area);
    f.render_widget(block, page_area);

    let selection = page.selection_range();
    let text_style = Style::default().fg(colors::ON_SURFACE);
    let selected_style = Style::default().fg(colors::ON_SURFACE).bg(colors::SELECTION);

    let mut spans: Vec<Span> = page
        .text()
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let style = if selection.as_ref().is_some_and(|r| r.contains(&i)) {
                selected_style
            } else if i == page.cursor() {
                text_style.add_modifier(Modifier::REVERSED)
            } else {
                text_style
            };
            Span::styled(c.to_string(), style)
        })
        .collect();
    if page.cursor() == page.text().chars().count() {
        spans.push(Span::styled(" ", text_style.add_modifier(Modifier::REVERSED)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_status(f: &mut Frame, status: &str, area: Rect) {
    let status_area = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(1),
        area.width,
        1.min(area.height),
    );
    f.render_widget(
        Paragraph::new(Span::styled(status.to_string(), Style::default().fg(colors::SUBTEXT)))
            .style(Style::default().bg(colors::SURFACE)),
        status_area,
    );
}

fn render_header(f: &mut Frame, view: &OverlayView, buffer: &str, area: Rect) {
    let mut spans = match &view.selection_chip {
        Some(chip) => vec![
            Span::styled("Search for ", Style::default().fg(colors::SUBTEXT)),
            Span::styled(
                format!(" {chip} "),
                Style::default()
                    .fg(colors::ON_SURFACE)
                    .bg(colors::PRIMARY_CONTAINER),
            ),
        ],
        None => vec![Span::styled(
            "No text selected, opening sites directly",
            Style::default().fg(colors::SUBTEXT),
        )],
    };
    if !buffer.is_empty() {
        spans.push(Span::styled("   > ", Style::default().fg(colors::OUTLINE)));
        spans.push(Span::styled(
            buffer.to_string(),
            Style::default()
                .fg(colors::WARNING)
                .add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Build spans for one card (key and label line, domain line).
fn build_card_lines(
    item: &OverlayItem,
    is_active: bool,
    cell_width: usize,
) -> (Line<'static>, Line<'static>) {
    let bg = if is_active {
        colors::SURFACE_HIGH
    } else {
        colors::SURFACE
    };
    let key = format!(" {} ", item.key);
    let label_width = cell_width.saturating_sub(key.chars().count() + 2);
    let label = truncate_text(&item.label, label_width);

    let key_style = Style::default()
        .fg(colors::BG)
        .bg(if is_active {
            colors::PRIMARY
        } else {
            colors::OUTLINE
        })
        .add_modifier(Modifier::BOLD);
    let label_style = if is_active {
        Style::default()
            .fg(colors::ON_SURFACE)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::ON_SURFACE).bg(bg)
    };

    let line1 = Line::from(vec![
        Span::styled(key, key_style),
        Span::styled(format!(" {label:label_width$} "), label_style),
    ]);

    let (domain, domain_color) = if item.domain.is_empty() {
        ("invalid template".to_string(), colors::WARNING)
    } else {
        (item.domain.clone(), colors::SUBTEXT)
    };
    let domain_width = cell_width.saturating_sub(2);
    let line2 = Line::from(Span::styled(
        format!(
            "  {:domain_width$}",
            truncate_text(&domain, domain_width)
        ),
        Style::default().fg(domain_color).bg(bg),
    ));

    (line1, line2)
}

fn render_help_bar(f: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("type", Style::default().fg(colors::PRIMARY)),
        Span::styled(": filter  ", Style::default().fg(colors::SUBTEXT)),
        Span::styled("arrows", Style::default().fg(colors::PRIMARY)),
        Span::styled(": move  ", Style::default().fg(colors::SUBTEXT)),
        Span::styled("Enter", Style::default().fg(colors::PRIMARY)),
        Span::styled(": open first  ", Style::default().fg(colors::SUBTEXT)),
        Span::styled("Esc", Style::default().fg(colors::PRIMARY)),
        Span::styled(": close", Style::default().fg(colors::SUBTEXT)),
    ]);
    f.render_widget(
        Paragraph::new(help).style(Style::default().bg(colors::SURFACE)),
        area,
    );
}

/// Render the overlay grid and record card positions.
// Grid math: usize indices to u16 terminal coords
#[allow(clippy::cast_possible_truncation)]
fn render_overlay(f: &mut Frame, view: &OverlayView, buffer: &str, layout: &mut OverlayLayout) {
    let regions = overlay_regions(f.area());
    layout.area = Some(regions.area);

    f.render_widget(Clear, regions.area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Launch ({} sites) ", view.items.len()))
        .style(Style::default().bg(colors::SURFACE))
        .border_style(Style::default().fg(colors::PRIMARY));
    f.render_widget(block, regions.area);

    render_header(f, view, buffer, regions.header);
    render_help_bar(f, regions.help);

    let grid = regions.grid;
    if view.items.is_empty() {
        let empty = Paragraph::new("No keymaps configured")
            .style(Style::default().fg(colors::SUBTEXT).bg(colors::SCRIM));
        f.render_widget(empty, grid);
        return;
    }

    let columns = view.columns.max(1);
    let cell_width = (grid.width as usize / columns).max(1);
    let visible_rows = (grid.height / LINES_PER_CARD) as usize;

    for (slot, row) in (view.scroll_row..view.scroll_row + visible_rows).enumerate() {
        let y = grid.y + slot as u16 * LINES_PER_CARD;
        for col in 0..columns {
            let index = row * columns + col;
            let Some(item) = view.items.get(index) else {
                break;
            };
            let rect = Rect::new(
                grid.x + (col * cell_width) as u16,
                y,
                cell_width as u16,
                LINES_PER_CARD,
            );
            let (line1, line2) = build_card_lines(item, index == view.active_index, cell_width);
            f.render_widget(Paragraph::new(vec![line1, line2]), rect);
            layout.cards.push((rect, index));
        }
    }
}
