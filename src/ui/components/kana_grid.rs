use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Widget;

use crate::engine::filter::SelectionMode;
use crate::engine::hit_test::Bounds;
use crate::kana::{self, Column, Kana, Row};
use crate::session::settings::DisplayType;
use crate::ui::theme::Theme;

/// Width of the row-label gutter on the left of the grid.
pub const LABEL_WIDTH: u16 = 4;
pub const CELL_WIDTH: u16 = 5;
pub const CELL_GAP: u16 = 1;
/// 10 plain rows, 5 diacritic rows, then ん alone.
pub const GRID_LINES: u16 = 16;
pub const GRID_WIDTH: u16 = LABEL_WIDTH + 5 * (CELL_WIDTH + CELL_GAP);

/// Position of one kana in the grid, in line/column units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSlot {
    pub line: u16,
    pub col: u16,
    pub kana: &'static Kana,
}

/// Every table entry placed on the grid: rows top to bottom, vowels left
/// to right, empty slots skipped, ん last.
pub fn grid_slots() -> Vec<GridSlot> {
    let mut slots = Vec::with_capacity(kana::TABLE.len());
    for (line, row) in Row::all().enumerate() {
        for (col, column) in Column::VOWELS.into_iter().enumerate() {
            if let Some(k) = kana::table::at(row, column) {
                slots.push(GridSlot {
                    line: line as u16,
                    col: col as u16,
                    kana: k,
                });
            }
        }
    }
    if let Some(n) = kana::table::at(Row::Wa, Column::N) {
        slots.push(GridSlot {
            line: GRID_LINES - 1,
            col: 0,
            kana: n,
        });
    }
    slots
}

fn slot_rect(area: Rect, slot: &GridSlot) -> Rect {
    Rect::new(
        area.x + LABEL_WIDTH + slot.col * (CELL_WIDTH + CELL_GAP),
        area.y + slot.line,
        CELL_WIDTH,
        1,
    )
}

/// Screen rectangle of every grid cell that fits inside `area`.
pub fn grid_cells(area: Rect) -> Vec<(&'static Kana, Rect)> {
    grid_slots()
        .iter()
        .map(|slot| (slot.kana, slot_rect(area, slot)))
        .filter(|(_, r)| r.right() <= area.right() && r.bottom() <= area.bottom())
        .collect()
}

/// Cell map keyed by hiragana, in the form the hit-tester takes.
pub fn grid_bounds(area: Rect) -> Vec<(&'static str, Bounds)> {
    grid_cells(area)
        .into_iter()
        .map(|(k, r)| (k.key(), Bounds::from(r)))
        .collect()
}

/// Index of the slot reached by moving `(dx, dy)` from `from`. Vertical
/// moves land on the nearest populated column of the target line.
pub fn step_cursor(slots: &[GridSlot], from: usize, dx: i32, dy: i32) -> usize {
    let Some(cur) = slots.get(from) else {
        return 0;
    };
    if dy == 0 {
        let len = slots.len() as i32;
        return (from as i32 + dx).rem_euclid(len) as usize;
    }
    let target_line = i32::from(cur.line) + dy;
    if target_line < 0 || target_line >= i32::from(GRID_LINES) {
        return from;
    }
    slots
        .iter()
        .enumerate()
        .filter(|(_, s)| i32::from(s.line) == target_line)
        .min_by_key(|(_, s)| (i32::from(s.col) - i32::from(cur.col)).abs())
        .map(|(i, _)| i)
        .unwrap_or(from)
}

pub struct KanaGrid<'a> {
    pub display: DisplayType,
    pub mode: &'a SelectionMode,
    pub cursor: Option<usize>,
    pub drag: Option<Bounds>,
    pub theme: &'a Theme,
}

impl Widget for KanaGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let label_style = Style::default().fg(colors.text_pending());

        for (line, row) in Row::all().enumerate() {
            let y = area.y + line as u16;
            if y >= area.bottom() {
                break;
            }
            buf.set_string(area.x, y, row.label(), label_style);
        }

        for (i, slot) in grid_slots().iter().enumerate() {
            let rect = slot_rect(area, slot);
            if rect.right() > area.right() || rect.bottom() > area.bottom() {
                continue;
            }
            let selected = self.mode.is_custom_selected(slot.kana);
            let mut style = if selected {
                Style::default()
                    .fg(colors.selected_fg())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg()).bg(colors.accent_dim())
            };
            if self.cursor == Some(i) {
                style = style.fg(colors.cursor()).add_modifier(Modifier::UNDERLINED);
                if selected {
                    style = style.bg(colors.selected_bg()).fg(colors.selected_fg());
                }
            }

            buf.set_style(rect, style);
            let glyph = self.display.glyph(slot.kana);
            let width = Span::raw(glyph).width() as u16;
            let x = rect.x + rect.width.saturating_sub(width) / 2;
            buf.set_string(x, rect.y, glyph, style);
        }

        if let Some(drag) = self.drag {
            let overlay = Style::default().bg(colors.accent());
            let area_bounds = Bounds::from(area);
            let left = drag.left.max(area_bounds.left);
            let right = drag.right.min(area_bounds.right);
            let top = drag.top.max(area_bounds.top);
            let bottom = drag.bottom.min(area_bounds.bottom);
            for y in top..bottom {
                for x in left..right {
                    buf[(x as u16, y as u16)].set_style(overlay);
                }
            }
        }
    }
}
