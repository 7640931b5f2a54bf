use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;

use crate::engine::filter::SelectionMode;
use crate::kana::{Column, Row};
use crate::ui::theme::Theme;

const CHIP_WIDTH: u16 = 4;
const CHIP_GAP: u16 = 1;

/// A toggleable row or column label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Chip {
    Row(Row),
    Column(Column),
}

impl Chip {
    pub fn label(self) -> &'static str {
        match self {
            Chip::Row(r) => r.label(),
            Chip::Column(c) => c.label(),
        }
    }

    pub fn is_selected(self, mode: &SelectionMode) -> bool {
        match self {
            Chip::Row(r) => mode.is_row_selected(r),
            Chip::Column(c) => mode.is_column_selected(c),
        }
    }
}

/// The chips offered for the current mode: all 15 rows, all 6 columns, or
/// nothing for modes without a picker.
pub fn chips_for(mode: &SelectionMode) -> Vec<Chip> {
    match mode {
        SelectionMode::Row(_) => Row::all().map(Chip::Row).collect(),
        SelectionMode::Column(_) => Column::ALL.into_iter().map(Chip::Column).collect(),
        _ => Vec::new(),
    }
}

/// Lays the chips out left to right, wrapping onto following lines.
pub fn chip_cells(area: Rect, chips: &[Chip]) -> Vec<(Chip, Rect)> {
    let per_line = ((area.width + CHIP_GAP) / (CHIP_WIDTH + CHIP_GAP)).max(1);
    chips
        .iter()
        .enumerate()
        .map(|(i, &chip)| {
            let i = i as u16;
            let rect = Rect::new(
                area.x + (i % per_line) * (CHIP_WIDTH + CHIP_GAP),
                area.y + i / per_line,
                CHIP_WIDTH,
                1,
            );
            (chip, rect)
        })
        .filter(|(_, r)| r.bottom() <= area.bottom() && r.right() <= area.right())
        .collect()
}

/// Lines needed to show `count` chips at `width`.
pub fn chip_lines(width: u16, count: usize) -> u16 {
    let per_line = ((width + CHIP_GAP) / (CHIP_WIDTH + CHIP_GAP)).max(1) as usize;
    count.div_ceil(per_line) as u16
}

pub struct ChipPicker<'a> {
    pub mode: &'a SelectionMode,
    pub cursor: Option<usize>,
    pub theme: &'a Theme,
}

impl Widget for ChipPicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let chips = chips_for(self.mode);
        for (i, (chip, rect)) in chip_cells(area, &chips).into_iter().enumerate() {
            let mut style = if chip.is_selected(self.mode) {
                Style::default()
                    .fg(colors.selected_fg())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg()).bg(colors.accent_dim())
            };
            if self.cursor == Some(i) {
                style = style.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED);
            }
            buf.set_style(rect, style);
            buf.set_string(rect.x + 1, rect.y, chip.label(), style);
        }
    }
}
