use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::kana::Kana;
use crate::session::settings::DisplayType;
use crate::ui::theme::Theme;

/// The flashcard: the current kana in the chosen notation, plus the other
/// two notations when the hint is revealed.
pub struct KanaCard<'a> {
    pub kana: Option<&'static Kana>,
    pub display: DisplayType,
    pub hint_visible: bool,
    pub paused: bool,
    pub theme: &'a Theme,
}

/// Spreads a glyph out so it reads larger on a terminal grid.
fn spaced(glyph: &str) -> String {
    glyph.chars().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
}

impl Widget for KanaCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = if self.paused { " Paused " } else { "" };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(if self.paused {
                colors.warning()
            } else {
                colors.border_focused()
            }))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(kana) = self.kana else {
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let glyph = Paragraph::new(Line::from(Span::styled(
            spaced(self.display.glyph(kana)),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        glyph.render(layout[1], buf);

        let hint_text = if self.hint_visible {
            self.display.hints(kana).join("  ")
        } else {
            "[h] hint".to_string()
        };
        let hint_style = if self.hint_visible {
            Style::default().fg(colors.fg())
        } else {
            Style::default().fg(colors.text_pending())
        };
        Paragraph::new(Line::from(Span::styled(hint_text, hint_style)))
            .alignment(Alignment::Center)
            .render(layout[3], buf);
    }
}
