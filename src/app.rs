use std::path::PathBuf;
use std::time::Instant;

use ratatui::layout::Rect;
use tracing::{debug, warn};

use crate::config::Config;
use crate::engine::filter::{ModeKind, SelectionMode};
use crate::engine::hit_test::{self, Bounds, DragTracker, Point, PointerGesture};
use crate::kana;
use crate::session::practice::PracticeSession;
use crate::session::settings::SettingsPatch;
use crate::ui::components::chip_picker::{self, Chip};
use crate::ui::components::kana_grid;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Settings,
    Practice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    Display,
    Mode,
    Picker,
    Grid,
    Auto,
    Interval,
    Start,
}

impl SettingsField {
    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Display => "Display",
            SettingsField::Mode => "Selection range",
            SettingsField::Picker => "Pick",
            SettingsField::Grid => "Kana",
            SettingsField::Auto => "Auto advance",
            SettingsField::Interval => "Interval",
            SettingsField::Start => "Start",
        }
    }
}

/// Where the mouse-sensitive parts landed on the last frame.
#[derive(Clone, Debug, Default)]
pub struct HitAreas {
    pub grid: Option<Rect>,
    pub chips: Vec<(Chip, Rect)>,
}

pub struct App {
    pub session: PracticeSession,
    pub config: Config,
    pub config_path: PathBuf,
    /// Set when the file at `config_path` failed to parse; it is then
    /// never overwritten.
    pub config_unreadable: bool,
    pub theme: Theme,
    pub should_quit: bool,
    pub settings_selected: usize,
    pub chip_cursor: usize,
    pub grid_cursor: usize,
    pub drag: DragTracker,
    pub hit_areas: HitAreas,
}

impl App {
    pub fn new(config: Config, config_path: PathBuf, seed: Option<u64>) -> Self {
        let selection = config.selection();
        let session = match seed {
            Some(seed) => PracticeSession::with_seed(selection, seed),
            None => PracticeSession::from_entropy(selection),
        };
        let drag = DragTracker::new(config.drag_threshold);

        Self {
            session,
            config,
            config_path,
            config_unreadable: false,
            theme: Theme::default(),
            should_quit: false,
            settings_selected: 0,
            chip_cursor: 0,
            grid_cursor: 0,
            drag,
            hit_areas: HitAreas::default(),
        }
    }

    pub fn screen(&self) -> AppScreen {
        if self.session.is_practicing() {
            AppScreen::Practice
        } else {
            AppScreen::Settings
        }
    }

    pub fn settings_fields(&self) -> Vec<SettingsField> {
        let config = self.session.config();
        let mut fields = vec![SettingsField::Display, SettingsField::Mode];
        match config.mode.kind() {
            ModeKind::Row | ModeKind::Column => fields.push(SettingsField::Picker),
            ModeKind::Custom => fields.push(SettingsField::Grid),
            ModeKind::All | ModeKind::Dakuon => {}
        }
        fields.push(SettingsField::Auto);
        if config.auto_advance {
            fields.push(SettingsField::Interval);
        }
        fields.push(SettingsField::Start);
        fields
    }

    pub fn selected_field(&self) -> SettingsField {
        let fields = self.settings_fields();
        fields
            .get(self.settings_selected)
            .or(fields.last())
            .copied()
            .unwrap_or(SettingsField::Start)
    }

    fn focus(&mut self, field: SettingsField) {
        if let Some(idx) = self.settings_fields().iter().position(|&f| f == field) {
            self.settings_selected = idx;
        }
    }

    pub fn settings_next(&mut self) {
        let len = self.settings_fields().len();
        if self.settings_selected + 1 < len {
            self.settings_selected += 1;
        }
    }

    pub fn settings_prev(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_cycle_forward(&mut self, now: Instant) {
        self.settings_cycle(1, now);
    }

    pub fn settings_cycle_backward(&mut self, now: Instant) {
        self.settings_cycle(-1, now);
    }

    fn settings_cycle(&mut self, dir: i32, now: Instant) {
        let config = self.session.config();
        match self.selected_field() {
            SettingsField::Display => {
                let display = if dir > 0 {
                    config.display_type.next()
                } else {
                    config.display_type.prev()
                };
                self.apply(SettingsPatch::display_type(display), now);
            }
            SettingsField::Mode => {
                let kind = if dir > 0 {
                    config.mode.kind().next()
                } else {
                    config.mode.kind().prev()
                };
                self.set_mode(kind, now);
            }
            SettingsField::Picker => {
                let len = chip_picker::chips_for(&config.mode).len();
                if len > 0 {
                    self.chip_cursor =
                        (self.chip_cursor as i32 + dir).rem_euclid(len as i32) as usize;
                }
            }
            SettingsField::Grid => self.move_grid_cursor(dir, 0),
            SettingsField::Auto => self.toggle_auto(now),
            SettingsField::Interval => self.change_interval(dir, now),
            SettingsField::Start => {}
        }
    }

    /// Space on the focused field: toggles the chip or cell under the
    /// cursor, flips auto advance, or starts from the start line.
    pub fn settings_toggle(&mut self, now: Instant) {
        match self.selected_field() {
            SettingsField::Picker => {
                let chips = chip_picker::chips_for(&self.session.config().mode);
                if let Some(&chip) = chips.get(self.chip_cursor) {
                    self.toggle_chip(chip);
                }
            }
            SettingsField::Grid => {
                let slots = kana_grid::grid_slots();
                if let Some(slot) = slots.get(self.grid_cursor) {
                    self.session.toggle_custom(slot.kana);
                    self.remember();
                }
            }
            SettingsField::Auto => self.toggle_auto(now),
            SettingsField::Start => {
                self.start(now);
            }
            SettingsField::Display | SettingsField::Mode | SettingsField::Interval => {
                self.settings_cycle_forward(now)
            }
        }
    }

    pub fn move_grid_cursor(&mut self, dx: i32, dy: i32) {
        let slots = kana_grid::grid_slots();
        self.grid_cursor = kana_grid::step_cursor(&slots, self.grid_cursor, dx, dy);
    }

    /// Switches selection mode, restoring the rows, columns or subset last
    /// used with that mode.
    pub fn set_mode(&mut self, kind: ModeKind, now: Instant) {
        self.remember();
        let mode = self.config.mode_for(kind);
        self.apply(SettingsPatch::mode(mode), now);
        self.chip_cursor = 0;
        self.focus(SettingsField::Mode);
    }

    fn toggle_chip(&mut self, chip: Chip) {
        match chip {
            Chip::Row(row) => self.session.toggle_row(row),
            Chip::Column(column) => self.session.toggle_column(column),
        };
        self.remember();
    }

    pub fn clear_custom(&mut self) {
        if self.session.clear_custom() {
            self.remember();
        }
    }

    pub fn toggle_auto(&mut self, now: Instant) {
        let enabled = !self.session.config().auto_advance;
        self.apply(SettingsPatch::auto_advance(enabled), now);
    }

    pub fn change_interval(&mut self, delta: i32, now: Instant) {
        let current = self.session.config().auto_interval;
        let interval = if delta > 0 {
            current.increment()
        } else {
            current.decrement()
        };
        if interval != current {
            self.apply(SettingsPatch::auto_interval(interval), now);
        }
    }

    pub fn start(&mut self, now: Instant) -> bool {
        self.drag.cancel();
        self.session.start(now).is_some()
    }

    /// Manual next; auto mode advances on the timer instead.
    pub fn next_card(&mut self) {
        if !self.session.config().auto_advance {
            self.session.next();
        }
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        self.session.toggle_pause(now);
    }

    pub fn toggle_hint(&mut self) {
        self.session.toggle_hint();
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.settings_selected = 0;
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.session.tick(now)
    }

    pub fn pointer_down(&mut self, p: Point) {
        if self.screen() != AppScreen::Settings {
            return;
        }
        if let Some(grid) = self.hit_areas.grid {
            if Bounds::from(grid).contains(p) {
                let cell = kana_grid::grid_bounds(grid)
                    .into_iter()
                    .map(|(_, bounds)| bounds)
                    .find(|bounds| bounds.contains(p));
                self.drag.press_in(p, cell);
                self.focus(SettingsField::Grid);
                return;
            }
        }
        let chip_cells: Vec<(Chip, Bounds)> = self
            .hit_areas
            .chips
            .iter()
            .map(|&(chip, r)| (chip, Bounds::from(r)))
            .collect();
        if let Some(chip) = hit_test::hit_point(p, &chip_cells) {
            let chips = chip_picker::chips_for(&self.session.config().mode);
            if let Some(idx) = chips.iter().position(|&c| c == chip) {
                self.chip_cursor = idx;
            }
            self.focus(SettingsField::Picker);
            self.toggle_chip(chip);
        }
    }

    pub fn pointer_drag(&mut self, p: Point) {
        self.drag.moved(p);
    }

    /// Finishes a grid interaction: a click toggles one cell, a drag adds
    /// every cell the rectangle overlaps.
    pub fn pointer_up(&mut self, p: Point) {
        let Some(gesture) = self.drag.release(p) else {
            return;
        };
        let Some(grid) = self.hit_areas.grid else {
            return;
        };
        let cells = kana_grid::grid_bounds(grid);
        match gesture {
            PointerGesture::Click(at) => {
                let Some(k) = hit_test::hit_point(at, &cells).and_then(kana::lookup) else {
                    return;
                };
                if let Some(idx) = kana_grid::grid_slots()
                    .iter()
                    .position(|s| s.kana.key() == k.key())
                {
                    self.grid_cursor = idx;
                }
                self.session.toggle_custom(k);
            }
            PointerGesture::Drag(bounds) => {
                let keys = hit_test::hit_test(&bounds, &cells);
                debug!(cells = keys.len(), "drag selection");
                self.session
                    .add_custom(keys.into_iter().filter_map(kana::lookup));
            }
        }
        self.remember();
    }

    /// Rectangle to highlight while a grid drag is in progress.
    pub fn drag_overlay(&self) -> Option<Bounds> {
        self.drag.drag_bounds()
    }

    pub fn save_config(&mut self) {
        self.remember();
        if self.config_unreadable {
            warn!(
                path = %self.config_path.display(),
                "config was unreadable, leaving it untouched"
            );
            return;
        }
        if let Err(err) = self.config.save_to(&self.config_path) {
            warn!(path = %self.config_path.display(), "failed to save config: {err:#}");
        }
    }

    fn apply(&mut self, patch: SettingsPatch, now: Instant) {
        self.session.update(patch, now);
        self.remember();
    }

    fn remember(&mut self) {
        self.config.remember(self.session.config());
    }

    pub fn selection_mode(&self) -> &SelectionMode {
        &self.session.config().mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kana::{Column, Row};
    use crate::ui::components::kana_grid::{CELL_GAP, CELL_WIDTH, GRID_LINES, GRID_WIDTH, LABEL_WIDTH};
    use std::time::Duration;

    fn test_app() -> App {
        App::new(Config::default(), PathBuf::from("unused.toml"), Some(11))
    }

    fn custom_app() -> App {
        let mut app = test_app();
        app.set_mode(ModeKind::Custom, Instant::now());
        app.hit_areas.grid = Some(Rect::new(0, 0, GRID_WIDTH, GRID_LINES));
        app
    }

    /// Screen point inside the grid cell at (line, col).
    fn cell_point(line: u16, col: u16) -> Point {
        Point::new(
            i32::from(LABEL_WIDTH + col * (CELL_WIDTH + CELL_GAP) + 1),
            i32::from(line),
        )
    }

    fn custom_keys(app: &App) -> Vec<&'static str> {
        app.session.pool().iter().map(|k| k.hiragana).collect()
    }

    #[test]
    fn test_fields_follow_mode_and_auto() {
        let mut app = test_app();
        let now = Instant::now();
        assert_eq!(
            app.settings_fields(),
            vec![
                SettingsField::Display,
                SettingsField::Mode,
                SettingsField::Auto,
                SettingsField::Start
            ]
        );
        app.set_mode(ModeKind::Row, now);
        assert!(app.settings_fields().contains(&SettingsField::Picker));
        app.set_mode(ModeKind::Custom, now);
        assert!(app.settings_fields().contains(&SettingsField::Grid));
        app.toggle_auto(now);
        assert!(app.settings_fields().contains(&SettingsField::Interval));
    }

    #[test]
    fn test_mode_cycle_keeps_drafts() {
        let mut app = test_app();
        let now = Instant::now();
        app.set_mode(ModeKind::Row, now);
        app.session.toggle_row(Row::Ka);
        app.settings_toggle(now); // Mode field: cycles forward to Column
        assert_eq!(app.session.config().mode.kind(), ModeKind::Column);
        app.set_mode(ModeKind::Row, now);
        assert!(app.session.config().mode.is_row_selected(Row::Ka));
    }

    #[test]
    fn test_start_refused_on_empty_pool() {
        let mut app = test_app();
        let now = Instant::now();
        app.set_mode(ModeKind::Column, now);
        assert!(!app.start(now));
        assert_eq!(app.screen(), AppScreen::Settings);

        app.focus(SettingsField::Picker);
        app.chip_cursor = 5;
        app.settings_toggle(now);
        assert!(app.session.config().mode.is_column_selected(Column::N));
        assert!(app.start(now));
        assert_eq!(app.screen(), AppScreen::Practice);
        assert_eq!(app.session.current().map(|k| k.hiragana), Some("ん"));
    }

    #[test]
    fn test_click_toggles_cell() {
        let mut app = custom_app();
        let p = cell_point(1, 1); // き
        app.pointer_down(p);
        app.pointer_up(p);
        assert_eq!(custom_keys(&app), vec!["き"]);
        assert_eq!(app.grid_cursor, 6);

        app.pointer_down(p);
        app.pointer_up(p);
        assert!(custom_keys(&app).is_empty());
    }

    #[test]
    fn test_drag_adds_without_removing() {
        let mut app = custom_app();
        let a = cell_point(0, 0);
        app.pointer_down(a);
        app.pointer_up(a);
        assert_eq!(custom_keys(&app), vec!["あ"]);

        // Drag along the first line from い to う, past the threshold.
        let from = cell_point(0, 1);
        let to = cell_point(0, 2);
        app.pointer_down(Point::new(from.x - 1, from.y));
        app.pointer_drag(Point::new(to.x, to.y));
        assert!(app.drag_overlay().is_some());
        app.pointer_up(to);
        assert_eq!(custom_keys(&app), vec!["あ", "い", "う"]);
        assert!(app.drag_overlay().is_none());
    }

    #[test]
    fn test_short_drag_is_a_click() {
        let mut app = custom_app();
        let p = cell_point(2, 0); // さ
        app.pointer_down(p);
        app.pointer_drag(Point::new(p.x + 2, p.y));
        app.pointer_up(Point::new(p.x + 2, p.y));
        assert_eq!(custom_keys(&app), vec!["さ"]);
    }

    #[test]
    fn test_vertical_drag_down_a_column_adds() {
        let mut app = custom_app();
        let a = cell_point(0, 0);
        app.pointer_down(a);
        app.pointer_up(a);
        assert_eq!(custom_keys(&app), vec!["あ"]);

        app.pointer_down(a);
        for line in 1..=4 {
            app.pointer_drag(cell_point(line, 0));
        }
        assert!(app.drag_overlay().is_some());
        app.pointer_up(cell_point(4, 0));
        assert_eq!(custom_keys(&app), vec!["あ", "か", "さ", "た", "な"]);
    }

    #[test]
    fn test_one_line_drag_keeps_pressed_cell() {
        let mut app = custom_app();
        let ka = cell_point(1, 0);
        app.pointer_down(ka);
        app.pointer_up(ka);

        app.pointer_down(ka);
        app.pointer_drag(cell_point(2, 0));
        app.pointer_up(cell_point(2, 0));
        assert_eq!(custom_keys(&app), vec!["か", "さ"]);
    }

    #[test]
    fn test_chip_click_toggles_row() {
        let mut app = test_app();
        app.set_mode(ModeKind::Row, Instant::now());
        app.hit_areas.chips = vec![
            (Chip::Row(Row::A), Rect::new(0, 20, 4, 1)),
            (Chip::Row(Row::Ka), Rect::new(5, 20, 4, 1)),
        ];
        app.pointer_down(Point::new(6, 20));
        assert!(app.session.config().mode.is_row_selected(Row::Ka));
        assert_eq!(app.chip_cursor, 1);
        assert_eq!(app.selected_field(), SettingsField::Picker);
        assert_eq!(app.config.selected_rows, vec![Row::Ka]);
    }

    #[test]
    fn test_mouse_ignored_while_practicing() {
        let mut app = custom_app();
        app.session.toggle_custom(kana::lookup("あ").unwrap());
        assert!(app.start(Instant::now()));
        app.pointer_down(cell_point(0, 1));
        app.pointer_up(cell_point(0, 1));
        assert_eq!(custom_keys(&app), vec!["あ"]);
    }

    #[test]
    fn test_next_card_only_in_manual_mode() {
        let mut app = test_app();
        let now = Instant::now();
        app.toggle_auto(now);
        app.start(now);
        let seen_before = app.session.state().seen.len();
        app.next_card();
        assert_eq!(app.session.state().seen.len(), seen_before);

        app.toggle_auto(now);
        app.next_card();
        assert_eq!(app.session.state().seen.len(), seen_before + 1);
    }

    #[test]
    fn test_interval_change_rearms_and_persists() {
        let mut app = test_app();
        let t0 = Instant::now();
        app.toggle_auto(t0);
        app.start(t0);
        app.change_interval(1, t0 + Duration::from_secs(2));
        assert_eq!(app.config.auto_interval_secs, 4);
        assert!(!app.tick(t0 + Duration::from_secs(5)));
        assert!(app.tick(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_reset_returns_to_settings() {
        let mut app = test_app();
        app.start(Instant::now());
        app.reset();
        assert_eq!(app.screen(), AppScreen::Settings);
        assert!(app.session.current().is_none());
    }

    #[test]
    fn test_save_config_writes_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut app = App::new(Config::default(), path.clone(), Some(1));
        let now = Instant::now();
        app.set_mode(ModeKind::Row, now);
        app.session.toggle_row(Row::Ma);
        app.apply(SettingsPatch::display_type(crate::session::DisplayType::Katakana), now);
        app.save_config();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.selection_mode, ModeKind::Row);
        assert_eq!(loaded.selected_rows, vec![Row::Ma]);
        assert_eq!(loaded.display_type, crate::session::DisplayType::Katakana);
    }

    #[test]
    fn test_unreadable_config_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original =
            "display_type = \"katakana\"\nauto_interval_secs = 7\ndrag_threshold = \"oops\"\n";
        std::fs::write(&path, original).unwrap();
        assert!(Config::load_from(&path).is_err());

        let mut app = App::new(Config::default(), path.clone(), Some(1));
        app.config_unreadable = true;
        app.set_mode(ModeKind::Row, Instant::now());
        app.save_config();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }
}
