mod app;
mod config;
mod engine;
mod event;
mod kana;
mod logging;
mod session;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing::{info, warn};

use app::{App, AppScreen, HitAreas, SettingsField};
use config::Config;
use engine::filter::ModeKind;
use engine::hit_test::Point;
use event::{AppEvent, EventHandler};
use kana::{Column, Row};
use session::settings::{AutoInterval, DisplayType};
use ui::components::chip_picker::{self, ChipPicker};
use ui::components::kana_card::KanaCard;
use ui::components::kana_grid::{self, KanaGrid};
use ui::components::progress_bar::ProgressBar;
use ui::layout::AppLayout;

#[derive(Parser)]
#[command(name = "kanadr", version, about = "Terminal kana flashcards")]
struct Cli {
    #[arg(short, long, value_enum, help = "Notation shown on the card")]
    display: Option<DisplayType>,

    #[arg(short, long, value_enum, help = "Which kana to drill")]
    mode: Option<ModeKind>,

    #[arg(long, value_enum, value_delimiter = ',', help = "Rows for --mode row, e.g. a,ka,ga")]
    rows: Option<Vec<Row>>,

    #[arg(long, value_enum, value_delimiter = ',', help = "Columns for --mode column, e.g. i,n")]
    columns: Option<Vec<Column>>,

    #[arg(short, long, help = "Advance cards automatically")]
    auto: bool,

    #[arg(short, long, value_parser = parse_interval, help = "Seconds per card in auto mode (1-10)")]
    interval: Option<AutoInterval>,

    #[arg(long, help = "Seed for a reproducible card order")]
    seed: Option<u64>,

    #[arg(long, help = "Log file path")]
    log_file: Option<PathBuf>,

    #[arg(long, help = "Config file path")]
    config: Option<PathBuf>,
}

fn parse_interval(s: &str) -> Result<AutoInterval, String> {
    let secs: u32 = s.parse().map_err(|e| format!("{e}"))?;
    AutoInterval::new(secs).map_err(|e| e.to_string())
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(display) = self.display {
            config.display_type = display;
        }
        if let Some(rows) = &self.rows {
            config.selected_rows = rows.clone();
            config.selection_mode = ModeKind::Row;
        }
        if let Some(columns) = &self.columns {
            config.selected_columns = columns.clone();
            config.selection_mode = ModeKind::Column;
        }
        if let Some(mode) = self.mode {
            config.selection_mode = mode;
        }
        if self.auto {
            config.auto_advance = true;
        }
        if let Some(interval) = self.interval {
            config.auto_interval_secs = u32::from(interval.secs());
        }
        config.normalize();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let (mut config, load_error) = match Config::load_from(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    cli.apply_to(&mut config);

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.log_file));
    if let Err(err) = logging::init(&log_path) {
        eprintln!("warning: logging disabled: {err}");
    }
    if let Some(err) = &load_error {
        warn!(path = %config_path.display(), "config unreadable, using defaults: {err:#}");
    }
    info!(
        config = %config_path.display(),
        mode = ?config.selection_mode,
        seed = ?cli.seed,
        "kanadr starting"
    );

    let mut app = App::new(config, config_path, cli.seed);
    app.config_unreadable = load_error.is_some();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    app.save_config();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
            AppEvent::Tick => {}
            AppEvent::Resize(_, _) => app.drag.cancel(),
        }

        // Ticks stall while input keeps arriving; poll the timer on every event.
        app.tick(Instant::now());

        if app.should_quit {
            info!("kanadr exiting");
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen() {
        AppScreen::Settings => handle_settings_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    let on_grid = app.selected_field() == SettingsField::Grid;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('h') if on_grid => app.move_grid_cursor(-1, 0),
        KeyCode::Char('l') if on_grid => app.move_grid_cursor(1, 0),
        KeyCode::Char('k') if on_grid => app.move_grid_cursor(0, -1),
        KeyCode::Char('j') if on_grid => app.move_grid_cursor(0, 1),
        KeyCode::Up | KeyCode::Char('k') => app.settings_prev(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.settings_next(),
        KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(now),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(now),
        KeyCode::Char(' ') => app.settings_toggle(now),
        KeyCode::Char('c') => app.clear_custom(),
        KeyCode::Char('a') => app.toggle_auto(now),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_interval(1, now),
        KeyCode::Char('-') => app.change_interval(-1, now),
        KeyCode::Enter => {
            app.start(now);
        }
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('r') | KeyCode::Esc => app.reset(),
        KeyCode::Char('h') => app.toggle_hint(),
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('n') => app.next_card(),
        KeyCode::Char('p') => app.toggle_pause(now),
        KeyCode::Char('a') => app.toggle_auto(now),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_interval(1, now),
        KeyCode::Char('-') => app.change_interval(-1, now),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let p = Point::new(i32::from(mouse.column), i32::from(mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.pointer_down(p),
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_drag(p),
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(p),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &mut App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen() {
        AppScreen::Settings => render_settings(frame, app),
        AppScreen::Practice => {
            app.hit_areas = HitAreas::default();
            render_practice(frame, app);
        }
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " kanadr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn field_height(field: SettingsField, app: &App, width: u16) -> u16 {
    match field {
        SettingsField::Picker => {
            let count = chip_picker::chips_for(app.selection_mode()).len();
            1 + chip_picker::chip_lines(width, count)
        }
        SettingsField::Grid => 1 + kana_grid::GRID_LINES,
        _ => 2,
    }
}

fn render_settings(frame: &mut ratatui::Frame, app: &mut App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);

    let pool_size = app.session.pool().len();
    render_header(
        frame,
        app,
        app_layout.header,
        &format!(" Settings | Selected: {pool_size} kana"),
    );

    let colors = &app.theme.colors;
    let centered = ui::layout::centered_rect(60, 100, app_layout.main);
    let block = Block::bordered()
        .title(" Kana practice ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = app.settings_fields();
    let content_width = inner.width.saturating_sub(5);
    let mut constraints: Vec<Constraint> = fields
        .iter()
        .map(|&f| Constraint::Length(field_height(f, app, content_width)))
        .collect();
    constraints.push(Constraint::Min(0));
    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let config = app.session.config();
    let selected = app.selected_field();
    let mut hit_areas = HitAreas::default();

    for (i, &field) in fields.iter().enumerate() {
        let rect = field_layout[i];
        let is_selected = field == selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.cursor()
        } else {
            colors.text_pending()
        });

        let body = Rect::new(
            rect.x + 5,
            rect.y + 1,
            rect.width.saturating_sub(5),
            rect.height.saturating_sub(1),
        );

        let value = match field {
            SettingsField::Display => Some(format!("< {} >", config.display_type.label())),
            SettingsField::Mode => Some(format!("< {} >", config.mode.kind().label())),
            SettingsField::Auto => Some(if config.auto_advance {
                "< On >".to_string()
            } else {
                "< Off >".to_string()
            }),
            SettingsField::Interval => Some(format!("< {} >", config.auto_interval)),
            _ => None,
        };

        let label_line = match field {
            SettingsField::Start => {
                if app.session.can_start() {
                    Line::from(Span::styled(
                        format!("{indicator}Start ({pool_size} kana)  [Enter]"),
                        label_style.fg(colors.success()),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("{indicator}Select at least one kana to start"),
                        label_style.fg(colors.warning()),
                    ))
                }
            }
            SettingsField::Grid => Line::from(vec![
                Span::styled(format!("{indicator}{}:", field.label()), label_style),
                Span::styled(
                    "  click/Space toggle, drag to add, [c] clear",
                    Style::default().fg(colors.text_pending()),
                ),
            ]),
            _ => Line::from(Span::styled(
                format!("{indicator}{}:", field.label()),
                label_style,
            )),
        };
        Paragraph::new(label_line).render(
            Rect::new(rect.x, rect.y, rect.width, rect.height.min(1)),
            frame.buffer_mut(),
        );

        if let Some(value) = value {
            Paragraph::new(Line::from(Span::styled(format!("  {value}"), value_style)))
                .render(body, frame.buffer_mut());
        }

        match field {
            SettingsField::Picker => {
                let chips = chip_picker::chips_for(&config.mode);
                hit_areas.chips = chip_picker::chip_cells(body, &chips);
                ChipPicker {
                    mode: &config.mode,
                    cursor: is_selected.then_some(app.chip_cursor),
                    theme: &app.theme,
                }
                .render(body, frame.buffer_mut());
            }
            SettingsField::Grid => {
                hit_areas.grid = Some(body);
                KanaGrid {
                    display: config.display_type,
                    mode: &config.mode,
                    cursor: is_selected.then_some(app.grid_cursor),
                    drag: app.drag_overlay(),
                    theme: &app.theme,
                }
                .render(body, frame.buffer_mut());
            }
            _ => {}
        }
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        " [↑↓] Field  [←→] Change  [Space] Toggle  [Enter] Start  [q] Quit ",
        Style::default().fg(colors.text_pending()),
    )));
    frame.render_widget(footer, app_layout.footer);

    app.hit_areas = hit_areas;
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);

    let config = app.session.config();
    let state = app.session.state();
    let pool_size = app.session.pool().len();
    let pace = if config.auto_advance {
        format!("Auto {}", config.auto_interval)
    } else {
        "Manual".to_string()
    };
    render_header(
        frame,
        app,
        app_layout.header,
        &format!(
            " {} | {} | Pool {pool_size} | Seen {}/{pool_size} | {pace}",
            config.display_type.label(),
            config.mode.kind().label(),
            state.seen.len().min(pool_size),
        ),
    );

    let show_countdown = config.auto_advance;
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(if show_countdown { 3 } else { 0 }),
        ])
        .split(app_layout.main);

    let card_area = ui::layout::centered_rect(40, 70, vertical[0]);
    frame.render_widget(
        KanaCard {
            kana: app.session.current(),
            display: config.display_type,
            hint_visible: state.hint_visible,
            paused: state.paused,
            theme: &app.theme,
        },
        card_area,
    );

    if show_countdown {
        let now = Instant::now();
        let (ratio, caption) = match app.session.auto_progress(now) {
            Some(progress) => {
                let left = (1.0 - progress) * config.auto_interval.duration().as_secs_f64();
                (1.0 - progress, format!("{left:.1}s"))
            }
            None => (0.0, "paused".to_string()),
        };
        let bar_area = ui::layout::centered_rect(40, 100, vertical[1]);
        frame.render_widget(
            ProgressBar::new("Next card", ratio, caption, &app.theme),
            bar_area,
        );
    }

    let hints = if config.auto_advance {
        " [p] Pause  [+/-] Interval  [h] Hint  [a] Manual  [r] Reset  [q] Quit "
    } else {
        " [Space] Next  [h] Hint  [a] Auto  [r] Reset  [q] Quit "
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(colors.accent()),
    )));
    frame.render_widget(footer, app_layout.footer);
}
