use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use pressure::app::{App, AppScreen};
use pressure::challenge::Button;
use pressure::challenge::catalog::Catalog;
use pressure::config::{Config, DifficultyLevel};
use pressure::engine::{GameEvent, Phase};
use pressure::event::{AppEvent, EventHandler};
use pressure::store::kv::{KeyValueStore, MemoryStore};
use pressure::store::json_store::JsonStore;
use pressure::store::schema::ExportData;
use pressure::ui;
use pressure::ui::components::achievement_list::AchievementList;
use pressure::ui::components::dashboard::Dashboard;
use pressure::ui::components::menu::MenuAction;
use pressure::ui::components::progress_bar::TimerBar;
use pressure::ui::components::stats_dashboard::StatsDashboard;
use pressure::ui::layout::{GameLayout, LayoutTier, pack_hint_lines};
use pressure::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "pressure",
    version,
    about = "Pressing Under Pressure: press red or blue as instructed before time runs out"
)]
struct Cli {
    #[arg(short, long, help = "Difficulty (easy, normal, hard, extreme)")]
    difficulty: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Seed for challenge selection, for repeatable games")]
    seed: Option<u64>,

    #[arg(long, help = "Print the challenge catalog as JSON and exit")]
    catalog: bool,

    #[arg(long, help = "Erase all statistics and achievements and exit")]
    reset: bool,

    #[arg(long, value_name = "FILE", help = "Write stats, achievements and config to FILE and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Replace stats and achievements with the contents of FILE and exit")]
    import: Option<PathBuf>,
}

/// Logs go to a file: the terminal belongs to the UI.
fn init_logging(dir: &Path) {
    let path = dir.join("pressure.log");
    match fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::new().filter_or("PRESSURE_LOG", "info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("warning: cannot open log file {}: {e}", path.display()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = JsonStore::new();
    if let Ok(ref store) = store {
        init_logging(store.base_dir());
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("config unreadable, using defaults: {e}");
        Config::default()
    });
    if let Some(name) = cli.difficulty.as_deref() {
        config.difficulty = DifficultyLevel::from_name(name)
            .with_context(|| format!("unknown difficulty '{name}'"))?;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();

    if cli.catalog {
        let catalog = Catalog::standard();
        let dump = serde_json::json!({
            "stats": catalog.stats(),
            "challenges": catalog.challenges(),
        });
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    if let Some(path) = cli.export {
        let store = store.context("data directory unavailable")?;
        let export = store.export_all(&config);
        fs::write(&path, serde_json::to_string_pretty(&export)?)?;
        println!("Exported to {}", path.display());
        return Ok(());
    }

    if let Some(path) = cli.import {
        let store = store.context("data directory unavailable")?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let data: ExportData = serde_json::from_str(&content)?;
        store.import_all(&data)?;
        println!("Imported from {}", path.display());
        return Ok(());
    }

    let backing: Box<dyn KeyValueStore> = match store {
        Ok(store) => {
            if store.check_interrupted_import() {
                log::warn!("removed backups left by an interrupted import");
            }
            Box::new(store)
        }
        Err(e) => {
            eprintln!("warning: progress will not be saved: {e}");
            Box::new(MemoryStore::new())
        }
    };

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        log::warn!(
            "unknown theme '{}', available: {}",
            config.theme,
            Theme::available_themes().join(", ")
        );
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let tick_rate = Duration::from_millis(config.tick_interval_ms);
    let mut app = App::new(config, backing, cli.seed, theme)?;

    if cli.reset {
        app.reset_progress();
        println!("Statistics and achievements erased.");
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        return Err(err);
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
            AppEvent::Key(key, at) => handle_key(app, key, at),
            AppEvent::Tick(at) => app.tick(at),
            AppEvent::Resize => {}
        }

        for event in app.drain_events() {
            if let GameEvent::AchievementsUnlocked { achievements } = event {
                let names: Vec<&str> = achievements
                    .iter()
                    .filter_map(|a| a.kind().map(|k| k.name()))
                    .collect();
                log::debug!("unlocked this game: {}", names.join(", "));
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, at: Instant) {
    // Held keys repeat; only distinct presses count.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key, at),
        AppScreen::Game => handle_game_key(app, key, at),
        AppScreen::GameResult => handle_result_key(app, key, at),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Achievements => handle_achievements_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, at: Instant) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('s') => app.go_to_stats(),
        KeyCode::Char('a') => app.go_to_achievements(),
        KeyCode::Char('d') => app.cycle_difficulty(true),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Left | KeyCode::Right if app.menu.selected_action() == MenuAction::Difficulty => {
            app.cycle_difficulty(key.code == KeyCode::Right);
        }
        KeyCode::Enter | KeyCode::Char(' ') => match app.menu.selected_action() {
            MenuAction::Play => app.start_game(at),
            MenuAction::Difficulty => app.cycle_difficulty(true),
            MenuAction::Stats => app.go_to_stats(),
            MenuAction::Achievements => app.go_to_achievements(),
            MenuAction::Quit => app.should_quit = true,
        },
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent, at: Instant) {
    // Let a deadline that has already passed resolve the round first, so a
    // late press cannot sneak in.
    app.tick(at);
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Left => app.press(Button::Red),
        KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Right => app.press(Button::Blue),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent, at: Instant) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('r') => app.start_game(at),
        KeyCode::Char('s') => app.go_to_stats(),
        KeyCode::Char('a') => app.go_to_achievements(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('a') => app.go_to_achievements(),
        KeyCode::Char('j') | KeyCode::Down => {
            let max = app.stats.history.len().saturating_sub(1);
            app.stats_scroll = (app.stats_scroll + 1).min(max);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.stats_scroll = app.stats_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_achievements_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('s') => app.go_to_stats(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Game => render_game(frame, app),
        AppScreen::GameResult => render_result(frame, app),
        AppScreen::Stats => {
            let dashboard = StatsDashboard::new(&app.stats, app.stats_scroll, app.theme);
            frame.render_widget(dashboard, area);
        }
        AppScreen::Achievements => {
            let list = AchievementList::new(&app.achievements, app.theme);
            frame.render_widget(list, area);
        }
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header_info = format!(
        " High score {} | {} games | {}/{} achievements",
        app.stats.high_score,
        app.stats.total_games,
        app.achievements.unlocked().count(),
        app.achievements.achievements.len(),
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " pressure ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Enter] Play  [d] Difficulty  [s] Stats  [a] Achievements  [q] Quit ",
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = GameLayout::new(area);
    let state = app.engine.state();

    let header_text = format!(
        " Round {} | Score {} | Streak {} | {}",
        state.round,
        state.score,
        state.streak,
        app.config.difficulty.as_str(),
    );
    let header = Paragraph::new(Line::from(Span::styled(
        header_text,
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::bordered().border_style(Style::default().fg(colors.border())))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    let (text, text_color) = match (app.engine.phase(), state.challenge) {
        (Phase::Resolving, _) => ("\u{2714} CORRECTO".to_string(), colors.success()),
        (_, Some(challenge)) => (challenge.text.to_string(), colors.fg()),
        (_, None) => (String::new(), colors.fg()),
    };
    let padding = layout.challenge.height.saturating_sub(3) / 2;
    let mut lines: Vec<Line> = (0..padding).map(|_| Line::from("")).collect();
    lines.push(Line::from(Span::styled(
        text,
        Style::default().fg(text_color).add_modifier(Modifier::BOLD),
    )));
    let challenge = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::bordered().border_style(Style::default().fg(colors.accent())));
    frame.render_widget(challenge, layout.challenge);

    frame.render_widget(TimerBar::new(app.timer, app.theme), layout.timer);

    if let Some(buttons_area) = layout.buttons {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(buttons_area);
        let wide = layout.tier == LayoutTier::Wide;
        for (button, rect) in [(Button::Red, halves[0]), (Button::Blue, halves[1])] {
            let (label, key, color) = match button {
                Button::Red => ("ROJO", "r / \u{2190}", colors.red_button()),
                Button::Blue => ("AZUL", "b / \u{2192}", colors.blue_button()),
            };
            let count = state.presses.get(button);
            let title = if wide { format!(" {label} [{key}] ") } else { format!(" {label} ") };
            let body = Paragraph::new(Line::from(Span::styled(
                format!("\u{00d7} {count}"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .title(title)
                    .border_style(Style::default().fg(color)),
            );
            frame.render_widget(body, rect);
        }
    }

    let hints = ["[r/\u{2190}] Red", "[b/\u{2192}] Blue", "[Esc] Give up"];
    let footer_text = pack_hint_lines(&hints, layout.footer.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let mut footer = vec![Span::styled(footer_text, Style::default().fg(colors.text_dim()))];
    if let Some(ref err) = app.last_error {
        footer.push(Span::styled(format!("  {err}"), Style::default().fg(colors.error())));
    }
    frame.render_widget(Paragraph::new(Line::from(footer)), layout.footer);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    if let Some(ref outcome) = app.last_outcome {
        let centered = ui::layout::centered_rect(60, 70, area);
        frame.render_widget(Dashboard::new(outcome, app.theme), centered);
    }
}
