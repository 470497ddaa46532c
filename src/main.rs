use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEvent,
    KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};

use simfut_terminal::config::EngineVariant;
use simfut_terminal::event::{EventCategory, Side};
use simfut_terminal::persist::{self, FileStore};
use simfut_terminal::playback::PlaybackStatus;
use simfut_terminal::poisson;
use simfut_terminal::rng::RngSource;
use simfut_terminal::state::{AppState, FormField, Screen};

struct App {
    state: AppState,
    should_quit: bool,
    store: Option<FileStore>,
    rng: RngSource<rand::rngs::ThreadRng>,
    tick_rate: Duration,
}

impl App {
    fn new(store: Option<FileStore>) -> Self {
        let tick_ms = std::env::var("SIM_TICK_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(250)
            .max(20);
        let mut state = AppState::new();
        match &store {
            Some(store) => {
                persist::load_into_state(&mut state, store);
                state.push_log(format!(
                    "[INFO] Store {} ({} past matches)",
                    store.path().display(),
                    state.history.len()
                ));
            }
            None => state.push_log("[WARN] No cache dir, history will not persist"),
        }
        Self {
            state,
            should_quit: false,
            store,
            rng: RngSource::thread(),
            tick_rate: Duration::from_millis(tick_ms),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('?') | KeyCode::Esc => self.state.help_overlay = false,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('H') | KeyCode::Char('2') => self.state.toggle_screen(),
            KeyCode::Char('1') | KeyCode::Esc => self.state.screen = Screen::Simulator,
            _ => match self.state.screen {
                Screen::Simulator => self.on_simulator_key(key),
                Screen::History => self.on_history_key(key),
            },
        }
    }

    fn on_simulator_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down => self.state.select_next_field(),
            KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up => {
                self.state.select_prev_field()
            }
            KeyCode::Char('l') | KeyCode::Right => self.state.adjust_field(1),
            KeyCode::Char('h') | KeyCode::Left => self.state.adjust_field(-1),
            KeyCode::Enter | KeyCode::Char('r') => self.run(),
            KeyCode::Char(' ') => {
                if let Some(playback) = self.state.playback.as_mut() {
                    playback.toggle();
                }
            }
            KeyCode::Char('e') => {
                if let Some(playback) = self.state.playback.as_mut() {
                    playback.skip_to_end();
                }
            }
            KeyCode::Char('x') => {
                self.state.clear_result();
                self.state.push_log("[INFO] Result cleared");
            }
            KeyCode::Char('v') => {
                self.state.toggle_variant();
                let label = variant_label(self.state.variant);
                self.state.push_log(format!("[INFO] Engine: {label}"));
            }
            _ => {}
        }
        self.persist_form();
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_history_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_history_prev(),
            KeyCode::Char('c') => {
                self.state.clear_history();
                if let Some(store) = self.store.as_mut()
                    && let Err(err) = persist::clear_history(store)
                {
                    self.state.push_log(format!("[WARN] Clear history failed: {err:#}"));
                }
            }
            _ => {}
        }
    }

    fn run(&mut self) {
        if self.state.run_simulation(&mut self.rng).is_none() {
            return;
        }
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(err) = persist::save_history(store, &self.state.history) {
            self.state.push_log(format!("[WARN] Save history failed: {err:#}"));
        }
    }

    fn persist_form(&mut self) {
        if !self.state.form_dirty {
            return;
        }
        self.state.form_dirty = false;
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(err) = persist::save_config(store, &self.state.form) {
            self.state.push_log(format!("[WARN] Save form failed: {err:#}"));
        }
    }

    fn on_tick(&mut self) {
        let Some(playback) = self.state.playback.as_mut() else {
            return;
        };
        let (home, away) = {
            let res = playback.result();
            (res.home_team.clone(), res.away_team.clone())
        };
        let was_running = playback.status() == PlaybackStatus::Running;
        let revealed: Vec<String> = playback
            .tick()
            .iter()
            .filter(|e| e.category == EventCategory::Goal)
            .map(|e| {
                let team = match e.side {
                    Side::Home => home.as_str(),
                    Side::Away => away.as_str(),
                    Side::Neutral => "?",
                };
                format!("[ALERT] Goal {team} {}'", e.minute)
            })
            .collect();
        let finished = was_running && playback.status() == PlaybackStatus::Finished;
        for line in revealed {
            self.state.push_log(line);
        }
        if finished {
            self.state.push_log("[INFO] Final whistle");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(FileStore::open_default());
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Some(store) = app.store.as_mut()
        && let Err(err) = persist::save_from_state(&app.state, store)
    {
        eprintln!("warning: store not saved: {err:#}");
    }
    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= app.tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Simulator => render_simulator(frame, chunks[1], &app.state),
        Screen::History => render_history(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state, 3))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Simulator => format!("SIMFUT | Engine: {}", variant_label(state.variant)),
        Screen::History => format!("SIMFUT HISTORY | {} matches", state.history.len()),
    };
    let line1 = format!("   o   {title}");
    let line2 = "  /|\\".to_string();
    let line3 = "  / \\".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Simulator => {
            "j/k Field | h/l Adjust | Enter/r Run | Space Pause | e End | x Clear | v Engine | H History | ? Help | q Quit".to_string()
        }
        Screen::History => "1/Esc Simulator | j/k Move | c Clear | ? Help | q Quit".to_string(),
    }
}

fn variant_label(variant: EngineVariant) -> &'static str {
    match variant {
        EngineVariant::Full => "FULL",
        EngineVariant::Quick => "QUICK",
    }
}

fn render_simulator(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(1)])
        .split(area);

    render_form(frame, cols[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(cols[1]);

    render_scoreboard(frame, right[0], state);

    let tape = Paragraph::new(event_tape_text(state, right[1].height.saturating_sub(2)))
        .block(Block::default().title("Events").borders(Borders::ALL));
    frame.render_widget(tape, right[1]);
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Match").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::with_capacity(FormField::ALL.len() * 2);
    for field in FormField::ALL {
        let selected = field == state.form_field;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let marker = if selected { ">" } else { " " };
        lines.push(Line::styled(
            format!("{marker} {:<11}{}", field.label(), form_value(state, field)),
            style,
        ));
        if let Some(msg) = state.field_error(field) {
            lines.push(Line::styled(
                format!("    {msg}"),
                Style::default().fg(Color::Red),
            ));
        }
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn form_value(state: &AppState, field: FormField) -> String {
    let form = &state.form;
    let team = |name: &str| {
        if name.trim().is_empty() {
            "-".to_string()
        } else {
            name.to_string()
        }
    };
    let flag = |on: bool| if on { "yes" } else { "no" }.to_string();
    match field {
        FormField::HomeTeam => team(&form.home_team),
        FormField::AwayTeam => team(&form.away_team),
        FormField::Duration => format!("{}'", form.duration_minutes),
        FormField::Climate => form.climate_label().to_string(),
        FormField::ExtraTime => flag(form.extra_time),
        FormField::Penalties => flag(form.penalties),
        FormField::HomeAttack => format!("{:.2}", form.home_attack),
        FormField::HomeDefense => format!("{:.2}", form.home_defense),
        FormField::AwayAttack => format!("{:.2}", form.away_attack),
        FormField::AwayDefense => format!("{:.2}", form.away_defense),
    }
}

fn render_scoreboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Scoreboard").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(playback) = state.playback.as_ref() else {
        let empty = Paragraph::new("No result yet. Press Enter to simulate.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let res = playback.result();
    let (gh, ga) = playback.score();
    let status = match playback.status() {
        PlaybackStatus::Idle => "READY",
        PlaybackStatus::Running => "LIVE",
        PlaybackStatus::Paused => "PAUSED",
        PlaybackStatus::Finished => "FINAL",
    };
    let mut lines = vec![
        Line::styled(
            format!("{} {gh} - {ga} {}", res.home_team, res.away_team),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!(
            "{} {}' {status} | {}",
            playback.period().label(),
            playback.clock(),
            simfut_terminal::ratings::climate(res.climate).label
        )),
    ];
    if res.lambda_home > 0.0 || res.lambda_away > 0.0 {
        let (p_home, p_draw, p_away) = poisson::outcome_probs(res.lambda_home, res.lambda_away, 10);
        lines.push(Line::raw(format!(
            "λ {:.2} / {:.2} | H{:.0} D{:.0} A{:.0}",
            res.lambda_home,
            res.lambda_away,
            p_home * 100.0,
            p_draw * 100.0,
            p_away * 100.0
        )));
    }
    if playback.status() == PlaybackStatus::Finished
        && let Some(shootout) = &res.shootout
    {
        lines.push(Line::raw(format!("Penalties {}", shootout.score_label())));
    }
    frame.render_widget(Paragraph::new(lines), rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress().clamp(0.0, 1.0))
        .label(format!("{}/{}'", playback.clock(), res.minutes));
    frame.render_widget(gauge, rows[1]);
}

fn event_tape_text(state: &AppState, visible: u16) -> Text<'static> {
    let Some(playback) = state.playback.as_ref() else {
        return Text::raw("");
    };
    let revealed = playback.revealed();
    let skip = revealed.len().saturating_sub(visible as usize);
    let lines: Vec<Line> = revealed
        .iter()
        .skip(skip)
        .map(|e| Line::styled(format!("{:>3}' {}", e.minute, e.text), category_style(e.category)))
        .collect();
    Text::from(lines)
}

fn category_style(category: EventCategory) -> Style {
    match category {
        EventCategory::Goal => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        EventCategory::Yellow => Style::default().fg(Color::Yellow),
        EventCategory::Red => Style::default().fg(Color::Red),
        EventCategory::Penalty => Style::default().fg(Color::Cyan),
        c if c.is_milestone() => Style::default().fg(Color::DarkGray),
        _ => Style::default(),
    }
}

fn render_history(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let list_block = Block::default().title("Past matches").borders(Borders::ALL);
    let list_area = list_block.inner(cols[0]);
    frame.render_widget(list_block, cols[0]);

    if state.history.is_empty() {
        let empty = Paragraph::new("No simulations yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
    } else {
        let visible = list_area.height as usize;
        let (start, end) = visible_range(state.history_selected, state.history.len(), visible);
        let lines: Vec<Line> = state
            .history
            .iter()
            .enumerate()
            .skip(start)
            .take(end - start)
            .map(|(idx, r)| {
                let style = if idx == state.history_selected {
                    Style::default().fg(Color::White).bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                Line::styled(
                    format!(
                        "{} {}",
                        r.timestamp.format("%m-%d %H:%M"),
                        r.score_label
                    ),
                    style,
                )
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), list_area);
    }

    let summary = state.history.summary();
    let mut detail = vec![
        format!(
            "Played {} | H {} D {} A {}",
            summary.matches, summary.home_wins, summary.draws, summary.away_wins
        ),
        format!("Goals/match {:.2}", summary.goals_per_match()),
        String::new(),
    ];
    if let Some(record) = state.selected_history() {
        detail.push(record.score_label.clone());
        detail.push(format!(
            "{}' | {} | λ {:.2} / {:.2}",
            record.minutes,
            simfut_terminal::ratings::climate(record.climate).label,
            record.lambda_home,
            record.lambda_away
        ));
        for e in &record.events {
            if e.category.is_milestone() {
                continue;
            }
            detail.push(format!("{:>3}' {}", e.minute, e.text));
        }
    }
    let detail = Paragraph::new(detail.join("\n"))
        .block(Block::default().title("Detail").borders(Borders::ALL));
    frame.render_widget(detail, cols[1]);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState, lines: usize) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(lines);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "SIMFUT - Help",
        "",
        "Global:",
        "  H / 2        History",
        "  1 / Esc      Simulator",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Simulator:",
        "  j/k or Tab   Select field",
        "  h/l or ←/→   Change value",
        "  Enter / r    Simulate",
        "  Space        Pause/resume playback",
        "  e            Skip to final whistle",
        "  x            Clear result",
        "  v            Toggle FULL/QUICK engine",
        "",
        "History:",
        "  j/k or ↑/↓   Move",
        "  c            Clear history",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
