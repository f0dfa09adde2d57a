use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use fmp_terminal::data_feed;
use fmp_terminal::league_sources::LEAGUES;
use fmp_terminal::state::{
    AppState, Delta, HistoryStatus, PickSide, ProviderCommand, Screen, apply_delta,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Enter => self.confirm(),
            KeyCode::Char('b') | KeyCode::Esc => self.back(),
            KeyCode::Char('r') => self.request_history(true),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_cap(1),
            KeyCode::Char('-') => self.adjust_cap(-1),
            _ => {}
        }
    }

    fn move_down(&mut self) {
        match self.state.screen {
            Screen::Leagues => self.state.select_next_league(),
            Screen::Teams => self.state.select_next_team(),
            Screen::Forecast => {}
        }
    }

    fn move_up(&mut self) {
        match self.state.screen {
            Screen::Leagues => self.state.select_prev_league(),
            Screen::Teams => self.state.select_prev_team(),
            Screen::Forecast => {}
        }
    }

    fn confirm(&mut self) {
        match self.state.screen {
            Screen::Leagues => {
                self.state.reset_picks();
                self.state.screen = Screen::Teams;
                if self.state.current_history().is_none() {
                    self.request_history(false);
                }
            }
            Screen::Teams => self.state.confirm_team(),
            Screen::Forecast => {}
        }
    }

    fn back(&mut self) {
        match self.state.screen {
            Screen::Leagues => {}
            Screen::Teams => match self.state.pick_side {
                PickSide::Home => self.state.screen = Screen::Leagues,
                PickSide::Away => self.state.reset_picks(),
            },
            Screen::Forecast => {
                self.state.reset_picks();
                self.state.screen = Screen::Teams;
            }
        }
    }

    fn adjust_cap(&mut self, step: i64) {
        if self.state.screen != Screen::Forecast {
            return;
        }
        let cap = (self.state.max_goals as i64 + step).clamp(1, 10) as u32;
        if cap != self.state.max_goals {
            self.state.max_goals = cap;
            self.state.recompute_prediction();
        }
    }

    fn request_history(&mut self, announce: bool) {
        let league_key = self.state.current_league().key.to_string();
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] History fetch unavailable");
            }
            return;
        };
        if tx
            .send(ProviderCommand::LoadLeague {
                league_key: league_key.clone(),
            })
            .is_err()
        {
            if announce {
                self.state.push_log("[WARN] History request failed");
            }
            return;
        }
        self.state
            .history_status
            .insert(league_key, HistoryStatus::Loading);
        if announce {
            self.state.push_log("[INFO] History refresh requested");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    data_feed::spawn_provider(tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
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
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Leagues => render_leagues(frame, chunks[1], &app.state),
        Screen::Teams => render_teams(frame, chunks[1], &app.state),
        Screen::Forecast => render_forecast(frame, chunks[1], &app.state),
    }

    render_log(frame, chunks[2], &app.state);

    let footer =
        Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let league = state.current_league();
    let status = match state.current_status() {
        HistoryStatus::NotLoaded => "no data".to_string(),
        HistoryStatus::Loading => "loading...".to_string(),
        HistoryStatus::Ready => match state.current_history() {
            Some(h) => format!("{} matches", h.len()),
            None => "no data".to_string(),
        },
        HistoryStatus::Failed(_) => "fetch failed".to_string(),
    };
    format!("FMP TERMINAL | {} | {}\n", league.name, status)
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Leagues => {
            "j/k/↑/↓ Move | Enter Pick league | r Refresh | ? Help | q Quit".to_string()
        }
        Screen::Teams => {
            let side = match state.pick_side {
                PickSide::Home => "home",
                PickSide::Away => "away",
            };
            format!("Picking {side} side | j/k Move | Enter Confirm | b/Esc Back | q Quit")
        }
        Screen::Forecast => {
            "b/Esc Re-pick | +/- Scoreline cap | r Refresh data | q Quit".to_string()
        }
    }
}

fn render_leagues(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = vec![Line::from(Span::styled(
        "Pick a league",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (idx, league) in LEAGUES.iter().enumerate() {
        let loaded = state
            .histories
            .get(league.key)
            .map(|h| format!("{} matches", h.len()))
            .unwrap_or_else(|| "-".to_string());
        let marker = if idx == state.league_selected { ">" } else { " " };
        let style = if idx == state.league_selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(" {marker} {:<18} {loaded}", league.name),
            style,
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)])
        .split(area);

    let teams = state.pickable_teams();
    let cursor = state.team_cursor.min(teams.len().saturating_sub(1));
    let visible = cols[0].height.saturating_sub(1) as usize;
    let (start, end) = visible_range(cursor, teams.len(), visible.max(1));

    let side = match state.pick_side {
        PickSide::Home => "Home team",
        PickSide::Away => "Away team",
    };
    let mut lines = vec![Line::from(Span::styled(
        side,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for idx in start..end {
        let marker = if idx == cursor { ">" } else { " " };
        let style = if idx == cursor {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(" {marker} {}", teams[idx]),
            style,
        )));
    }
    frame.render_widget(Paragraph::new(lines), cols[0]);

    let picked_home = state.home_team.as_deref().unwrap_or("-");
    let picked_away = state.away_team.as_deref().unwrap_or("-");
    let coverage = state
        .current_history()
        .and_then(|h| h.latest_date())
        .map(|d| format!("data through {d}"))
        .unwrap_or_else(|| "coverage unknown".to_string());
    let info = vec![
        Line::from(format!("League: {}", state.current_league().name)),
        Line::from(format!("Home:   {picked_home}")),
        Line::from(format!("Away:   {picked_away}")),
        Line::from(""),
        Line::from(Span::styled(coverage, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(
        Paragraph::new(info).block(Block::default().borders(Borders::LEFT)),
        cols[1],
    );
}

fn render_forecast(frame: &mut Frame, area: Rect, state: &AppState) {
    let home = state.home_team.as_deref().unwrap_or("-");
    let away = state.away_team.as_deref().unwrap_or("-");

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{home}  vs  {away}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match &state.prediction {
        Some(p) => {
            lines.push(prob_line(&format!("{home} win"), p.home_win, Color::Green));
            lines.push(prob_line("Draw", p.draw, Color::Yellow));
            lines.push(prob_line(&format!("{away} win"), p.away_win, Color::Red));
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "Expected goals:   {:.1}",
                p.expected_total_goals
            )));
            match p.expected_total_corners {
                Some(c) => lines.push(Line::from(format!("Expected corners: {c:.1}"))),
                None => lines.push(Line::from(Span::styled(
                    "Expected corners: no corner data for this league",
                    Style::default().fg(Color::DarkGray),
                ))),
            }
            if let Some((rh, ra)) = state.rates {
                lines.push(Line::from(Span::styled(
                    format!("Model rates: home {rh:.2}, away {ra:.2} (cap {})", state.max_goals),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        None => lines.push(Line::from("No prediction yet")),
    }

    if let Some(warning) = state.data_warning() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("! {warning}"),
            Style::default().fg(Color::Yellow),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn prob_line(label: &str, p: f64, color: Color) -> Line<'static> {
    let filled = (p * 24.0).round() as usize;
    let bar: String = "█".repeat(filled.min(24));
    Line::from(vec![
        Span::raw(format!("{label:<16} {:>5.1}% ", p * 100.0)),
        Span::styled(bar, Style::default().fg(color)),
    ])
}

fn render_log(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(1) as usize;
    let lines: Vec<Line> = state
        .logs
        .iter()
        .take(visible)
        .map(|l| Line::from(l.clone()))
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::TOP).title("Log")),
        area,
    );
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.min(46);
    let height = area.height.min(12);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);
    let text = vec![
        Line::from("Keys"),
        Line::from(""),
        Line::from("j/k or arrows  move"),
        Line::from("Enter          confirm selection"),
        Line::from("b or Esc       back"),
        Line::from("r              refresh league data"),
        Line::from("+/-            scoreline cap (forecast)"),
        Line::from("q              quit"),
        Line::from(""),
        Line::from("Any key closes this help"),
    ];
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help")),
        popup,
    );
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total <= visible {
        return (0, total);
    }
    let half = visible / 2;
    let start = selected.saturating_sub(half).min(total - visible);
    (start, start + visible)
}
