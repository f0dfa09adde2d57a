use std::collections::{HashMap, VecDeque};

use crate::league_sources::{LEAGUES, LeagueSource};
use crate::match_history::MatchHistory;
use crate::predict::predict_match;
use crate::team_rates::estimate_rates;
use crate::win_prob::{DEFAULT_MAX_GOALS, PredictionResult};

const LOG_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Leagues,
    Teams,
    Forecast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSide {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStatus {
    NotLoaded,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadLeague { league_key: String },
}

#[derive(Debug, Clone)]
pub enum Delta {
    HistoryLoaded {
        league_key: String,
        history: MatchHistory,
    },
    HistoryFailed {
        league_key: String,
        error: String,
    },
    Log(String),
}

pub struct AppState {
    pub screen: Screen,
    pub league_selected: usize,
    pub pick_side: PickSide,
    pub team_cursor: usize,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub max_goals: u32,
    pub histories: HashMap<String, MatchHistory>,
    pub history_status: HashMap<String, HistoryStatus>,
    pub prediction: Option<PredictionResult>,
    pub rates: Option<(f64, f64)>,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Leagues,
            league_selected: 0,
            pick_side: PickSide::Home,
            team_cursor: 0,
            home_team: None,
            away_team: None,
            max_goals: DEFAULT_MAX_GOALS,
            histories: HashMap::new(),
            history_status: HashMap::new(),
            prediction: None,
            rates: None,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    pub fn current_league(&self) -> &'static LeagueSource {
        &LEAGUES[self.league_selected.min(LEAGUES.len() - 1)]
    }

    pub fn current_history(&self) -> Option<&MatchHistory> {
        self.histories.get(self.current_league().key)
    }

    pub fn current_status(&self) -> HistoryStatus {
        self.history_status
            .get(self.current_league().key)
            .cloned()
            .unwrap_or(HistoryStatus::NotLoaded)
    }

    /// Teams offered by the picker. The home pick is excluded from the
    /// away list so the caller can never request a team against itself.
    pub fn pickable_teams(&self) -> Vec<&'static str> {
        let league = self.current_league();
        match (&self.pick_side, &self.home_team) {
            (PickSide::Away, Some(home)) => league
                .teams
                .iter()
                .copied()
                .filter(|t| t != home)
                .collect(),
            _ => league.teams.to_vec(),
        }
    }

    pub fn select_next_league(&mut self) {
        if self.league_selected + 1 < LEAGUES.len() {
            self.league_selected += 1;
        }
    }

    pub fn select_prev_league(&mut self) {
        self.league_selected = self.league_selected.saturating_sub(1);
    }

    pub fn select_next_team(&mut self) {
        let len = self.pickable_teams().len();
        if len > 0 && self.team_cursor + 1 < len {
            self.team_cursor += 1;
        }
    }

    pub fn select_prev_team(&mut self) {
        self.team_cursor = self.team_cursor.saturating_sub(1);
    }

    /// Confirm the highlighted team for the side being picked. Picking the
    /// home side moves on to the away pick; picking the away side moves to
    /// the forecast.
    pub fn confirm_team(&mut self) {
        let teams = self.pickable_teams();
        let Some(team) = teams.get(self.team_cursor.min(teams.len().saturating_sub(1))) else {
            return;
        };
        match self.pick_side {
            PickSide::Home => {
                self.home_team = Some(team.to_string());
                self.pick_side = PickSide::Away;
                self.team_cursor = 0;
            }
            PickSide::Away => {
                self.away_team = Some(team.to_string());
                self.screen = Screen::Forecast;
                self.recompute_prediction();
            }
        }
    }

    pub fn reset_picks(&mut self) {
        self.pick_side = PickSide::Home;
        self.team_cursor = 0;
        self.home_team = None;
        self.away_team = None;
        self.prediction = None;
        self.rates = None;
    }

    /// Recompute the forecast from whatever history is currently loaded.
    /// An absent history behaves like an empty one: the estimator falls
    /// back to its fixed priors and the UI flags low confidence.
    pub fn recompute_prediction(&mut self) {
        let (Some(home), Some(away)) = (self.home_team.clone(), self.away_team.clone()) else {
            self.prediction = None;
            self.rates = None;
            return;
        };
        let empty = MatchHistory::default();
        let history = self.current_history().unwrap_or(&empty);
        let rates = estimate_rates(&home, &away, history);
        match predict_match(&home, &away, history, self.max_goals) {
            Ok(result) => {
                self.rates = Some(rates);
                self.prediction = Some(result);
            }
            Err(err) => {
                self.prediction = None;
                self.rates = None;
                self.push_log(format!("[WARN] Prediction failed: {err}"));
            }
        }
    }

    /// Caveat line for the forecast panel, when the estimate leans on
    /// defaults rather than team evidence.
    pub fn data_warning(&self) -> Option<String> {
        match self.current_status() {
            HistoryStatus::Failed(err) => {
                return Some(format!("history unavailable ({err}); using default rates"));
            }
            HistoryStatus::Loading | HistoryStatus::NotLoaded => {
                return Some("history still loading; using default rates".to_string());
            }
            HistoryStatus::Ready => {}
        }

        let history = self.current_history()?;
        if history.is_empty() {
            return Some("league history is empty; using default rates".to_string());
        }
        let (home, away) = (self.home_team.as_deref()?, self.away_team.as_deref()?);
        let home_fixtures = history
            .records()
            .iter()
            .filter(|r| r.home_team == home && r.home_goals.is_some())
            .count();
        let away_fixtures = history
            .records()
            .iter()
            .filter(|r| r.away_team == away && r.away_goals.is_some())
            .count();
        if home_fixtures == 0 {
            return Some(format!("{home} has no scored home fixtures; using league average"));
        }
        if away_fixtures == 0 {
            return Some(format!("{away} has no scored away fixtures; using league average"));
        }
        None
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_front(line.into());
        while self.logs.len() > LOG_CAP {
            self.logs.pop_back();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::HistoryLoaded {
            league_key,
            history,
        } => {
            let n = history.len();
            let coverage = history
                .latest_date()
                .map(|d| format!(" through {d}"))
                .unwrap_or_default();
            state.push_log(format!("[INFO] {league_key}: {n} matches loaded{coverage}"));
            state.histories.insert(league_key.clone(), history);
            state.history_status.insert(league_key, HistoryStatus::Ready);
            if state.screen == Screen::Forecast {
                state.recompute_prediction();
            }
        }
        Delta::HistoryFailed { league_key, error } => {
            state.push_log(format!("[WARN] {league_key}: history fetch failed: {error}"));
            state
                .history_status
                .insert(league_key, HistoryStatus::Failed(error));
        }
        Delta::Log(line) => state.push_log(line),
    }
}
