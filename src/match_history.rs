use anyhow::{Result, anyhow};
use chrono::NaiveDate;

/// One historical fixture in canonical shape. Count fields are `None` when
/// the source row carried no usable value; absent is not zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub home_corners: Option<u32>,
    pub away_corners: Option<u32>,
    pub date: Option<NaiveDate>,
}

/// Immutable collection of fixtures for one competition. Loaded once per
/// league by the data feed, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MatchHistory {
    records: Vec<MatchRecord>,
}

impl MatchHistory {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any record carries a corner count. A history loaded from a
    /// source without a recognized corner column reports false, and corner
    /// estimates come back as unavailable rather than zero.
    pub fn has_corner_data(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.home_corners.is_some() || r.away_corners.is_some())
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().filter_map(|r| r.date).max()
    }

    /// Distinct team names appearing anywhere in the history, sorted.
    pub fn team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .iter()
            .flat_map(|r| [r.home_team.clone(), r.away_team.clone()])
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

// Recognized header spellings, lowercased. Sources disagree on labels for
// the same column; everything is mapped here so nothing downstream ever
// branches on a source schema.
const HOME_TEAM_COLS: &[&str] = &["hometeam", "home team", "home"];
const AWAY_TEAM_COLS: &[&str] = &["awayteam", "away team", "away"];
const HOME_GOALS_COLS: &[&str] = &["fthg", "hg", "homegoals", "home goals"];
const AWAY_GOALS_COLS: &[&str] = &["ftag", "ag", "awaygoals", "away goals"];
const HOME_CORNERS_COLS: &[&str] = &["hc", "homecorners", "home corners"];
const AWAY_CORNERS_COLS: &[&str] = &["ac", "awaycorners", "away corners"];
const DATE_COLS: &[&str] = &["date", "matchdate"];

/// Parse a raw CSV payload into the canonical history shape.
///
/// Tolerant by policy: rows with unparseable counts keep the record with the
/// field absent, and unknown columns are ignored. Only a table without team
/// columns is an error, since nothing can be derived from it.
pub fn parse_history_csv(raw: &str) -> Result<MatchHistory> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines.next().ok_or_else(|| anyhow!("empty csv payload"))?;
    let headers: Vec<String> = split_csv_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let home_team_idx = find_column(&headers, HOME_TEAM_COLS)
        .ok_or_else(|| anyhow!("no home team column in csv header"))?;
    let away_team_idx = find_column(&headers, AWAY_TEAM_COLS)
        .ok_or_else(|| anyhow!("no away team column in csv header"))?;
    let home_goals_idx = find_column(&headers, HOME_GOALS_COLS);
    let away_goals_idx = find_column(&headers, AWAY_GOALS_COLS);
    let home_corners_idx = find_column(&headers, HOME_CORNERS_COLS);
    let away_corners_idx = find_column(&headers, AWAY_CORNERS_COLS);
    let date_idx = find_column(&headers, DATE_COLS);

    let mut records = Vec::new();
    for line in lines {
        let cells = split_csv_line(line);
        let home_team = cell_text(&cells, Some(home_team_idx));
        let away_team = cell_text(&cells, Some(away_team_idx));
        let (Some(home_team), Some(away_team)) = (home_team, away_team) else {
            continue;
        };

        records.push(MatchRecord {
            home_team,
            away_team,
            home_goals: cell_count(&cells, home_goals_idx),
            away_goals: cell_count(&cells, away_goals_idx),
            home_corners: cell_count(&cells, home_corners_idx),
            away_corners: cell_count(&cells, away_corners_idx),
            date: cell_date(&cells, date_idx),
        });
    }

    Ok(MatchHistory::new(records))
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        if let Some(idx) = headers.iter().position(|h| h == alias) {
            return Some(idx);
        }
    }
    None
}

fn cell_text(cells: &[String], idx: Option<usize>) -> Option<String> {
    let raw = cells.get(idx?)?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(raw.to_string())
}

fn cell_count(cells: &[String], idx: Option<usize>) -> Option<u32> {
    parse_count(cells.get(idx?)?)
}

fn cell_date(cells: &[String], idx: Option<usize>) -> Option<NaiveDate> {
    parse_match_date(cells.get(idx?)?)
}

/// Non-negative integer count, or `None` for anything else. Negative and
/// fractional values are treated as absent, never clamped to zero.
fn parse_count(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() || s == "-" || s.eq_ignore_ascii_case("na") {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // dd/mm/yy and dd/mm/yyyy are both seen in the wild, plus ISO.
    for fmt in ["%d/%m/%Y", "%d/%m/%y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => out.push(std::mem::take(&mut field)),
            _ => field.push(ch),
        }
    }
    out.push(field);
    out
}
