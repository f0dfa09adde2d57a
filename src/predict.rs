use anyhow::Result;

use crate::match_history::MatchHistory;
use crate::team_rates::{estimate_corners, estimate_rates};
use crate::win_prob::{PredictionResult, simulate};

/// Full prediction for a pairing: rate estimation feeds the scoreline
/// simulation, and the corner estimate rides along unchanged.
pub fn predict_match(
    home_team: &str,
    away_team: &str,
    history: &MatchHistory,
    max_goals: u32,
) -> Result<PredictionResult> {
    let (expected_home, expected_away) = estimate_rates(home_team, away_team, history);
    let mut result = simulate(expected_home, expected_away, max_goals)?;
    result.expected_total_corners = estimate_corners(home_team, away_team, history);
    Ok(result)
}
