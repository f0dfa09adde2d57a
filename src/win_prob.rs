use anyhow::{Result, ensure};

use crate::team_rates::round_dp;

/// Scoreline cap for the joint grid. Poisson mass beyond five goals is
/// negligible at realistic football scoring rates.
pub const DEFAULT_MAX_GOALS: u32 = 5;

/// Final output of a prediction: outcome probabilities plus the totals the
/// presentation layer shows alongside them.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub expected_total_goals: f64,
    pub expected_total_corners: Option<f64>,
}

/// Aggregate the joint scoreline distribution of two independent Poisson
/// processes into win/draw/loss probabilities.
///
/// Probabilities are rounded to 3 decimals and sum to 1.0 minus the tail
/// mass truncated beyond `max_goals` in each dimension; that tail is
/// dropped, not redistributed. Non-finite or negative rates are a caller
/// bug and are rejected up front.
pub fn simulate(
    expected_home_goals: f64,
    expected_away_goals: f64,
    max_goals: u32,
) -> Result<PredictionResult> {
    ensure!(
        expected_home_goals.is_finite() && expected_home_goals >= 0.0,
        "home rate must be finite and non-negative, got {expected_home_goals}"
    );
    ensure!(
        expected_away_goals.is_finite() && expected_away_goals >= 0.0,
        "away rate must be finite and non-negative, got {expected_away_goals}"
    );

    let pmf_home = poisson_pmf(expected_home_goals, max_goals);
    let pmf_away = poisson_pmf(expected_away_goals, max_goals);

    let mut home_win = 0.0;
    let mut draw = 0.0;
    let mut away_win = 0.0;

    for (i, p_i) in pmf_home.iter().enumerate() {
        for (j, p_j) in pmf_away.iter().enumerate() {
            let p = p_i * p_j;
            if i > j {
                home_win += p;
            } else if i == j {
                draw += p;
            } else {
                away_win += p;
            }
        }
    }

    Ok(PredictionResult {
        home_win: round_dp(home_win, 3),
        draw: round_dp(draw, 3),
        away_win: round_dp(away_win, 3),
        expected_total_goals: round_dp(expected_home_goals + expected_away_goals, 1),
        expected_total_corners: None,
    })
}

/// P(X=k) for k in 0..=max_k via the multiplicative recurrence
/// p_k = p_{k-1} * lambda / k. lambda = 0 yields [1, 0, 0, ...].
pub fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }
    out
}
