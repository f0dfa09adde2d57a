use crate::match_history::{MatchHistory, MatchRecord};

// Global fallback priors when a league has no scored fixtures at all:
// a generic home-advantage assumption.
pub const DEFAULT_HOME_GOALS: f64 = 1.5;
pub const DEFAULT_AWAY_GOALS: f64 = 1.0;

/// Expected goals scored and conceded for one team in one role (home or
/// away). Derived fresh per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamRateProfile {
    pub attack_rate: f64,
    pub defense_rate: f64,
}

/// Mean goals per fixture across the whole history, split by venue.
#[derive(Debug, Clone, Copy)]
pub struct LeagueAverages {
    pub home_goals: f64,
    pub away_goals: f64,
    pub sample_matches: usize,
}

/// League-wide scoring baselines, or `None` when the history is empty or
/// carries no scored fixture. Records with missing goal counts do not
/// contribute to either mean.
pub fn league_averages(history: &MatchHistory) -> Option<LeagueAverages> {
    let mut home_sum = 0.0;
    let mut away_sum = 0.0;
    let mut home_n = 0usize;
    let mut away_n = 0usize;

    for rec in history.records() {
        if let Some(hg) = rec.home_goals {
            home_sum += hg as f64;
            home_n += 1;
        }
        if let Some(ag) = rec.away_goals {
            away_sum += ag as f64;
            away_n += 1;
        }
    }

    if home_n == 0 && away_n == 0 {
        return None;
    }

    Some(LeagueAverages {
        home_goals: mean_or_zero(home_sum, home_n),
        away_goals: mean_or_zero(away_sum, away_n),
        sample_matches: home_n.max(away_n),
    })
}

/// The home team's scoring profile over its home fixtures. A team with no
/// usable home fixture inherits the league averages for both rates.
pub fn home_profile(team: &str, history: &MatchHistory, avg: &LeagueAverages) -> TeamRateProfile {
    let scored = venue_mean(history, |r| {
        if r.home_team == team { r.home_goals } else { None }
    });
    let conceded = venue_mean(history, |r| {
        if r.home_team == team { r.away_goals } else { None }
    });
    TeamRateProfile {
        attack_rate: scored.unwrap_or(avg.home_goals),
        defense_rate: conceded.unwrap_or(avg.away_goals),
    }
}

/// The away team's profile over its away fixtures, symmetric to
/// [`home_profile`].
pub fn away_profile(team: &str, history: &MatchHistory, avg: &LeagueAverages) -> TeamRateProfile {
    let scored = venue_mean(history, |r| {
        if r.away_team == team { r.away_goals } else { None }
    });
    let conceded = venue_mean(history, |r| {
        if r.away_team == team { r.home_goals } else { None }
    });
    TeamRateProfile {
        attack_rate: scored.unwrap_or(avg.away_goals),
        defense_rate: conceded.unwrap_or(avg.home_goals),
    }
}

/// Expected goals for a home/away pairing via the multiplicative
/// attack x defense / league-average model.
///
/// Missing-data ladder: empty or wholly unscored history falls back to the
/// fixed priors; a team without usable fixtures falls back to the league
/// averages for its side; a league average of exactly zero clamps the
/// normalization factor to 1.0 instead of dividing by it. Infallible, and
/// both outputs are finite and non-negative.
pub fn estimate_rates(home_team: &str, away_team: &str, history: &MatchHistory) -> (f64, f64) {
    let Some(avg) = league_averages(history) else {
        return (DEFAULT_HOME_GOALS, DEFAULT_AWAY_GOALS);
    };

    let home = home_profile(home_team, history, &avg);
    let away = away_profile(away_team, history, &avg);

    let home_attack_factor = strength_factor(home.attack_rate, avg.home_goals);
    let away_defense_factor = strength_factor(away.defense_rate, avg.home_goals);
    let expected_home = avg.home_goals * home_attack_factor * away_defense_factor;

    let away_attack_factor = strength_factor(away.attack_rate, avg.away_goals);
    let home_defense_factor = strength_factor(home.defense_rate, avg.away_goals);
    let expected_away = avg.away_goals * away_attack_factor * home_defense_factor;

    (expected_home, expected_away)
}

/// Expected total corners for the pairing, one decimal place, or `None`
/// when the history carries no corner data at all. `None` means
/// "unavailable", which callers must keep distinct from an estimate of
/// zero corners.
pub fn estimate_corners(home_team: &str, away_team: &str, history: &MatchHistory) -> Option<f64> {
    if !history.has_corner_data() {
        return None;
    }

    let league_home = venue_mean(history, |r| r.home_corners);
    let league_away = venue_mean(history, |r| r.away_corners);

    let home = venue_mean(history, |r| {
        if r.home_team == home_team { r.home_corners } else { None }
    })
    .or(league_home)?;
    let away = venue_mean(history, |r| {
        if r.away_team == away_team { r.away_corners } else { None }
    })
    .or(league_away)?;

    Some(round_dp(home + away, 1))
}

/// Ratio of a rate to its league baseline. A zero baseline means no
/// adjustment, not a division failure.
fn strength_factor(rate: f64, league_avg: f64) -> f64 {
    if league_avg == 0.0 { 1.0 } else { rate / league_avg }
}

/// Mean of the counts selected by `pick`, or `None` when no record yields
/// one. Used for both per-team venue splits and league-wide corner means.
fn venue_mean<F>(history: &MatchHistory, pick: F) -> Option<f64>
where
    F: Fn(&MatchRecord) -> Option<u32>,
{
    let mut sum = 0.0;
    let mut n = 0usize;
    for rec in history.records() {
        if let Some(count) = pick(rec) {
            sum += count as f64;
            n += 1;
        }
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}

fn mean_or_zero(sum: f64, n: usize) -> f64 {
    if n == 0 { 0.0 } else { sum / n as f64 }
}

pub(crate) fn round_dp(v: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(home: &str, away: &str, hg: u32, ag: u32) -> MatchRecord {
        MatchRecord {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_goals: Some(hg),
            away_goals: Some(ag),
            home_corners: None,
            away_corners: None,
            date: None,
        }
    }

    #[test]
    fn empty_history_returns_fixed_priors() {
        let history = MatchHistory::default();
        assert_eq!(
            estimate_rates("A", "B", &history),
            (DEFAULT_HOME_GOALS, DEFAULT_AWAY_GOALS)
        );
    }

    #[test]
    fn wholly_unscored_history_returns_fixed_priors() {
        let mut r = rec("A", "B", 0, 0);
        r.home_goals = None;
        r.away_goals = None;
        let history = MatchHistory::new(vec![r]);
        assert_eq!(
            estimate_rates("A", "B", &history),
            (DEFAULT_HOME_GOALS, DEFAULT_AWAY_GOALS)
        );
    }

    #[test]
    fn unknown_team_inherits_league_averages() {
        let history = MatchHistory::new(vec![
            rec("A", "B", 2, 0),
            rec("B", "A", 2, 2),
            rec("A", "C", 2, 2),
            rec("C", "B", 2, 0),
        ]);
        // Neither X nor Y has fixtures: all factors are 1.0 and the
        // estimate collapses to the league averages, not the priors.
        let avg = league_averages(&history).unwrap();
        let (eh, ea) = estimate_rates("X", "Y", &history);
        assert!((eh - avg.home_goals).abs() < 1e-12);
        assert!((ea - avg.away_goals).abs() < 1e-12);
    }

    #[test]
    fn single_fixture_history_is_deterministic() {
        // One row: A 2-1 B at home. League averages are 2.0 home, 1.0 away.
        // Every factor is mean/league-avg of that same row, so:
        //   expected_home = 2.0 * (2/2) * (2/2) = 2.0
        //   expected_away = 1.0 * (1/1) * (1/1) = 1.0
        let history = MatchHistory::new(vec![rec("TeamA", "TeamB", 2, 1)]);
        let (eh, ea) = estimate_rates("TeamA", "TeamB", &history);
        assert!((eh - 2.0).abs() < 1e-12);
        assert!((ea - 1.0).abs() < 1e-12);
    }

    #[test]
    fn strong_attack_weak_defense_multiplies() {
        let history = MatchHistory::new(vec![
            rec("A", "C", 3, 0),
            rec("C", "B", 3, 1),
            rec("B", "C", 0, 1),
            rec("C", "A", 0, 2),
        ]);
        let avg = league_averages(&history).unwrap();
        // A scores 3 at home vs league home avg 1.5: factor 2.0. B concedes
        // 3 away vs league home avg 1.5: factor 2.0. Expected home goals
        // should be 1.5 * 2.0 * 2.0 = 6.0.
        assert!((avg.home_goals - 1.5).abs() < 1e-12);
        let (eh, _) = estimate_rates("A", "B", &history);
        assert!((eh - 6.0).abs() < 1e-12);
    }

    #[test]
    fn zero_league_average_does_not_divide() {
        let history = MatchHistory::new(vec![rec("A", "B", 0, 0), rec("B", "A", 0, 0)]);
        let (eh, ea) = estimate_rates("A", "B", &history);
        assert!(eh.is_finite() && ea.is_finite());
        assert_eq!((eh, ea), (0.0, 0.0));
    }

    #[test]
    fn corners_unavailable_without_corner_data() {
        let history = MatchHistory::new(vec![rec("A", "B", 1, 1)]);
        assert_eq!(estimate_corners("A", "B", &history), None);
    }

    #[test]
    fn corners_sum_team_means() {
        let mut r1 = rec("A", "B", 1, 0);
        r1.home_corners = Some(6);
        r1.away_corners = Some(2);
        let mut r2 = rec("A", "C", 2, 0);
        r2.home_corners = Some(8);
        r2.away_corners = Some(4);
        let mut r3 = rec("C", "B", 0, 0);
        r3.home_corners = Some(5);
        r3.away_corners = Some(3);
        let history = MatchHistory::new(vec![r1, r2, r3]);
        // A averages 7 home corners, B averages 2.5 away corners.
        assert_eq!(estimate_corners("A", "B", &history), Some(9.5));
    }

    #[test]
    fn corners_fall_back_to_league_means_for_unseen_teams() {
        let mut r = rec("A", "B", 1, 0);
        r.home_corners = Some(6);
        r.away_corners = Some(2);
        let history = MatchHistory::new(vec![r]);
        assert_eq!(estimate_corners("X", "Y", &history), Some(8.0));
    }
}
