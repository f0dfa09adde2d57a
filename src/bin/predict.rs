use anyhow::{Result, anyhow, bail};

use fmp_terminal::data_feed;
use fmp_terminal::league_sources;
use fmp_terminal::predict::predict_match;
use fmp_terminal::team_rates::estimate_rates;
use fmp_terminal::win_prob::DEFAULT_MAX_GOALS;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let league_arg = parse_string_arg("--league")
        .ok_or_else(|| anyhow!("--league is required (e.g. --league epl)"))?;
    let home = parse_string_arg("--home").ok_or_else(|| anyhow!("--home is required"))?;
    let away = parse_string_arg("--away").ok_or_else(|| anyhow!("--away is required"))?;
    if home == away {
        bail!("home and away teams must be distinct");
    }
    let max_goals = parse_u32_arg("--max-goals").unwrap_or(DEFAULT_MAX_GOALS);
    let offline = has_flag("--offline") || data_feed::offline_mode();

    let league = league_sources::find_league(&league_arg).ok_or_else(|| {
        let known = league_sources::LEAGUES
            .iter()
            .map(|l| l.key)
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("unknown league {league_arg:?}; known: {known}")
    })?;

    let history = data_feed::load_history(league, offline)?;
    if !history.is_empty() {
        let known = history.team_names();
        for team in [home.as_str(), away.as_str()] {
            if !known.iter().any(|n| n == team) {
                eprintln!(
                    "note: {team} has no fixtures in the {} data; league averages apply",
                    league.name
                );
            }
        }
    }

    let (rate_home, rate_away) = estimate_rates(&home, &away, &history);
    let result = predict_match(&home, &away, &history, max_goals)?;

    println!("{} | {} vs {}", league.name, home, away);
    println!("History: {} matches", history.len());
    println!("Model rates: home {rate_home:.2}, away {rate_away:.2} (cap {max_goals})");
    println!("Home win: {:.1}%", result.home_win * 100.0);
    println!("Draw:     {:.1}%", result.draw * 100.0);
    println!("Away win: {:.1}%", result.away_win * 100.0);
    println!("Expected goals: {:.1}", result.expected_total_goals);
    match result.expected_total_corners {
        Some(corners) => println!("Expected corners: {corners:.1}"),
        None => println!("Expected corners: n/a (no corner data)"),
    }

    Ok(())
}

fn parse_string_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn parse_u32_arg(name: &str) -> Option<u32> {
    parse_string_arg(name).and_then(|raw| raw.parse::<u32>().ok())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
