use std::env;

/// One supported competition: where its historical CSV lives and which
/// teams the picker offers.
#[derive(Debug, Clone, Copy)]
pub struct LeagueSource {
    pub key: &'static str,
    pub name: &'static str,
    pub default_url: &'static str,
    pub teams: &'static [&'static str],
}

pub const LEAGUES: &[LeagueSource] = &[
    LeagueSource {
        key: "epl",
        name: "Premier League",
        default_url: "https://raw.githubusercontent.com/Sh1503/football-match-predictor/main/epl.csv",
        teams: &[
            "Arsenal",
            "Aston Villa",
            "Bournemouth",
            "Brentford",
            "Brighton",
            "Chelsea",
            "Crystal Palace",
            "Everton",
            "Fulham",
            "Ipswich",
            "Leicester",
            "Liverpool",
            "Man City",
            "Man United",
            "Newcastle",
            "Nott'm Forest",
            "Southampton",
            "Tottenham",
            "West Ham",
            "Wolves",
        ],
    },
    LeagueSource {
        key: "laliga",
        name: "La Liga",
        default_url: "https://raw.githubusercontent.com/Sh1503/football-match-predictor/main/laliga.csv",
        teams: &[
            "Alaves",
            "Ath Bilbao",
            "Ath Madrid",
            "Barcelona",
            "Betis",
            "Celta",
            "Espanol",
            "Getafe",
            "Girona",
            "Las Palmas",
            "Leganes",
            "Mallorca",
            "Osasuna",
            "Real Madrid",
            "Sevilla",
            "Sociedad",
            "Valencia",
            "Valladolid",
            "Vallecano",
            "Villarreal",
        ],
    },
    LeagueSource {
        key: "seriea",
        name: "Serie A",
        default_url: "https://raw.githubusercontent.com/Sh1503/football-match-predictor/main/seriea.csv",
        teams: &[
            "Atalanta",
            "Bologna",
            "Cagliari",
            "Como",
            "Empoli",
            "Fiorentina",
            "Genoa",
            "Inter",
            "Juventus",
            "Lazio",
            "Lecce",
            "Milan",
            "Monza",
            "Napoli",
            "Parma",
            "Roma",
            "Torino",
            "Udinese",
            "Venezia",
            "Verona",
        ],
    },
    LeagueSource {
        key: "bundesliga",
        name: "Bundesliga",
        default_url: "https://raw.githubusercontent.com/Sh1503/football-match-predictor/main/bundesliga.csv",
        teams: &[
            "Augsburg",
            "Bayern Munich",
            "Bochum",
            "Dortmund",
            "Ein Frankfurt",
            "Freiburg",
            "Heidenheim",
            "Hoffenheim",
            "Holstein Kiel",
            "Leverkusen",
            "M'gladbach",
            "Mainz",
            "RB Leipzig",
            "St Pauli",
            "Stuttgart",
            "Union Berlin",
            "Werder Bremen",
            "Wolfsburg",
        ],
    },
    LeagueSource {
        key: "ligue1",
        name: "Ligue 1",
        default_url: "https://raw.githubusercontent.com/Sh1503/football-match-predictor/main/ligue1.csv",
        teams: &[
            "Angers",
            "Auxerre",
            "Brest",
            "Le Havre",
            "Lens",
            "Lille",
            "Lyon",
            "Marseille",
            "Monaco",
            "Montpellier",
            "Nantes",
            "Nice",
            "Paris SG",
            "Reims",
            "Rennes",
            "St Etienne",
            "Strasbourg",
            "Toulouse",
        ],
    },
];

/// CSV source for a league, honoring a `FMP_LEAGUE_<KEY>_URL` override.
pub fn source_url(league: &LeagueSource) -> String {
    let env_key = format!("FMP_LEAGUE_{}_URL", league.key.to_uppercase());
    match env::var(&env_key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => league.default_url.to_string(),
    }
}

/// Look a league up by key or display name, case-insensitively.
pub fn find_league(query: &str) -> Option<&'static LeagueSource> {
    let q = query.trim().to_lowercase();
    LEAGUES
        .iter()
        .find(|l| l.key == q || l.name.to_lowercase() == q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_league_matches_key_and_name() {
        assert_eq!(find_league("epl").unwrap().name, "Premier League");
        assert_eq!(find_league("Premier League").unwrap().key, "epl");
        assert_eq!(find_league("  La Liga  ").unwrap().key, "laliga");
        assert!(find_league("mls").is_none());
    }

    #[test]
    fn every_league_has_teams_and_a_source() {
        for league in LEAGUES {
            assert!(!league.teams.is_empty(), "{} has no teams", league.key);
            assert!(league.default_url.starts_with("https://"));
        }
    }
}
