use chrono::NaiveDate;

use fmp_terminal::match_history::parse_history_csv;

static EPL_SAMPLE: &str = include_str!("fixtures/epl_sample.csv");

#[test]
fn fixture_parses_with_canonical_columns() {
    let history = parse_history_csv(EPL_SAMPLE).unwrap();
    assert_eq!(history.len(), 11);
    assert!(history.has_corner_data());
    assert_eq!(
        history.latest_date(),
        NaiveDate::from_ymd_opt(2024, 9, 21)
    );

    let first = &history.records()[0];
    assert_eq!(first.home_team, "Arsenal");
    assert_eq!(first.away_team, "Wolves");
    assert_eq!(first.home_goals, Some(2));
    assert_eq!(first.away_goals, Some(0));
    assert_eq!(first.home_corners, Some(8));
    assert_eq!(first.away_corners, Some(2));
}

#[test]
fn blank_result_row_keeps_teams_but_not_counts() {
    let history = parse_history_csv(EPL_SAMPLE).unwrap();
    let row = history
        .records()
        .iter()
        .find(|r| r.home_team == "Fulham")
        .unwrap();
    assert_eq!(row.away_team, "Newcastle");
    assert_eq!(row.home_goals, None);
    assert_eq!(row.away_goals, None);
    assert_eq!(row.home_corners, None);
}

#[test]
fn alternate_schema_normalizes_to_the_same_shape() {
    let csv = "MatchDate,Home,Away,HG,AG,HomeCorners,AwayCorners\n\
               2024-08-17,Arsenal,Wolves,2,0,8,2\n\
               2024-08-18,Chelsea,Man City,0,2,5,6\n";
    let history = parse_history_csv(csv).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.has_corner_data());
    let rec = &history.records()[1];
    assert_eq!(rec.home_team, "Chelsea");
    assert_eq!(rec.away_goals, Some(2));
    assert_eq!(rec.away_corners, Some(6));
    assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 8, 18));
}

#[test]
fn schema_without_corner_columns_reports_no_corner_data() {
    let csv = "HomeTeam,AwayTeam,FTHG,FTAG\nArsenal,Wolves,2,0\n";
    let history = parse_history_csv(csv).unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history.has_corner_data());
}

#[test]
fn team_names_are_sorted_and_deduped() {
    let history = parse_history_csv(EPL_SAMPLE).unwrap();
    let names = history.team_names();
    assert_eq!(names.iter().filter(|n| n.as_str() == "Chelsea").count(), 1);
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}
