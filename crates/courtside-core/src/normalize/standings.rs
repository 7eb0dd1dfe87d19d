//! League standings entries -> `Team`.

use tracing::debug;

use super::{conference_from_name, first_non_empty, normalize_color, split_display_name, stat_count};
use crate::api::wire::{StandingsResponse, WireStandingsEntry};
use crate::models::{Conference, Team};

/// Map one standings entry. Dropped when the entry has no team id.
///
/// Wins, losses and rank come from the entry's flat stats list by name;
/// rank is the playoff seed.
pub fn team_from_standings_entry(entry: &WireStandingsEntry, conference: Conference) -> Option<Team> {
    let team = entry.team.as_ref()?;
    let id = first_non_empty(&[team.id.as_deref()])?.to_string();

    let name = first_non_empty(&[team.display_name.as_deref(), team.name.as_deref()])
        .unwrap_or("Unknown")
        .to_string();
    let (derived_location, derived_nickname) = split_display_name(&name);

    Some(Team {
        id,
        location: first_non_empty(&[team.location.as_deref()])
            .map(str::to_string)
            .or(derived_location),
        nickname: first_non_empty(&[team.name.as_deref()])
            .map(str::to_string)
            .or(derived_nickname),
        abbr: team.abbreviation.clone().unwrap_or_default(),
        color: normalize_color(team.color.as_deref()),
        logo_url: team.logo_url().unwrap_or_default().to_string(),
        wins: stat_count(&entry.stats, "wins"),
        losses: stat_count(&entry.stats, "losses"),
        conference,
        rank: stat_count(&entry.stats, "playoffSeed"),
        name,
    })
}

/// Walk conference groups, then each group's entries.
pub fn teams_from_standings(response: &StandingsResponse) -> Vec<Team> {
    let mut teams = Vec::new();
    for group in &response.children {
        let label = first_non_empty(&[group.name.as_deref(), group.abbreviation.as_deref()]).unwrap_or_default();
        let conference = conference_from_name(label);
        let before = teams.len();
        teams.extend(
            group
                .standings
                .entries
                .iter()
                .filter_map(|entry| team_from_standings_entry(entry, conference)),
        );
        debug!(
            conference = %conference,
            kept = teams.len() - before,
            received = group.standings.entries.len(),
            "Normalized standings group"
        );
    }
    teams
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: serde_json::Value) -> WireStandingsEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_entry() {
        let e = entry(json!({
            "team": {
                "id": "2",
                "displayName": "Boston Celtics",
                "location": "Boston",
                "name": "Celtics",
                "abbreviation": "BOS",
                "color": "007a33",
                "logos": [{ "href": "https://a.espncdn.com/i/teamlogos/nba/500/bos.png" }]
            },
            "stats": [
                { "name": "wins", "value": 35.0 },
                { "name": "losses", "value": 10.0 },
                { "name": "playoffSeed", "value": 1.0 }
            ]
        }));
        let team = team_from_standings_entry(&e, Conference::East).unwrap();
        assert_eq!(team.id, "2");
        assert_eq!(team.name, "Boston Celtics");
        assert_eq!(team.location.as_deref(), Some("Boston"));
        assert_eq!(team.nickname.as_deref(), Some("Celtics"));
        assert_eq!(team.color, "#007A33");
        assert_eq!(team.logo_url, "https://a.espncdn.com/i/teamlogos/nba/500/bos.png");
        assert_eq!((team.wins, team.losses, team.rank), (35, 10, 1));
        assert_eq!(team.conference, Conference::East);
    }

    #[test]
    fn test_location_and_nickname_derived_from_name() {
        let e = entry(json!({
            "team": { "id": 13, "displayName": "Los Angeles Lakers", "abbreviation": "LAL" },
            "stats": [{ "name": "wins", "value": 24 }]
        }));
        let team = team_from_standings_entry(&e, Conference::West).unwrap();
        assert_eq!(team.id, "13");
        assert_eq!(team.location.as_deref(), Some("Los Angeles"));
        assert_eq!(team.nickname.as_deref(), Some("Lakers"));
        assert_eq!(team.wins, 24);
        // Missing named stats default to zero
        assert_eq!(team.losses, 0);
        assert_eq!(team.rank, 0);
        assert_eq!(team.color, super::super::DEFAULT_TEAM_COLOR);
        assert_eq!(team.logo_url, "");
    }

    #[test]
    fn test_entry_without_team_id_is_dropped() {
        assert!(team_from_standings_entry(&entry(json!({ "stats": [] })), Conference::East).is_none());
        assert!(team_from_standings_entry(&entry(json!({ "team": { "displayName": "X" } })), Conference::East).is_none());
    }

    #[test]
    fn test_teams_from_standings_groups() {
        let response: StandingsResponse = serde_json::from_value(json!({
            "children": [
                {
                    "name": "Eastern Conference",
                    "standings": { "entries": [
                        { "team": { "id": "2", "displayName": "Boston Celtics" }, "stats": [] },
                        { "team": { "displayName": "No Id" }, "stats": [] },
                        "garbage"
                    ] }
                },
                {
                    "name": "Western Conference",
                    "standings": { "entries": [
                        { "team": { "id": "7", "displayName": "Denver Nuggets" }, "stats": [] }
                    ] }
                }
            ]
        }))
        .unwrap();
        let teams = teams_from_standings(&response);
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].conference, Conference::East);
        assert_eq!(teams[1].conference, Conference::West);
        assert_eq!(teams[1].nickname.as_deref(), Some("Nuggets"));
    }
}
