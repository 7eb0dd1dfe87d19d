//! Plain-text rendering of standings, schedule and team detail.

use std::fmt::Write;

use chrono::Local;
use courtside_core::cache::CacheEntryInfo;
use courtside_core::{Game, Player, Team, TeamDetailBundle};

pub fn standings_table(teams: &[Team]) -> String {
    if teams.is_empty() {
        return "No standings available.\n".to_string();
    }

    let mut out = String::new();
    let mut conference = None;
    for team in teams {
        if conference != Some(team.conference) {
            conference = Some(team.conference);
            let _ = writeln!(out, "\n{} Conference", team.conference);
            let _ = writeln!(out, "{:>3}  {:<5} {:<24} {:>7} {:>6}", "#", "TEAM", "NAME", "W-L", "PCT");
        }
        let rank = if team.rank == 0 { "-".to_string() } else { team.rank.to_string() };
        let _ = writeln!(
            out,
            "{:>3}  {:<5} {:<24} {:>7} {:>6.3}",
            rank,
            team.abbr,
            team.name,
            team.record(),
            team.win_pct()
        );
    }
    out
}

fn game_row(game: &Game) -> String {
    let when = game.date.with_timezone(&Local).format("%a %b %e %H:%M").to_string();
    let result = game.score_line().unwrap_or_else(|| game.status.to_string());
    let tv = match (&game.broadcaster, game.is_national_tv) {
        (Some(name), true) => format!("{} (national)", name),
        (Some(name), false) => name.clone(),
        (None, _) => String::new(),
    };
    format!("{:<16} {:<11} {:>9}  {}", when, game.matchup(), result, tv)
        .trim_end()
        .to_string()
}

pub fn schedule_table(games: &[Game]) -> String {
    if games.is_empty() {
        return "No games scheduled.\n".to_string();
    }
    games.iter().map(|g| game_row(g) + "\n").collect()
}

fn player_row(player: &Player) -> String {
    let injury = player
        .injury_status
        .as_ref()
        .map(|i| format!("{:?}", i.status))
        .unwrap_or_default();
    format!("{:<26} {:<4} {:>3}  {}", player.name, player.position, player.age, injury)
        .trim_end()
        .to_string()
}

pub fn team_detail(bundle: &TeamDetailBundle) -> String {
    if bundle.is_empty() {
        return "No team data available.\n".to_string();
    }

    let mut out = String::from("Roster\n");
    for player in &bundle.roster {
        let _ = writeln!(out, "  {}", player_row(player));
    }
    out.push_str("\nNext games\n");
    for game in &bundle.next_games {
        let _ = writeln!(out, "  {}", game_row(game));
    }
    out.push_str("\nLast games\n");
    for game in &bundle.last_games {
        let _ = writeln!(out, "  {}", game_row(game));
    }
    out
}

pub fn cache_status(entries: &[CacheEntryInfo]) -> String {
    if entries.is_empty() {
        return "Cache is empty.\n".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let age = entry.age.as_deref().unwrap_or("unreadable");
            let state = if entry.expired { "expired" } else { "fresh" };
            format!("{:<28} {:<12} {}\n", entry.key, age, state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use courtside_core::{Conference, GameStatus};

    fn team(abbr: &str, conference: Conference, rank: u32) -> Team {
        Team {
            id: abbr.to_lowercase(),
            name: format!("{} Team", abbr),
            location: None,
            nickname: None,
            abbr: abbr.to_string(),
            color: "#1E1E1E".to_string(),
            logo_url: String::new(),
            wins: 30,
            losses: 10,
            conference,
            rank,
        }
    }

    #[test]
    fn test_standings_groups_by_conference() {
        let teams = vec![
            team("BOS", Conference::East, 1),
            team("NYK", Conference::East, 0),
            team("OKC", Conference::West, 1),
        ];
        let out = standings_table(&teams);
        let east = out.find("East Conference").unwrap();
        let west = out.find("West Conference").unwrap();
        assert!(east < west);
        assert_eq!(out.matches("Conference").count(), 2);
        assert!(out.contains("30-10"));
        assert!(out.contains("  -  NYK"));
    }

    #[test]
    fn test_empty_outputs() {
        assert_eq!(standings_table(&[]), "No standings available.\n");
        assert_eq!(schedule_table(&[]), "No games scheduled.\n");
        assert_eq!(team_detail(&TeamDetailBundle::default()), "No team data available.\n");
        assert_eq!(cache_status(&[]), "Cache is empty.\n");
    }

    #[test]
    fn test_game_row_shows_score_or_status() {
        let mut game = Game {
            id: "1".to_string(),
            home_team: team("BOS", Conference::East, 0),
            away_team: team("LAL", Conference::West, 0),
            date: Utc.with_ymd_and_hms(2025, 1, 15, 0, 30, 0).unwrap(),
            is_national_tv: true,
            broadcaster: Some("ESPN".to_string()),
            status: GameStatus::Scheduled,
            home_score: None,
            away_score: None,
        };
        let row = game_row(&game);
        assert!(row.contains("LAL @ BOS"));
        assert!(row.contains("SCHEDULED"));
        assert!(row.ends_with("ESPN (national)"));

        game.status = GameStatus::Final;
        game.home_score = Some(110);
        game.away_score = Some(102);
        assert!(game_row(&game).contains("102-110"));
    }

    #[test]
    fn test_cache_status_rows() {
        let entries = vec![
            CacheEntryInfo {
                key: "standings_v2".to_string(),
                age: Some("5m ago".to_string()),
                expired: false,
            },
            CacheEntryInfo {
                key: "schedule_v3".to_string(),
                age: None,
                expired: true,
            },
        ];
        let out = cache_status(&entries);
        assert!(out.lines().next().unwrap().ends_with("fresh"));
        assert!(out.contains("unreadable"));
        assert!(out.lines().nth(1).unwrap().ends_with("expired"));
    }
}
