//! Scoreboard and team-schedule events -> `Game`.
//!
//! Both endpoints send the same event shape but differ in what they carry:
//! scoreboard competitors have records and broadcasts, team-schedule
//! competitors do not.

use super::{derive_status, first_non_empty, normalize_color, parse_event_date, parse_score, record_from_summary, split_display_name};
use crate::api::wire::{WireCompetition, WireCompetitor, WireEvent};
use crate::models::{Conference, Game, Team};

/// Networks that count as national TV
const NATIONAL_BROADCASTERS: [&str; 3] = ["ABC", "ESPN", "TNT"];

/// Shown when a scoreboard event lists no broadcast
const DEFAULT_BROADCASTER: &str = "League Pass";

/// Which upstream endpoint an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventSource {
    Scoreboard,
    TeamSchedule,
}

pub fn game_from_scoreboard_event(event: &WireEvent) -> Option<Game> {
    game_from_event(event, EventSource::Scoreboard)
}

pub fn game_from_team_schedule_event(event: &WireEvent) -> Option<Game> {
    game_from_event(event, EventSource::TeamSchedule)
}

fn game_from_event(event: &WireEvent, source: EventSource) -> Option<Game> {
    let id = first_non_empty(&[event.id.as_deref()])?.to_string();
    let date = parse_event_date(event.date.as_deref()?)?;
    let competition = event.competitions.first()?;
    let home = find_side(competition, "home")?;
    let away = find_side(competition, "away")?;

    let status_type = event.status.as_ref().and_then(|s| s.kind.as_ref());
    let status = derive_status(
        status_type.and_then(|t| t.completed),
        status_type.and_then(|t| t.state.as_deref()),
    );

    let with_record = source == EventSource::Scoreboard;
    let (is_national_tv, broadcaster) = match source {
        EventSource::Scoreboard => broadcast_info(competition),
        EventSource::TeamSchedule => (false, None),
    };

    Some(Game {
        id,
        home_team: team_from_competitor(home, with_record),
        away_team: team_from_competitor(away, with_record),
        date,
        is_national_tv,
        broadcaster,
        status,
        home_score: home.score.as_ref().filter(|v| !v.is_null()).map(parse_score),
        away_score: away.score.as_ref().filter(|v| !v.is_null()).map(parse_score),
    })
}

fn find_side<'a>(competition: &'a WireCompetition, side: &str) -> Option<&'a WireCompetitor> {
    competition
        .competitors
        .iter()
        .find(|c| c.home_away.as_deref().is_some_and(|h| h.eq_ignore_ascii_case(side)))
}

fn broadcast_info(competition: &WireCompetition) -> (bool, Option<String>) {
    let is_national_tv = competition
        .broadcasts
        .iter()
        .filter_map(|b| b.names.first())
        .any(|name| NATIONAL_BROADCASTERS.contains(&name.trim()));
    let broadcaster = competition
        .broadcasts
        .first()
        .and_then(|b| first_non_empty(&[b.names.first().map(String::as_str)]))
        .unwrap_or(DEFAULT_BROADCASTER)
        .to_string();
    (is_national_tv, Some(broadcaster))
}

/// Team snapshot embedded in a game. Conference and rank are placeholders;
/// the standings own those values.
fn team_from_competitor(competitor: &WireCompetitor, with_record: bool) -> Team {
    let team = competitor.team.clone().unwrap_or_default();
    let name = first_non_empty(&[team.display_name.as_deref(), team.name.as_deref()])
        .unwrap_or("Unknown")
        .to_string();
    let (derived_location, derived_nickname) = split_display_name(&name);

    let (wins, losses) = if with_record {
        competitor
            .records
            .first()
            .and_then(|r| r.summary.as_deref())
            .map(record_from_summary)
            .unwrap_or((0, 0))
    } else {
        (0, 0)
    };

    Team {
        id: first_non_empty(&[team.id.as_deref(), competitor.id.as_deref()])
            .unwrap_or_default()
            .to_string(),
        location: first_non_empty(&[team.location.as_deref()])
            .map(str::to_string)
            .or(derived_location),
        nickname: first_non_empty(&[team.name.as_deref(), team.short_display_name.as_deref()])
            .map(str::to_string)
            .or(derived_nickname),
        abbr: team.abbreviation.clone().unwrap_or_default(),
        color: normalize_color(team.color.as_deref()),
        logo_url: team.logo_url().unwrap_or_default().to_string(),
        wins,
        losses,
        conference: Conference::East,
        rank: 0,
        name,
    }
}
