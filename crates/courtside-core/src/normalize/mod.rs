//! Upstream normalizer: pure functions mapping one upstream payload shape
//! into one domain entity.
//!
//! Every mapper returns `Option`: `None` means the record lacked something
//! the domain cannot do without (an id, a date, both competitors) and is
//! dropped by the caller. Everything else falls back to a default.

pub mod events;
pub mod roster;
pub mod standings;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::api::wire::WireStat;
use crate::models::{Conference, GameStatus};

pub use events::{game_from_scoreboard_event, game_from_team_schedule_event};
pub use roster::player_from_roster_athlete;
pub use standings::{team_from_standings_entry, teams_from_standings};

/// Used when the feed sends no team color at all
pub const DEFAULT_TEAM_COLOR: &str = "#1E1E1E";

/// Canonical `#RRGGBB` form. Accepts values with or without the leading `#`
/// and the 3-digit shorthand; anything else falls back to the default.
pub fn normalize_color(color: Option<&str>) -> String {
    let raw = color.map(str::trim).unwrap_or_default();
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return DEFAULT_TEAM_COLOR.to_string();
    }
    match hex.len() {
        6 => format!("#{}", hex.to_ascii_uppercase()),
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            format!("#{}", expanded.to_ascii_uppercase())
        }
        _ => DEFAULT_TEAM_COLOR.to_string(),
    }
}

/// Three-way status rule: a completed flag or the terminal `post` state is
/// FINAL, the `in` state is LIVE, everything else (absent included) is SCHEDULED.
pub fn derive_status(completed: Option<bool>, state: Option<&str>) -> GameStatus {
    let state = state.map(str::trim).unwrap_or_default();
    if completed == Some(true) || state.eq_ignore_ascii_case("post") {
        GameStatus::Final
    } else if state.eq_ignore_ascii_case("in") {
        GameStatus::Live
    } else {
        GameStatus::Scheduled
    }
}

/// Score from a number, a numeric string, or an object carrying `value` or
/// `displayValue`. Unparsable input is 0.
pub fn parse_score(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .map(|v| v.min(u64::from(u32::MAX)) as u32)
            .unwrap_or(0),
        Value::String(s) => leading_number(s).unwrap_or(0),
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("displayValue"))
            .map(parse_score)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Parse the leading run of digits ("112 (OT)" -> 112).
fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Split "Los Angeles Lakers" into ("Los Angeles", "Lakers").
/// A single word is treated as the nickname.
pub fn split_display_name(name: &str) -> (Option<String>, Option<String>) {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.split_last() {
        None => (None, None),
        Some((last, [])) => (None, Some(last.to_string())),
        Some((last, rest)) => (Some(rest.join(" ")), Some(last.to_string())),
    }
}

pub fn conference_from_name(name: &str) -> Conference {
    if name.to_ascii_lowercase().contains("east") {
        Conference::East
    } else {
        Conference::West
    }
}

/// Wins and losses from a "24-23" record summary.
pub fn record_from_summary(summary: &str) -> (u32, u32) {
    let mut parts = summary.split('-');
    let wins = parts.next().and_then(leading_number).unwrap_or(0);
    let losses = parts.next().and_then(leading_number).unwrap_or(0);
    (wins, losses)
}

/// Event timestamps. The feed mostly sends minute precision
/// (`2024-01-15T00:30Z`), which is not valid RFC 3339.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Look up a named statistic in a flat stats list. Missing or non-numeric is 0.
pub fn stat_value(stats: &[WireStat], name: &str) -> f64 {
    stats
        .iter()
        .find(|s| s.name.as_deref() == Some(name))
        .and_then(|s| s.value.as_ref())
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Non-negative whole number from a stat value.
pub(crate) fn stat_count(stats: &[WireStat], name: &str) -> u32 {
    let value = stat_value(stats, name);
    if value <= 0.0 {
        0
    } else {
        value.round().min(f64::from(u32::MAX)) as u32
    }
}

/// First non-empty string among the candidates
pub(crate) fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .map(str::trim)
        .find(|s| !s.is_empty())
}
