//! Upstream payload shapes as the feed actually sends them.
//!
//! The feed is third-party owned and changes without notice, so every field
//! is optional and every record list is decoded lossily: one record that
//! fails to decode is dropped with a warning instead of failing the batch.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Decode a JSON array element by element, dropping elements that fail.
/// A missing, null or non-array value yields an empty list.
pub(crate) fn lossy_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let items = match raw {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(record = std::any::type_name::<T>(), kind = %json_kind(&other), "Expected a list, ignoring");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(record = std::any::type_name::<T>(), error = %e, "Dropping malformed upstream record");
                None
            }
        })
        .collect())
}

/// Accept ids sent either as strings or as bare numbers.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ===== Shared =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireLogo {
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireTeam {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "shortDisplayName")]
    pub short_display_name: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub color: Option<String>,
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "lossy_vec")]
    pub logos: Vec<WireLogo>,
}

impl WireTeam {
    pub fn logo_url(&self) -> Option<&str> {
        self.logo
            .as_deref()
            .filter(|l| !l.is_empty())
            .or_else(|| self.logos.first().and_then(|l| l.href.as_deref()))
    }
}

// ===== Standings =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsResponse {
    /// One child group per conference
    #[serde(default, deserialize_with = "lossy_vec")]
    pub children: Vec<WireConference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireConference {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub standings: WireStandings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireStandings {
    #[serde(default, deserialize_with = "lossy_vec")]
    pub entries: Vec<WireStandingsEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireStandingsEntry {
    pub team: Option<WireTeam>,
    #[serde(default, deserialize_with = "lossy_vec")]
    pub stats: Vec<WireStat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireStat {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<Value>,
}

// ===== Scoreboard / team schedule =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreboardResponse {
    #[serde(default, deserialize_with = "lossy_vec")]
    pub events: Vec<WireEvent>,
}

/// Team schedule responses carry the same event shape as the scoreboard.
pub type TeamScheduleResponse = ScoreboardResponse;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub date: Option<String>,
    pub status: Option<WireStatus>,
    #[serde(default, deserialize_with = "lossy_vec")]
    pub competitions: Vec<WireCompetition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireStatus {
    #[serde(rename = "type")]
    pub kind: Option<WireStatusType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireStatusType {
    pub state: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCompetition {
    #[serde(default, deserialize_with = "lossy_vec")]
    pub competitors: Vec<WireCompetitor>,
    #[serde(default, deserialize_with = "lossy_vec")]
    pub broadcasts: Vec<WireBroadcast>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCompetitor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>,
    /// Number, numeric string, or `{ "value": .., "displayValue": .. }`
    pub score: Option<Value>,
    pub team: Option<WireTeam>,
    #[serde(default, deserialize_with = "lossy_vec")]
    pub records: Vec<WireRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRecord {
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireBroadcast {
    #[serde(default, deserialize_with = "lossy_vec")]
    pub names: Vec<String>,
}

// ===== Roster =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterResponse {
    #[serde(default)]
    pub team: WireRosterTeam,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRosterTeam {
    #[serde(default, deserialize_with = "lossy_vec")]
    pub athletes: Vec<WireAthlete>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireAthlete {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub position: Option<WirePosition>,
    pub headshot: Option<WireLogo>,
    #[serde(rename = "displayWeight")]
    pub display_weight: Option<String>,
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lossy_vec")]
    pub injuries: Vec<WireInjury>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WirePosition {
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireInjury {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<WireInjuryType>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireInjuryType {
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_event_is_dropped_not_fatal() {
        let raw = json!({
            "events": [
                { "id": "1", "date": "2024-01-15T00:30Z" },
                { "id": "2", "competitions": "not-a-list-of-objects", "status": 7 },
                { "id": 3, "date": "2024-01-16T00:30Z" }
            ]
        });
        let parsed: ScoreboardResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.events[1].id.as_deref(), Some("3"));
    }

    #[test]
    fn test_non_list_events_yields_empty() {
        let parsed: ScoreboardResponse = serde_json::from_value(json!({ "events": {} })).unwrap();
        assert!(parsed.events.is_empty());
        let parsed: ScoreboardResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn test_logo_url_prefers_inline_logo() {
        let team: WireTeam = serde_json::from_value(json!({
            "logo": "https://a/inline.png",
            "logos": [{ "href": "https://a/list.png" }]
        }))
        .unwrap();
        assert_eq!(team.logo_url(), Some("https://a/inline.png"));

        let team: WireTeam = serde_json::from_value(json!({ "logos": [{ "href": "https://a/list.png" }] })).unwrap();
        assert_eq!(team.logo_url(), Some("https://a/list.png"));
    }
}
