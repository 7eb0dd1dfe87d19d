use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    #[default]
    Scheduled,
    Live,
    Final,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Scheduled => write!(f, "SCHEDULED"),
            GameStatus::Live => write!(f, "LIVE"),
            GameStatus::Final => write!(f, "FINAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub home_team: Team,
    pub away_team: Team,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_national_tv: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster: Option<String>,
    pub status: GameStatus,
    // Usually absent for scheduled games, but never guaranteed either way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
}

impl Game {
    pub fn is_final(&self) -> bool {
        self.status == GameStatus::Final
    }

    /// "AWY @ HOM" matchup label
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team.abbr, self.home_team.abbr)
    }

    /// Score line "away-home", or None when either side is missing.
    pub fn score_line(&self) -> Option<String> {
        match (self.away_score, self.home_score) {
            (Some(away), Some(home)) => Some(format!("{}-{}", away, home)),
            _ => None,
        }
    }
}
