use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Conference {
    #[default]
    East,
    West,
}

impl std::fmt::Display for Conference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conference::East => write!(f, "East"),
            Conference::West => write!(f, "West"),
        }
    }
}

/// A team as shown in the standings.
///
/// Teams embedded in a `Game` are snapshots taken from the schedule payload;
/// their record and placement may lag behind the standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub abbr: String,
    pub color: String,
    pub logo_url: String,
    pub wins: u32,
    pub losses: u32,
    pub conference: Conference,
    pub rank: u32,
}

impl Team {
    /// Win-loss record, e.g. "24-23"
    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }

    pub fn win_pct(&self) -> f64 {
        let played = self.wins + self.losses;
        if played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(played)
        }
    }

    /// Short label preferring the nickname ("Lakers") over the full name.
    pub fn short_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}
