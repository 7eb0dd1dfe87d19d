use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InjuryDesignation {
    Out,
    Doubtful,
    Questionable,
    DayToDay,
    Unknown,
}

impl InjuryDesignation {
    /// Map an upstream status label ("Out", "Day-To-Day", ...) onto a designation.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "out" => InjuryDesignation::Out,
            "doubtful" => InjuryDesignation::Doubtful,
            "questionable" => InjuryDesignation::Questionable,
            "daytoday" => InjuryDesignation::DayToDay,
            _ => InjuryDesignation::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryStatus {
    pub status: InjuryDesignation,
    pub detail: String,
    pub return_date: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
    /// Effective field goal %
    pub efg: f64,
    /// True shooting %
    pub ts: f64,
    /// Usage rate %
    pub usg: f64,
    /// Player efficiency rating
    pub per: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatLines {
    pub season: PlayerStats,
    pub last10: PlayerStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SalaryKind {
    Guaranteed,
    NonGuaranteed,
    #[serde(rename = "TEAM_OPTION")]
    TeamOption,
    #[serde(rename = "PLAYER_OPTION")]
    PlayerOption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryYear {
    pub year: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: SalaryKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub years: Vec<SalaryYear>,
    pub total_value: f64,
    pub expiry_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Looked up against the standings, not owned.
    pub team_id: String,
    pub position: String,
    pub headshot_url: String,
    pub weight: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_status: Option<InjuryStatus>,
    pub stats: PlayerStatLines,
    pub contract: Contract,
}

impl Player {
    pub fn is_injured(&self) -> bool {
        self.injury_status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injury_designation_from_label() {
        assert_eq!(InjuryDesignation::from_label("Out"), InjuryDesignation::Out);
        assert_eq!(InjuryDesignation::from_label("QUESTIONABLE"), InjuryDesignation::Questionable);
        assert_eq!(InjuryDesignation::from_label("Day-To-Day"), InjuryDesignation::DayToDay);
        assert_eq!(InjuryDesignation::from_label("Suspended"), InjuryDesignation::Unknown);
    }

    #[test]
    fn test_salary_kind_wire_names() {
        assert_eq!(serde_json::to_value(SalaryKind::NonGuaranteed).unwrap(), "NON-GUARANTEED");
        assert_eq!(serde_json::to_value(SalaryKind::TeamOption).unwrap(), "TEAM_OPTION");
    }
}
