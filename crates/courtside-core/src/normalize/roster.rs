//! Team roster athletes -> `Player`.
//!
//! The roster endpoint carries no per-player statistics or contract data,
//! so those are zeroed placeholders.

use super::first_non_empty;
use crate::api::wire::WireAthlete;
use crate::models::{Contract, InjuryDesignation, InjuryStatus, Player, PlayerStatLines};

const DEFAULT_HEADSHOT_URL: &str = "https://a.espncdn.com/i/headshots/nba/players/full/0.png";
const DEFAULT_POSITION: &str = "N/A";

/// Contract expiry reported when no contract data is known
const PLACEHOLDER_EXPIRY_YEAR: i32 = 2025;

pub fn player_from_roster_athlete(athlete: &WireAthlete, team_id: &str) -> Option<Player> {
    let id = first_non_empty(&[athlete.id.as_deref()])?.to_string();
    let name = first_non_empty(&[athlete.full_name.as_deref(), athlete.display_name.as_deref()])
        .unwrap_or("Unknown")
        .to_string();

    let injury_status = athlete.injuries.first().map(|injury| InjuryStatus {
        status: InjuryDesignation::from_label(injury.status.as_deref().unwrap_or_default()),
        detail: injury
            .kind
            .as_ref()
            .and_then(|k| k.description.clone())
            .unwrap_or_default(),
        return_date: injury.date.clone().unwrap_or_default(),
    });

    let age = athlete
        .age
        .filter(|a| a.is_finite() && *a > 0.0)
        .map(|a| a.round() as u32)
        .unwrap_or(0);

    Some(Player {
        team_id: team_id.to_string(),
        position: first_non_empty(&[athlete.position.as_ref().and_then(|p| p.abbreviation.as_deref())])
            .unwrap_or(DEFAULT_POSITION)
            .to_string(),
        headshot_url: first_non_empty(&[athlete.headshot.as_ref().and_then(|h| h.href.as_deref())])
            .unwrap_or(DEFAULT_HEADSHOT_URL)
            .to_string(),
        weight: athlete.display_weight.clone().unwrap_or_default(),
        age,
        injury_status,
        stats: PlayerStatLines::default(),
        contract: Contract {
            player_id: id.clone(),
            player_name: name.clone(),
            years: Vec::new(),
            total_value: 0.0,
            expiry_year: PLACEHOLDER_EXPIRY_YEAR,
        },
        id,
        name,
    })
}
