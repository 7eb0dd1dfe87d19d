//! Domain models consumed by the rendering layer.
//!
//! - `Team`: standings entry (also embedded as a snapshot inside `Game`)
//! - `Game`: scheduled, live or completed matchup
//! - `Player`: roster entry with injury, statistics and contract data
//! - `TeamDetailBundle`: the aggregate cached per team
//!
//! All types round-trip through serde because they are persisted in the
//! response cache. Field names use the camelCase wire form.

pub mod game;
pub mod player;
pub mod team;

use serde::{Deserialize, Serialize};

pub use game::{Game, GameStatus};
pub use player::{Contract, InjuryDesignation, InjuryStatus, Player, PlayerStatLines, PlayerStats, SalaryKind, SalaryYear};
pub use team::{Conference, Team};

/// Everything shown on a team page. Cached as one unit per team id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailBundle {
    pub roster: Vec<Player>,
    pub next_games: Vec<Game>,
    pub last_games: Vec<Game>,
}

impl TeamDetailBundle {
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty() && self.next_games.is_empty() && self.last_games.is_empty()
    }
}
