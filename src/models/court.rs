//! Court: a physical court snapshot or a planned queue entry.

use serde::{Deserialize, Serialize};

use crate::models::player::Username;
use crate::models::Timestamp;

/// Numeric court identifier.
pub type CourtId = u32;

/// Number of players on a doubles court.
pub const PLAYERS_PER_COURT: usize = 4;

/// Which side of the net a slot belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Slots 0 and 2 are side A, slots 1 and 3 side B.
    pub fn of_slot(slot: usize) -> Side {
        if slot % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }
}

/// A court: either empty or exactly four usernames in slot order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    /// Empty, or four usernames. Slots 0/2 and 1/3 are the two teams.
    pub players: Vec<Username>,
    /// Real start for an active court, projected start for a planned one.
    pub start_time: Option<Timestamp>,
}

impl Court {
    /// An empty court.
    pub fn empty(id: CourtId) -> Self {
        Self {
            id,
            players: Vec::new(),
            start_time: None,
        }
    }

    pub fn new(id: CourtId, players: Vec<Username>, start_time: Timestamp) -> Self {
        Self {
            id,
            players,
            start_time: Some(start_time),
        }
    }

    /// True when four players are assigned.
    pub fn is_occupied(&self) -> bool {
        self.players.len() == PLAYERS_PER_COURT
    }

    pub fn contains(&self, username: &str) -> bool {
        self.players.iter().any(|p| p == username)
    }

    /// Usernames on the given side, in slot order.
    pub fn team(&self, side: Side) -> Vec<&str> {
        self.players
            .iter()
            .enumerate()
            .filter(|(slot, _)| Side::of_slot(*slot) == side)
            .map(|(_, p)| p.as_str())
            .collect()
    }

    /// Remove all players and the start time.
    pub fn clear(&mut self) {
        self.players.clear();
        self.start_time = None;
    }
}
