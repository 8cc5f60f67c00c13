//! Player record: identity, skill, and committed session stats.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Timestamp;

/// Unique key for a player within a session.
pub type Username = String;

/// Lowest skill level a player can hold.
pub const MIN_SKILL: u8 = 1;
/// Highest skill level a player can hold.
pub const MAX_SKILL: u8 = 8;

/// Gender category used by the gender score. Unset is modeled as `Option::None`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse a roster/API spelling (`m`, `male`, `f`, `female`, any case). Empty means unset.
    pub fn parse(raw: &str) -> Result<Option<Gender>, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "m" | "male" => Ok(Some(Gender::Male)),
            "f" | "female" => Ok(Some(Gender::Female)),
            other => Err(other.to_string()),
        }
    }
}

/// Clamp a raw skill value into `MIN_SKILL..=MAX_SKILL`.
pub fn clamp_skill(raw: i64) -> u8 {
    raw.clamp(MIN_SKILL as i64, MAX_SKILL as i64) as u8
}

/// A player in the session.
///
/// Only committed state lives here. Planning passes never write to a `Player`;
/// they work on a [`Projection`](crate::logic::Projection) instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub username: Username,
    pub skill_level: u8,
    pub gender: Option<Gender>,
    /// Participates in this session's scheduling.
    pub enabled: bool,
    /// Currently on a court.
    pub playing: bool,
    /// End of the player's last game, or when they joined if they have not played yet.
    pub last_played: Timestamp,
    /// When this player last finished a game on the same court as each other player.
    #[serde(default)]
    pub last_partnered: HashMap<Username, Timestamp>,
    pub games_played: u32,
    /// How many games this player has shared a court with each other player.
    #[serde(default)]
    pub times_partnered: HashMap<Username, u32>,
}

impl Player {
    /// Create an enabled player who starts waiting at `joined`.
    pub fn new(
        name: impl Into<String>,
        username: impl Into<Username>,
        skill_level: u8,
        joined: Timestamp,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            skill_level: skill_level.clamp(MIN_SKILL, MAX_SKILL),
            gender: None,
            enabled: true,
            playing: false,
            last_played: joined,
            last_partnered: HashMap::new(),
            games_played: 0,
            times_partnered: HashMap::new(),
        }
    }

    /// Builder-style gender setter.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Mark the player as on court.
    pub fn start_game(&mut self) {
        self.playing = true;
    }

    /// Commit the end of a game played alongside `court_mates`.
    pub fn finish_game<'a>(&mut self, court_mates: impl IntoIterator<Item = &'a str>, ended: Timestamp) {
        self.playing = false;
        self.last_played = ended;
        self.games_played += 1;
        for mate in court_mates {
            if mate == self.username {
                continue;
            }
            self.last_partnered.insert(mate.to_string(), ended);
            *self.times_partnered.entry(mate.to_string()).or_insert(0) += 1;
        }
    }
}
