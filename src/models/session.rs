//! Session: the canonical player/court records plus the last computed plan.

use crate::models::court::{Court, CourtId};
use crate::models::player::{clamp_skill, Gender, Player, Username};
use crate::models::settings::SessionSettings;
use crate::models::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors returned by session operations. The scheduler itself never fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionError {
    CourtNotFound(CourtId),
    /// Tried to start a game on a court that already has one.
    CourtOccupied(CourtId),
    /// Tried to finish a game on a court with no game.
    CourtEmpty(CourtId),
    /// Fewer than four eligible players.
    NotEnoughPlayers,
    PlayerNotFound(Username),
    DuplicateUsername(Username),
    /// Name or username is empty after trimming.
    InvalidName,
    InvalidSettings(&'static str),
    QueueEntryNotFound(usize),
    InvalidSlot(usize),
    /// No eligible player can take the skipped slot.
    NoReplacement,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::CourtNotFound(id) => write!(f, "Court {} not found", id),
            SessionError::CourtOccupied(id) => write!(f, "Court {} already has a game", id),
            SessionError::CourtEmpty(id) => write!(f, "Court {} has no game in progress", id),
            SessionError::NotEnoughPlayers => write!(f, "Need at least 4 available players to schedule a game"),
            SessionError::PlayerNotFound(u) => write!(f, "Player '{}' not found", u),
            SessionError::DuplicateUsername(u) => write!(f, "A player with username '{}' already exists", u),
            SessionError::InvalidName => write!(f, "Name and username must not be empty"),
            SessionError::InvalidSettings(reason) => write!(f, "Invalid settings: {}", reason),
            SessionError::QueueEntryNotFound(i) => write!(f, "Queue entry {} not found", i),
            SessionError::InvalidSlot(s) => write!(f, "Slot {} is not a valid court slot", s),
            SessionError::NoReplacement => write!(f, "No available player can replace the skipped player"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Full session state: roster, physical courts, settings and the current plan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub players: Vec<Player>,
    /// Physical courts, in id order.
    pub courts: Vec<Court>,
    /// Planned upcoming courts. Regenerated on every event.
    pub queue: Vec<Court>,
    pub settings: SessionSettings,
}

impl Session {
    /// Create a session with `settings.court_count` empty courts and no players.
    pub fn new(settings: SessionSettings) -> Result<Self, SessionError> {
        settings.validate()?;
        let courts = (0..settings.court_count as CourtId).map(Court::empty).collect();
        Ok(Self {
            id: Uuid::new_v4(),
            players: Vec::new(),
            courts,
            queue: Vec::new(),
            settings,
        })
    }

    pub fn get_player(&self, username: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.username == username)
    }

    pub fn get_player_mut(&mut self, username: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.username == username)
    }

    pub fn court(&self, id: CourtId) -> Result<&Court, SessionError> {
        self.courts
            .iter()
            .find(|c| c.id == id)
            .ok_or(SessionError::CourtNotFound(id))
    }

    pub fn court_mut(&mut self, id: CourtId) -> Result<&mut Court, SessionError> {
        self.courts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SessionError::CourtNotFound(id))
    }

    /// Add a player. Usernames are unique (case-sensitive); names and usernames are trimmed.
    pub fn add_player(&mut self, mut player: Player) -> Result<(), SessionError> {
        player.name = player.name.trim().to_string();
        player.username = player.username.trim().to_string();
        if player.name.is_empty() || player.username.is_empty() {
            return Err(SessionError::InvalidName);
        }
        if self.get_player(&player.username).is_some() {
            return Err(SessionError::DuplicateUsername(player.username));
        }
        log::info!("Session {}: added player {}", self.id, player.username);
        self.players.push(player);
        Ok(())
    }

    /// Add several players at once. Either all are added or, on the first
    /// invalid or clashing entry, none are.
    pub fn add_players(&mut self, players: Vec<Player>) -> Result<(), SessionError> {
        let mut batch = Vec::with_capacity(players.len());
        for mut player in players {
            player.name = player.name.trim().to_string();
            player.username = player.username.trim().to_string();
            if player.name.is_empty() || player.username.is_empty() {
                return Err(SessionError::InvalidName);
            }
            let clashes = self.get_player(&player.username).is_some()
                || batch.iter().any(|p: &Player| p.username == player.username);
            if clashes {
                return Err(SessionError::DuplicateUsername(player.username));
            }
            batch.push(player);
        }
        log::info!("Session {}: added {} player(s)", self.id, batch.len());
        self.players.extend(batch);
        Ok(())
    }

    /// Change a player's display name, skill (clamped) and/or gender.
    pub fn edit_player(
        &mut self,
        username: &str,
        name: Option<&str>,
        skill_level: Option<i64>,
        gender: Option<Option<Gender>>,
    ) -> Result<(), SessionError> {
        let player = self
            .get_player_mut(username)
            .ok_or_else(|| SessionError::PlayerNotFound(username.to_string()))?;
        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(SessionError::InvalidName);
            }
            player.name = name.to_string();
        }
        if let Some(skill) = skill_level {
            player.skill_level = clamp_skill(skill);
        }
        if let Some(gender) = gender {
            player.gender = gender;
        }
        Ok(())
    }

    /// Enable or disable a player. Re-enabling starts their wait over at `now`.
    pub fn set_player_enabled(
        &mut self,
        username: &str,
        enabled: bool,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        let player = self
            .get_player_mut(username)
            .ok_or_else(|| SessionError::PlayerNotFound(username.to_string()))?;
        if enabled && !player.enabled && !player.playing {
            player.last_played = now;
        }
        player.enabled = enabled;
        Ok(())
    }

    /// Replace the settings, growing or shrinking the court list to match.
    /// Courts with a game in progress cannot be removed.
    pub fn update_settings(&mut self, settings: SessionSettings) -> Result<(), SessionError> {
        settings.validate()?;
        let target = settings.court_count;
        if self.courts.iter().skip(target).any(Court::is_occupied) {
            return Err(SessionError::InvalidSettings(
                "cannot remove a court with a game in progress",
            ));
        }
        self.courts.truncate(target);
        while self.courts.len() < target {
            let next_id = self.courts.iter().map(|c| c.id + 1).max().unwrap_or(0);
            self.courts.push(Court::empty(next_id));
        }
        self.settings = settings;
        Ok(())
    }
}
