//! Per-pass projection of player availability and partner history.
//!
//! Built fresh from committed state at the start of each planning call and
//! dropped at the end. Nothing here is ever written back to a [`Player`].

use std::collections::HashMap;

use crate::models::{Court, Player, SessionSettings, Timestamp, Username, PLAYERS_PER_COURT};

/// Planning-only view of one player.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedState {
    /// Earliest time the player is free for another game.
    pub next_available: Timestamp,
    /// Projected end of the real court the player is on, if any.
    pub committed_until: Option<Timestamp>,
    pub last_partnered: HashMap<Username, Timestamp>,
    pub times_partnered: HashMap<Username, u32>,
}

impl ProjectedState {
    fn from_committed(player: &Player) -> Self {
        Self {
            next_available: player.last_played,
            committed_until: None,
            last_partnered: player.last_partnered.clone(),
            times_partnered: player.times_partnered.clone(),
        }
    }

    /// Still on a real court when a game starting at `game_start` begins.
    /// A court ending exactly at `game_start` has already freed its players.
    pub fn is_committed_at(&self, game_start: Timestamp) -> bool {
        self.committed_until.is_some_and(|end| end > game_start)
    }

    /// Free to start a game at `game_start`.
    pub fn is_available_at(&self, game_start: Timestamp) -> bool {
        game_start >= self.free_at()
    }

    /// Earliest instant the player is both off court and not booked.
    pub fn free_at(&self) -> Timestamp {
        self.committed_until
            .map_or(self.next_available, |end| end.max(self.next_available))
    }

    fn partner_with(&mut self, other: &str, until: Timestamp) {
        self.last_partnered.insert(other.to_string(), until);
        *self.times_partnered.entry(other.to_string()).or_insert(0) += 1;
    }
}

/// Scratch state for one planning pass, keyed by username.
#[derive(Clone, Debug, Default)]
pub struct Projection {
    states: HashMap<Username, ProjectedState>,
}

impl Projection {
    /// Seed from committed state, then credit players on `active_courts` with
    /// their court's projected end and their current court-mates.
    ///
    /// A player marked as playing but listed on none of `active_courts` is
    /// treated as on a game that started at `now`.
    pub fn seed(
        players: &[&Player],
        active_courts: &[Court],
        settings: &SessionSettings,
        now: Timestamp,
    ) -> Self {
        let mut states: HashMap<Username, ProjectedState> = players
            .iter()
            .map(|p| (p.username.clone(), ProjectedState::from_committed(p)))
            .collect();

        for court in active_courts.iter().filter(|c| c.is_occupied()) {
            let start = court.start_time.unwrap_or(now);
            let end = projected_end(start, settings, now);
            for username in &court.players {
                let Some(state) = states.get_mut(username) else {
                    continue;
                };
                state.next_available = end;
                state.committed_until = Some(end);
                for mate in court.players.iter().filter(|m| *m != username) {
                    state.partner_with(mate, end);
                }
            }
        }

        let unlisted_end = projected_end(now, settings, now);
        for player in players.iter().filter(|p| p.playing) {
            if let Some(state) = states.get_mut(&player.username) {
                if state.committed_until.is_none() {
                    log::debug!("'{}' is playing but on no listed court", player.username);
                    state.next_available = state.next_available.max(unlisted_end);
                    state.committed_until = Some(unlisted_end);
                }
            }
        }

        Self { states }
    }

    /// When the fourth-earliest of `usernames` becomes free, or `None` if
    /// fewer than four of them are known.
    pub fn fourth_free_at<'a>(
        &self,
        usernames: impl IntoIterator<Item = &'a str>,
    ) -> Option<Timestamp> {
        let mut free: Vec<Timestamp> = usernames
            .into_iter()
            .filter_map(|u| self.get(u))
            .map(ProjectedState::free_at)
            .collect();
        free.sort();
        free.get(PLAYERS_PER_COURT - 1).copied()
    }

    pub fn get(&self, username: &str) -> Option<&ProjectedState> {
        self.states.get(username)
    }

    /// Mark a player as booked on a game starting at `game_start`.
    pub fn schedule(&mut self, username: &str, game_start: Timestamp, settings: &SessionSettings) {
        if let Some(state) = self.states.get_mut(username) {
            state.next_available = game_start + settings.expected_duration();
        }
    }

    /// Record a hypothetical game between every pair in `court_players`.
    pub fn record_pairings(
        &mut self,
        court_players: &[&str],
        game_start: Timestamp,
        settings: &SessionSettings,
    ) {
        let end = game_start + settings.expected_duration();
        for (i, a) in court_players.iter().enumerate() {
            for b in court_players.iter().skip(i + 1) {
                if let Some(state) = self.states.get_mut(*a) {
                    state.partner_with(b, end);
                }
                if let Some(state) = self.states.get_mut(*b) {
                    state.partner_with(a, end);
                }
            }
        }
    }
}

/// When a game that started at `start` is expected to end; never earlier than `now`.
pub fn projected_end(start: Timestamp, settings: &SessionSettings, now: Timestamp) -> Timestamp {
    (start + settings.expected_duration()).max(now)
}
