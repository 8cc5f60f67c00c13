//! Session settings: court count, variance bounds, time caps and score weights.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::session::SessionError;

/// Weight applied to each sub-score when totalling a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub time: f64,
    pub diversity: f64,
    pub balance: f64,
    pub skill: f64,
    pub gender: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            time: 1.0,
            diversity: 0.5,
            balance: 0.5,
            skill: 0.5,
            gender: 0.25,
        }
    }
}

/// Tunables for one session. Missing fields deserialize to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub court_count: usize,
    /// Number of upcoming courts planned on every re-plan.
    pub queue_length: usize,
    /// Largest allowed gap between the two teams' skill totals.
    pub max_team_variance: u32,
    /// Largest allowed skill gap between any two players on a court.
    pub max_individual_variance: u32,
    pub expected_game_minutes: u32,
    /// Waits beyond this earn no extra time score.
    pub max_wait_minutes: u32,
    /// Partner gaps beyond this earn no extra diversity score.
    pub max_diversity_wait_minutes: u32,
    /// Partner counts at or above this earn no count score.
    pub max_diversity_count: u32,
    pub weights: ScoreWeights,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            court_count: 3,
            queue_length: 6,
            max_team_variance: 1,
            max_individual_variance: 2,
            expected_game_minutes: 8,
            max_wait_minutes: 30,
            max_diversity_wait_minutes: 60,
            max_diversity_count: 3,
            weights: ScoreWeights::default(),
        }
    }
}

impl SessionSettings {
    pub fn expected_duration(&self) -> Duration {
        Duration::minutes(self.expected_game_minutes as i64)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::minutes(self.max_wait_minutes as i64)
    }

    pub fn max_diversity_wait(&self) -> Duration {
        Duration::minutes(self.max_diversity_wait_minutes as i64)
    }

    /// Reject settings that would divide by zero or leave nothing to schedule on.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.court_count == 0 {
            return Err(SessionError::InvalidSettings("court_count must be at least 1"));
        }
        if self.expected_game_minutes == 0 {
            return Err(SessionError::InvalidSettings(
                "expected_game_minutes must be at least 1",
            ));
        }
        if self.max_wait_minutes == 0 || self.max_diversity_wait_minutes == 0 {
            return Err(SessionError::InvalidSettings("wait caps must be at least 1 minute"));
        }
        if self.max_diversity_count == 0 {
            return Err(SessionError::InvalidSettings("max_diversity_count must be at least 1"));
        }
        let w = &self.weights;
        let weights = [w.time, w.diversity, w.balance, w.skill, w.gender];
        if weights.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err(SessionError::InvalidSettings(
                "weights must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
