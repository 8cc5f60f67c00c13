//! Score model: normalized sub-scores for one candidate against the slot-mates
//! already chosen for a court.
//!
//! `chosen` is always in pick order, which is also slot order: index 0 is team
//! A's first pick, 1 team B's first pick, 2 team A's second pick. A `None`
//! entry is a username that did not resolve to a player; it contributes a
//! neutral score rather than an error.

use chrono::Duration;

use crate::logic::projection::ProjectedState;
use crate::models::{Gender, Player, ScoreWeights, SessionSettings, Timestamp};

/// `clamp(elapsed, 0, cap) / cap`, in milliseconds.
fn capped_ratio(elapsed: Duration, cap: Duration) -> f64 {
    let cap_ms = cap.num_milliseconds();
    if cap_ms <= 0 {
        return 0.0;
    }
    elapsed.num_milliseconds().clamp(0, cap_ms) as f64 / cap_ms as f64
}

/// `1 - clamp(gap / (bound + 1), 0, 1)`.
fn closeness(gap: i32, bound: u32) -> f64 {
    let scaled = gap.unsigned_abs() as f64 / (bound as f64 + 1.0);
    1.0 - scaled.clamp(0.0, 1.0)
}

/// Rewards a longer projected wait, capped at `max_wait`.
pub fn time_score(state: &ProjectedState, game_start: Timestamp, settings: &SessionSettings) -> f64 {
    if state.is_committed_at(game_start) {
        return 0.0;
    }
    capped_ratio(game_start - state.next_available, settings.max_wait())
}

/// Rewards pairing with people not partnered recently or often.
pub fn diversity_score(
    state: &ProjectedState,
    chosen: &[Option<&Player>],
    game_start: Timestamp,
    settings: &SessionSettings,
) -> f64 {
    let max_count = settings.max_diversity_count;
    let per_mate: Vec<f64> = chosen
        .iter()
        .flatten()
        .map(|mate| {
            let delay = match state.last_partnered.get(&mate.username) {
                Some(&when) => capped_ratio(game_start - when, settings.max_diversity_wait()),
                None => 1.0,
            };
            let times = state.times_partnered.get(&mate.username).copied().unwrap_or(0);
            let count = 1.0 - times.min(max_count) as f64 / max_count.max(1) as f64;
            0.5 * delay + 0.5 * count
        })
        .collect();
    if per_mate.is_empty() {
        return 0.0;
    }
    per_mate.iter().sum::<f64>() / per_mate.len() as f64
}

/// Team-total balance. `None` until two slot-mates are chosen.
pub fn balance_score(
    candidate: &Player,
    chosen: &[Option<&Player>],
    settings: &SessionSettings,
) -> Option<f64> {
    let skill = |p: &Option<&Player>| p.map(|p| p.skill_level as i32);
    let target = match chosen {
        [_, b_first] => skill(b_first)?,
        [a_first, b_first, a_second] => skill(a_first)? + skill(a_second)? - skill(b_first)?,
        _ => return None,
    };
    Some(closeness(
        candidate.skill_level as i32 - target,
        settings.max_team_variance,
    ))
}

/// Pairwise skill bound, measured against the chosen slot-mate with the largest gap.
/// `None` until a slot-mate is chosen.
pub fn skill_score(
    candidate: &Player,
    chosen: &[Option<&Player>],
    settings: &SessionSettings,
) -> Option<f64> {
    let widest_gap = chosen
        .iter()
        .flatten()
        .map(|mate| (candidate.skill_level as i32 - mate.skill_level as i32).abs())
        .max()?;
    Some(closeness(widest_gap, settings.max_individual_variance))
}

/// Gender pattern the next pick should complete, if any.
fn target_gender(chosen: &[Option<&Player>]) -> Option<Gender> {
    let gender = |i: usize| chosen.get(i).copied().flatten().and_then(|p| p.gender);
    if chosen.len() < 2 {
        return None;
    }
    let (a_first, b_first) = (gender(0)?, gender(1)?);
    if a_first == b_first {
        return None;
    }
    match chosen.len() {
        2 => Some(b_first),
        3 => {
            let a_second = gender(2)?;
            if a_second == a_first {
                Some(b_first)
            } else {
                Some(a_first)
            }
        }
        _ => None,
    }
}

/// 1 when the candidate completes the implied same-gender or mixed pattern, else 0.
pub fn gender_score(candidate: &Player, chosen: &[Option<&Player>]) -> f64 {
    match (target_gender(chosen), candidate.gender) {
        (Some(target), Some(g)) if target == g => 1.0,
        _ => 0.0,
    }
}

/// All sub-scores for one candidate in one slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreBreakdown {
    pub time: f64,
    pub diversity: f64,
    /// `None` while the balance constraint is not active for this slot.
    pub balance: Option<f64>,
    /// `None` while the skill constraint is not active for this slot.
    pub skill: Option<f64>,
    pub gender: f64,
}

impl ScoreBreakdown {
    pub fn total(&self, weights: &ScoreWeights) -> f64 {
        weights.time * self.time
            + weights.diversity * self.diversity
            + weights.balance * self.balance.unwrap_or(0.0)
            + weights.skill * self.skill.unwrap_or(0.0)
            + weights.gender * self.gender
    }

    /// Every active variance constraint scores above zero.
    pub fn satisfies_constraints(&self) -> bool {
        self.balance.map_or(true, |s| s > 0.0) && self.skill.map_or(true, |s| s > 0.0)
    }
}

pub fn score_candidate(
    candidate: &Player,
    state: &ProjectedState,
    chosen: &[Option<&Player>],
    game_start: Timestamp,
    settings: &SessionSettings,
) -> ScoreBreakdown {
    ScoreBreakdown {
        time: time_score(state, game_start, settings),
        diversity: diversity_score(state, chosen, game_start, settings),
        balance: balance_score(candidate, chosen, settings),
        skill: skill_score(candidate, chosen, settings),
        gender: gender_score(candidate, chosen),
    }
}
