//! Court assigner: fills one court's four slots from the working priority sequence.

use crate::logic::projection::Projection;
use crate::logic::score::score_candidate;
use crate::models::{Player, SessionSettings, Timestamp, PLAYERS_PER_COURT};

/// Pick the best candidate for the next slot. Returns an index into `window`.
///
/// Only candidates satisfying the active variance constraints are scored; if
/// none do, the whole window is scored and a fairness violation is logged.
/// Ties keep the earliest window position.
pub(crate) fn pick_candidate(
    window: &[&Player],
    chosen: &[Option<&Player>],
    projection: &Projection,
    game_start: Timestamp,
    settings: &SessionSettings,
) -> Option<usize> {
    let scored: Vec<(usize, bool, f64)> = window
        .iter()
        .enumerate()
        .filter_map(|(i, candidate)| {
            let state = projection.get(&candidate.username)?;
            let breakdown = score_candidate(candidate, state, chosen, game_start, settings);
            Some((
                i,
                breakdown.satisfies_constraints(),
                breakdown.total(&settings.weights),
            ))
        })
        .collect();

    let pool: Vec<_> = if scored.iter().any(|s| s.1) {
        scored.into_iter().filter(|s| s.1).collect()
    } else {
        if !scored.is_empty() {
            log::warn!(
                "No candidate within skill variance for slot {} at {}; taking best unconstrained pick",
                chosen.len(),
                game_start
            );
        }
        scored
    };

    let mut best: Option<(usize, f64)> = None;
    for (i, _, total) in pool {
        if best.map_or(true, |(_, top)| total > top) {
            best = Some((i, total));
        }
    }
    best.map(|(i, _)| i)
}

/// Fill one court starting at `game_start` from `queue`.
///
/// Only players free at `game_start` are considered. The first slot is the
/// earliest of them in the queue, unscored. Each later slot is chosen from the
/// first `base_window - picks` free entries not already on this court. Every
/// pick moves to the back of `queue` and is booked in the projection; once the
/// court is full every pairing is recorded.
///
/// Returns `None` if fewer than four players in `queue` are free at `game_start`.
pub(crate) fn fill_court<'a>(
    queue: &mut Vec<&'a Player>,
    projection: &mut Projection,
    game_start: Timestamp,
    base_window: usize,
    settings: &SessionSettings,
) -> Option<Vec<&'a Player>> {
    let mut picked: Vec<&'a Player> = Vec::with_capacity(PLAYERS_PER_COURT);
    while picked.len() < PLAYERS_PER_COURT {
        // Picks so far sit at the back of the queue.
        let open = queue.len() - picked.len();
        let free: Vec<usize> = (0..open)
            .filter(|&i| {
                projection
                    .get(&queue[i].username)
                    .is_some_and(|s| s.is_available_at(game_start))
            })
            .collect();
        if picked.is_empty() && free.len() < PLAYERS_PER_COURT {
            return None;
        }
        let index = if picked.is_empty() {
            free[0]
        } else {
            let size = base_window
                .saturating_sub(picked.len())
                .clamp(1, free.len().max(1));
            let window: Vec<&Player> = free.iter().take(size).map(|&i| queue[i]).collect();
            let chosen: Vec<Option<&Player>> = picked.iter().map(|p| Some(*p)).collect();
            let best = pick_candidate(&window, &chosen, projection, game_start, settings)?;
            free[best]
        };
        let player = queue.remove(index);
        queue.push(player);
        projection.schedule(&player.username, game_start, settings);
        picked.push(player);
    }

    let usernames: Vec<&str> = picked.iter().map(|p| p.username.as_str()).collect();
    projection.record_pairings(&usernames, game_start, settings);
    Some(picked)
}
