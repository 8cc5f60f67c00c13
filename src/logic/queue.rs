//! Queue generation: plans the next `queue_length` courts across the court rotation.

use crate::logic::assign::fill_court;
use crate::logic::projection::{projected_end, Projection};
use crate::models::{Court, Player, SessionSettings, Timestamp, PLAYERS_PER_COURT};
use chrono::Duration;

/// Order players for assignment: those not playing first, then longest wait first.
/// Stable, so equal keys keep roster order.
pub fn priority_sequence<'a>(players: &[&'a Player], projection: &Projection) -> Vec<&'a Player> {
    let mut sequence = players.to_vec();
    sequence.sort_by_key(|p| {
        projection
            .get(&p.username)
            .map(|s| (p.playing || s.committed_until.is_some(), s.next_available))
            .unwrap_or((true, p.last_played))
    });
    sequence
}

/// Time left on each court's current game. Empty and overdue courts report zero.
fn remaining_time(courts: &[Court], settings: &SessionSettings, now: Timestamp) -> Vec<Duration> {
    courts
        .iter()
        .map(|court| match court.start_time {
            Some(start) if court.is_occupied() => projected_end(start, settings, now) - now,
            _ => Duration::zero(),
        })
        .collect()
}

/// Log usernames on courts that are not in the roster. Scheduling carries on without them.
fn report_unknown_players(players: &[Player], courts: &[Court]) {
    for court in courts {
        for username in &court.players {
            if !players.iter().any(|p| &p.username == username) {
                log::warn!("Court {} lists unknown player '{}'", court.id, username);
            }
        }
    }
}

/// Plan the next `queue_length` courts.
///
/// `courts` is the live snapshot of physical courts (empty or occupied). Each
/// planned court carries the id of the physical court projected to free up for
/// it and its projected start time. A court whose slot comes up before four
/// players are free starts when the fourth one is. Returns an empty plan when fewer than four
/// players are enabled or there are no courts.
pub fn generate_queue(
    players: &[Player],
    courts: &[Court],
    queue_length: usize,
    settings: &SessionSettings,
    now: Timestamp,
) -> Vec<Court> {
    let eligible: Vec<&Player> = players.iter().filter(|p| p.enabled).collect();
    if eligible.len() < PLAYERS_PER_COURT {
        log::debug!("Not enough enabled players to plan ({})", eligible.len());
        return Vec::new();
    }
    if courts.is_empty() {
        log::debug!("No courts to plan against");
        return Vec::new();
    }
    report_unknown_players(players, courts);

    let mut projection = Projection::seed(&eligible, courts, settings, now);
    let mut queue = priority_sequence(&eligible, &projection);

    let remaining = remaining_time(courts, settings, now);
    let mut rotation: Vec<usize> = (0..courts.len()).collect();
    rotation.sort_by_key(|&i| remaining[i]);

    // Leave enough of the front of the queue for the other courts in a round.
    let concurrent = (eligible.len() / PLAYERS_PER_COURT).clamp(1, courts.len());
    let base_window = eligible.len() - PLAYERS_PER_COURT * (concurrent - 1);

    let mut court_free: Vec<Timestamp> = remaining.iter().map(|&r| now + r).collect();
    let mut plan = Vec::with_capacity(queue_length);
    for i in 0..queue_length {
        let physical = rotation[i % courts.len()];
        let mut game_start = court_free[physical];
        // Hold the court until four players are off their current games.
        let usernames = queue.iter().map(|p| p.username.as_str());
        if let Some(four_free) = projection.fourth_free_at(usernames) {
            if four_free > game_start {
                log::debug!(
                    "Court {} waits until {} for four free players",
                    courts[physical].id,
                    four_free
                );
                game_start = four_free;
            }
        }

        let Some(picked) = fill_court(&mut queue, &mut projection, game_start, base_window, settings)
        else {
            break;
        };
        court_free[physical] = game_start + settings.expected_duration();
        let usernames = picked.iter().map(|p| p.username.clone()).collect();
        plan.push(Court::new(courts[physical].id, usernames, game_start));
    }

    log::debug!("Planned {} court(s) from {} players", plan.len(), eligible.len());
    plan
}
