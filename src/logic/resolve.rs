//! Single-court resolvers: the next court to start, and a substitute for a skipped player.

use std::collections::HashSet;

use crate::logic::assign::{fill_court, pick_candidate};
use crate::logic::projection::Projection;
use crate::logic::queue::priority_sequence;
use crate::models::{Court, Player, SessionSettings, Timestamp, PLAYERS_PER_COURT};

fn find<'a>(players: &'a [Player], username: &str) -> Option<&'a Player> {
    players.iter().find(|p| p.username == username)
}

/// The court that should start next.
///
/// Returns the head of `queue` unchanged if all four of its players are still
/// enabled and off court. Otherwise plans one court from the players not
/// currently playing, starting at `now`. The result has no players when fewer
/// than four are free.
pub fn get_next_court(
    queue: &[Court],
    players: &[Player],
    settings: &SessionSettings,
    now: Timestamp,
) -> Court {
    let head = queue.first();
    if let Some(head) = head.filter(|c| c.is_occupied()) {
        let still_free = head
            .players
            .iter()
            .all(|u| find(players, u).is_some_and(|p| p.enabled && !p.playing));
        if still_free {
            return head.clone();
        }
        log::debug!("Queued court {} is stale; recomputing", head.id);
    }

    let id = head.map_or(0, |c| c.id);
    let free: Vec<&Player> = players.iter().filter(|p| p.enabled && !p.playing).collect();
    if free.len() < PLAYERS_PER_COURT {
        return Court::empty(id);
    }

    let mut projection = Projection::seed(&free, &[], settings, now);
    let mut sequence = priority_sequence(&free, &projection);
    let window = sequence.len();
    match fill_court(&mut sequence, &mut projection, now, window, settings) {
        Some(picked) => Court::new(id, picked.iter().map(|p| p.username.clone()).collect(), now),
        None => Court::empty(id),
    }
}

/// Slot-mates of an open slot, ordered so the open slot takes the role of the
/// fourth pick: the three remaining players read as team-X first, team-Y first,
/// team-X second, with the open slot completing team Y.
fn remaining_order(slot: usize) -> Option<[usize; 3]> {
    match slot {
        0 => Some([3, 2, 1]),
        1 => Some([2, 3, 0]),
        2 => Some([1, 0, 3]),
        3 => Some([0, 1, 2]),
        _ => None,
    }
}

/// Best player to take `slot` on `court`, keeping the other three where they are.
///
/// Candidates are enabled players who are not playing and not already on the
/// court. Returns `None` for an invalid slot or when nobody is eligible.
pub fn get_best_player<'a>(
    court: &Court,
    slot: usize,
    players: &'a [Player],
    settings: &SessionSettings,
    now: Timestamp,
) -> Option<&'a Player> {
    best_substitute(court, slot, players, &HashSet::new(), settings, now)
}

/// [`get_best_player`], additionally passing over everyone in `excluded`.
pub(crate) fn best_substitute<'a>(
    court: &Court,
    slot: usize,
    players: &'a [Player],
    excluded: &HashSet<&str>,
    settings: &SessionSettings,
    now: Timestamp,
) -> Option<&'a Player> {
    if court.players.len() != PLAYERS_PER_COURT {
        return None;
    }
    let order = remaining_order(slot)?;
    let chosen: Vec<Option<&Player>> = order
        .iter()
        .map(|&i| {
            let username = &court.players[i];
            let found = find(players, username);
            if found.is_none() {
                log::warn!("Court {} lists unknown player '{}'", court.id, username);
            }
            found
        })
        .collect();

    let candidates: Vec<&Player> = players
        .iter()
        .filter(|p| {
            p.enabled
                && !p.playing
                && !court.contains(&p.username)
                && !excluded.contains(p.username.as_str())
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let projection = Projection::seed(&candidates, &[], settings, now);
    let sequence = priority_sequence(&candidates, &projection);
    pick_candidate(&sequence, &chosen, &projection, now, settings).map(|i| sequence[i])
}
