//! Session events: commit state changes and re-plan the queue.

use std::collections::HashSet;

use crate::logic::queue::generate_queue;
use crate::logic::resolve::{best_substitute, get_next_court};
use crate::models::{
    Court, CourtId, Session, SessionError, SessionSettings, Timestamp, Username,
    PLAYERS_PER_COURT,
};

/// Regenerate the stored queue from the current roster and courts.
pub fn replan(session: &mut Session, now: Timestamp) {
    session.queue = generate_queue(
        &session.players,
        &session.courts,
        session.settings.queue_length,
        &session.settings,
        now,
    );
}

/// Start the next planned game on an empty court.
pub fn start_next_game(
    session: &mut Session,
    court_id: CourtId,
    now: Timestamp,
) -> Result<(), SessionError> {
    if session.court(court_id)?.is_occupied() {
        return Err(SessionError::CourtOccupied(court_id));
    }
    let next = get_next_court(&session.queue, &session.players, &session.settings, now);
    if !next.is_occupied() {
        return Err(SessionError::NotEnoughPlayers);
    }

    for username in &next.players {
        session
            .get_player_mut(username)
            .ok_or_else(|| SessionError::PlayerNotFound(username.clone()))?
            .start_game();
    }
    log::info!(
        "Session {}: court {} started with {:?}",
        session.id,
        court_id,
        next.players
    );
    let court = session.court_mut(court_id)?;
    court.players = next.players;
    court.start_time = Some(now);

    replan(session, now);
    Ok(())
}

/// Finish the game on a court: commit wait and partner stats, free the court.
pub fn finish_game(
    session: &mut Session,
    court_id: CourtId,
    now: Timestamp,
) -> Result<(), SessionError> {
    let court = session.court_mut(court_id)?;
    if !court.is_occupied() {
        return Err(SessionError::CourtEmpty(court_id));
    }
    let usernames = std::mem::take(&mut court.players);
    court.clear();

    for username in &usernames {
        match session.get_player_mut(username) {
            Some(player) => player.finish_game(usernames.iter().map(String::as_str), now),
            None => log::warn!("Finished court {} lists unknown player '{}'", court_id, username),
        }
    }
    log::info!("Session {}: court {} finished", session.id, court_id);

    replan(session, now);
    Ok(())
}

/// Replace the player in `slot` of queued court `queue_index` with the best
/// available substitute. Players already queued on a court whose game would
/// overlap this one are passed over. The rest of the queue is left as is so
/// the patched court survives until it is started.
pub fn skip_player(
    session: &mut Session,
    queue_index: usize,
    slot: usize,
    now: Timestamp,
) -> Result<Username, SessionError> {
    let court = session
        .queue
        .get(queue_index)
        .ok_or(SessionError::QueueEntryNotFound(queue_index))?;
    if slot >= PLAYERS_PER_COURT || slot >= court.players.len() {
        return Err(SessionError::InvalidSlot(slot));
    }
    let replacement = {
        let busy = overlapping_players(&session.queue, queue_index, &session.settings);
        best_substitute(court, slot, &session.players, &busy, &session.settings, now)
            .ok_or(SessionError::NoReplacement)?
            .username
            .clone()
    };

    let skipped = std::mem::replace(
        &mut session.queue[queue_index].players[slot],
        replacement.clone(),
    );
    log::info!(
        "Session {}: skipped {} in queued court {}, replaced by {}",
        session.id,
        skipped,
        queue_index,
        replacement
    );
    Ok(replacement)
}

/// Usernames on other queued courts whose planned game overlaps entry `index`.
fn overlapping_players<'q>(
    queue: &'q [Court],
    index: usize,
    settings: &SessionSettings,
) -> HashSet<&'q str> {
    let duration = settings.expected_duration();
    let Some(start) = queue.get(index).and_then(|c| c.start_time) else {
        return HashSet::new();
    };
    queue
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .filter(|(_, other)| {
            other
                .start_time
                .is_some_and(|s| s < start + duration && start < s + duration)
        })
        .flat_map(|(_, other)| other.players.iter().map(String::as_str))
        .collect()
}

/// Enable or disable a player and re-plan.
pub fn set_player_enabled(
    session: &mut Session,
    username: &str,
    enabled: bool,
    now: Timestamp,
) -> Result<(), SessionError> {
    session.set_player_enabled(username, enabled, now)?;
    replan(session, now);
    Ok(())
}

/// Apply new settings and re-plan.
pub fn apply_settings(
    session: &mut Session,
    settings: SessionSettings,
    now: Timestamp,
) -> Result<(), SessionError> {
    session.update_settings(settings)?;
    replan(session, now);
    Ok(())
}
