//! Scheduling logic: projection, scoring, court assignment, queue planning, session events.

mod assign;
mod events;
mod projection;
mod queue;
mod resolve;
pub mod score;

pub use events::{
    apply_settings, finish_game, replan, set_player_enabled, skip_player, start_next_game,
};
pub use projection::{projected_end, ProjectedState, Projection};
pub use queue::{generate_queue, priority_sequence};
pub use resolve::{get_best_player, get_next_court};
