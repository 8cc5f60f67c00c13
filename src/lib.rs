//! Badminton court scheduler: rolling four-player court queue with models, planning logic and roster loading.

pub mod logic;
pub mod models;
pub mod roster;

pub use logic::{
    apply_settings, finish_game, generate_queue, get_best_player, get_next_court, replan,
    set_player_enabled, skip_player, start_next_game,
};
pub use models::{
    Court, CourtId, Gender, Player, ScoreWeights, Session, SessionError, SessionId,
    SessionSettings, Side, Timestamp, Username,
};
pub use roster::{load_roster, parse_roster, username_for, RosterError};
