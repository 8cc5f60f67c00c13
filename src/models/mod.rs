//! Data structures for the court scheduler: players, courts, settings, session state.

mod court;
mod player;
mod session;
mod settings;

/// All timestamps are UTC wall-clock instants.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub use court::{Court, CourtId, Side, PLAYERS_PER_COURT};
pub use player::{clamp_skill, Gender, Player, Username, MAX_SKILL, MIN_SKILL};
pub use session::{Session, SessionError, SessionId};
pub use settings::{ScoreWeights, SessionSettings};
