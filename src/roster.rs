//! Roster loading: one player per line, `name,skill[,gender[,username]]`.

use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::models::{clamp_skill, Gender, Player, Timestamp};

/// Errors while reading a roster.
#[derive(Debug)]
pub enum RosterError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingSkill { line: u64 },
    InvalidSkill { line: u64, value: String },
    InvalidGender { line: u64, value: String },
    DuplicateUsername { line: u64, value: String },
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::Io(e) => write!(f, "Could not read roster: {}", e),
            RosterError::Csv(e) => write!(f, "Malformed roster: {}", e),
            RosterError::MissingSkill { line } => write!(f, "Line {}: missing skill level", line),
            RosterError::InvalidSkill { line, value } => {
                write!(f, "Line {}: '{}' is not a skill level", line, value)
            }
            RosterError::InvalidGender { line, value } => {
                write!(f, "Line {}: '{}' is not a gender", line, value)
            }
            RosterError::DuplicateUsername { line, value } => {
                write!(f, "Line {}: username '{}' is already taken", line, value)
            }
        }
    }
}

impl std::error::Error for RosterError {}

impl From<std::io::Error> for RosterError {
    fn from(e: std::io::Error) -> Self {
        RosterError::Io(e)
    }
}

impl From<csv::Error> for RosterError {
    fn from(e: csv::Error) -> Self {
        RosterError::Csv(e)
    }
}

/// Lowercase alphanumeric form of a display name, e.g. "Mary Ann" -> "maryann".
fn base_username(name: &str) -> String {
    let base: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if base.is_empty() {
        "player".to_string()
    } else {
        base
    }
}

/// `base`, or `base-2`, `base-3`, ... whichever is not taken yet.
fn unique_username(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Username derived from `name` that no player in `existing` holds yet.
pub fn username_for(name: &str, existing: &[Player]) -> String {
    let taken: HashSet<String> = existing.iter().map(|p| p.username.clone()).collect();
    unique_username(&base_username(name), &taken)
}

fn parse_record(
    record: &StringRecord,
    taken: &mut HashSet<String>,
    now: Timestamp,
) -> Result<Option<Player>, RosterError> {
    let line = record.position().map_or(0, |p| p.line());
    let field = |i: usize| record.get(i).unwrap_or("").trim();

    let name = field(0);
    if name.is_empty() {
        return Ok(None);
    }
    let raw_skill = field(1);
    if raw_skill.is_empty() {
        return Err(RosterError::MissingSkill { line });
    }
    let skill = raw_skill
        .parse::<i64>()
        .map_err(|_| RosterError::InvalidSkill {
            line,
            value: raw_skill.to_string(),
        })?;
    let gender = Gender::parse(field(2)).map_err(|value| RosterError::InvalidGender { line, value })?;

    let username = match field(3) {
        "" => unique_username(&base_username(name), taken),
        explicit if taken.contains(explicit) => {
            return Err(RosterError::DuplicateUsername {
                line,
                value: explicit.to_string(),
            })
        }
        explicit => explicit.to_string(),
    };
    taken.insert(username.clone());

    let mut player = Player::new(name, username, clamp_skill(skill), now);
    player.gender = gender;
    Ok(Some(player))
}

/// Parse roster text. Derived usernames avoid clashing with `existing` players
/// and with each other; an explicit username that clashes is an error.
pub fn parse_roster(
    text: &str,
    existing: &[Player],
    now: Timestamp,
) -> Result<Vec<Player>, RosterError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut taken: HashSet<String> = existing.iter().map(|p| p.username.clone()).collect();
    let mut players = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(player) = parse_record(&record, &mut taken, now)? {
            players.push(player);
        }
    }
    log::debug!("Parsed {} player(s) from roster", players.len());
    Ok(players)
}

/// Read and parse a roster file.
pub fn load_roster<P: AsRef<Path>>(path: P, now: Timestamp) -> Result<Vec<Player>, RosterError> {
    let text = std::fs::read_to_string(path)?;
    parse_roster(&text, &[], now)
}
