//! Error types for the scoring engine.

use crate::{MatchStatus, PlayerId, TeamId};
use thiserror::Error;

/// All possible errors from the scoring engine.
///
/// Every variant is local and recoverable: a rejected command or admin
/// action leaves the match state exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Command admission errors
    #[error("match is {0}, not live")]
    InvalidState(MatchStatus),

    #[error("missing participants: {0}")]
    MissingParticipants(&'static str),

    #[error("invalid runs: {0} (expected 0..=6)")]
    InvalidRuns(u32),

    #[error("innings already has {0} wickets down")]
    TooManyWickets(u32),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("scoring blocked until dismissed batsman {0} is replaced")]
    PendingReplacement(PlayerId),

    #[error("another command is in flight for this match")]
    Busy,

    #[error("{kind} cannot dismiss the non-striker")]
    InvalidDismissal { kind: String },

    // Admin errors
    #[error("toss has not been recorded")]
    TossNotRecorded,

    #[error("invalid toss: {0}")]
    InvalidToss(String),

    #[error("invalid match format: {0}")]
    InvalidFormat(String),

    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {player} does not play for {team}")]
    WrongTeam { player: PlayerId, team: TeamId },

    #[error("player {0} cannot take this position")]
    SamePlayer(PlayerId),

    #[error("bowler {0} bowled the previous over")]
    BowlerUnavailable(PlayerId),

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("ledger replay disagrees with running totals: {0}")]
    Inconsistent(String),
}

impl Error {
    /// Stable machine-readable code for wire payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidState(_) => "invalid_state",
            Error::MissingParticipants(_) => "missing_participants",
            Error::InvalidRuns(_) => "invalid_runs",
            Error::TooManyWickets(_) => "too_many_wickets",
            Error::NothingToUndo => "nothing_to_undo",
            Error::PendingReplacement(_) => "pending_replacement",
            Error::Busy => "busy",
            Error::InvalidDismissal { .. } => "invalid_dismissal",
            Error::TossNotRecorded => "toss_not_recorded",
            Error::InvalidToss(_) => "invalid_toss",
            Error::InvalidFormat(_) => "invalid_format",
            Error::UnknownPlayer(_) => "unknown_player",
            Error::WrongTeam { .. } => "wrong_team",
            Error::SamePlayer(_) => "same_player",
            Error::BowlerUnavailable(_) => "bowler_unavailable",
            Error::InvalidSnapshot(_) => "invalid_snapshot",
            Error::Inconsistent(_) => "inconsistent",
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidState(MatchStatus::Setup);
        assert_eq!(err.to_string(), "match is setup, not live");

        let err = Error::InvalidRuns(7);
        assert_eq!(err.to_string(), "invalid runs: 7 (expected 0..=6)");

        let err = Error::WrongTeam {
            player: "p1".into(),
            team: "lions".into(),
        };
        assert_eq!(err.to_string(), "player p1 does not play for lions");
    }

    #[test]
    fn error_codes() {
        assert_eq!(Error::Busy.code(), "busy");
        assert_eq!(Error::NothingToUndo.code(), "nothing_to_undo");
        assert_eq!(
            Error::PendingReplacement("p3".into()).code(),
            "pending_replacement"
        );
    }
}
