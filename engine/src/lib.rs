//! # Wicket Engine
//!
//! Ball-by-ball scoring for cricket matches.
//!
//! The engine turns scoring commands into an append-only ball ledger and
//! keeps running aggregates, strike and the match lifecycle in step with
//! it. It is pure logic: no IO, no clocks, no async.
//!
//! ## Design Principles
//!
//! - **Ledger first**: every figure can be rebuilt by replaying the ledger
//! - **All or nothing**: a rejected command leaves the state untouched
//! - **Deterministic**: same commands, same state, same serialization
//!
//! ## Core Concepts
//!
//! ### Commands
//!
//! A [`Command`] is what the scorer entered: runs off the bat, a wicket,
//! an extra, or a correction that takes back the last delivery.
//!
//! ### Ledger and aggregates
//!
//! Admitted commands become [`Delivery`] entries in a [`BallLedger`].
//! [`Tally`] folds each delivery into team totals and player figures, and
//! [`strike_swaps`] decides who faces next.
//!
//! ### Lifecycle
//!
//! [`MatchInfo`] moves a match through [`MatchStatus`]:
//! `setup -> live -> innings_break -> live -> completed`, or `abandoned`
//! from any open state.
//!
//! ## Quick Start
//!
//! ```rust
//! use wicket_engine::{
//!     Command, MatchFormat, MatchInfo, MatchState, SquadRoster, Toss, TossDecision,
//! };
//!
//! let roster = SquadRoster::new()
//!     .with_player("a", "Asha", "lions")
//!     .with_player("b", "Ben", "lions")
//!     .with_player("x", "Xan", "tigers");
//!
//! let mut state = MatchState::new(MatchInfo::new("m1", "lions", "tigers", MatchFormat::limited(20)));
//! state.record_toss(Toss { winner: "lions".into(), decision: TossDecision::Bat }).unwrap();
//! state.start_match().unwrap();
//! state.assign_openers("a".into(), "b".into(), &roster).unwrap();
//! state.assign_bowler("x".into(), &roster).unwrap();
//!
//! state.apply(&Command::runs(4)).unwrap();
//! state.apply(&Command::runs(1)).unwrap();
//!
//! let innings = state.current_innings().unwrap();
//! assert_eq!(innings.tally.totals.runs, 5);
//! assert_eq!(innings.crease.striker.as_deref(), Some("b"));
//! ```
//!
//! ## Persistence
//!
//! Use [`MatchState::export_state`] and [`MatchState::import_state`] with
//! [`MatchSnapshot`]. Aggregates are rebuilt from the ledgers on import.

pub mod aggregate;
pub mod command;
pub mod delivery;
pub mod error;
pub mod innings;
pub mod ledger;
pub mod lifecycle;
pub mod live;
pub mod roster;
pub mod snapshot;
pub mod state;
pub mod strike;
pub mod undo;
pub mod validate;

// Re-export main types at crate root
pub use aggregate::{ExtrasBreakdown, InningsTotals, PlayerInningsStat, Tally};
pub use command::{Batter, Command, ExtraKind, WicketKind};
pub use delivery::{Delivery, Dismissal, PendingDelivery};
pub use error::Error;
pub use innings::{Crease, Innings};
pub use ledger::{BallLedger, BALLS_PER_OVER};
pub use lifecycle::{
    InningsEnd, Margin, MatchFormat, MatchInfo, MatchResult, MatchStatus, Toss, TossDecision,
};
pub use live::{BattingLine, BowlingLine, InningsSummary, LiveSnapshot};
pub use roster::{PlayerProfile, Role, Roster, SquadRoster};
pub use snapshot::{InningsSnapshot, MatchSnapshot, SnapshotMetadata, SNAPSHOT_FORMAT_VERSION};
pub use state::{ApplyResult, MatchState};
pub use strike::strike_swaps;
pub use undo::{UndoController, UndoFrame};
pub use validate::{Admission, Validator, MAX_RUNS_PER_BALL};

/// Type aliases for clarity
pub type MatchId = String;
pub type TeamId = String;
pub type PlayerId = String;
/// Per-innings delivery number, starting at 1
pub type Sequence = u32;
pub type InningsNumber = u8;
pub type Version = u64;
