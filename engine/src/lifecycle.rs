//! Match lifecycle state machine.
//!
//! ```text
//! setup -> live -> innings_break -> live -> completed
//!   \_______\__________\______________\____> abandoned
//! ```
//!
//! Only the transitions in this module change [`MatchInfo::status`].
//! Once a match is completed or abandoned it never changes again.

use crate::{error::Result, Error, InningsTotals, MatchId, TeamId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Setup,
    Live,
    InningsBreak,
    Completed,
    Abandoned,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Abandoned)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Setup => "setup",
            MatchStatus::Live => "live",
            MatchStatus::InningsBreak => "innings_break",
            MatchStatus::Completed => "completed",
            MatchStatus::Abandoned => "abandoned",
        };
        write!(f, "{}", s)
    }
}

/// What the toss winner chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toss {
    pub winner: TeamId,
    pub decision: TossDecision,
}

/// Playing conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFormat {
    /// Overs per innings; `None` for formats without an over limit
    pub overs: Option<u32>,
    #[serde(default = "default_players_per_side")]
    pub players_per_side: u32,
}

fn default_players_per_side() -> u32 {
    11
}

impl MatchFormat {
    /// Longest over limit whose ball count still fits a `u32`.
    pub const MAX_OVERS: u32 = u32::MAX / crate::BALLS_PER_OVER;

    pub fn limited(overs: u32) -> Self {
        Self {
            overs: Some(overs),
            players_per_side: default_players_per_side(),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            overs: None,
            players_per_side: default_players_per_side(),
        }
    }

    pub fn with_players(mut self, players_per_side: u32) -> Self {
        self.players_per_side = players_per_side;
        self
    }

    /// Wickets that end an innings: the last batsman cannot bat alone.
    pub fn wicket_limit(&self) -> u32 {
        self.players_per_side.saturating_sub(1)
    }

    pub fn ball_limit(&self) -> Option<u32> {
        self.overs.map(|o| o.saturating_mul(crate::BALLS_PER_OVER))
    }

    /// Reject formats no innings can be played under.
    pub fn check(&self) -> Result<()> {
        match self.overs {
            Some(0) => {
                return Err(Error::InvalidFormat(
                    "an innings needs at least one over".into(),
                ))
            }
            Some(overs) if overs > Self::MAX_OVERS => {
                return Err(Error::InvalidFormat(format!(
                    "{} overs exceeds the limit of {}",
                    overs,
                    Self::MAX_OVERS
                )))
            }
            _ => {}
        }
        if self.players_per_side < 2 {
            return Err(Error::InvalidFormat(
                "a side needs at least two players".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchFormat {
    fn default() -> Self {
        Self::limited(20)
    }
}

/// Why an innings closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InningsEnd {
    AllOut,
    OversExhausted,
    TargetReached,
}

/// Winning margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "camelCase")]
pub enum Margin {
    Runs(u32),
    Wickets(u32),
}

/// Final outcome, recorded once and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MatchResult {
    Won { team: TeamId, margin: Margin },
    Tie,
    NoResult,
}

impl MatchResult {
    /// Decide the result from both innings totals.
    pub fn decide(
        first_team: &TeamId,
        first: &InningsTotals,
        second_team: &TeamId,
        second: &InningsTotals,
        format: &MatchFormat,
    ) -> Self {
        if second.runs > first.runs {
            MatchResult::Won {
                team: second_team.clone(),
                margin: Margin::Wickets(format.wicket_limit().saturating_sub(second.wickets)),
            }
        } else if second.runs == first.runs {
            MatchResult::Tie
        } else {
            MatchResult::Won {
                team: first_team.clone(),
                margin: Margin::Runs(first.runs - second.runs),
            }
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Won {
                team,
                margin: Margin::Runs(n),
            } => write!(f, "{} won by {} runs", team, n),
            MatchResult::Won {
                team,
                margin: Margin::Wickets(n),
            } => write!(f, "{} won by {} wickets", team, n),
            MatchResult::Tie => write!(f, "match tied"),
            MatchResult::NoResult => write!(f, "no result"),
        }
    }
}

/// Match-level facts owned by the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub id: MatchId,
    pub home: TeamId,
    pub away: TeamId,
    pub format: MatchFormat,
    pub toss: Option<Toss>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
}

impl MatchInfo {
    pub fn new(
        id: impl Into<MatchId>,
        home: impl Into<TeamId>,
        away: impl Into<TeamId>,
        format: MatchFormat,
    ) -> Self {
        Self {
            id: id.into(),
            home: home.into(),
            away: away.into(),
            format,
            toss: None,
            status: MatchStatus::Setup,
            result: None,
        }
    }

    /// The side that is not `team`.
    pub fn opponent(&self, team: &str) -> &TeamId {
        if team == self.home {
            &self.away
        } else {
            &self.home
        }
    }

    /// Record the toss. Only valid during setup.
    pub fn record_toss(&mut self, toss: Toss) -> Result<()> {
        self.require(MatchStatus::Setup)?;
        if toss.winner != self.home && toss.winner != self.away {
            return Err(Error::InvalidToss(format!(
                "{} is not playing in this match",
                toss.winner
            )));
        }
        self.toss = Some(toss);
        Ok(())
    }

    /// setup -> live. Returns (batting, bowling) for the first innings.
    pub fn start(&mut self) -> Result<(TeamId, TeamId)> {
        self.require(MatchStatus::Setup)?;
        self.format.check()?;
        let toss = self.toss.as_ref().ok_or(Error::TossNotRecorded)?;
        let batting = match toss.decision {
            TossDecision::Bat => toss.winner.clone(),
            TossDecision::Bowl => self.opponent(&toss.winner).clone(),
        };
        let bowling = self.opponent(&batting).clone();
        self.status = MatchStatus::Live;
        Ok((batting, bowling))
    }

    /// live -> innings_break, fired when the first innings closes.
    pub(crate) fn close_first_innings(&mut self) {
        debug_assert_eq!(self.status, MatchStatus::Live);
        self.status = MatchStatus::InningsBreak;
    }

    /// innings_break -> live.
    pub(crate) fn resume(&mut self) -> Result<()> {
        self.require(MatchStatus::InningsBreak)?;
        self.status = MatchStatus::Live;
        Ok(())
    }

    /// live -> completed with the decided result.
    pub(crate) fn complete(&mut self, result: MatchResult) {
        debug_assert_eq!(self.status, MatchStatus::Live);
        self.status = MatchStatus::Completed;
        self.result = Some(result);
    }

    /// Any non-terminal state -> abandoned.
    pub fn abandon(&mut self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidState(self.status));
        }
        self.status = MatchStatus::Abandoned;
        self.result = Some(MatchResult::NoResult);
        Ok(())
    }

    /// Put back a status and result saved before a delivery. Undo only.
    pub(crate) fn restore(&mut self, status: MatchStatus, result: Option<MatchResult>) {
        self.status = status;
        self.result = result;
    }

    fn require(&self, status: MatchStatus) -> Result<()> {
        if self.status == status {
            Ok(())
        } else {
            Err(Error::InvalidState(self.status))
        }
    }
}
