//! Snapshot types for persisting and restoring match state.
//!
//! A snapshot carries the ball ledgers, not the aggregates. Aggregates are
//! rebuilt by replay on import, so a snapshot can never disagree with its
//! own ledger. The undo frame is not persisted: a restored match starts
//! with nothing to undo.

use crate::{
    error::Result, BallLedger, Crease, Delivery, Error, Innings, InningsEnd, InningsNumber,
    MatchId, MatchInfo, MatchState, MatchStatus, Tally, TeamId, Version,
};
use serde::{Deserialize, Serialize};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Persisted form of one innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsSnapshot {
    pub number: InningsNumber,
    pub batting: TeamId,
    pub bowling: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    pub crease: Crease,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<InningsEnd>,
    pub deliveries: Vec<Delivery>,
}

/// A point-in-time snapshot of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    pub version: Version,
    pub info: MatchInfo,
    pub innings: Vec<InningsSnapshot>,
}

impl MatchSnapshot {
    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }

    pub fn delivery_count(&self) -> usize {
        self.innings.iter().map(|i| i.deliveries.len()).sum()
    }
}

/// Metadata about a snapshot (without the ledgers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub match_id: MatchId,
    pub version: Version,
    pub status: MatchStatus,
    pub innings_count: usize,
    pub delivery_count: usize,
}

impl From<&MatchSnapshot> for SnapshotMetadata {
    fn from(snapshot: &MatchSnapshot) -> Self {
        Self {
            format_version: snapshot.format_version,
            match_id: snapshot.info.id.clone(),
            version: snapshot.version,
            status: snapshot.info.status,
            innings_count: snapshot.innings.len(),
            delivery_count: snapshot.delivery_count(),
        }
    }
}

impl MatchState {
    /// Export the persistent part of the state.
    pub fn export_state(&self) -> MatchSnapshot {
        MatchSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            version: self.version(),
            info: self.info().clone(),
            innings: self
                .innings()
                .iter()
                .map(|innings| InningsSnapshot {
                    number: innings.number,
                    batting: innings.batting.clone(),
                    bowling: innings.bowling.clone(),
                    target: innings.target,
                    crease: innings.crease.clone(),
                    closed: innings.closed,
                    deliveries: innings.ledger.deliveries().to_vec(),
                })
                .collect(),
        }
    }

    /// Rebuild a match from a snapshot, replaying every ledger.
    pub fn import_state(snapshot: MatchSnapshot) -> Result<Self> {
        snapshot
            .info
            .format
            .check()
            .map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        let status = snapshot.info.status;
        let expected_innings = match status {
            MatchStatus::Setup => 0..=0,
            MatchStatus::Live | MatchStatus::InningsBreak | MatchStatus::Completed => 1..=2,
            MatchStatus::Abandoned => 0..=2,
        };
        if !expected_innings.contains(&snapshot.innings.len()) {
            return Err(Error::InvalidSnapshot(format!(
                "{} innings in a {} match",
                snapshot.innings.len(),
                status
            )));
        }

        let mut innings = Vec::with_capacity(snapshot.innings.len());
        for (index, saved) in snapshot.innings.into_iter().enumerate() {
            if usize::from(saved.number) != index + 1 {
                return Err(Error::InvalidSnapshot(format!(
                    "innings {} out of order",
                    saved.number
                )));
            }
            let ledger = BallLedger::from_deliveries(saved.number, saved.deliveries)
                .map_err(Error::InvalidSnapshot)?;
            let tally = Tally::replay(ledger.iter());

            let mut restored = Innings::new(saved.number, saved.batting, saved.bowling, saved.target);
            restored.ledger = ledger;
            restored.tally = tally;
            restored.crease = saved.crease;
            restored.closed = saved.closed;
            innings.push(restored);
        }

        let state = MatchState::from_parts(snapshot.info, innings, snapshot.version);
        state.verify()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, MatchFormat, SquadRoster, Toss, TossDecision, WicketKind};

    fn played() -> MatchState {
        let roster = SquadRoster::new()
            .with_player("a", "A", "lions")
            .with_player("b", "B", "lions")
            .with_player("c", "C", "lions")
            .with_player("x", "X", "tigers");
        let mut state = MatchState::new(MatchInfo::new(
            "m1",
            "lions",
            "tigers",
            MatchFormat::limited(20),
        ));
        state
            .record_toss(Toss {
                winner: "lions".into(),
                decision: TossDecision::Bat,
            })
            .unwrap();
        state.start_match().unwrap();
        state.assign_openers("a".into(), "b".into(), &roster).unwrap();
        state.assign_bowler("x".into(), &roster).unwrap();
        state.apply(&Command::runs(4)).unwrap();
        state.apply(&Command::wicket(WicketKind::Bowled)).unwrap();
        state.replace_batsman("c".into(), &roster).unwrap();
        state.apply(&Command::runs(1)).unwrap();
        state
    }

    #[test]
    fn export_import_roundtrip() {
        let state = played();
        let json = state.export_state().to_json().unwrap();

        let restored = MatchState::import_state(MatchSnapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored.version(), state.version());
        assert_eq!(restored.innings(), state.innings());
        assert!(!restored.undo().is_armed());
    }

    #[test]
    fn deterministic_serialization() {
        let a = played().export_state().to_json().unwrap();
        let b = played().export_state().to_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reject_gapped_ledger() {
        let mut snapshot = played().export_state();
        snapshot.innings[0].deliveries.remove(1);
        assert!(matches!(
            MatchState::import_state(snapshot),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn reject_innings_in_setup() {
        let mut snapshot = played().export_state();
        snapshot.info.status = MatchStatus::Setup;
        assert!(matches!(
            MatchState::import_state(snapshot),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn reject_unplayable_format() {
        for overs in [0, MatchFormat::MAX_OVERS + 1] {
            let mut snapshot = played().export_state();
            snapshot.info.format = MatchFormat::limited(overs);
            assert!(matches!(
                MatchState::import_state(snapshot),
                Err(Error::InvalidSnapshot(_))
            ));
        }
    }

    #[test]
    fn reject_future_format_version() {
        let mut snapshot = played().export_state();
        snapshot.format_version = 999;
        let json = snapshot.to_json().unwrap();
        assert!(matches!(
            MatchSnapshot::from_json(&json),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn snapshot_metadata() {
        let snapshot = played().export_state();
        let metadata: SnapshotMetadata = (&snapshot).into();
        assert_eq!(metadata.match_id, "m1");
        assert_eq!(metadata.status, MatchStatus::Live);
        assert_eq!(metadata.innings_count, 1);
        assert_eq!(metadata.delivery_count, 3);
    }
}
