//! Ledger entry types.

use crate::{ExtraKind, InningsNumber, PlayerId, Sequence, WicketKind};
use serde::{Deserialize, Serialize};

/// A dismissal recorded on a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dismissal {
    pub kind: WicketKind,
    /// The batsman who is out (striker unless run out at the other end)
    pub player_out: PlayerId,
}

/// A validated delivery waiting for the ledger to number it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDelivery {
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    /// Runs credited to the striker
    pub bat_runs: u32,
    pub extra: Option<ExtraKind>,
    /// All extras on this delivery, penalty included
    pub extra_runs: u32,
    pub wicket: Option<Dismissal>,
    pub commentary: String,
}

/// One bowled delivery, legal or not. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// Gapless per-innings sequence number, starting at 1
    pub seq: Sequence,
    pub innings: InningsNumber,
    /// Over number, starting at 1
    pub over: u32,
    /// Ball within the over being attempted; only legal deliveries move it on
    pub ball: u32,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    pub bat_runs: u32,
    pub extra: Option<ExtraKind>,
    pub extra_runs: u32,
    pub wicket: Option<Dismissal>,
    pub commentary: String,
}

impl Delivery {
    /// Whether this delivery consumes one of the over's six balls.
    pub fn is_legal(&self) -> bool {
        self.extra.map_or(true, ExtraKind::is_legal)
    }

    /// Runs added to the innings total.
    pub fn total_runs(&self) -> u32 {
        self.bat_runs + self.extra_runs
    }

    /// Runs physically run (or hit) between the wickets, penalties excluded.
    /// This is what decides strike.
    pub fn runs_run(&self) -> u32 {
        let penalty = self.extra.map_or(0, ExtraKind::penalty);
        self.bat_runs + self.extra_runs - penalty
    }

    /// Whether the striker is charged with a ball faced.
    pub fn faced_by_striker(&self) -> bool {
        self.extra != Some(ExtraKind::Wide)
    }

    /// Runs charged against the bowler's analysis.
    pub fn conceded(&self) -> u32 {
        let extras = match self.extra {
            Some(ExtraKind::Wide) => self.extra_runs,
            Some(ExtraKind::NoBall) => ExtraKind::NoBall.penalty(),
            Some(ExtraKind::Bye) | Some(ExtraKind::LegBye) | None => 0,
        };
        self.bat_runs + extras
    }

    pub fn is_four(&self) -> bool {
        self.bat_runs == 4
    }

    pub fn is_six(&self) -> bool {
        self.bat_runs == 6
    }

    /// Short scorebook notation ("4", "W", "1wd", "2nb", "1lb").
    pub fn notation(&self) -> String {
        let mut out = match self.extra {
            Some(ExtraKind::Wide) => format!("{}wd", self.extra_runs),
            Some(ExtraKind::NoBall) => format!("{}nb", self.total_runs()),
            Some(ExtraKind::Bye) => format!("{}b", self.extra_runs),
            Some(ExtraKind::LegBye) => format!("{}lb", self.extra_runs),
            None if self.wicket.is_some() && self.bat_runs == 0 => String::new(),
            None => self.bat_runs.to_string(),
        };
        if self.wicket.is_some() {
            out.push('W');
        }
        out
    }
}

impl PendingDelivery {
    /// Number the delivery for the ledger.
    pub(crate) fn into_delivery(
        self,
        seq: Sequence,
        innings: InningsNumber,
        over: u32,
        ball: u32,
    ) -> Delivery {
        Delivery {
            seq,
            innings,
            over,
            ball,
            striker: self.striker,
            non_striker: self.non_striker,
            bowler: self.bowler,
            bat_runs: self.bat_runs,
            extra: self.extra,
            extra_runs: self.extra_runs,
            wicket: self.wicket,
            commentary: self.commentary,
        }
    }
}
