//! Innings aggregation - running totals and player figures.
//!
//! Figures are maintained incrementally: [`Tally::apply`] folds one
//! delivery in and [`Tally::revert`] is its exact inverse. [`Tally::replay`]
//! rebuilds everything from a ledger and is used as a consistency check.

use crate::{Delivery, ExtraKind, PlayerId, WicketKind, BALLS_PER_OVER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extras conceded, by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrasBreakdown {
    pub wides: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
}

impl ExtrasBreakdown {
    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes
    }

    fn slot(&mut self, kind: ExtraKind) -> &mut u32 {
        match kind {
            ExtraKind::Wide => &mut self.wides,
            ExtraKind::NoBall => &mut self.no_balls,
            ExtraKind::Bye => &mut self.byes,
            ExtraKind::LegBye => &mut self.leg_byes,
        }
    }
}

/// Team totals for an innings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsTotals {
    pub runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
    pub extras: ExtrasBreakdown,
}

impl InningsTotals {
    /// Completed overs and balls into the current one.
    pub fn overs(&self) -> (u32, u32) {
        (
            self.legal_balls / BALLS_PER_OVER,
            self.legal_balls % BALLS_PER_OVER,
        )
    }

    /// Overs in scorebook form, e.g. "12.3".
    pub fn overs_display(&self) -> String {
        let (overs, balls) = self.overs();
        format!("{}.{}", overs, balls)
    }
}

/// Batting and bowling figures for one player in one innings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInningsStat {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissal: Option<WicketKind>,
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
}

impl PlayerInningsStat {
    fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_batted(&self) -> bool {
        self.balls_faced > 0 || self.runs > 0 || self.dismissal.is_some()
    }

    pub fn has_bowled(&self) -> bool {
        self.balls_bowled > 0 || self.runs_conceded > 0
    }
}

/// Incrementally maintained aggregates for one innings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub totals: InningsTotals,
    /// Player figures; BTreeMap keeps serialization order stable
    pub players: BTreeMap<PlayerId, PlayerInningsStat>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild aggregates from scratch.
    pub fn replay<'a>(deliveries: impl IntoIterator<Item = &'a Delivery>) -> Self {
        let mut tally = Self::new();
        for delivery in deliveries {
            tally.apply(delivery);
        }
        tally
    }

    pub fn player(&self, id: &str) -> Option<&PlayerInningsStat> {
        self.players.get(id)
    }

    /// Runs credited to batsmen across the innings.
    pub fn batting_runs(&self) -> u32 {
        self.players.values().map(|p| p.runs).sum()
    }

    /// Fold one delivery into the aggregates.
    pub fn apply(&mut self, delivery: &Delivery) {
        let totals = &mut self.totals;
        totals.runs += delivery.total_runs();
        if let Some(kind) = delivery.extra {
            *totals.extras.slot(kind) += delivery.extra_runs;
        }
        if delivery.is_legal() {
            totals.legal_balls += 1;
        }
        if delivery.wicket.is_some() {
            totals.wickets += 1;
        }

        // A wide never reaches the striker's card
        if delivery.faced_by_striker() {
            let striker = self.players.entry(delivery.striker.clone()).or_default();
            striker.runs += delivery.bat_runs;
            striker.balls_faced += 1;
            if delivery.is_four() {
                striker.fours += 1;
            }
            if delivery.is_six() {
                striker.sixes += 1;
            }
        }

        let bowler = self.players.entry(delivery.bowler.clone()).or_default();
        if delivery.is_legal() {
            bowler.balls_bowled += 1;
        }
        bowler.runs_conceded += delivery.conceded();

        if let Some(dismissal) = &delivery.wicket {
            if dismissal.kind.credits_bowler() {
                self.players
                    .entry(delivery.bowler.clone())
                    .or_default()
                    .wickets += 1;
            }
            let out = self.players.entry(dismissal.player_out.clone()).or_default();
            debug_assert!(out.dismissal.is_none(), "batsman dismissed twice");
            out.dismissal = Some(dismissal.kind);
        }
    }

    /// Exact inverse of [`Tally::apply`] for the same delivery.
    ///
    /// Must only be called with the most recently applied delivery.
    pub fn revert(&mut self, delivery: &Delivery) {
        let totals = &mut self.totals;
        totals.runs -= delivery.total_runs();
        if let Some(kind) = delivery.extra {
            *totals.extras.slot(kind) -= delivery.extra_runs;
        }
        if delivery.is_legal() {
            totals.legal_balls -= 1;
        }
        if delivery.wicket.is_some() {
            totals.wickets -= 1;
        }

        if let Some(dismissal) = &delivery.wicket {
            if let Some(out) = self.players.get_mut(&dismissal.player_out) {
                out.dismissal = None;
            }
            if dismissal.kind.credits_bowler() {
                if let Some(bowler) = self.players.get_mut(&delivery.bowler) {
                    bowler.wickets -= 1;
                }
            }
        }

        if let Some(bowler) = self.players.get_mut(&delivery.bowler) {
            if delivery.is_legal() {
                bowler.balls_bowled -= 1;
            }
            bowler.runs_conceded -= delivery.conceded();
        }

        if delivery.faced_by_striker() {
            if let Some(striker) = self.players.get_mut(&delivery.striker) {
                striker.runs -= delivery.bat_runs;
                striker.balls_faced -= 1;
                if delivery.is_four() {
                    striker.fours -= 1;
                }
                if delivery.is_six() {
                    striker.sixes -= 1;
                }
            }
        }

        // apply() never leaves a blank entry behind, so a blank entry here
        // is one this delivery created
        let out = delivery.wicket.as_ref().map(|d| &d.player_out);
        for id in [Some(&delivery.striker), Some(&delivery.bowler), out]
            .into_iter()
            .flatten()
        {
            if self.players.get(id).is_some_and(PlayerInningsStat::is_blank) {
                self.players.remove(id);
            }
        }
    }

    /// Describe the first difference from another tally, if any.
    pub fn diff(&self, other: &Tally) -> Option<String> {
        if self.totals != other.totals {
            return Some(format!(
                "totals {:?} != {:?}",
                self.totals, other.totals
            ));
        }
        for (id, stat) in &self.players {
            if other.players.get(id) != Some(stat) {
                return Some(format!("figures for {} differ", id));
            }
        }
        if self.players.len() != other.players.len() {
            return Some("player sets differ".to_string());
        }
        None
    }
}
