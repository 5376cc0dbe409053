//! Innings state: ledger, aggregates and the players at the crease.

use crate::{
    error::Result, strike::strike_swaps, BallLedger, Delivery, Error, InningsEnd, InningsNumber,
    MatchFormat, PendingDelivery, PlayerId, Tally, TeamId, BALLS_PER_OVER,
};
use serde::{Deserialize, Serialize};

/// Who is batting and bowling right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crease {
    pub striker: Option<PlayerId>,
    pub non_striker: Option<PlayerId>,
    pub bowler: Option<PlayerId>,
    /// Bowler of the last completed over; may not bowl the next one
    pub previous_bowler: Option<PlayerId>,
    /// Dismissed batsman whose end is vacant
    pub pending_replacement: Option<PlayerId>,
}

impl Crease {
    /// Batsmen change ends.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    /// Whether `player` is one of the two batsmen in.
    pub fn is_batting(&self, player: &str) -> bool {
        self.striker.as_deref() == Some(player) || self.non_striker.as_deref() == Some(player)
    }

    /// Remove a dismissed batsman, leaving that end vacant.
    fn vacate(&mut self, player: &str) {
        if self.striker.as_deref() == Some(player) {
            self.striker = None;
        } else if self.non_striker.as_deref() == Some(player) {
            self.non_striker = None;
        }
        self.pending_replacement = Some(player.to_string());
    }

    /// The incoming batsman takes the vacant end.
    pub(crate) fn fill_vacancy(&mut self, player: PlayerId) {
        if self.striker.is_none() {
            self.striker = Some(player);
        } else {
            debug_assert!(self.non_striker.is_none(), "no vacant end");
            self.non_striker = Some(player);
        }
        self.pending_replacement = None;
    }

    fn end_over(&mut self) {
        self.previous_bowler = self.bowler.take();
    }
}

/// One side's batting turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Innings {
    pub number: InningsNumber,
    pub batting: TeamId,
    pub bowling: TeamId,
    /// Runs needed to win, second innings only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    pub ledger: BallLedger,
    pub tally: Tally,
    pub crease: Crease,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<InningsEnd>,
}

impl Innings {
    pub fn new(
        number: InningsNumber,
        batting: impl Into<TeamId>,
        bowling: impl Into<TeamId>,
        target: Option<u32>,
    ) -> Self {
        Self {
            number,
            batting: batting.into(),
            bowling: bowling.into(),
            target,
            ledger: BallLedger::new(number),
            tally: Tally::new(),
            crease: Crease::default(),
            closed: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    pub fn has_been_dismissed(&self, player: &str) -> bool {
        self.tally
            .player(player)
            .is_some_and(|p| p.dismissal.is_some())
    }

    /// Append a delivery and update aggregates and the crease.
    pub(crate) fn record(&mut self, pending: PendingDelivery) -> Delivery {
        let delivery = self.ledger.append(pending).clone();
        self.tally.apply(&delivery);

        let over_complete =
            delivery.is_legal() && self.ledger.legal_balls() % BALLS_PER_OVER == 0;
        if strike_swaps(delivery.runs_run(), over_complete) {
            self.crease.rotate();
        }
        // Vacate the dismissed batsman wherever the batsmen ended up
        if let Some(dismissal) = &delivery.wicket {
            self.crease.vacate(&dismissal.player_out);
        }
        if over_complete {
            self.crease.end_over();
        }
        delivery
    }

    /// Whether the innings has reached a natural end. Signals eligibility
    /// only; closing is up to the lifecycle.
    pub fn completion(&self, format: &MatchFormat) -> Option<InningsEnd> {
        let totals = &self.tally.totals;
        if self.target.is_some_and(|target| totals.runs >= target) {
            return Some(InningsEnd::TargetReached);
        }
        if totals.wickets >= format.wicket_limit() {
            return Some(InningsEnd::AllOut);
        }
        if format
            .ball_limit()
            .is_some_and(|limit| totals.legal_balls >= limit)
        {
            return Some(InningsEnd::OversExhausted);
        }
        None
    }

    pub(crate) fn close(&mut self, end: InningsEnd) {
        self.closed = Some(end);
        self.crease.pending_replacement = None;
    }

    /// Runs still needed, if chasing.
    pub fn runs_required(&self) -> Option<u32> {
        self.target
            .map(|target| target.saturating_sub(self.tally.totals.runs))
    }

    pub fn balls_remaining(&self, format: &MatchFormat) -> Option<u32> {
        format
            .ball_limit()
            .map(|limit| limit.saturating_sub(self.tally.totals.legal_balls))
    }

    /// Aggregates rebuilt from the ledger alone.
    pub fn replay(&self) -> Tally {
        Tally::replay(self.ledger.iter())
    }

    /// Compare running aggregates against a full replay.
    pub fn verify(&self) -> Result<()> {
        let replayed = self.replay();
        if let Some(diff) = self.tally.diff(&replayed) {
            return Err(Error::Inconsistent(format!(
                "innings {}: {}",
                self.number, diff
            )));
        }
        if self.ledger.legal_balls() != self.tally.totals.legal_balls {
            return Err(Error::Inconsistent(format!(
                "innings {}: ledger has {} legal balls, totals have {}",
                self.number,
                self.ledger.legal_balls(),
                self.tally.totals.legal_balls
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dismissal, WicketKind};

    fn innings() -> Innings {
        let mut innings = Innings::new(1, "lions", "tigers", None);
        innings.crease.striker = Some("a".into());
        innings.crease.non_striker = Some("b".into());
        innings.crease.bowler = Some("x".into());
        innings
    }

    fn ball(innings: &Innings, bat_runs: u32) -> PendingDelivery {
        PendingDelivery {
            striker: innings.crease.striker.clone().unwrap(),
            non_striker: innings.crease.non_striker.clone().unwrap(),
            bowler: innings.crease.bowler.clone().unwrap(),
            bat_runs,
            extra: None,
            extra_runs: 0,
            wicket: None,
            commentary: String::new(),
        }
    }

    #[test]
    fn single_rotates_strike() {
        let mut inn = innings();
        let p = ball(&inn, 1);
        inn.record(p);
        assert_eq!(inn.crease.striker.as_deref(), Some("b"));
        assert_eq!(inn.crease.non_striker.as_deref(), Some("a"));
    }

    #[test]
    fn over_end_rotates_and_releases_bowler() {
        let mut inn = innings();
        for _ in 0..6 {
            let p = ball(&inn, 0);
            inn.record(p);
        }
        assert_eq!(inn.crease.striker.as_deref(), Some("b"));
        assert_eq!(inn.crease.bowler, None);
        assert_eq!(inn.crease.previous_bowler.as_deref(), Some("x"));
        assert_eq!(inn.tally.totals.overs(), (1, 0));
    }

    #[test]
    fn run_out_vacates_correct_end() {
        let mut inn = innings();
        let mut p = ball(&inn, 1);
        // non-striker "b" run out after one completed run; batsmen crossed
        p.wicket = Some(Dismissal {
            kind: WicketKind::RunOut,
            player_out: "b".into(),
        });
        inn.record(p);

        assert_eq!(inn.crease.striker, None);
        assert_eq!(inn.crease.non_striker.as_deref(), Some("a"));
        assert_eq!(inn.crease.pending_replacement.as_deref(), Some("b"));
        assert!(inn.has_been_dismissed("b"));

        inn.crease.fill_vacancy("c".into());
        assert_eq!(inn.crease.striker.as_deref(), Some("c"));
        assert_eq!(inn.crease.pending_replacement, None);
    }

    #[test]
    fn completion_signals() {
        let format = MatchFormat::limited(1).with_players(3);
        let mut inn = innings();
        assert_eq!(inn.completion(&format), None);

        inn.tally.totals.wickets = 2;
        assert_eq!(inn.completion(&format), Some(InningsEnd::AllOut));

        inn.tally.totals.wickets = 0;
        inn.tally.totals.legal_balls = 6;
        assert_eq!(inn.completion(&format), Some(InningsEnd::OversExhausted));

        inn.target = Some(10);
        inn.tally.totals.runs = 10;
        assert_eq!(inn.completion(&format), Some(InningsEnd::TargetReached));
        assert_eq!(inn.runs_required(), Some(0));
    }

    #[test]
    fn verify_catches_drift() {
        let mut inn = innings();
        let p = ball(&inn, 4);
        inn.record(p);
        assert!(inn.verify().is_ok());

        inn.tally.totals.runs += 1;
        assert!(matches!(inn.verify(), Err(Error::Inconsistent(_))));
    }
}
