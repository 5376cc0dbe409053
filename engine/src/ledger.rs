//! The ball ledger - append-only record of deliveries for one innings.
//!
//! The ledger is the source of truth. Aggregates are derived from it and
//! can always be rebuilt by replaying it from the start.

use crate::{Delivery, InningsNumber, PendingDelivery, Sequence};
use serde::{Deserialize, Serialize};

/// Legal deliveries per over.
pub const BALLS_PER_OVER: u32 = 6;

/// Ordered deliveries of one innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallLedger {
    innings: InningsNumber,
    deliveries: Vec<Delivery>,
    /// Legal deliveries in the ledger
    legal: u32,
}

impl BallLedger {
    /// Create an empty ledger for an innings.
    pub fn new(innings: InningsNumber) -> Self {
        Self {
            innings,
            deliveries: Vec::new(),
            legal: 0,
        }
    }

    /// Rebuild a ledger from stored deliveries, checking numbering.
    pub fn from_deliveries(
        innings: InningsNumber,
        deliveries: Vec<Delivery>,
    ) -> Result<Self, String> {
        let mut ledger = Self::new(innings);
        for delivery in deliveries {
            let (over, ball) = ledger.position();
            if delivery.seq != ledger.next_seq()
                || delivery.innings != innings
                || delivery.over != over
                || delivery.ball != ball
            {
                return Err(format!(
                    "delivery {} of innings {} is out of order",
                    delivery.seq, delivery.innings
                ));
            }
            ledger.push(delivery);
        }
        Ok(ledger)
    }

    pub fn innings(&self) -> InningsNumber {
        self.innings
    }

    /// Sequence number the next appended delivery will get.
    pub fn next_seq(&self) -> Sequence {
        self.deliveries.len() as Sequence + 1
    }

    /// Legal deliveries recorded so far.
    pub fn legal_balls(&self) -> u32 {
        self.legal
    }

    /// (over, ball) the next delivery will be bowled at.
    pub fn position(&self) -> (u32, u32) {
        (
            self.legal / BALLS_PER_OVER + 1,
            self.legal % BALLS_PER_OVER + 1,
        )
    }

    /// Append a validated delivery. Returns the numbered entry.
    ///
    /// This is the only way deliveries enter the ledger.
    pub fn append(&mut self, pending: PendingDelivery) -> &Delivery {
        let (over, ball) = self.position();
        let delivery = pending.into_delivery(self.next_seq(), self.innings, over, ball);
        let index = self.deliveries.len();
        self.push(delivery);
        &self.deliveries[index]
    }

    fn push(&mut self, delivery: Delivery) {
        if delivery.is_legal() {
            self.legal += 1;
        }
        self.deliveries.push(delivery);
    }

    /// Remove the tail entry. Used only by undo.
    pub fn pop(&mut self) -> Option<Delivery> {
        let delivery = self.deliveries.pop()?;
        if delivery.is_legal() {
            debug_assert!(self.legal > 0, "legal ball count underflow");
            self.legal -= 1;
        }
        Some(delivery)
    }

    pub fn last(&self) -> Option<&Delivery> {
        self.deliveries.last()
    }

    /// The most recent `n` deliveries, oldest first.
    pub fn recent(&self, n: usize) -> &[Delivery] {
        let start = self.deliveries.len().saturating_sub(n);
        &self.deliveries[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtraKind;

    fn pending(extra: Option<ExtraKind>) -> PendingDelivery {
        PendingDelivery {
            striker: "s".into(),
            non_striker: "n".into(),
            bowler: "b".into(),
            bat_runs: 0,
            extra,
            extra_runs: extra.map_or(0, ExtraKind::penalty),
            wicket: None,
            commentary: String::new(),
        }
    }

    #[test]
    fn sequence_is_gapless() {
        let mut ledger = BallLedger::new(1);
        for expected in 1..=8 {
            let d = ledger.append(pending(None));
            assert_eq!(d.seq, expected);
        }
        assert_eq!(ledger.len(), 8);
    }

    #[test]
    fn over_rolls_after_six_legal_balls() {
        let mut ledger = BallLedger::new(1);
        for _ in 0..5 {
            ledger.append(pending(None));
        }
        assert_eq!(ledger.position(), (1, 6));

        let d = ledger.append(pending(Some(ExtraKind::Wide)));
        assert_eq!((d.over, d.ball), (1, 6));
        let d = ledger.append(pending(Some(ExtraKind::NoBall)));
        assert_eq!((d.over, d.ball), (1, 6));
        assert_eq!(ledger.position(), (1, 6));

        let d = ledger.append(pending(Some(ExtraKind::Bye)));
        assert_eq!((d.over, d.ball), (1, 6));
        assert_eq!(ledger.position(), (2, 1));
        assert_eq!(ledger.legal_balls(), 6);
    }

    #[test]
    fn pop_reuses_sequence_and_position() {
        let mut ledger = BallLedger::new(2);
        ledger.append(pending(None));
        ledger.append(pending(None));
        let popped = ledger.pop().unwrap();
        assert_eq!(popped.seq, 2);
        assert_eq!(ledger.next_seq(), 2);
        assert_eq!(ledger.position(), (1, 2));

        let d = ledger.append(pending(None));
        assert_eq!(d.seq, 2);
        assert_eq!(d.innings, 2);
    }

    #[test]
    fn pop_empty() {
        let mut ledger = BallLedger::new(1);
        assert!(ledger.pop().is_none());
        assert_eq!(ledger.legal_balls(), 0);
    }

    #[test]
    fn recent_window() {
        let mut ledger = BallLedger::new(1);
        for _ in 0..4 {
            ledger.append(pending(None));
        }
        let recent = ledger.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].seq, 3);
        assert_eq!(ledger.recent(10).len(), 4);
    }

    #[test]
    fn rebuild_rejects_gaps() {
        let mut ledger = BallLedger::new(1);
        ledger.append(pending(None));
        ledger.append(pending(None));
        let mut entries = ledger.deliveries().to_vec();
        assert!(BallLedger::from_deliveries(1, entries.clone()).is_ok());

        entries.remove(0);
        assert!(BallLedger::from_deliveries(1, entries).is_err());
    }
}
