//! Single-level undo.
//!
//! The frame saved before each delivery holds everything the delivery can
//! change that the ledger tail cannot give back by itself: the crease,
//! the innings close marker and the match status/result. Aggregates are
//! restored by reverting the popped delivery.

use crate::{Crease, InningsEnd, InningsNumber, MatchResult, MatchStatus, Sequence};
use serde::{Deserialize, Serialize};

/// State captured just before a delivery was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoFrame {
    pub innings: InningsNumber,
    /// Sequence number of the delivery this frame undoes
    pub seq: Sequence,
    pub crease: Crease,
    pub closed: Option<InningsEnd>,
    pub status: MatchStatus,
    pub result: Option<MatchResult>,
}

/// Holds at most one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoController {
    frame: Option<UndoFrame>,
}

impl UndoController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the state before the latest delivery, replacing any
    /// older frame.
    pub fn arm(&mut self, frame: UndoFrame) {
        self.frame = Some(frame);
    }

    pub fn is_armed(&self) -> bool {
        self.frame.is_some()
    }

    pub fn peek(&self) -> Option<&UndoFrame> {
        self.frame.as_ref()
    }

    /// Consume the frame. A second call returns `None`.
    pub fn take(&mut self) -> Option<UndoFrame> {
        self.frame.take()
    }

    pub fn clear(&mut self) {
        self.frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seq: Sequence) -> UndoFrame {
        UndoFrame {
            innings: 1,
            seq,
            crease: Crease::default(),
            closed: None,
            status: MatchStatus::Live,
            result: None,
        }
    }

    #[test]
    fn holds_one_level() {
        let mut undo = UndoController::new();
        assert!(!undo.is_armed());

        undo.arm(frame(1));
        undo.arm(frame(2));
        assert_eq!(undo.peek().unwrap().seq, 2);

        assert_eq!(undo.take().unwrap().seq, 2);
        assert!(undo.take().is_none());
    }
}
