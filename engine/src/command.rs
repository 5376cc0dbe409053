//! Scoring commands.
//!
//! The engine consumes already-structured commands; turning an utterance
//! or a button press into one of these values happens upstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtraKind {
    Wide,
    NoBall,
    Bye,
    LegBye,
}

impl ExtraKind {
    /// Wides and no-balls do not consume a ball of the over.
    pub fn is_legal(self) -> bool {
        matches!(self, ExtraKind::Bye | ExtraKind::LegBye)
    }

    /// Runs added automatically on top of whatever was run.
    pub fn penalty(self) -> u32 {
        match self {
            ExtraKind::Wide | ExtraKind::NoBall => 1,
            ExtraKind::Bye | ExtraKind::LegBye => 0,
        }
    }
}

impl fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraKind::Wide => write!(f, "wide"),
            ExtraKind::NoBall => write!(f, "no-ball"),
            ExtraKind::Bye => write!(f, "bye"),
            ExtraKind::LegBye => write!(f, "leg-bye"),
        }
    }
}

/// How a batsman was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WicketKind {
    Bowled,
    Caught,
    Lbw,
    Stumped,
    HitWicket,
    RunOut,
    ObstructingField,
}

impl WicketKind {
    /// Whether the dismissal goes into the bowler's figures.
    pub fn credits_bowler(self) -> bool {
        !self.is_fielding_dismissal()
    }

    /// Dismissals attributed to the fielding side. These are also the only
    /// ones that can fall on the non-striker.
    pub fn is_fielding_dismissal(self) -> bool {
        matches!(self, WicketKind::RunOut | WicketKind::ObstructingField)
    }
}

impl fmt::Display for WicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WicketKind::Bowled => "bowled",
            WicketKind::Caught => "caught",
            WicketKind::Lbw => "lbw",
            WicketKind::Stumped => "stumped",
            WicketKind::HitWicket => "hit wicket",
            WicketKind::RunOut => "run out",
            WicketKind::ObstructingField => "obstructing the field",
        };
        write!(f, "{}", s)
    }
}

/// Which batsman a dismissal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Batter {
    #[default]
    Striker,
    NonStriker,
}

/// A structured scoring command addressed to one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Runs off the bat on a legal delivery.
    #[serde(rename_all = "camelCase")]
    Runs {
        runs: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commentary: Option<String>,
    },

    /// A dismissal on a legal delivery.
    #[serde(rename_all = "camelCase")]
    Wicket {
        kind: WicketKind,
        /// Runs completed before the dismissal
        #[serde(default)]
        runs: u32,
        #[serde(default)]
        batter: Batter,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commentary: Option<String>,
    },

    /// An extra. For wides and no-balls `runs` excludes the one-run penalty.
    #[serde(rename_all = "camelCase")]
    Extra {
        category: ExtraKind,
        #[serde(default)]
        runs: u32,
        /// Runs off a no-ball that came off the bat
        #[serde(default)]
        off_bat: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commentary: Option<String>,
    },

    /// Undo the most recent delivery.
    Correction,
}

impl Command {
    pub fn runs(runs: u32) -> Self {
        Command::Runs {
            runs,
            commentary: None,
        }
    }

    pub fn wicket(kind: WicketKind) -> Self {
        Command::Wicket {
            kind,
            runs: 0,
            batter: Batter::Striker,
            commentary: None,
        }
    }

    pub fn run_out(runs: u32, batter: Batter) -> Self {
        Command::Wicket {
            kind: WicketKind::RunOut,
            runs,
            batter,
            commentary: None,
        }
    }

    pub fn extra(category: ExtraKind, runs: u32) -> Self {
        Command::Extra {
            category,
            runs,
            off_bat: false,
            commentary: None,
        }
    }

    /// No-ball where the batsman hit `runs` off it.
    pub fn no_ball_off_bat(runs: u32) -> Self {
        Command::Extra {
            category: ExtraKind::NoBall,
            runs,
            off_bat: true,
            commentary: None,
        }
    }

    /// Attach commentary text.
    pub fn with_commentary(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Command::Runs { commentary, .. }
            | Command::Wicket { commentary, .. }
            | Command::Extra { commentary, .. } => *commentary = Some(text.into()),
            Command::Correction => {}
        }
        self
    }

    pub fn is_correction(&self) -> bool {
        matches!(self, Command::Correction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_legality() {
        assert!(!ExtraKind::Wide.is_legal());
        assert!(!ExtraKind::NoBall.is_legal());
        assert!(ExtraKind::Bye.is_legal());
        assert!(ExtraKind::LegBye.is_legal());
    }

    #[test]
    fn bowler_credit() {
        assert!(WicketKind::Bowled.credits_bowler());
        assert!(WicketKind::Stumped.credits_bowler());
        assert!(!WicketKind::RunOut.credits_bowler());
        assert!(!WicketKind::ObstructingField.credits_bowler());
    }

    #[test]
    fn wire_format() {
        let cmd: Command = serde_json::from_str(r#"{"type": "runs", "runs": 4}"#).unwrap();
        assert_eq!(cmd, Command::runs(4));

        let cmd: Command =
            serde_json::from_str(r#"{"type": "wicket", "kind": "runOut", "runs": 1, "batter": "nonStriker"}"#)
                .unwrap();
        assert_eq!(cmd, Command::run_out(1, Batter::NonStriker));

        let cmd: Command = serde_json::from_str(
            r#"{"type": "extra", "category": "noBall", "runs": 4, "offBat": true}"#,
        )
        .unwrap();
        assert_eq!(cmd, Command::no_ball_off_bat(4));

        let json = serde_json::to_string(&Command::Correction).unwrap();
        assert_eq!(json, r#"{"type":"correction"}"#);
    }

    #[test]
    fn commentary_is_optional() {
        let cmd = Command::runs(6).with_commentary("into the stands");
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("into the stands"));

        let json = serde_json::to_string(&Command::runs(1)).unwrap();
        assert!(!json.contains("commentary"));
    }
}
