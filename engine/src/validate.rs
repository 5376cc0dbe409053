//! Command validation.
//!
//! Checks a command against the current match and innings before anything
//! is mutated. On success the command is normalized into a
//! [`PendingDelivery`] ready for the ledger.

use crate::{
    error::Result, Batter, Command, Dismissal, Error, ExtraKind, Innings, MatchInfo,
    MatchStatus, PendingDelivery, WicketKind,
};

/// Highest number of runs a single delivery may carry.
pub const MAX_RUNS_PER_BALL: u32 = 6;

/// What an admitted command will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Deliver(PendingDelivery),
    Undo,
}

/// Read-only view used to admit or reject a command.
#[derive(Debug)]
pub struct Validator<'a> {
    info: &'a MatchInfo,
    innings: Option<&'a Innings>,
    undo_ready: bool,
}

impl<'a> Validator<'a> {
    pub fn new(info: &'a MatchInfo, innings: Option<&'a Innings>, undo_ready: bool) -> Self {
        Self {
            info,
            innings,
            undo_ready,
        }
    }

    /// Admit or reject a command. Never mutates anything.
    pub fn check(&self, command: &Command) -> Result<Admission> {
        if command.is_correction() {
            return self.check_correction();
        }

        // Wicket limit is a property of the innings and holds even after
        // the lifecycle has moved on.
        if let (Command::Wicket { .. }, Some(innings)) = (command, self.innings) {
            let limit = self.info.format.wicket_limit();
            if innings.tally.totals.wickets >= limit {
                return Err(Error::TooManyWickets(innings.tally.totals.wickets));
            }
        }

        if self.info.status != MatchStatus::Live {
            return Err(Error::InvalidState(self.info.status));
        }
        let innings = self
            .innings
            .filter(|i| !i.is_closed())
            .ok_or(Error::InvalidState(self.info.status))?;

        let crease = &innings.crease;
        if let Some(player) = &crease.pending_replacement {
            return Err(Error::PendingReplacement(player.clone()));
        }
        let striker = crease
            .striker
            .clone()
            .ok_or(Error::MissingParticipants("striker"))?;
        let non_striker = crease
            .non_striker
            .clone()
            .ok_or(Error::MissingParticipants("non-striker"))?;
        let bowler = crease
            .bowler
            .clone()
            .ok_or(Error::MissingParticipants("bowler"))?;

        let mut pending = PendingDelivery {
            striker,
            non_striker,
            bowler,
            bat_runs: 0,
            extra: None,
            extra_runs: 0,
            wicket: None,
            commentary: String::new(),
        };

        let commentary = match command {
            Command::Runs { runs, commentary } => {
                check_runs(*runs)?;
                pending.bat_runs = *runs;
                commentary
            }
            Command::Wicket {
                kind,
                runs,
                batter,
                commentary,
            } => {
                check_runs(*runs)?;
                let player_out = match batter {
                    Batter::Striker => pending.striker.clone(),
                    Batter::NonStriker if kind.is_fielding_dismissal() => {
                        pending.non_striker.clone()
                    }
                    Batter::NonStriker => {
                        return Err(Error::InvalidDismissal {
                            kind: kind.to_string(),
                        })
                    }
                };
                pending.bat_runs = *runs;
                pending.wicket = Some(Dismissal {
                    kind: *kind,
                    player_out,
                });
                commentary
            }
            Command::Extra {
                category,
                runs,
                off_bat,
                commentary,
            } => {
                check_runs(*runs)?;
                pending.extra = Some(*category);
                if *category == ExtraKind::NoBall && *off_bat {
                    pending.bat_runs = *runs;
                    pending.extra_runs = category.penalty();
                } else {
                    pending.extra_runs = category.penalty() + runs;
                }
                commentary
            }
            Command::Correction => return self.check_correction(),
        };

        let text = match commentary {
            Some(text) => text.clone(),
            None => default_commentary(&pending),
        };
        pending.commentary = text;
        Ok(Admission::Deliver(pending))
    }

    fn check_correction(&self) -> Result<Admission> {
        // A mistaken innings-closing ball can still be taken back during
        // the break; a completed match is final.
        if !matches!(
            self.info.status,
            MatchStatus::Live | MatchStatus::InningsBreak
        ) {
            return Err(Error::InvalidState(self.info.status));
        }
        match self.innings {
            Some(innings) if !innings.ledger.is_empty() && self.undo_ready => Ok(Admission::Undo),
            _ => Err(Error::NothingToUndo),
        }
    }
}

fn check_runs(runs: u32) -> Result<()> {
    if runs > MAX_RUNS_PER_BALL {
        Err(Error::InvalidRuns(runs))
    } else {
        Ok(())
    }
}

fn default_commentary(pending: &PendingDelivery) -> String {
    if let Some(dismissal) = &pending.wicket {
        let mut text = format!("OUT ({})", dismissal.kind);
        if dismissal.kind == WicketKind::RunOut && pending.bat_runs > 0 {
            text.push_str(&format!(" after {} completed", pending.bat_runs));
        }
        return text;
    }
    match (pending.extra, pending.bat_runs) {
        (None, 0) => "no run".to_string(),
        (None, 4) => "FOUR".to_string(),
        (None, 6) => "SIX".to_string(),
        (None, 1) => "1 run".to_string(),
        (None, n) => format!("{} runs", n),
        (Some(ExtraKind::NoBall), n) if n > 0 => format!("no-ball, {} off the bat", n),
        (Some(kind), _) => {
            let runs = pending.extra_runs;
            if runs == 1 {
                format!("1 {}", kind)
            } else {
                format!("{} {}s", runs, kind)
            }
        }
    }
}
