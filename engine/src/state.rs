//! MatchState - the canonical, versioned state of one match.
//!
//! All mutation goes through this type: scoring commands via
//! [`MatchState::apply`] and crease/lifecycle administration via the
//! other `&mut self` methods. Each successful call bumps the version.

use crate::{
    error::Result, validate::Admission, Command, Error, Innings, InningsEnd, InningsNumber,
    MatchInfo, MatchResult, MatchStatus, PendingDelivery, PlayerId, Roster, Sequence, Toss,
    UndoController, UndoFrame, Validator, Version,
};
use serde::{Deserialize, Serialize};

/// Result of an admitted scoring command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    pub innings: InningsNumber,
    /// Sequence number appended, or removed for a correction
    pub seq: Sequence,
    pub corrected: bool,
    /// Set when this delivery closed the innings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innings_end: Option<InningsEnd>,
    pub status: MatchStatus,
    pub version: Version,
}

/// The state of one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    info: MatchInfo,
    innings: Vec<Innings>,
    undo: UndoController,
    version: Version,
}

impl MatchState {
    /// Create a match in setup.
    pub fn new(info: MatchInfo) -> Self {
        Self {
            info,
            innings: Vec::new(),
            undo: UndoController::new(),
            version: 0,
        }
    }

    pub(crate) fn from_parts(info: MatchInfo, innings: Vec<Innings>, version: Version) -> Self {
        Self {
            info,
            innings,
            undo: UndoController::new(),
            version,
        }
    }

    pub fn info(&self) -> &MatchInfo {
        &self.info
    }

    pub fn status(&self) -> MatchStatus {
        self.info.status
    }

    /// Bumped on every admitted command and admin action.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn innings(&self) -> &[Innings] {
        &self.innings
    }

    /// The innings being played, or the one just closed during a break.
    pub fn current_innings(&self) -> Option<&Innings> {
        self.innings.last()
    }

    pub fn undo(&self) -> &UndoController {
        &self.undo
    }

    // ------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------

    /// Validate and apply a scoring command.
    ///
    /// On error nothing has changed.
    pub fn apply(&mut self, command: &Command) -> Result<ApplyResult> {
        let admission = Validator::new(
            &self.info,
            self.innings.last(),
            self.undo.is_armed(),
        )
        .check(command)?;

        match admission {
            Admission::Deliver(pending) => self.deliver(pending),
            Admission::Undo => self.correct(),
        }
    }

    fn deliver(&mut self, pending: PendingDelivery) -> Result<ApplyResult> {
        let status = self.info.status;
        let result = self.info.result.clone();
        let format = self.info.format;

        let innings = self
            .innings
            .last_mut()
            .ok_or(Error::InvalidState(status))?;
        let crease = innings.crease.clone();
        let closed = innings.closed;

        let delivery = innings.record(pending);
        let innings_end = innings.completion(&format);
        if let Some(end) = innings_end {
            innings.close(end);
        }
        let number = innings.number;

        self.undo.arm(UndoFrame {
            innings: number,
            seq: delivery.seq,
            crease,
            closed,
            status,
            result,
        });
        if innings_end.is_some() {
            self.close_innings(number);
        }
        self.version += 1;

        Ok(ApplyResult {
            innings: number,
            seq: delivery.seq,
            corrected: false,
            innings_end,
            status: self.info.status,
            version: self.version,
        })
    }

    /// Lifecycle transition once the aggregator signals completion.
    fn close_innings(&mut self, number: InningsNumber) {
        if number == 1 {
            self.info.close_first_innings();
            return;
        }
        if let [first, second] = self.innings.as_slice() {
            let result = MatchResult::decide(
                &first.batting,
                &first.tally.totals,
                &second.batting,
                &second.tally.totals,
                &self.info.format,
            );
            self.info.complete(result);
        }
    }

    fn correct(&mut self) -> Result<ApplyResult> {
        let frame = self.undo.take().ok_or(Error::NothingToUndo)?;
        let innings = self.innings.last_mut().ok_or(Error::NothingToUndo)?;
        let delivery = innings.ledger.pop().ok_or(Error::NothingToUndo)?;
        debug_assert_eq!(
            (delivery.innings, delivery.seq),
            (frame.innings, frame.seq),
            "undo frame does not match ledger tail"
        );

        innings.tally.revert(&delivery);
        innings.crease = frame.crease;
        innings.closed = frame.closed;
        let number = innings.number;
        self.info.restore(frame.status, frame.result);
        self.version += 1;

        Ok(ApplyResult {
            innings: number,
            seq: delivery.seq,
            corrected: true,
            innings_end: None,
            status: self.info.status,
            version: self.version,
        })
    }

    // ------------------------------------------------------------------
    // Lifecycle and crease administration
    // ------------------------------------------------------------------

    pub fn record_toss(&mut self, toss: Toss) -> Result<()> {
        self.info.record_toss(toss)?;
        self.version += 1;
        Ok(())
    }

    /// setup -> live, opening the first innings with an empty crease.
    pub fn start_match(&mut self) -> Result<()> {
        let (batting, bowling) = self.info.start()?;
        self.innings.push(Innings::new(1, batting, bowling, None));
        self.undo.clear();
        self.version += 1;
        Ok(())
    }

    /// Put the opening pair in. Only before the first ball of an innings.
    pub fn assign_openers(
        &mut self,
        striker: PlayerId,
        non_striker: PlayerId,
        roster: &dyn Roster,
    ) -> Result<()> {
        let innings = self.open_innings()?;
        if !innings.ledger.is_empty() {
            return Err(Error::InvalidState(self.info.status));
        }
        check_openers(innings, &striker, &non_striker, roster)?;

        let innings = self.open_innings_mut()?;
        innings.crease.striker = Some(striker);
        innings.crease.non_striker = Some(non_striker);
        self.version += 1;
        Ok(())
    }

    /// Hand the ball to a bowler. Required at the start of every over.
    pub fn assign_bowler(&mut self, bowler: PlayerId, roster: &dyn Roster) -> Result<()> {
        let innings = self.open_innings()?;
        check_bowler(innings, &bowler, roster)?;

        let innings = self.open_innings_mut()?;
        innings.crease.bowler = Some(bowler);
        self.version += 1;
        Ok(())
    }

    /// Fill the end vacated by a dismissal.
    pub fn replace_batsman(&mut self, batsman: PlayerId, roster: &dyn Roster) -> Result<()> {
        let innings = self.open_innings()?;
        if innings.crease.pending_replacement.is_none() {
            return Err(Error::InvalidState(self.info.status));
        }
        check_batsman(innings, &batsman, roster)?;

        let innings = self.open_innings_mut()?;
        innings.crease.fill_vacancy(batsman);
        self.version += 1;
        Ok(())
    }

    /// innings_break -> live, opening the second innings with its target.
    pub fn start_next_innings(
        &mut self,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
        roster: &dyn Roster,
    ) -> Result<()> {
        if self.info.status != MatchStatus::InningsBreak {
            return Err(Error::InvalidState(self.info.status));
        }
        let first = self
            .innings
            .first()
            .ok_or(Error::InvalidState(self.info.status))?;

        let mut next = Innings::new(
            first.number + 1,
            first.bowling.clone(),
            first.batting.clone(),
            Some(first.tally.totals.runs + 1),
        );
        check_openers(&next, &striker, &non_striker, roster)?;
        check_bowler(&next, &bowler, roster)?;

        self.info.resume()?;
        next.crease.striker = Some(striker);
        next.crease.non_striker = Some(non_striker);
        next.crease.bowler = Some(bowler);
        self.innings.push(next);
        self.undo.clear();
        self.version += 1;
        Ok(())
    }

    /// Any open state -> abandoned.
    pub fn abandon(&mut self) -> Result<()> {
        self.info.abandon()?;
        self.undo.clear();
        self.version += 1;
        Ok(())
    }

    /// Replay every ledger and compare with the running aggregates.
    pub fn verify(&self) -> Result<()> {
        for innings in &self.innings {
            innings.verify()?;
            let totals = &innings.tally.totals;
            if totals.runs != innings.tally.batting_runs() + totals.extras.total() {
                return Err(Error::Inconsistent(format!(
                    "innings {}: runs do not add up",
                    innings.number
                )));
            }
        }
        Ok(())
    }

    fn open_innings(&self) -> Result<&Innings> {
        if self.info.status != MatchStatus::Live {
            return Err(Error::InvalidState(self.info.status));
        }
        self.innings
            .last()
            .filter(|i| !i.is_closed())
            .ok_or(Error::InvalidState(self.info.status))
    }

    fn open_innings_mut(&mut self) -> Result<&mut Innings> {
        let status = self.info.status;
        if status != MatchStatus::Live {
            return Err(Error::InvalidState(status));
        }
        self.innings
            .last_mut()
            .filter(|i| !i.is_closed())
            .ok_or(Error::InvalidState(status))
    }
}

fn check_openers(
    innings: &Innings,
    striker: &str,
    non_striker: &str,
    roster: &dyn Roster,
) -> Result<()> {
    if striker == non_striker {
        return Err(Error::SamePlayer(non_striker.to_string()));
    }
    check_batsman(innings, striker, roster)?;
    check_batsman(innings, non_striker, roster)
}

fn check_batsman(innings: &Innings, player: &str, roster: &dyn Roster) -> Result<()> {
    let profile = roster
        .player(player)
        .ok_or_else(|| Error::UnknownPlayer(player.to_string()))?;
    if profile.team != innings.batting {
        return Err(Error::WrongTeam {
            player: player.to_string(),
            team: innings.batting.clone(),
        });
    }
    if innings.has_been_dismissed(player) || innings.crease.is_batting(player) {
        return Err(Error::SamePlayer(player.to_string()));
    }
    Ok(())
}

fn check_bowler(innings: &Innings, player: &str, roster: &dyn Roster) -> Result<()> {
    let profile = roster
        .player(player)
        .ok_or_else(|| Error::UnknownPlayer(player.to_string()))?;
    if profile.team != innings.bowling {
        return Err(Error::WrongTeam {
            player: player.to_string(),
            team: innings.bowling.clone(),
        });
    }
    if innings.crease.previous_bowler.as_deref() == Some(player) {
        return Err(Error::BowlerUnavailable(player.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Batter, ExtraKind, MatchFormat, SquadRoster, TossDecision, WicketKind,
    };

    fn roster() -> SquadRoster {
        let mut roster = SquadRoster::new();
        for i in 1..=11 {
            roster = roster
                .with_player(format!("L{}", i), format!("Lion {}", i), "lions")
                .with_player(format!("T{}", i), format!("Tiger {}", i), "tigers");
        }
        roster
    }

    /// Live match, lions batting, L1/L2 in, T1 bowling.
    fn live_match(format: MatchFormat) -> (MatchState, SquadRoster) {
        let roster = roster();
        let mut state = MatchState::new(MatchInfo::new("m1", "lions", "tigers", format));
        state
            .record_toss(Toss {
                winner: "lions".into(),
                decision: TossDecision::Bat,
            })
            .unwrap();
        state.start_match().unwrap();
        state
            .assign_openers("L1".into(), "L2".into(), &roster)
            .unwrap();
        state.assign_bowler("T1".into(), &roster).unwrap();
        (state, roster)
    }

    fn striker(state: &MatchState) -> Option<&str> {
        state.current_innings()?.crease.striker.as_deref()
    }

    #[test]
    fn oversized_format_never_goes_live() {
        let mut state = MatchState::new(MatchInfo::new(
            "m1",
            "lions",
            "tigers",
            MatchFormat::limited(MatchFormat::MAX_OVERS + 1),
        ));
        state
            .record_toss(Toss {
                winner: "lions".into(),
                decision: TossDecision::Bat,
            })
            .unwrap();
        let before = state.clone();

        assert!(matches!(state.start_match(), Err(Error::InvalidFormat(_))));
        assert_eq!(state, before);
        assert!(matches!(
            state.apply(&Command::runs(1)),
            Err(Error::InvalidState(MatchStatus::Setup))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn largest_format_scores_without_overflow() {
        let (mut state, _) = live_match(MatchFormat::limited(MatchFormat::MAX_OVERS));
        let result = state.apply(&Command::runs(1)).unwrap();
        assert_eq!(result.innings_end, None);
        assert_eq!(state.status(), MatchStatus::Live);
        assert_eq!(state.current_innings().unwrap().ledger.len(), 1);
    }

    #[test]
    fn start_opens_first_innings() {
        let (state, _) = live_match(MatchFormat::limited(20));
        assert_eq!(state.status(), MatchStatus::Live);
        let innings = state.current_innings().unwrap();
        assert_eq!(innings.number, 1);
        assert_eq!(innings.batting, "lions");
        assert_eq!(innings.bowling, "tigers");
        assert_eq!(state.version(), 4);
    }

    #[test]
    fn scoring_before_openers_is_rejected() {
        let roster = roster();
        let mut state = MatchState::new(MatchInfo::new(
            "m1",
            "lions",
            "tigers",
            MatchFormat::limited(20),
        ));
        assert_eq!(
            state.apply(&Command::runs(1)),
            Err(Error::InvalidState(MatchStatus::Setup))
        );
        state
            .record_toss(Toss {
                winner: "tigers".into(),
                decision: TossDecision::Bat,
            })
            .unwrap();
        state.start_match().unwrap();
        assert_eq!(
            state.apply(&Command::runs(1)),
            Err(Error::MissingParticipants("striker"))
        );
        // tigers won the toss and bat, so lions cannot open
        assert!(matches!(
            state.assign_openers("L1".into(), "L2".into(), &roster),
            Err(Error::WrongTeam { .. })
        ));
    }

    #[test]
    fn over_needs_new_bowler() {
        let (mut state, roster) = live_match(MatchFormat::limited(20));
        for _ in 0..6 {
            state.apply(&Command::runs(0)).unwrap();
        }
        assert_eq!(
            state.apply(&Command::runs(0)),
            Err(Error::MissingParticipants("bowler"))
        );
        assert_eq!(
            state.assign_bowler("T1".into(), &roster),
            Err(Error::BowlerUnavailable("T1".into()))
        );
        state.assign_bowler("T2".into(), &roster).unwrap();
        state.apply(&Command::runs(0)).unwrap();
    }

    #[test]
    fn wicket_blocks_until_replacement() {
        let (mut state, roster) = live_match(MatchFormat::limited(20));
        state.apply(&Command::wicket(WicketKind::Caught)).unwrap();

        assert_eq!(
            state.apply(&Command::runs(1)),
            Err(Error::PendingReplacement("L1".into()))
        );
        assert_eq!(
            state.replace_batsman("L1".into(), &roster),
            Err(Error::SamePlayer("L1".into()))
        );
        state.replace_batsman("L3".into(), &roster).unwrap();
        assert_eq!(striker(&state), Some("L3"));
        state.apply(&Command::runs(1)).unwrap();
    }

    #[test]
    fn correction_restores_exact_state() {
        let (mut state, _) = live_match(MatchFormat::limited(20));
        state.apply(&Command::runs(3)).unwrap();
        let before = state.current_innings().unwrap().clone();

        state.apply(&Command::runs(4)).unwrap();
        let undone = state.apply(&Command::Correction).unwrap();
        assert!(undone.corrected);
        assert_eq!(undone.seq, 2);
        assert_eq!(state.current_innings().unwrap(), &before);
        assert_eq!(
            serde_json::to_string(state.current_innings().unwrap()).unwrap(),
            serde_json::to_string(&before).unwrap()
        );
    }

    #[test]
    fn second_correction_is_rejected() {
        let (mut state, _) = live_match(MatchFormat::limited(20));
        state.apply(&Command::runs(1)).unwrap();
        state.apply(&Command::runs(2)).unwrap();
        state.apply(&Command::Correction).unwrap();
        let before = state.clone();
        assert_eq!(state.apply(&Command::Correction), Err(Error::NothingToUndo));
        assert_eq!(state, before);
    }

    #[test]
    fn correction_on_empty_ledger() {
        let (mut state, _) = live_match(MatchFormat::limited(20));
        let before = state.clone();
        assert_eq!(state.apply(&Command::Correction), Err(Error::NothingToUndo));
        assert_eq!(state, before);
    }

    #[test]
    fn correction_undoes_replacement_and_wicket() {
        let (mut state, roster) = live_match(MatchFormat::limited(20));
        let before = state.current_innings().unwrap().clone();
        state
            .apply(&Command::run_out(1, Batter::NonStriker))
            .unwrap();
        state.replace_batsman("L3".into(), &roster).unwrap();
        state.apply(&Command::Correction).unwrap();
        assert_eq!(state.current_innings().unwrap(), &before);
    }

    #[test]
    fn correction_reopens_closed_innings() {
        let format = MatchFormat::limited(20).with_players(2);
        let (mut state, _) = live_match(format);
        let before = state.current_innings().unwrap().clone();

        let result = state.apply(&Command::wicket(WicketKind::Bowled)).unwrap();
        assert_eq!(result.innings_end, Some(InningsEnd::AllOut));
        assert_eq!(state.status(), MatchStatus::InningsBreak);

        state.apply(&Command::Correction).unwrap();
        assert_eq!(state.status(), MatchStatus::Live);
        assert_eq!(state.current_innings().unwrap(), &before);
    }

    #[test]
    fn chase_completes_match() {
        let format = MatchFormat::limited(1).with_players(3);
        let (mut state, roster) = live_match(format);
        for runs in [4, 0, 0, 2, 0, 0] {
            state.apply(&Command::runs(runs)).unwrap();
        }
        assert_eq!(state.status(), MatchStatus::InningsBreak);
        assert_eq!(
            state.current_innings().unwrap().closed,
            Some(InningsEnd::OversExhausted)
        );

        state
            .start_next_innings("T1".into(), "T2".into(), "L1".into(), &roster)
            .unwrap();
        assert_eq!(state.current_innings().unwrap().target, Some(7));
        assert_eq!(state.apply(&Command::Correction), Err(Error::NothingToUndo));

        state.apply(&Command::runs(6)).unwrap();
        let result = state
            .apply(&Command::extra(ExtraKind::Wide, 0))
            .unwrap();
        assert_eq!(result.innings_end, Some(InningsEnd::TargetReached));
        assert_eq!(state.status(), MatchStatus::Completed);
        assert_eq!(
            state.info().result,
            Some(MatchResult::Won {
                team: "tigers".into(),
                margin: crate::Margin::Wickets(2),
            })
        );

        // completed matches are immutable
        assert_eq!(
            state.apply(&Command::Correction),
            Err(Error::InvalidState(MatchStatus::Completed))
        );
        assert!(state.abandon().is_err());
    }

    #[test]
    fn defending_side_wins_by_runs() {
        let format = MatchFormat::limited(1).with_players(2);
        let (mut state, roster) = live_match(format);
        state.apply(&Command::runs(6)).unwrap();
        state.apply(&Command::wicket(WicketKind::Lbw)).unwrap();
        assert_eq!(state.status(), MatchStatus::InningsBreak);

        state
            .start_next_innings("T1".into(), "T2".into(), "L1".into(), &roster)
            .unwrap();
        state.apply(&Command::runs(2)).unwrap();
        state.apply(&Command::wicket(WicketKind::Stumped)).unwrap();

        assert_eq!(state.status(), MatchStatus::Completed);
        assert_eq!(
            state.info().result.as_ref().unwrap().to_string(),
            "lions won by 4 runs"
        );
    }

    #[test]
    fn verify_after_mixed_scoring() {
        let (mut state, roster) = live_match(MatchFormat::limited(20));
        let commands = [
            Command::runs(1),
            Command::extra(ExtraKind::Wide, 0),
            Command::no_ball_off_bat(4),
            Command::extra(ExtraKind::Bye, 2),
            Command::wicket(WicketKind::Caught),
        ];
        for command in &commands {
            state.apply(command).unwrap();
        }
        state.replace_batsman("L3".into(), &roster).unwrap();
        assert!(state.verify().is_ok());
    }

    #[test]
    fn abandon_from_live() {
        let (mut state, _) = live_match(MatchFormat::limited(20));
        state.apply(&Command::runs(1)).unwrap();
        state.abandon().unwrap();
        assert_eq!(state.status(), MatchStatus::Abandoned);
        assert_eq!(
            state.apply(&Command::Correction),
            Err(Error::InvalidState(MatchStatus::Abandoned))
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_command() -> impl Strategy<Value = Command> {
            prop_oneof![
                4 => (0u32..=6).prop_map(Command::runs),
                1 => Just(Command::wicket(WicketKind::Bowled)),
                1 => (0u32..=3, any::<bool>()).prop_map(|(runs, non_striker)| {
                    let batter = if non_striker { Batter::NonStriker } else { Batter::Striker };
                    Command::run_out(runs, batter)
                }),
                1 => (0u32..=4).prop_map(|runs| Command::extra(ExtraKind::Wide, runs)),
                1 => (0u32..=6).prop_map(Command::no_ball_off_bat),
                1 => (0u32..=4).prop_map(|runs| Command::extra(ExtraKind::NoBall, runs)),
                1 => (0u32..=4).prop_map(|runs| Command::extra(ExtraKind::Bye, runs)),
                1 => (0u32..=4).prop_map(|runs| Command::extra(ExtraKind::LegBye, runs)),
            ]
        }

        /// Fill any gap at the crease so the next command can be scored.
        fn keep_crease_ready(state: &mut MatchState, roster: &SquadRoster, next_in: &mut u32) {
            let Some(innings) = state.current_innings() else {
                return;
            };
            if innings.crease.pending_replacement.is_some() {
                *next_in += 1;
                state
                    .replace_batsman(format!("L{}", next_in), roster)
                    .unwrap();
            }
            let innings = state.current_innings().unwrap();
            if innings.crease.bowler.is_none() {
                let next = match innings.crease.previous_bowler.as_deref() {
                    Some("T1") => "T2",
                    _ => "T1",
                };
                state.assign_bowler(next.into(), roster).unwrap();
            }
        }

        proptest! {
            #[test]
            fn prop_aggregates_match_ledger(commands in prop::collection::vec(arb_command(), 1..80)) {
                let (mut state, roster) = live_match(MatchFormat::limited(20));
                let mut next_in = 2;

                for command in &commands {
                    if state.status() != MatchStatus::Live {
                        break;
                    }
                    keep_crease_ready(&mut state, &roster, &mut next_in);
                    state.apply(command).unwrap();

                    let innings = state.current_innings().unwrap();
                    let totals = &innings.tally.totals;
                    prop_assert_eq!(
                        totals.runs,
                        innings.tally.batting_runs() + totals.extras.total()
                    );
                    prop_assert_eq!(totals.legal_balls, innings.ledger.legal_balls());
                    prop_assert!(state.verify().is_ok());
                }
            }

            #[test]
            fn prop_correction_is_exact_inverse(commands in prop::collection::vec(arb_command(), 1..60)) {
                let (mut state, roster) = live_match(MatchFormat::limited(20));
                let mut next_in = 2;

                for command in &commands {
                    if state.status() != MatchStatus::Live {
                        break;
                    }
                    keep_crease_ready(&mut state, &roster, &mut next_in);
                    let before = state.clone();
                    state.apply(command).unwrap();

                    let mut undone = state.clone();
                    undone.apply(&Command::Correction).unwrap();
                    prop_assert_eq!(undone.innings(), before.innings());
                    prop_assert_eq!(undone.info(), before.info());
                    prop_assert_eq!(undone.version(), before.version() + 2);
                }
            }
        }
    }
}
