//! Live view of a match, as pushed to subscribers.
//!
//! Built from a consistent read of [`MatchState`]; carries display names so
//! clients need no roster of their own.

use crate::{
    Delivery, ExtrasBreakdown, Innings, InningsEnd, InningsNumber, MatchFormat, MatchId,
    MatchResult, MatchState, MatchStatus, PlayerId, Roster, TeamId, Toss, Version, WicketKind,
    BALLS_PER_OVER,
};
use serde::{Deserialize, Serialize};

/// A batsman's line on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingLine {
    pub id: PlayerId,
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissal: Option<WicketKind>,
    pub on_strike: bool,
}

/// A bowler's analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingLine {
    pub id: PlayerId,
    pub name: String,
    /// Overs in scorebook form, e.g. "3.2"
    pub overs: String,
    pub runs: u32,
    pub wickets: u32,
}

/// Score and cards for one innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsSummary {
    pub number: InningsNumber,
    pub batting: TeamId,
    pub bowling: TeamId,
    pub runs: u32,
    pub wickets: u32,
    pub overs: String,
    pub extras: ExtrasBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs_required: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balls_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<InningsEnd>,
    /// In batting order
    pub batting_card: Vec<BattingLine>,
    /// In order of first appearance
    pub bowling_card: Vec<BowlingLine>,
}

/// Everything a scoreboard needs, at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    pub match_id: MatchId,
    pub version: Version,
    pub status: MatchStatus,
    pub home: TeamId,
    pub away: TeamId,
    pub format: MatchFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toss: Option<Toss>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    pub innings: Vec<InningsSummary>,
    /// Batsmen in, striker first; a vacant end is skipped
    pub batsmen: Vec<BattingLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bowler: Option<BowlingLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_replacement: Option<PlayerId>,
    /// The striker's end awaits the incoming batsman, so nobody is on strike
    #[serde(default)]
    pub strike_vacant: bool,
    /// Latest deliveries of the current innings, oldest first
    pub recent: Vec<Delivery>,
    pub can_undo: bool,
}

impl MatchState {
    /// Build the live view, with up to `recent` trailing deliveries.
    pub fn live_snapshot(&self, roster: &dyn Roster, recent: usize) -> LiveSnapshot {
        let info = self.info();
        let format = info.format;
        let current = self.current_innings();

        let (batsmen, bowler, pending_replacement, strike_vacant, recent) = match current {
            Some(innings) if !innings.is_closed() => {
                let crease = &innings.crease;
                let batsmen = [(&crease.striker, true), (&crease.non_striker, false)]
                    .into_iter()
                    .filter_map(|(id, on_strike)| {
                        id.as_ref()
                            .map(|id| batting_line(innings, roster, id, on_strike))
                    })
                    .collect();
                let bowler = crease
                    .bowler
                    .as_ref()
                    .map(|id| bowling_line(innings, roster, id));
                (
                    batsmen,
                    bowler,
                    crease.pending_replacement.clone(),
                    crease.striker.is_none() && crease.pending_replacement.is_some(),
                    innings.ledger.recent(recent).to_vec(),
                )
            }
            Some(innings) => (
                Vec::new(),
                None,
                None,
                false,
                innings.ledger.recent(recent).to_vec(),
            ),
            None => (Vec::new(), None, None, false, Vec::new()),
        };

        LiveSnapshot {
            match_id: info.id.clone(),
            version: self.version(),
            status: info.status,
            home: info.home.clone(),
            away: info.away.clone(),
            format,
            toss: info.toss.clone(),
            result: info.result.clone(),
            innings: self
                .innings()
                .iter()
                .map(|innings| summarize(innings, &format, roster))
                .collect(),
            batsmen,
            bowler,
            pending_replacement,
            strike_vacant,
            recent,
            can_undo: self.undo().is_armed() && !info.status.is_terminal(),
        }
    }
}

fn summarize(innings: &Innings, format: &MatchFormat, roster: &dyn Roster) -> InningsSummary {
    let totals = &innings.tally.totals;
    let striker = innings.crease.striker.as_deref();

    let mut batting_order: Vec<&PlayerId> = Vec::new();
    let mut bowling_order: Vec<&PlayerId> = Vec::new();
    for delivery in innings.ledger.iter() {
        for id in [&delivery.striker, &delivery.non_striker] {
            if !batting_order.contains(&id) {
                batting_order.push(id);
            }
        }
        if !bowling_order.contains(&&delivery.bowler) {
            bowling_order.push(&delivery.bowler);
        }
    }
    // Openers and replacements who have not seen a ball yet
    for id in [&innings.crease.striker, &innings.crease.non_striker]
        .into_iter()
        .flatten()
    {
        if !batting_order.contains(&id) {
            batting_order.push(id);
        }
    }

    InningsSummary {
        number: innings.number,
        batting: innings.batting.clone(),
        bowling: innings.bowling.clone(),
        runs: totals.runs,
        wickets: totals.wickets,
        overs: totals.overs_display(),
        extras: totals.extras,
        target: innings.target,
        runs_required: innings.runs_required(),
        balls_remaining: innings.balls_remaining(format),
        closed: innings.closed,
        batting_card: batting_order
            .into_iter()
            .map(|id| batting_line(innings, roster, id, Some(id.as_str()) == striker))
            .collect(),
        bowling_card: bowling_order
            .into_iter()
            .map(|id| bowling_line(innings, roster, id))
            .collect(),
    }
}

fn batting_line(innings: &Innings, roster: &dyn Roster, id: &PlayerId, on_strike: bool) -> BattingLine {
    let stat = innings.tally.player(id).cloned().unwrap_or_default();
    BattingLine {
        id: id.clone(),
        name: roster.display_name(id),
        runs: stat.runs,
        balls: stat.balls_faced,
        fours: stat.fours,
        sixes: stat.sixes,
        dismissal: stat.dismissal,
        on_strike: on_strike && !innings.is_closed(),
    }
}

fn bowling_line(innings: &Innings, roster: &dyn Roster, id: &PlayerId) -> BowlingLine {
    let stat = innings.tally.player(id).cloned().unwrap_or_default();
    BowlingLine {
        id: id.clone(),
        name: roster.display_name(id),
        overs: format!(
            "{}.{}",
            stat.balls_bowled / BALLS_PER_OVER,
            stat.balls_bowled % BALLS_PER_OVER
        ),
        runs: stat.runs_conceded,
        wickets: stat.wickets,
    }
}
