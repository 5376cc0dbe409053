//! Lifecycle and crease administration.

use serde::Deserialize;
use wicket_engine::{LiveSnapshot, PlayerId, Toss};

use crate::error::Result;
use crate::registry::MatchRegistry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenersRequest {
    pub striker: PlayerId,
    pub non_striker: PlayerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlerRequest {
    pub bowler: PlayerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatsmanRequest {
    pub batsman: PlayerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextInningsRequest {
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
}

/// An administrative action against one match.
#[derive(Debug)]
pub enum AdminAction {
    RecordToss(Toss),
    Start,
    AssignOpeners(OpenersRequest),
    AssignBowler(BowlerRequest),
    ReplaceBatsman(BatsmanRequest),
    StartNextInnings(NextInningsRequest),
    Abandon,
}

impl AdminAction {
    fn name(&self) -> &'static str {
        match self {
            AdminAction::RecordToss(_) => "record_toss",
            AdminAction::Start => "start_match",
            AdminAction::AssignOpeners(_) => "assign_openers",
            AdminAction::AssignBowler(_) => "assign_bowler",
            AdminAction::ReplaceBatsman(_) => "replace_batsman",
            AdminAction::StartNextInnings(_) => "start_next_innings",
            AdminAction::Abandon => "abandon",
        }
    }
}

/// Apply an admin action and return the new snapshot.
pub async fn handle_admin(
    registry: &MatchRegistry,
    match_id: &str,
    action: AdminAction,
) -> Result<LiveSnapshot> {
    let name = action.name();
    let snapshot = registry
        .mutate(match_id, move |state, roster| match action {
            AdminAction::RecordToss(toss) => state.record_toss(toss),
            AdminAction::Start => state.start_match(),
            AdminAction::AssignOpeners(req) => {
                state.assign_openers(req.striker, req.non_striker, roster)
            }
            AdminAction::AssignBowler(req) => state.assign_bowler(req.bowler, roster),
            AdminAction::ReplaceBatsman(req) => state.replace_batsman(req.batsman, roster),
            AdminAction::StartNextInnings(req) => {
                state.start_next_innings(req.striker, req.non_striker, req.bowler, roster)
            }
            AdminAction::Abandon => state.abandon(),
        })
        .await?;

    tracing::info!(
        match_id = %match_id,
        action = name,
        version = snapshot.version,
        "Admin action applied"
    );
    Ok(snapshot)
}
