//! Match registration - turns a setup request into a registered match.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use wicket_engine::{MatchFormat, MatchId, MatchInfo, PlayerProfile, Role, SquadRoster, TeamId};

use crate::error::{AppError, Result};
use crate::registry::MatchRegistry;

/// One player on a team sheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

/// A team and its squad.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSheet {
    pub id: TeamId,
    pub players: Vec<PlayerEntry>,
}

/// Request body for registering a match.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    /// Generated when omitted
    #[serde(default)]
    pub match_id: Option<MatchId>,
    pub home: TeamSheet,
    pub away: TeamSheet,
    #[serde(default)]
    pub format: MatchFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchResponse {
    pub match_id: MatchId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Validate the team sheets and register the match.
pub fn handle_create(
    registry: &MatchRegistry,
    request: CreateMatchRequest,
) -> Result<CreateMatchResponse> {
    let roster = build_roster(&request)?;
    let match_id = request
        .match_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let info = MatchInfo::new(match_id, request.home.id, request.away.id, request.format);
    let slot = registry.create(info, roster)?;

    Ok(CreateMatchResponse {
        match_id: slot.id.clone(),
        created_at: slot.created_at,
    })
}

fn build_roster(request: &CreateMatchRequest) -> Result<SquadRoster> {
    if request.home.id == request.away.id {
        return Err(AppError::BadRequest(
            "home and away must be different teams".to_string(),
        ));
    }
    request
        .format
        .check()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut roster = SquadRoster::new();
    let mut seen = HashSet::new();
    for team in [&request.home, &request.away] {
        for player in &team.players {
            if !seen.insert(player.id.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "player {} is listed twice",
                    player.id
                )));
            }
            roster.add(PlayerProfile {
                id: player.id.clone(),
                name: player.name.clone(),
                role: player.role,
                team: team.id.clone(),
            });
        }
    }
    Ok(roster)
}
