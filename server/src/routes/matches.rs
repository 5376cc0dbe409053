//! Match endpoints: registration, scoring, administration and live feed.

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use wicket_engine::{Command, LiveSnapshot, Toss};

use crate::error::{AppError, Result};
use crate::handlers::{
    handle_admin, handle_command, handle_create, handle_live_connection, AdminAction,
    BatsmanRequest, BowlerRequest, CreateMatchRequest, CreateMatchResponse, NextInningsRequest,
    OpenersRequest,
};
use crate::AppState;

/// Create match routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matches", post(create_handler))
        .route("/matches/{id}", get(snapshot_handler))
        .route("/matches/{id}/commands", post(command_handler))
        .route("/matches/{id}/toss", post(toss_handler))
        .route("/matches/{id}/start", post(start_handler))
        .route("/matches/{id}/openers", post(openers_handler))
        .route("/matches/{id}/bowler", post(bowler_handler))
        .route("/matches/{id}/batsman", post(batsman_handler))
        .route("/matches/{id}/next-innings", post(next_innings_handler))
        .route("/matches/{id}/abandon", post(abandon_handler))
        .route("/matches/{id}/live", get(live_handler))
}

/// POST /matches - Register a match in setup.
async fn create_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<CreateMatchResponse>)> {
    let response = handle_create(&state.registry, request)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /matches/{id} - Current snapshot.
async fn snapshot_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LiveSnapshot>> {
    Ok(Json(state.registry.snapshot(&id).await?))
}

/// POST /matches/{id}/commands - Score a delivery or correct the last one.
async fn command_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(command): Json<Command>,
) -> Result<Json<LiveSnapshot>> {
    Ok(Json(handle_command(&state.registry, &id, command).await?))
}

async fn admin(state: &AppState, id: &str, action: AdminAction) -> Result<Json<LiveSnapshot>> {
    Ok(Json(handle_admin(&state.registry, id, action).await?))
}

async fn toss_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(toss): Json<Toss>,
) -> Result<Json<LiveSnapshot>> {
    admin(&state, &id, AdminAction::RecordToss(toss)).await
}

async fn start_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LiveSnapshot>> {
    admin(&state, &id, AdminAction::Start).await
}

async fn openers_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<OpenersRequest>,
) -> Result<Json<LiveSnapshot>> {
    admin(&state, &id, AdminAction::AssignOpeners(request)).await
}

async fn bowler_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BowlerRequest>,
) -> Result<Json<LiveSnapshot>> {
    admin(&state, &id, AdminAction::AssignBowler(request)).await
}

async fn batsman_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BatsmanRequest>,
) -> Result<Json<LiveSnapshot>> {
    admin(&state, &id, AdminAction::ReplaceBatsman(request)).await
}

async fn next_innings_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<NextInningsRequest>,
) -> Result<Json<LiveSnapshot>> {
    admin(&state, &id, AdminAction::StartNextInnings(request)).await
}

async fn abandon_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LiveSnapshot>> {
    admin(&state, &id, AdminAction::Abandon).await
}

/// GET /matches/{id}/live - Upgrade to the live websocket feed.
async fn live_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    if !state.registry.contains(&id) {
        return Err(AppError::MatchNotFound(id));
    }
    let registry = state.registry.clone();
    Ok(ws.on_upgrade(move |socket| handle_live_connection(socket, registry, id)))
}
