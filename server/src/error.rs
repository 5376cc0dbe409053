//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use wicket_engine::Error as EngineError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Match already exists: {0}")]
    MatchExists(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Engine(e) => e.code(),
            AppError::MatchNotFound(_) => "match_not_found",
            AppError::MatchExists(_) => "match_exists",
            AppError::BadRequest(_) => "bad_request",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(e) => engine_status(e),
            AppError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MatchExists(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn engine_status(error: &EngineError) -> StatusCode {
    match error {
        // The match is not in a position to take this right now
        EngineError::Busy
        | EngineError::InvalidState(_)
        | EngineError::MissingParticipants(_)
        | EngineError::NothingToUndo
        | EngineError::PendingReplacement(_)
        | EngineError::TossNotRecorded
        | EngineError::BowlerUnavailable(_) => StatusCode::CONFLICT,
        // The request itself carries a bad value
        EngineError::InvalidRuns(_)
        | EngineError::TooManyWickets(_)
        | EngineError::InvalidDismissal { .. }
        | EngineError::InvalidToss(_)
        | EngineError::InvalidFormat(_)
        | EngineError::UnknownPlayer(_)
        | EngineError::WrongTeam { .. }
        | EngineError::SamePlayer(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidSnapshot(_) => StatusCode::BAD_REQUEST,
        EngineError::Inconsistent(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request failed: {}", self);
        } else {
            tracing::warn!(code = self.code(), "Request rejected: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use wicket_engine::MatchStatus;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::from(EngineError::Busy).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(EngineError::InvalidState(MatchStatus::Setup)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(EngineError::InvalidRuns(9)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(EngineError::InvalidFormat("0 overs".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::MatchNotFound("m1".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn codes_pass_through() {
        assert_eq!(AppError::from(EngineError::NothingToUndo).code(), "nothing_to_undo");
        assert_eq!(AppError::MatchExists("m1".into()).code(), "match_exists");
    }
}
