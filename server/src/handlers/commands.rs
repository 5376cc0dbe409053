//! Scoring command handler.

use wicket_engine::{ApplyResult, Command, LiveSnapshot};

use crate::error::Result;
use crate::registry::MatchRegistry;

/// Validate and apply a scoring command, returning the new snapshot.
///
/// Rejections are logged and returned; the match is unchanged.
pub async fn handle_command(
    registry: &MatchRegistry,
    match_id: &str,
    command: Command,
) -> Result<LiveSnapshot> {
    let mut applied: Option<ApplyResult> = None;
    let outcome = registry
        .mutate(match_id, |state, _| {
            applied = Some(state.apply(&command)?);
            Ok(())
        })
        .await;

    match (&outcome, applied) {
        (Ok(_), Some(result)) => {
            tracing::debug!(
                match_id = %match_id,
                innings = result.innings,
                seq = result.seq,
                corrected = result.corrected,
                version = result.version,
                "Command applied"
            );
            if let Some(end) = result.innings_end {
                tracing::info!(
                    match_id = %match_id,
                    innings = result.innings,
                    end = ?end,
                    "Innings closed"
                );
            }
        }
        (Err(e), _) => {
            tracing::warn!(match_id = %match_id, command = ?command, "Command rejected: {}", e);
        }
        (Ok(_), None) => {}
    }

    outcome
}
