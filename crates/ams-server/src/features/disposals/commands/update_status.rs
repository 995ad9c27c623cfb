//! Disposal status update command
//!
//! Entering `completed` is delegated to the workflow completion
//! coordinator: pre-deletion audit snapshot plus asset removal, committed
//! with the status write. Re-completing an already-completed disposal is
//! a no-op.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::{DisposalView, DISPOSAL_VIEW_SELECT};
use crate::audit::ActorSnapshot;
use crate::auth::Principal;
use crate::error::AppError;
use crate::policy::{self, AccessMode, Decision, ResourceClass};
use crate::workflow::{self, transition_allowed, CompletionError, DisposalStatus, UnknownStatus};

/// Command to move a disposal through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDisposalStatusCommand {
    /// Set from the path parameter, not the body.
    #[serde(skip)]
    pub id: i64,

    pub status: String,
}

/// Errors that can occur when updating a disposal status
#[derive(Debug, thiserror::Error)]
pub enum UpdateDisposalStatusError {
    #[error("Disposal {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Status validation failed: {0}")]
    UnknownStatus(#[from] UnknownStatus),

    #[error("Disposal {0} is already completed")]
    LeavesCompleted(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateDisposalStatusError> for AppError {
    fn from(err: UpdateDisposalStatusError) -> Self {
        match err {
            e @ UpdateDisposalStatusError::NotFound(_) => AppError::NotFound(e.to_string()),
            UpdateDisposalStatusError::Denied(message) => AppError::Forbidden(message.to_string()),
            e @ UpdateDisposalStatusError::UnknownStatus(_) => AppError::Validation(e.to_string()),
            e @ UpdateDisposalStatusError::LeavesCompleted(_) => AppError::Conflict(e.to_string()),
            UpdateDisposalStatusError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(
    skip(pool, principal, command),
    fields(disposal_id = command.id, user = %principal.username)
)]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    command: UpdateDisposalStatusCommand,
) -> Result<DisposalView, UpdateDisposalStatusError> {
    let decision = policy::evaluate(&principal, ResourceClass::Disposals, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(UpdateDisposalStatusError::Denied(reason.message()));
    }

    let current_status = sqlx::query_scalar::<_, String>("SELECT status FROM disposals WHERE id = $1")
        .bind(command.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(UpdateDisposalStatusError::NotFound(command.id))?;

    let next = command.status.parse::<DisposalStatus>()?;

    if !transition_allowed(&current_status, next.as_str()) {
        return Err(UpdateDisposalStatusError::LeavesCompleted(command.id));
    }

    if next == DisposalStatus::Completed {
        let actor = ActorSnapshot::from_principal(&principal);
        match workflow::complete_disposal(&pool, command.id, &actor).await {
            Ok(outcome) => {
                tracing::debug!(?outcome, "Disposal completion coordinated");
            },
            Err(CompletionError::NotFound(_)) => {
                return Err(UpdateDisposalStatusError::NotFound(command.id));
            },
            Err(CompletionError::Database(e)) => {
                return Err(UpdateDisposalStatusError::Database(e));
            },
        }
    } else {
        let updated = sqlx::query(
            "UPDATE disposals SET status = $2 WHERE id = $1 AND status <> 'completed'",
        )
        .bind(command.id)
        .bind(next.as_str())
        .execute(&pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(UpdateDisposalStatusError::LeavesCompleted(command.id));
        }
    }

    let sql = format!("{DISPOSAL_VIEW_SELECT} WHERE d.id = $1");
    let view = sqlx::query_as::<_, DisposalView>(&sql)
        .bind(command.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(UpdateDisposalStatusError::NotFound(command.id))?;

    tracing::info!(disposal_id = view.id, status = %view.status, "Disposal updated");

    Ok(view)
}
