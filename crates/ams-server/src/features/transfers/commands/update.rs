//! Update transfer request command
//!
//! Status changes are gated by the policy engine (admin or transfer
//! manager). A change into `completed` is delegated to the workflow
//! completion coordinator, which commits the status write, the asset
//! relocation, and the linked audit entry in one transaction.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::{TransferRequestView, TRANSFER_VIEW_SELECT};
use crate::audit::ActorSnapshot;
use crate::auth::Principal;
use crate::error::AppError;
use crate::policy::{self, AccessMode, Decision, ResourceClass};
use crate::workflow::{self, transition_allowed, CompletionError, TransferStatus, UnknownStatus};

/// Command to update a transfer request. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransferRequestCommand {
    /// Set from the path parameter, not the body.
    #[serde(skip)]
    pub id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Errors that can occur when updating a transfer request
#[derive(Debug, thiserror::Error)]
pub enum UpdateTransferRequestError {
    #[error("Transfer request {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Status validation failed: {0}")]
    UnknownStatus(#[from] UnknownStatus),

    #[error("Transfer request {0} is already completed")]
    LeavesCompleted(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateTransferRequestError> for AppError {
    fn from(err: UpdateTransferRequestError) -> Self {
        match err {
            e @ UpdateTransferRequestError::NotFound(_) => AppError::NotFound(e.to_string()),
            UpdateTransferRequestError::Denied(message) => AppError::Forbidden(message.to_string()),
            e @ UpdateTransferRequestError::UnknownStatus(_) => AppError::Validation(e.to_string()),
            e @ UpdateTransferRequestError::LeavesCompleted(_) => AppError::Conflict(e.to_string()),
            UpdateTransferRequestError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(
    skip(pool, principal, command),
    fields(transfer_request_id = command.id, user = %principal.username)
)]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    command: UpdateTransferRequestCommand,
) -> Result<TransferRequestView, UpdateTransferRequestError> {
    let decision = policy::evaluate(&principal, ResourceClass::Transfers, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(UpdateTransferRequestError::Denied(reason.message()));
    }

    let current_status = sqlx::query_scalar::<_, String>(
        "SELECT status FROM transfer_requests WHERE id = $1",
    )
    .bind(command.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(UpdateTransferRequestError::NotFound(command.id))?;

    let new_status = command
        .status
        .as_deref()
        .map(|s| s.parse::<TransferStatus>())
        .transpose()?;

    if let Some(next) = new_status {
        if !transition_allowed(&current_status, next.as_str()) {
            return Err(UpdateTransferRequestError::LeavesCompleted(command.id));
        }
    }

    // Non-status fields go in first so a completion in the same payload
    // sees the approver for the custodian hand-off.
    sqlx::query(
        r#"
        UPDATE transfer_requests
        SET approved_by = COALESCE($2, approved_by),
            notes = COALESCE($3, notes),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(command.id)
    .bind(command.approved_by)
    .bind(&command.notes)
    .execute(&pool)
    .await?;

    match new_status {
        Some(TransferStatus::Completed) => {
            let actor = ActorSnapshot::from_principal(&principal);
            match workflow::complete_transfer(&pool, command.id, &actor).await {
                Ok(outcome) => {
                    tracing::debug!(?outcome, "Transfer completion coordinated");
                },
                Err(CompletionError::NotFound(_)) => {
                    return Err(UpdateTransferRequestError::NotFound(command.id));
                },
                Err(CompletionError::Database(e)) => {
                    return Err(UpdateTransferRequestError::Database(e));
                },
            }
        },
        Some(next) => {
            // Conditional write: a concurrent completion wins.
            let updated = sqlx::query(
                "UPDATE transfer_requests SET status = $2, updated_at = NOW() \
                 WHERE id = $1 AND status <> 'completed'",
            )
            .bind(command.id)
            .bind(next.as_str())
            .execute(&pool)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(UpdateTransferRequestError::LeavesCompleted(command.id));
            }
        },
        None => {},
    }

    let sql = format!("{TRANSFER_VIEW_SELECT} WHERE t.id = $1");
    let view = sqlx::query_as::<_, TransferRequestView>(&sql)
        .bind(command.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(UpdateTransferRequestError::NotFound(command.id))?;

    tracing::info!(
        transfer_request_id = view.id,
        status = %view.status,
        "Transfer request updated"
    );

    Ok(view)
}
