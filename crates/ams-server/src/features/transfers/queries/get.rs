//! Get single transfer request query

use sqlx::PgPool;

use super::super::types::{TransferRequestView, TRANSFER_VIEW_SELECT};
use crate::auth::{Principal, Role};
use crate::error::AppError;

/// Errors that can occur when fetching a transfer request
#[derive(Debug, thiserror::Error)]
pub enum GetTransferRequestError {
    #[error("Transfer request {0} not found")]
    NotFound(i64),

    #[error("Access denied")]
    Denied,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetTransferRequestError> for AppError {
    fn from(err: GetTransferRequestError) -> Self {
        match err {
            e @ GetTransferRequestError::NotFound(_) => AppError::NotFound(e.to_string()),
            e @ GetTransferRequestError::Denied => AppError::Forbidden(e.to_string()),
            GetTransferRequestError::Database(e) => AppError::Database(e),
        }
    }
}

/// Fetch one transfer request; visible to admins, transfer managers, and
/// the requester.
#[tracing::instrument(skip(pool, principal), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    transfer_request_id: i64,
) -> Result<TransferRequestView, GetTransferRequestError> {
    let sql = format!("{TRANSFER_VIEW_SELECT} WHERE t.id = $1");
    let view = sqlx::query_as::<_, TransferRequestView>(&sql)
        .bind(transfer_request_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(GetTransferRequestError::NotFound(transfer_request_id))?;

    let sees_all = principal.is_admin() || principal.role == Role::TransferManager;
    if !sees_all && view.requested_by != principal.id {
        return Err(GetTransferRequestError::Denied);
    }

    Ok(view)
}
