//! List transfer requests query

use sqlx::PgPool;

use super::super::types::{TransferRequestView, TRANSFER_VIEW_SELECT};
use crate::auth::{Principal, Role};
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;

/// Errors that can occur when listing transfer requests
#[derive(Debug, thiserror::Error)]
pub enum ListTransferRequestsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListTransferRequestsError> for AppError {
    fn from(err: ListTransferRequestsError) -> Self {
        match err {
            ListTransferRequestsError::Database(e) => AppError::Database(e),
        }
    }
}

/// Transfer requests are owner-scoped: admins and transfer managers see
/// everything, everyone else sees only what they filed.
#[tracing::instrument(skip(pool, principal), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    window: ListWindow,
) -> Result<Vec<TransferRequestView>, ListTransferRequestsError> {
    let sees_all = principal.is_admin() || principal.role == Role::TransferManager;

    let requests = if sees_all {
        let sql =
            format!("{TRANSFER_VIEW_SELECT} ORDER BY t.created_at DESC OFFSET $1 LIMIT $2");
        sqlx::query_as::<_, TransferRequestView>(&sql)
            .bind(window.offset())
            .bind(window.limit())
            .fetch_all(&pool)
            .await?
    } else {
        let sql = format!(
            "{TRANSFER_VIEW_SELECT} WHERE t.requested_by = $1 \
             ORDER BY t.created_at DESC OFFSET $2 LIMIT $3"
        );
        sqlx::query_as::<_, TransferRequestView>(&sql)
            .bind(principal.id)
            .bind(window.offset())
            .bind(window.limit())
            .fetch_all(&pool)
            .await?
    };

    tracing::debug!(count = requests.len(), sees_all, "Transfer requests listed");

    Ok(requests)
}
