//! List disposals query

use sqlx::PgPool;

use super::super::types::{DisposalView, DISPOSAL_VIEW_SELECT};
use crate::auth::Principal;
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;

/// Errors that can occur when listing disposals
#[derive(Debug, thiserror::Error)]
pub enum ListDisposalsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListDisposalsError> for AppError {
    fn from(err: ListDisposalsError) -> Self {
        match err {
            ListDisposalsError::Database(e) => AppError::Database(e),
        }
    }
}

/// Disposals are not location-partitioned; any authenticated principal
/// may browse them.
#[tracing::instrument(skip(pool, principal), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    window: ListWindow,
) -> Result<Vec<DisposalView>, ListDisposalsError> {
    let sql = format!("{DISPOSAL_VIEW_SELECT} ORDER BY d.created_at DESC OFFSET $1 LIMIT $2");
    let disposals = sqlx::query_as::<_, DisposalView>(&sql)
        .bind(window.offset())
        .bind(window.limit())
        .fetch_all(&pool)
        .await?;

    tracing::debug!(count = disposals.len(), "Disposals listed");

    Ok(disposals)
}
