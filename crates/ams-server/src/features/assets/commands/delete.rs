//! Delete asset command

use sqlx::PgPool;

use super::super::types::{Asset, ASSET_COLUMNS};
use crate::auth::Principal;
use crate::error::AppError;
use crate::policy::{self, AccessMode, Decision, ResourceClass};

/// Errors that can occur when deleting an asset
#[derive(Debug, thiserror::Error)]
pub enum DeleteAssetError {
    #[error("Asset {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteAssetError> for AppError {
    fn from(err: DeleteAssetError) -> Self {
        match err {
            e @ DeleteAssetError::NotFound(_) => AppError::NotFound(e.to_string()),
            DeleteAssetError::Denied(message) => AppError::Forbidden(message.to_string()),
            DeleteAssetError::Database(e) => AppError::Database(e),
        }
    }
}

/// Delete an asset after the write-policy and location checks. Dependent
/// rows are removed by the storage layer's referential actions.
#[tracing::instrument(skip(pool, principal), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    asset_id: i64,
) -> Result<Asset, DeleteAssetError> {
    let decision = policy::evaluate(&principal, ResourceClass::Assets, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(DeleteAssetError::Denied(reason.message()));
    }

    let select = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
    let existing = sqlx::query_as::<_, Asset>(&select)
        .bind(asset_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(DeleteAssetError::NotFound(asset_id))?;

    if !policy::allows_location(&decision, Some(&existing.location)) {
        return Err(DeleteAssetError::Denied("Access denied to this asset location"));
    }

    sqlx::query("DELETE FROM assets WHERE id = $1")
        .bind(asset_id)
        .execute(&pool)
        .await?;

    tracing::info!(asset_id, "Asset deleted");

    Ok(existing)
}
