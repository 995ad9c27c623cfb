//! Get single asset query

use sqlx::PgPool;

use super::super::types::{Asset, ASSET_COLUMNS};
use crate::auth::Principal;
use crate::error::AppError;
use crate::policy::{self, AccessMode, ResourceClass};

/// Errors that can occur when fetching an asset
#[derive(Debug, thiserror::Error)]
pub enum GetAssetError {
    #[error("Asset {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetAssetError> for AppError {
    fn from(err: GetAssetError) -> Self {
        match err {
            e @ GetAssetError::NotFound(_) => AppError::NotFound(e.to_string()),
            GetAssetError::Denied(message) => AppError::Forbidden(message.to_string()),
            GetAssetError::Database(e) => AppError::Database(e),
        }
    }
}

/// Fetch one asset; visibility follows the location partition.
#[tracing::instrument(skip(pool, principal), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    asset_id: i64,
) -> Result<Asset, GetAssetError> {
    let select = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
    let asset = sqlx::query_as::<_, Asset>(&select)
        .bind(asset_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(GetAssetError::NotFound(asset_id))?;

    let decision = policy::evaluate(&principal, ResourceClass::Assets, AccessMode::Read);
    if !policy::allows_location(&decision, Some(&asset.location)) {
        return Err(GetAssetError::Denied("Access denied to this asset"));
    }

    Ok(asset)
}
