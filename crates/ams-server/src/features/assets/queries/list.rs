//! List assets query

use sqlx::PgPool;

use super::super::types::{Asset, ASSET_COLUMNS};
use crate::auth::Principal;
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;
use crate::policy::{self, AccessMode, Decision, DenyReason, ResourceClass};

/// Errors that can occur when listing assets
#[derive(Debug, thiserror::Error)]
pub enum ListAssetsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListAssetsError> for AppError {
    fn from(err: ListAssetsError) -> Self {
        match err {
            ListAssetsError::Database(e) => AppError::Database(e),
        }
    }
}

/// List assets visible to the principal.
///
/// Admins see every location; location-scoped principals see records
/// whose location intersects their set; a principal with no location
/// scope gets an empty list (the documented policy path, not an error).
#[tracing::instrument(skip(pool, principal), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    window: ListWindow,
) -> Result<Vec<Asset>, ListAssetsError> {
    let decision = policy::evaluate(&principal, ResourceClass::Assets, AccessMode::Read);

    let assets = match decision {
        Decision::AllowAll => {
            let sql = format!(
                "SELECT {ASSET_COLUMNS} FROM assets ORDER BY created_at DESC OFFSET $1 LIMIT $2"
            );
            sqlx::query_as::<_, Asset>(&sql)
                .bind(window.offset())
                .bind(window.limit())
                .fetch_all(&pool)
                .await?
        },
        Decision::AllowLocations(locations) => {
            let sql = format!(
                "SELECT {ASSET_COLUMNS} FROM assets WHERE location = ANY($1) \
                 ORDER BY created_at DESC OFFSET $2 LIMIT $3"
            );
            sqlx::query_as::<_, Asset>(&sql)
                .bind(locations.to_vec())
                .bind(window.offset())
                .bind(window.limit())
                .fetch_all(&pool)
                .await?
        },
        Decision::Deny(DenyReason::NoLocationScope) => {
            tracing::debug!("No location scope configured; returning empty asset list");
            Vec::new()
        },
        Decision::Deny(_) => Vec::new(),
    };

    tracing::debug!(count = assets.len(), "Assets listed");

    Ok(assets)
}
