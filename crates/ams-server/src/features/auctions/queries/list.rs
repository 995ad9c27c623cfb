//! List auctions query

use sqlx::PgPool;

use super::super::types::{AuctionView, AUCTION_VIEW_SELECT};
use crate::auth::Principal;
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;

/// Errors that can occur when listing auctions
#[derive(Debug, thiserror::Error)]
pub enum ListAuctionsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListAuctionsError> for AppError {
    fn from(err: ListAuctionsError) -> Self {
        match err {
            ListAuctionsError::Database(e) => AppError::Database(e),
        }
    }
}

/// Auctions are not location-partitioned; any authenticated principal
/// may browse them.
#[tracing::instrument(skip(pool, principal), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    window: ListWindow,
) -> Result<Vec<AuctionView>, ListAuctionsError> {
    let sql = format!("{AUCTION_VIEW_SELECT} ORDER BY au.created_at DESC OFFSET $1 LIMIT $2");
    let auctions = sqlx::query_as::<_, AuctionView>(&sql)
        .bind(window.offset())
        .bind(window.limit())
        .fetch_all(&pool)
        .await?;

    tracing::debug!(count = auctions.len(), "Auctions listed");

    Ok(auctions)
}
