//! Auction status update command
//!
//! Entering `completed` is delegated to the workflow completion
//! coordinator: pre-deletion audit snapshot plus asset removal, committed
//! with the status write.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::{AuctionView, AUCTION_VIEW_SELECT};
use crate::audit::ActorSnapshot;
use crate::auth::Principal;
use crate::error::AppError;
use crate::policy::{self, AccessMode, Decision, ResourceClass};
use crate::workflow::{self, transition_allowed, AuctionStatus, CompletionError, UnknownStatus};

/// Command to update an auction's status and sale terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAuctionCommand {
    /// Set from the path parameter, not the body.
    #[serde(skip)]
    pub id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(alias = "final_bid", skip_serializing_if = "Option::is_none")]
    pub winning_bid: Option<f64>,

    #[serde(alias = "winner", skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
}

/// Errors that can occur when updating an auction
#[derive(Debug, thiserror::Error)]
pub enum UpdateAuctionError {
    #[error("Auction {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Status validation failed: {0}")]
    UnknownStatus(#[from] UnknownStatus),

    #[error("Auction {0} is already completed")]
    LeavesCompleted(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateAuctionError> for AppError {
    fn from(err: UpdateAuctionError) -> Self {
        match err {
            e @ UpdateAuctionError::NotFound(_) => AppError::NotFound(e.to_string()),
            UpdateAuctionError::Denied(message) => AppError::Forbidden(message.to_string()),
            e @ UpdateAuctionError::UnknownStatus(_) => AppError::Validation(e.to_string()),
            e @ UpdateAuctionError::LeavesCompleted(_) => AppError::Conflict(e.to_string()),
            UpdateAuctionError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(
    skip(pool, principal, command),
    fields(auction_id = command.id, user = %principal.username)
)]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    command: UpdateAuctionCommand,
) -> Result<AuctionView, UpdateAuctionError> {
    let decision = policy::evaluate(&principal, ResourceClass::Auctions, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(UpdateAuctionError::Denied(reason.message()));
    }

    let current_status = sqlx::query_scalar::<_, String>("SELECT status FROM auctions WHERE id = $1")
        .bind(command.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(UpdateAuctionError::NotFound(command.id))?;

    let new_status = command
        .status
        .as_deref()
        .map(|s| s.parse::<AuctionStatus>())
        .transpose()?;

    if let Some(next) = new_status {
        if !transition_allowed(&current_status, next.as_str()) {
            return Err(UpdateAuctionError::LeavesCompleted(command.id));
        }
    }

    // Sale terms land before completion so the pre-deletion snapshot
    // captures them.
    sqlx::query(
        r#"
        UPDATE auctions
        SET winning_bid = COALESCE($2, winning_bid),
            winner_name = COALESCE($3, winner_name)
        WHERE id = $1
        "#,
    )
    .bind(command.id)
    .bind(command.winning_bid)
    .bind(&command.winner_name)
    .execute(&pool)
    .await?;

    match new_status {
        Some(AuctionStatus::Completed) => {
            let actor = ActorSnapshot::from_principal(&principal);
            match workflow::complete_auction(&pool, command.id, &actor).await {
                Ok(outcome) => {
                    tracing::debug!(?outcome, "Auction completion coordinated");
                },
                Err(CompletionError::NotFound(_)) => {
                    return Err(UpdateAuctionError::NotFound(command.id));
                },
                Err(CompletionError::Database(e)) => {
                    return Err(UpdateAuctionError::Database(e));
                },
            }
        },
        Some(next) => {
            let updated = sqlx::query(
                "UPDATE auctions SET status = $2 WHERE id = $1 AND status <> 'completed'",
            )
            .bind(command.id)
            .bind(next.as_str())
            .execute(&pool)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(UpdateAuctionError::LeavesCompleted(command.id));
            }
        },
        None => {},
    }

    let sql = format!("{AUCTION_VIEW_SELECT} WHERE au.id = $1");
    let view = sqlx::query_as::<_, AuctionView>(&sql)
        .bind(command.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(UpdateAuctionError::NotFound(command.id))?;

    tracing::info!(auction_id = view.id, status = %view.status, "Auction updated");

    Ok(view)
}
