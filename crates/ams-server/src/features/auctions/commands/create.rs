//! Create auction command

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::{AuctionView, AUCTION_VIEW_SELECT};
use crate::auth::Principal;
use crate::error::AppError;
use crate::features::shared::validation::{validate_amount, AmountValidationError};
use crate::policy::{self, AccessMode, Decision, ResourceClass};

fn default_status() -> String {
    "draft".to_string()
}

/// Command to schedule an auction for an asset.
///
/// Some clients send `final_bid`/`winner`; they are aliases for
/// `winning_bid`/`winner_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuctionCommand {
    pub asset_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_bid: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_price: Option<f64>,

    #[serde(alias = "final_bid", skip_serializing_if = "Option::is_none")]
    pub winning_bid: Option<f64>,

    #[serde(alias = "winner", skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_contact: Option<String>,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateAuctionCommand {
    pub fn validate(&self) -> Result<(), CreateAuctionError> {
        validate_amount(self.starting_bid, "starting_bid")?;
        validate_amount(self.reserve_price, "reserve_price")?;
        validate_amount(self.winning_bid, "winning_bid")?;
        Ok(())
    }
}

/// Errors that can occur when creating an auction
#[derive(Debug, thiserror::Error)]
pub enum CreateAuctionError {
    #[error("Amount validation failed: {0}")]
    AmountValidation(#[from] AmountValidationError),

    #[error("Asset {0} not found")]
    AssetNotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateAuctionError> for AppError {
    fn from(err: CreateAuctionError) -> Self {
        match err {
            e @ CreateAuctionError::AmountValidation(_) => AppError::Validation(e.to_string()),
            e @ CreateAuctionError::AssetNotFound(_) => AppError::NotFound(e.to_string()),
            CreateAuctionError::Denied(message) => AppError::Forbidden(message.to_string()),
            CreateAuctionError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(
    skip(pool, principal, command),
    fields(asset_id = command.asset_id, user = %principal.username)
)]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    command: CreateAuctionCommand,
) -> Result<AuctionView, CreateAuctionError> {
    command.validate()?;

    let decision = policy::evaluate(&principal, ResourceClass::Auctions, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(CreateAuctionError::Denied(reason.message()));
    }

    let asset_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM assets WHERE id = $1")
        .bind(command.asset_id)
        .fetch_optional(&pool)
        .await?;
    if asset_exists.is_none() {
        return Err(CreateAuctionError::AssetNotFound(command.asset_id));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO auctions (
            asset_id, auction_date, starting_bid, reserve_price,
            winning_bid, winner_name, winner_contact, status,
            location, description, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(command.asset_id)
    .bind(command.auction_date)
    .bind(command.starting_bid)
    .bind(command.reserve_price)
    .bind(command.winning_bid)
    .bind(&command.winner_name)
    .bind(&command.winner_contact)
    .bind(&command.status)
    .bind(&command.location)
    .bind(&command.description)
    .bind(&command.notes)
    .fetch_one(&pool)
    .await?;

    let sql = format!("{AUCTION_VIEW_SELECT} WHERE au.id = $1");
    let view = sqlx::query_as::<_, AuctionView>(&sql)
        .bind(id)
        .fetch_one(&pool)
        .await?;

    tracing::info!(auction_id = id, "Auction created");

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_aliases_accepted() {
        let cmd: CreateAuctionCommand = serde_json::from_str(
            r#"{"asset_id": 42, "final_bid": 1500.0, "winner": "Bola A."}"#,
        )
        .unwrap();
        assert_eq!(cmd.winning_bid, Some(1500.0));
        assert_eq!(cmd.winner_name.as_deref(), Some("Bola A."));
        assert_eq!(cmd.status, "draft");
    }

    #[test]
    fn test_negative_bid_rejected() {
        let cmd: CreateAuctionCommand =
            serde_json::from_str(r#"{"asset_id": 1, "starting_bid": -5.0}"#).unwrap();
        assert!(matches!(
            cmd.validate(),
            Err(CreateAuctionError::AmountValidation(_))
        ));
    }
}
