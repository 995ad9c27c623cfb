//! Create disposal command

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::{DisposalView, DISPOSAL_VIEW_SELECT};
use crate::auth::Principal;
use crate::error::AppError;
use crate::features::shared::validation::{validate_amount, AmountValidationError};
use crate::policy::{self, AccessMode, Decision, ResourceClass};

fn default_status() -> String {
    "draft".to_string()
}

/// Command to open a disposal for an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDisposalCommand {
    pub asset_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposal_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proceeds: Option<f64>,

    #[serde(default = "default_status")]
    pub status: String,
}

impl CreateDisposalCommand {
    pub fn validate(&self) -> Result<(), CreateDisposalError> {
        validate_amount(self.proceeds, "proceeds")?;
        Ok(())
    }
}

/// Errors that can occur when creating a disposal
#[derive(Debug, thiserror::Error)]
pub enum CreateDisposalError {
    #[error("Amount validation failed: {0}")]
    AmountValidation(#[from] AmountValidationError),

    #[error("Asset {0} not found")]
    AssetNotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateDisposalError> for AppError {
    fn from(err: CreateDisposalError) -> Self {
        match err {
            e @ CreateDisposalError::AmountValidation(_) => AppError::Validation(e.to_string()),
            e @ CreateDisposalError::AssetNotFound(_) => AppError::NotFound(e.to_string()),
            CreateDisposalError::Denied(message) => AppError::Forbidden(message.to_string()),
            CreateDisposalError::Database(e) => AppError::Database(e),
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
    command: CreateDisposalCommand,
) -> Result<DisposalView, CreateDisposalError> {
    command.validate()?;

    let decision = policy::evaluate(&principal, ResourceClass::Disposals, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(CreateDisposalError::Denied(reason.message()));
    }

    let asset_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM assets WHERE id = $1")
        .bind(command.asset_id)
        .fetch_optional(&pool)
        .await?;
    if asset_exists.is_none() {
        return Err(CreateDisposalError::AssetNotFound(command.asset_id));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO disposals (asset_id, disposal_date, method, reason, proceeds, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(command.asset_id)
    .bind(command.disposal_date)
    .bind(&command.method)
    .bind(&command.reason)
    .bind(command.proceeds)
    .bind(&command.status)
    .fetch_one(&pool)
    .await?;

    let sql = format!("{DISPOSAL_VIEW_SELECT} WHERE d.id = $1");
    let view = sqlx::query_as::<_, DisposalView>(&sql)
        .bind(id)
        .fetch_one(&pool)
        .await?;

    tracing::info!(disposal_id = id, "Disposal created");

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_proceeds_rejected() {
        let cmd: CreateDisposalCommand =
            serde_json::from_str(r#"{"asset_id": 1, "proceeds": -20.0}"#).unwrap();
        assert!(matches!(
            cmd.validate(),
            Err(CreateDisposalError::AmountValidation(_))
        ));
    }

    #[test]
    fn test_status_defaults_to_draft() {
        let cmd: CreateDisposalCommand = serde_json::from_str(r#"{"asset_id": 1}"#).unwrap();
        assert_eq!(cmd.status, "draft");
    }
}
