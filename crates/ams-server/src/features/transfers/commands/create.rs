//! Create transfer request command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::{TransferRequestView, TRANSFER_VIEW_SELECT};
use crate::auth::Principal;
use crate::error::AppError;
use crate::features::shared::validation::{validate_location, LocationValidationError};

/// Command to file a transfer request. Any authenticated user may file
/// one; approval and completion are gated separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferRequestCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<i64>,

    pub from_location: String,
    pub to_location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateTransferRequestCommand {
    pub fn validate(&self) -> Result<(), CreateTransferRequestError> {
        validate_location(&self.from_location, "from_location")?;
        validate_location(&self.to_location, "to_location")?;
        Ok(())
    }
}

/// Errors that can occur when filing a transfer request
#[derive(Debug, thiserror::Error)]
pub enum CreateTransferRequestError {
    #[error("Location validation failed: {0}")]
    LocationValidation(#[from] LocationValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateTransferRequestError> for AppError {
    fn from(err: CreateTransferRequestError) -> Self {
        match err {
            e @ CreateTransferRequestError::LocationValidation(_) => {
                AppError::Validation(e.to_string())
            },
            CreateTransferRequestError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(
    skip(pool, principal, command),
    fields(user = %principal.username, to_location = %command.to_location)
)]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    command: CreateTransferRequestCommand,
) -> Result<TransferRequestView, CreateTransferRequestError> {
    command.validate()?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO transfer_requests (asset_id, from_location, to_location, requested_by, reason, notes, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'pending')
        RETURNING id
        "#,
    )
    .bind(command.asset_id)
    .bind(&command.from_location)
    .bind(&command.to_location)
    .bind(principal.id)
    .bind(&command.reason)
    .bind(&command.notes)
    .fetch_one(&pool)
    .await?;

    let sql = format!("{TRANSFER_VIEW_SELECT} WHERE t.id = $1");
    let view = sqlx::query_as::<_, TransferRequestView>(&sql)
        .bind(id)
        .fetch_one(&pool)
        .await?;

    tracing::info!(transfer_request_id = id, "Transfer request filed");

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_locations() {
        let cmd = CreateTransferRequestCommand {
            asset_id: Some(1),
            from_location: "WH-1".into(),
            to_location: "WH-2".into(),
            reason: None,
            notes: None,
        };
        assert!(cmd.validate().is_ok());

        let cmd = CreateTransferRequestCommand {
            asset_id: None,
            from_location: "".into(),
            to_location: "WH-2".into(),
            reason: None,
            notes: None,
        };
        assert!(matches!(
            cmd.validate(),
            Err(CreateTransferRequestError::LocationValidation(_))
        ));
    }
}
