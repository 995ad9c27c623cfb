//! Create asset command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::{Asset, ASSET_COLUMNS};
use crate::auth::Principal;
use crate::error::AppError;
use crate::features::shared::validation::{
    validate_amount, validate_location, validate_name, AmountValidationError,
    LocationValidationError, NameValidationError,
};
use crate::policy::{self, AccessMode, Decision, ResourceClass};

fn default_status() -> String {
    "active".to_string()
}

/// Command to register a new asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssetCommand {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Facility the asset lives in; access control partitions on this.
    pub location: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custodian_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
}

impl CreateAssetCommand {
    pub fn validate(&self) -> Result<(), CreateAssetError> {
        validate_name(&self.name, 100)?;
        validate_location(&self.location, "location")?;
        validate_amount(self.purchase_cost, "purchase_cost")?;
        validate_amount(self.current_value, "current_value")?;
        Ok(())
    }
}

/// Errors that can occur when creating an asset
#[derive(Debug, thiserror::Error)]
pub enum CreateAssetError {
    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("Location validation failed: {0}")]
    LocationValidation(#[from] LocationValidationError),

    #[error("Amount validation failed: {0}")]
    AmountValidation(#[from] AmountValidationError),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateAssetError> for AppError {
    fn from(err: CreateAssetError) -> Self {
        match err {
            e @ (CreateAssetError::NameValidation(_)
            | CreateAssetError::LocationValidation(_)
            | CreateAssetError::AmountValidation(_)) => AppError::Validation(e.to_string()),
            CreateAssetError::Denied(message) => AppError::Forbidden(message.to_string()),
            CreateAssetError::Database(e) => AppError::Database(e),
        }
    }
}

/// Create an asset. The policy engine runs before the write: the target
/// location must fall inside the principal's scope.
#[tracing::instrument(
    skip(pool, principal, command),
    fields(name = %command.name, location = %command.location, user = %principal.username)
)]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    command: CreateAssetCommand,
) -> Result<Asset, CreateAssetError> {
    command.validate()?;

    let decision = policy::evaluate(&principal, ResourceClass::Assets, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(CreateAssetError::Denied(reason.message()));
    }
    if !policy::allows_location(&decision, Some(&command.location)) {
        return Err(CreateAssetError::Denied(
            "Access denied to create assets in this location",
        ));
    }

    let sql = format!(
        r#"
        INSERT INTO assets (
            name, description, category, location, status,
            custodian_name, serial_number, purchase_cost, current_value, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {ASSET_COLUMNS}
        "#
    );

    let asset = sqlx::query_as::<_, Asset>(&sql)
        .bind(&command.name)
        .bind(&command.description)
        .bind(&command.category)
        .bind(&command.location)
        .bind(&command.status)
        .bind(&command.custodian_name)
        .bind(&command.serial_number)
        .bind(command.purchase_cost)
        .bind(command.current_value)
        .bind(principal.id)
        .fetch_one(&pool)
        .await?;

    tracing::info!(asset_id = asset.id, "Asset created");

    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str, location: &str) -> CreateAssetCommand {
        CreateAssetCommand {
            name: name.to_string(),
            description: None,
            category: None,
            location: location.to_string(),
            status: default_status(),
            custodian_name: None,
            serial_number: None,
            purchase_cost: None,
            current_value: None,
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(command("Printer", "WH-1").validate().is_ok());
    }

    #[test]
    fn test_validation_empty_name() {
        assert!(matches!(
            command("", "WH-1").validate(),
            Err(CreateAssetError::NameValidation(_))
        ));
    }

    #[test]
    fn test_validation_empty_location() {
        assert!(matches!(
            command("Printer", "").validate(),
            Err(CreateAssetError::LocationValidation(_))
        ));
    }

    #[test]
    fn test_validation_negative_cost() {
        let mut cmd = command("Printer", "WH-1");
        cmd.purchase_cost = Some(-10.0);
        assert!(matches!(
            cmd.validate(),
            Err(CreateAssetError::AmountValidation(_))
        ));
    }

    #[test]
    fn test_status_defaults_to_active() {
        let cmd: CreateAssetCommand =
            serde_json::from_str(r#"{"name": "Printer", "location": "WH-1"}"#).unwrap();
        assert_eq!(cmd.status, "active");
    }
}
