//! Update asset command

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

/// Command to update an existing asset. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssetCommand {
    /// Set from the path parameter, not the body.
    #[serde(skip)]
    pub id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custodian_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
}

impl UpdateAssetCommand {
    pub fn validate(&self) -> Result<(), UpdateAssetError> {
        if let Some(ref name) = self.name {
            validate_name(name, 100)?;
        }
        if let Some(ref location) = self.location {
            validate_location(location, "location")?;
        }
        validate_amount(self.purchase_cost, "purchase_cost")?;
        validate_amount(self.current_value, "current_value")?;
        Ok(())
    }
}

/// Errors that can occur when updating an asset
#[derive(Debug, thiserror::Error)]
pub enum UpdateAssetError {
    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("Location validation failed: {0}")]
    LocationValidation(#[from] LocationValidationError),

    #[error("Amount validation failed: {0}")]
    AmountValidation(#[from] AmountValidationError),

    #[error("Asset {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Denied(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateAssetError> for AppError {
    fn from(err: UpdateAssetError) -> Self {
        match err {
            e @ (UpdateAssetError::NameValidation(_)
            | UpdateAssetError::LocationValidation(_)
            | UpdateAssetError::AmountValidation(_)) => AppError::Validation(e.to_string()),
            e @ UpdateAssetError::NotFound(_) => AppError::NotFound(e.to_string()),
            UpdateAssetError::Denied(message) => AppError::Forbidden(message.to_string()),
            UpdateAssetError::Database(e) => AppError::Database(e),
        }
    }
}

/// Update an asset. The policy engine gates the write and the existing
/// record's location must fall inside the principal's scope.
#[tracing::instrument(
    skip(pool, principal, command),
    fields(asset_id = command.id, user = %principal.username)
)]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    command: UpdateAssetCommand,
) -> Result<Asset, UpdateAssetError> {
    command.validate()?;

    let decision = policy::evaluate(&principal, ResourceClass::Assets, AccessMode::Write);
    if let Decision::Deny(reason) = decision {
        return Err(UpdateAssetError::Denied(reason.message()));
    }

    let select = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
    let existing = sqlx::query_as::<_, Asset>(&select)
        .bind(command.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(UpdateAssetError::NotFound(command.id))?;

    if !policy::allows_location(&decision, Some(&existing.location)) {
        return Err(UpdateAssetError::Denied("Access denied to this asset location"));
    }

    let sql = format!(
        r#"
        UPDATE assets
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            category = COALESCE($4, category),
            location = COALESCE($5, location),
            status = COALESCE($6, status),
            custodian_name = COALESCE($7, custodian_name),
            serial_number = COALESCE($8, serial_number),
            purchase_cost = COALESCE($9, purchase_cost),
            current_value = COALESCE($10, current_value),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {ASSET_COLUMNS}
        "#
    );

    let asset = sqlx::query_as::<_, Asset>(&sql)
        .bind(command.id)
        .bind(&command.name)
        .bind(&command.description)
        .bind(&command.category)
        .bind(&command.location)
        .bind(&command.status)
        .bind(&command.custodian_name)
        .bind(&command.serial_number)
        .bind(command.purchase_cost)
        .bind(command.current_value)
        .fetch_one(&pool)
        .await?;

    tracing::info!(asset_id = asset.id, "Asset updated");

    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_absent_fields_ok() {
        let cmd = UpdateAssetCommand {
            id: 1,
            ..Default::default()
        };
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validate_present_fields_checked() {
        let cmd = UpdateAssetCommand {
            id: 1,
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(cmd.validate(), Err(UpdateAssetError::NameValidation(_))));

        let cmd = UpdateAssetCommand {
            id: 1,
            current_value: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(cmd.validate(), Err(UpdateAssetError::AmountValidation(_))));
    }
}
