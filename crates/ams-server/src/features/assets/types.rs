//! Asset entity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An asset row. `location` is the access-control partition key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: String,
    pub status: String,
    pub custodian_name: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_cost: Option<f64>,
    pub current_value: Option<f64>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column list shared by the asset queries.
pub const ASSET_COLUMNS: &str = "id, name, description, category, location, status, \
     custodian_name, serial_number, purchase_cost, current_value, created_by, created_at, updated_at";
