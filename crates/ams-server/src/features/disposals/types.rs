//! Disposal types

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A disposal record with a summary of its linked asset. `asset_id`
/// drops to NULL once the asset is retired by a completed disposal.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DisposalView {
    pub id: i64,
    pub asset_id: Option<i64>,
    pub disposal_date: Option<NaiveDate>,
    pub method: Option<String>,
    pub reason: Option<String>,
    pub proceeds: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub asset_name: Option<String>,
    pub asset_category: Option<String>,
}

/// Joined select shared by the disposal queries.
pub const DISPOSAL_VIEW_SELECT: &str = r#"
    SELECT d.id, d.asset_id, d.disposal_date, d.method, d.reason, d.proceeds,
           d.status, d.created_at,
           a.name AS asset_name, a.category AS asset_category
    FROM disposals d
    LEFT JOIN assets a ON a.id = d.asset_id
"#;
