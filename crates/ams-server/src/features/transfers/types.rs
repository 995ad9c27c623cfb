//! Transfer request types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A transfer request enriched with asset and requester details.
/// `asset_id` is nullable: the linked asset may have been removed after
/// the request was filed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TransferRequestView {
    pub id: i64,
    pub asset_id: Option<i64>,
    pub from_location: String,
    pub to_location: String,
    pub requested_by: i64,
    pub approved_by: Option<i64>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub asset_name: Option<String>,
    pub asset_location: Option<String>,
    pub requested_by_name: Option<String>,
}

/// Joined select shared by the transfer queries.
pub const TRANSFER_VIEW_SELECT: &str = r#"
    SELECT t.id, t.asset_id, t.from_location, t.to_location, t.requested_by, t.approved_by,
           t.reason, t.notes, t.status, t.created_at, t.updated_at,
           a.name AS asset_name, a.location AS asset_location,
           u.first_name || ' ' || u.last_name AS requested_by_name
    FROM transfer_requests t
    LEFT JOIN assets a ON a.id = t.asset_id
    LEFT JOIN users u ON u.id = t.requested_by
"#;
