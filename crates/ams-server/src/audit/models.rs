//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::auth::Principal;

// ============================================================================
// Audit Query Constants
// ============================================================================

/// Default number of audit entries returned per query
pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;

/// Maximum number of audit entries that can be returned in a single query.
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// Audit trail entry from the database. Immutable once written.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    /// Actor snapshot, captured at write time (never joined live)
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub user_email: Option<String>,
    pub full_name: Option<String>,
    /// Action performed (VIEW, LIST, CREATE, ... or a domain event)
    pub action: String,
    /// Entity the action targeted
    pub table_name: Option<String>,
    /// Id of the targeted record, when derivable
    pub record_id: Option<i64>,
    /// Prior-state snapshot
    pub old_values: Option<JsonValue>,
    /// New-state snapshot (redacted before persistence)
    pub new_values: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub response_status: Option<i32>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    /// Free-form structured extension data
    pub extra: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

/// Action vocabulary. Request-derived verbs plus the domain events emitted
/// by the workflow completion coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    View,
    List,
    Create,
    Update,
    Delete,
    TransferCompleted,
    AuctionSale,
    DisposalRetirement,
    Other,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::List => "LIST",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::TransferCompleted => "asset_transfer_completed",
            Self::AuctionSale => "asset_sold_at_auction",
            Self::DisposalRetirement => "asset_retired_via_disposal",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entities that show up in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditedTable {
    Users,
    Assets,
    Maintenance,
    TransferRequests,
    Auctions,
    Disposals,
    Notifications,
    Reports,
    Departments,
    AssetLocations,
    AuditTrail,
    Auth,
    Other,
}

impl AuditedTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Assets => "assets",
            Self::Maintenance => "maintenance",
            Self::TransferRequests => "transfer_requests",
            Self::Auctions => "auctions",
            Self::Disposals => "disposals",
            Self::Notifications => "notifications",
            Self::Reports => "reports",
            Self::Departments => "departments",
            Self::AssetLocations => "asset_locations",
            Self::AuditTrail => "audit_trail",
            Self::Auth => "auth",
            Self::Other => "other",
        }
    }

    /// Map the leading path segment of an API route to its entity name.
    pub fn from_path_segment(segment: &str) -> Self {
        match segment {
            "users" => Self::Users,
            "assets" => Self::Assets,
            "maintenance" => Self::Maintenance,
            "transfers" | "transfer-requests" | "transfer_requests" => Self::TransferRequests,
            "auctions" => Self::Auctions,
            "disposals" => Self::Disposals,
            "notifications" => Self::Notifications,
            "reports" => Self::Reports,
            "departments" => Self::Departments,
            "locations" => Self::AssetLocations,
            "audit" => Self::AuditTrail,
            "auth" => Self::Auth,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for AuditedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Actor identity snapshot for a new entry. Anonymous when no principal
/// could be resolved.
#[derive(Debug, Clone, Default)]
pub struct ActorSnapshot {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub user_email: Option<String>,
    pub full_name: Option<String>,
}

impl ActorSnapshot {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_principal(principal: &Principal) -> Self {
        Self {
            user_id: Some(principal.id),
            username: Some(principal.username.clone()),
            user_email: Some(principal.email.clone()),
            full_name: Some(principal.full_name.clone()),
        }
    }
}

impl From<Option<&Principal>> for ActorSnapshot {
    fn from(principal: Option<&Principal>) -> Self {
        principal.map(Self::from_principal).unwrap_or_default()
    }
}

/// Input for creating an audit entry
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor: ActorSnapshot,
    pub action: AuditAction,
    pub table_name: Option<AuditedTable>,
    pub record_id: Option<i64>,
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub response_status: Option<i32>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub extra: Option<JsonValue>,
}

impl NewAuditEntry {
    pub fn builder(action: AuditAction) -> AuditEntryBuilder {
        AuditEntryBuilder::new(action)
    }
}

/// Builder for audit entries
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
    entry: NewAuditEntry,
}

impl AuditEntryBuilder {
    fn new(action: AuditAction) -> Self {
        Self {
            entry: NewAuditEntry {
                actor: ActorSnapshot::anonymous(),
                action,
                table_name: None,
                record_id: None,
                old_values: None,
                new_values: None,
                ip_address: None,
                user_agent: None,
                request_method: None,
                request_path: None,
                response_status: None,
                duration_ms: None,
                error_message: None,
                extra: None,
            },
        }
    }

    pub fn actor(mut self, actor: ActorSnapshot) -> Self {
        self.entry.actor = actor;
        self
    }

    pub fn table(mut self, table: AuditedTable) -> Self {
        self.entry.table_name = Some(table);
        self
    }

    pub fn record_id(mut self, record_id: Option<i64>) -> Self {
        self.entry.record_id = record_id;
        self
    }

    pub fn old_values(mut self, values: JsonValue) -> Self {
        self.entry.old_values = Some(values);
        self
    }

    pub fn new_values(mut self, values: JsonValue) -> Self {
        self.entry.new_values = Some(values);
        self
    }

    pub fn origin(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.entry.ip_address = Some(ip_address.into());
        self.entry.user_agent = Some(user_agent.into());
        self
    }

    pub fn ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.entry.ip_address = Some(ip_address.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.entry.user_agent = Some(user_agent.into());
        self
    }

    pub fn request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.entry.request_method = Some(method.into());
        self.entry.request_path = Some(path.into());
        self
    }

    pub fn outcome(mut self, status: i32, duration_ms: i64) -> Self {
        self.entry.response_status = Some(status);
        self.entry.duration_ms = Some(duration_ms);
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.entry.error_message = Some(message.into());
        self
    }

    pub fn extra(mut self, extra: JsonValue) -> Self {
        self.entry.extra = Some(extra);
        self
    }

    pub fn build(self) -> NewAuditEntry {
        self.entry
    }
}

/// Query parameters for reading the audit trail
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_AUDIT_QUERY_LIMIT
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            action: None,
            table_name: None,
            record_id: None,
            start_time: None,
            end_time: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_as_str() {
        assert_eq!(AuditAction::View.as_str(), "VIEW");
        assert_eq!(AuditAction::List.as_str(), "LIST");
        assert_eq!(AuditAction::Create.as_str(), "CREATE");
        assert_eq!(AuditAction::TransferCompleted.as_str(), "asset_transfer_completed");
    }

    #[test]
    fn test_table_from_path_segment() {
        assert_eq!(AuditedTable::from_path_segment("assets"), AuditedTable::Assets);
        assert_eq!(
            AuditedTable::from_path_segment("transfer-requests"),
            AuditedTable::TransferRequests
        );
        assert_eq!(AuditedTable::from_path_segment("audit"), AuditedTable::AuditTrail);
        assert_eq!(AuditedTable::from_path_segment("locations"), AuditedTable::AssetLocations);
        assert_eq!(AuditedTable::from_path_segment("gadgets"), AuditedTable::Other);
    }

    #[test]
    fn test_builder() {
        let entry = NewAuditEntry::builder(AuditAction::Create)
            .table(AuditedTable::Assets)
            .record_id(Some(42))
            .new_values(json!({"name": "Printer"}))
            .origin("192.168.1.1", "curl/8")
            .request("POST", "/api/v1/assets")
            .outcome(201, 12)
            .build();

        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.table_name, Some(AuditedTable::Assets));
        assert_eq!(entry.record_id, Some(42));
        assert_eq!(entry.response_status, Some(201));
        assert!(entry.actor.user_id.is_none());
    }

    #[test]
    fn test_actor_snapshot_default_is_anonymous() {
        let actor = ActorSnapshot::from(None);
        assert!(actor.user_id.is_none());
        assert!(actor.username.is_none());
    }
}
