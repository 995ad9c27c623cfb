//! Request audit capture
//!
//! Every inbound request on an audit-worthy path produces exactly one
//! immutable audit trail entry: actor snapshot, derived action, target
//! entity, redacted state snapshots, network origin, timing, and outcome.
//! Persistence is fail-open: an audit write failure is logged and
//! discarded, never allowed to fail or slow the underlying request.
//!
//! The workflow completion coordinator writes additional domain entries
//! (relocations, retirements) through [`queries::insert_audit_entry`]
//! inside its own transaction.
//!
//! # Usage
//!
//! ```no_run
//! use ams_server::audit;
//! use sqlx::PgPool;
//! use std::time::Duration;
//!
//! # fn example(pool: PgPool) {
//! let app = axum::Router::<()>::new()
//!     .layer(audit::AuditLayer::new(pool, "secret", Duration::from_secs(5)));
//! # }
//! ```

mod middleware;
mod models;
mod queries;
mod redact;

pub use middleware::AuditLayer;
pub use models::{
    ActorSnapshot, AuditAction, AuditEntry, AuditQuery, AuditedTable, NewAuditEntry,
    DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT,
};
pub use queries::{insert_audit_entry, query_audit_entries, record_trail};
pub use redact::{redact, MASK_TOKEN};
