//! Feature modules implementing the AMS API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes:
//!
//! - **assets**: asset CRUD, scoped by the location partition
//! - **transfers**: transfer requests and their completion
//! - **auctions**: auction lifecycle; completion retires the asset
//! - **disposals**: disposal lifecycle; completion retires the asset
//! - **users**: read-only user directory with shared-location visibility
//! - **audit_trail**: read-only audit queries for admin/auditor roles
//!
//! Commands are plain data structures with validation; handlers are
//! standalone async functions holding the business logic and SQL. Every
//! mutating handler consults the policy engine before touching storage,
//! and terminal-status writes delegate to the workflow completion
//! coordinator.

pub mod assets;
pub mod auctions;
pub mod audit_trail;
pub mod disposals;
pub mod shared;
pub mod transfers;
pub mod users;

use axum::Router;
use sqlx::PgPool;

/// Creates the `/api/v1` router with all feature routes mounted.
pub fn router(db: PgPool) -> Router<()> {
    Router::new()
        .nest("/assets", assets::assets_routes().with_state(db.clone()))
        .nest(
            "/transfer-requests",
            transfers::transfer_requests_routes().with_state(db.clone()),
        )
        .nest("/auctions", auctions::auctions_routes().with_state(db.clone()))
        .nest("/disposals", disposals::disposals_routes().with_state(db.clone()))
        .nest("/users", users::users_routes().with_state(db.clone()))
        .nest("/audit", audit_trail::audit_routes().with_state(db))
}
