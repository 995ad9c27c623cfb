//! Audit trail feature slice (read-only)

pub mod routes;

pub use routes::audit_routes;
