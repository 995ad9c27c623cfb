//! Asset management feature slice
//!
//! CRUD over the asset entity; every operation goes through the policy
//! engine first, and reads are scoped by the location partition.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::assets_routes;
pub use types::Asset;
