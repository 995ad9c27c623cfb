//! Disposal feature slice
//!
//! Writes require the disposal-manager role or the disposal permission;
//! completing a disposal retires the linked asset through the workflow
//! completion coordinator.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::disposals_routes;
pub use types::DisposalView;
