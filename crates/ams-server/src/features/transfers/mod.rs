//! Transfer request feature slice
//!
//! Filing is open to any authenticated user; updates are gated to admins
//! and transfer managers; the transition into `completed` runs through
//! the workflow completion coordinator.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::transfer_requests_routes;
pub use types::TransferRequestView;
