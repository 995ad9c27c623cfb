//! Disposal write operations

pub mod create;
pub mod update_status;

pub use create::{CreateDisposalCommand, CreateDisposalError};
pub use update_status::{UpdateDisposalStatusCommand, UpdateDisposalStatusError};
