//! Disposal read operations

pub mod list;

pub use list::ListDisposalsError;
