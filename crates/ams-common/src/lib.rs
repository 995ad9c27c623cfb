//! AMS Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging bootstrap for the AMS workspace.
//!
//! # Overview
//!
//! This crate provides the functionality every AMS workspace member needs:
//!
//! - **Error Handling**: the crate-level [`AmsError`] and [`Result`] alias
//! - **Logging**: a centralized `tracing` subscriber setup with
//!   environment-based configuration
//!
//! # Example
//!
//! ```no_run
//! use ams_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("application started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{AmsError, Result};
