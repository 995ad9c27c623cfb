//! Asset write operations

pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateAssetCommand, CreateAssetError};
pub use delete::DeleteAssetError;
pub use update::{UpdateAssetCommand, UpdateAssetError};
