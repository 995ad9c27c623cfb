//! Asset read operations

pub mod get;
pub mod list;

pub use get::GetAssetError;
pub use list::ListAssetsError;
