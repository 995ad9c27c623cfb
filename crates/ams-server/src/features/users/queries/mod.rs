//! User directory read operations

pub mod list;

pub use list::{ListUsersError, ListUsersQuery};
