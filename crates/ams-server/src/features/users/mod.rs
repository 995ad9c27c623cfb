//! User directory feature slice
//!
//! Read-only lookups over principals: who carries a capability, who
//! covers a location. The shared-location rule gates what non-admin
//! requesters can see. User record management itself is admin territory
//! and lives with the identity service.

pub mod queries;
pub mod routes;
pub mod types;

pub use routes::users_routes;
pub use types::{DirectoryUser, UserSummary};
