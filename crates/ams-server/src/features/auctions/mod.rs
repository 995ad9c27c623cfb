//! Auction feature slice
//!
//! Writes require the auction-manager role or the auctions permission;
//! completing a sale retires the linked asset through the workflow
//! completion coordinator.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::auctions_routes;
pub use types::AuctionView;
