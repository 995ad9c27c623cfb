//! Auction read operations

pub mod list;

pub use list::ListAuctionsError;
