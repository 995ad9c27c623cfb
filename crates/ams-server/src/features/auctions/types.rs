//! Auction types

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// An auction enriched with a summary of its linked asset. `asset_id`
/// drops to NULL once the asset is retired by a completed sale.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuctionView {
    pub id: i64,
    pub asset_id: Option<i64>,
    pub auction_date: Option<NaiveDate>,
    pub starting_bid: Option<f64>,
    pub reserve_price: Option<f64>,
    pub winning_bid: Option<f64>,
    pub winner_name: Option<String>,
    pub winner_contact: Option<String>,
    pub status: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub asset_name: Option<String>,
    pub asset_category: Option<String>,
}

/// Joined select shared by the auction queries.
pub const AUCTION_VIEW_SELECT: &str = r#"
    SELECT au.id, au.asset_id, au.auction_date, au.starting_bid, au.reserve_price,
           au.winning_bid, au.winner_name, au.winner_contact, au.status,
           au.location, au.description, au.notes, au.created_at,
           a.name AS asset_name, a.category AS asset_category
    FROM auctions au
    LEFT JOIN assets a ON a.id = au.asset_id
"#;
