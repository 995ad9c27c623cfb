//! Auction API routes
//!
//! - `GET /api/v1/auctions` - List auctions with asset summaries
//! - `POST /api/v1/auctions` - Schedule an auction
//! - `PUT /api/v1/auctions/:id` - Update status / sale terms

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use sqlx::PgPool;

use super::commands::{self, CreateAuctionCommand, UpdateAuctionCommand};
use super::queries;
use crate::api::response::ApiResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;

pub fn auctions_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_auction))
        .route("/", get(list_auctions))
        .route("/:id", put(update_auction))
}

#[tracing::instrument(skip(pool, user, command))]
async fn create_auction(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Json(command): Json<CreateAuctionCommand>,
) -> Result<Response, AppError> {
    let view = commands::create::handle(pool, user, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn list_auctions(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Query(window): Query<ListWindow>,
) -> Result<Response, AppError> {
    let views = queries::list::handle(pool, user, window).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(views))).into_response())
}

#[tracing::instrument(skip(pool, user, command))]
async fn update_auction(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(mut command): Json<UpdateAuctionCommand>,
) -> Result<Response, AppError> {
    command.id = id;
    let view = commands::update_status::handle(pool, user, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(view))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = auctions_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
