//! Transfer request API routes
//!
//! - `GET /api/v1/transfer-requests` - List (owner-scoped)
//! - `GET /api/v1/transfer-requests/:id` - Get one
//! - `POST /api/v1/transfer-requests` - File a request
//! - `PUT /api/v1/transfer-requests/:id` - Update / change status

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use sqlx::PgPool;

use super::commands::{self, CreateTransferRequestCommand, UpdateTransferRequestCommand};
use super::queries;
use crate::api::response::ApiResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;

pub fn transfer_requests_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_transfer_request))
        .route("/", get(list_transfer_requests))
        .route("/:id", get(get_transfer_request))
        .route("/:id", put(update_transfer_request))
}

#[tracing::instrument(skip(pool, user, command))]
async fn create_transfer_request(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Json(command): Json<CreateTransferRequestCommand>,
) -> Result<Response, AppError> {
    let view = commands::create::handle(pool, user, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn list_transfer_requests(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Query(window): Query<ListWindow>,
) -> Result<Response, AppError> {
    let views = queries::list::handle(pool, user, window).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(views))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn get_transfer_request(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let view = queries::get::handle(pool, user, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(view))).into_response())
}

#[tracing::instrument(skip(pool, user, command))]
async fn update_transfer_request(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(mut command): Json<UpdateTransferRequestCommand>,
) -> Result<Response, AppError> {
    command.id = id;
    let view = commands::update::handle(pool, user, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(view))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = transfer_requests_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
