//! Asset API routes
//!
//! - `GET /api/v1/assets` - List assets visible to the caller
//! - `GET /api/v1/assets/:id` - Get one asset
//! - `POST /api/v1/assets` - Register an asset
//! - `PUT /api/v1/assets/:id` - Update an asset
//! - `DELETE /api/v1/assets/:id` - Delete an asset

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use sqlx::PgPool;

use super::commands::{self, CreateAssetCommand, UpdateAssetCommand};
use super::queries;
use crate::api::response::ApiResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;

pub fn assets_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_asset))
        .route("/", get(list_assets))
        .route("/:id", get(get_asset))
        .route("/:id", put(update_asset))
        .route("/:id", delete(delete_asset))
}

#[tracing::instrument(skip(pool, user, command))]
async fn create_asset(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Json(command): Json<CreateAssetCommand>,
) -> Result<Response, AppError> {
    let asset = commands::create::handle(pool, user, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(asset))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn list_assets(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Query(window): Query<ListWindow>,
) -> Result<Response, AppError> {
    let assets = queries::list::handle(pool, user, window).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(assets))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn get_asset(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let asset = queries::get::handle(pool, user, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(asset))).into_response())
}

#[tracing::instrument(skip(pool, user, command))]
async fn update_asset(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(mut command): Json<UpdateAssetCommand>,
) -> Result<Response, AppError> {
    command.id = id;
    let asset = commands::update::handle(pool, user, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(asset))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn delete_asset(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let asset = commands::delete::handle(pool, user, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(asset))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = assets_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
