//! Disposal API routes
//!
//! - `GET /api/v1/disposals` - List disposals with asset summaries
//! - `POST /api/v1/disposals` - Open a disposal
//! - `PUT /api/v1/disposals/:id/status` - Move a disposal through its lifecycle

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use sqlx::PgPool;

use super::commands::{self, CreateDisposalCommand, UpdateDisposalStatusCommand};
use super::queries;
use crate::api::response::ApiResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::features::shared::pagination::ListWindow;

pub fn disposals_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_disposal))
        .route("/", get(list_disposals))
        .route("/:id/status", put(update_disposal_status))
}

#[tracing::instrument(skip(pool, user, command))]
async fn create_disposal(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Json(command): Json<CreateDisposalCommand>,
) -> Result<Response, AppError> {
    let view = commands::create::handle(pool, user, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn list_disposals(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Query(window): Query<ListWindow>,
) -> Result<Response, AppError> {
    let views = queries::list::handle(pool, user, window).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(views))).into_response())
}

#[tracing::instrument(skip(pool, user, command))]
async fn update_disposal_status(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(mut command): Json<UpdateDisposalStatusCommand>,
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
        let router = disposals_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
