//! User directory API routes
//!
//! - `GET /api/v1/users?permission=maintenance&location=Lagos` - Directory lookup

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::queries::{self, ListUsersQuery};
use crate::api::response::ApiResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;

pub fn users_routes() -> Router<PgPool> {
    Router::new().route("/", get(list_users))
}

#[tracing::instrument(skip(pool, user, query))]
async fn list_users(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response, AppError> {
    let users = queries::list::handle(pool, user, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(users))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = users_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
