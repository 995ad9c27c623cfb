//! Audit trail API routes
//!
//! Read-only access to the audit trail, restricted to admin and auditor
//! roles.
//!
//! - `GET /api/v1/audit` - Filtered query
//! - `GET /api/v1/audit/:table/:id` - Trail for one record

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use crate::api::response::ApiResponse;
use crate::audit::{self, AuditQuery};
use crate::auth::{CurrentUser, Principal};
use crate::error::AppError;
use crate::policy::{self, AccessMode, Decision, ResourceClass};

pub fn audit_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(query_audit_trail))
        .route("/:table/:id", get(record_audit_trail))
}

fn require_audit_access(principal: &Principal) -> Result<(), AppError> {
    match policy::evaluate(principal, ResourceClass::AuditTrail, AccessMode::Read) {
        Decision::Deny(reason) => Err(AppError::Forbidden(reason.message().to_string())),
        _ => Ok(()),
    }
}

#[tracing::instrument(skip(pool, user, query))]
async fn query_audit_trail(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AuditQuery>,
) -> Result<Response, AppError> {
    require_audit_access(&user)?;

    let entries = audit::query_audit_entries(&pool, query)
        .await
        .map_err(AppError::Database)?;

    Ok((StatusCode::OK, Json(ApiResponse::success(entries))).into_response())
}

#[tracing::instrument(skip(pool, user))]
async fn record_audit_trail(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    Path((table, id)): Path<(String, i64)>,
) -> Result<Response, AppError> {
    require_audit_access(&user)?;

    let entries = audit::record_trail(&pool, &table, id, None)
        .await
        .map_err(AppError::Database)?;

    Ok((StatusCode::OK, Json(ApiResponse::success(entries))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = audit_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
