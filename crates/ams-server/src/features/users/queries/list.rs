//! User directory lookup
//!
//! `?permission=` finds the managers responsible for a capability (e.g.
//! the maintenance managers to notify). For non-admin requesters the
//! shared-location rule applies: a target user is visible iff the two
//! location sets intersect. A full, unfiltered listing is admin-only.

use serde::Deserialize;
use sqlx::PgPool;

use super::super::types::{DirectoryUser, UserRow, UserSummary, USER_COLUMNS};
use crate::auth::Principal;
use crate::error::AppError;
use crate::policy;

/// Query parameters for the user directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Capability to look up (e.g. "maintenance", "auction")
    pub permission: Option<String>,
    /// Require target users to cover this specific location
    pub location: Option<String>,
    /// Filter by exact role
    pub role: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Errors that can occur when listing users
#[derive(Debug, thiserror::Error)]
pub enum ListUsersError {
    #[error("{0}")]
    Denied(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListUsersError> for AppError {
    fn from(err: ListUsersError) -> Self {
        match err {
            ListUsersError::Denied(message) => AppError::Forbidden(message.to_string()),
            ListUsersError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, principal, query), fields(user = %principal.username))]
pub async fn handle(
    pool: PgPool,
    principal: Principal,
    query: ListUsersQuery,
) -> Result<Vec<UserSummary>, ListUsersError> {
    let skip = query.skip.unwrap_or(0).max(0) as usize;
    let limit = query.limit.unwrap_or(100).clamp(1, 500) as usize;

    if let Some(ref permission) = query.permission {
        return by_permission(&pool, &principal, permission, query.location.as_deref(), skip, limit)
            .await;
    }

    if let Some(ref role) = query.role {
        return by_role(&pool, role, query.location.as_deref(), skip, limit).await;
    }

    // Unfiltered listing exposes the whole directory; admins only.
    if !principal.is_admin() {
        return Err(ListUsersError::Denied("Only administrators can list all users"));
    }

    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username OFFSET $1 LIMIT $2");
    let rows = sqlx::query_as::<_, UserRow>(&sql)
        .bind(skip as i64)
        .bind(limit as i64)
        .fetch_all(&pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| DirectoryUser::from_row(row).summary())
        .collect())
}

/// Find users carrying a capability, scoped by location.
async fn by_permission(
    pool: &PgPool,
    principal: &Principal,
    permission: &str,
    location: Option<&str>,
    skip: usize,
    limit: usize,
) -> Result<Vec<UserSummary>, ListUsersError> {
    let target_role = policy::permission_role(permission);

    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = ANY($1) ORDER BY username");
    let rows = sqlx::query_as::<_, UserRow>(&sql)
        .bind(vec![
            target_role.as_str().to_string(),
            "admin".to_string(),
            "manager".to_string(),
        ])
        .fetch_all(pool)
        .await?;

    let matches = rows
        .into_iter()
        .map(DirectoryUser::from_row)
        .filter(|user| {
            user.is_admin() || user.role_raw == target_role.as_str() || user.has_permission(permission)
        })
        .filter(|user| match location {
            // An explicit location narrows to users covering it
            Some(location) => user.locations.contains(location),
            // Otherwise non-admin requesters only see users they share a
            // location with
            None => {
                principal.is_admin() || policy::share_location(&principal.locations, &user.locations)
            },
        })
        .skip(skip)
        .take(limit)
        .map(|user| user.summary())
        .collect::<Vec<_>>();

    tracing::debug!(permission, count = matches.len(), "Users listed by permission");

    Ok(matches)
}

/// Exact-role filter, optionally narrowed to users covering a location.
async fn by_role(
    pool: &PgPool,
    role: &str,
    location: Option<&str>,
    skip: usize,
    limit: usize,
) -> Result<Vec<UserSummary>, ListUsersError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY username");
    let rows = sqlx::query_as::<_, UserRow>(&sql)
        .bind(role)
        .fetch_all(pool)
        .await?;

    let matches = rows
        .into_iter()
        .map(DirectoryUser::from_row)
        .filter(|user| match location {
            Some(location) => user.locations.contains(location),
            None => true,
        })
        .skip(skip)
        .take(limit)
        .map(|user| user.summary())
        .collect::<Vec<_>>();

    Ok(matches)
}
