//! Principal context resolution
//!
//! Turns an (optional) bearer credential on an inbound request into a
//! [`Principal`]. The contract is: malformed, expired, or unknown
//! credentials resolve to anonymous (`None`) rather than erroring; the
//! caller decides whether anonymous access is permitted. The audit
//! recorder relies on this never failing.

pub mod principal;
pub mod token;

pub use principal::{AccessSet, Principal, Role, UserId};

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use sqlx::PgPool;

use crate::config::AuthConfig;
use crate::error::AppError;

/// Resolve the bearer credential in `headers` to a principal.
///
/// Every failure path (missing header, malformed token, expired token,
/// unknown user, even a database error) degrades to `None`.
pub async fn resolve_principal(
    pool: &PgPool,
    headers: &HeaderMap,
    jwt_secret: &str,
) -> Option<Principal> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?;
    let claims = token::decode_bearer(bearer, jwt_secret)?;

    match load_principal_by_username(pool, &claims.sub).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "principal lookup failed; treating request as anonymous");
            None
        },
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    permissions: Option<serde_json::Value>,
    asset_access: Option<serde_json::Value>,
}

async fn load_principal_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Principal>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, email, first_name, last_name, role, permissions, asset_access
        FROM users
        WHERE username = $1 AND status = 'active'
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(principal_from_row))
}

fn principal_from_row(row: UserRow) -> Principal {
    let role = row.role.parse::<Role>().unwrap_or_else(|unknown| {
        tracing::warn!(role = %unknown.0, username = %row.username, "unknown role, demoting to viewer");
        Role::Viewer
    });

    Principal {
        id: row.id,
        username: row.username,
        full_name: format!("{} {}", row.first_name, row.last_name),
        email: row.email,
        role,
        permissions: AccessSet::parse(row.permissions.as_ref()),
        locations: AccessSet::parse(row.asset_access.as_ref()),
    }
}

/// Extractor for handlers that require an authenticated principal.
///
/// Rejects anonymous requests with 401. The audit recorder does not use
/// this extractor; it goes through [`resolve_principal`] directly so it
/// can proceed with anonymous actor fields.
pub struct CurrentUser(pub Principal);

#[axum::async_trait]
impl FromRequestParts<PgPool> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, pool: &PgPool) -> Result<Self, Self::Rejection> {
        let auth = AuthConfig::from_env();
        match resolve_principal(pool, &parts.headers, &auth.jwt_secret).await {
            Some(principal) => Ok(CurrentUser(principal)),
            None => Err(AppError::Unauthorized("Authentication required".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_principal_from_row_parses_sets() {
        let row = UserRow {
            id: 7,
            username: "fola".into(),
            email: "fola@example.com".into(),
            first_name: "Fola".into(),
            last_name: "Ade".into(),
            role: "maintenance_manager".into(),
            permissions: Some(json!(["maintenance"])),
            asset_access: Some(json!("[\"Lagos\"]")),
        };

        let principal = principal_from_row(row);
        assert_eq!(principal.role, Role::MaintenanceManager);
        assert_eq!(principal.full_name, "Fola Ade");
        assert!(principal.has_permission("maintenance"));
        assert!(principal.locations.contains("Lagos"));
    }

    #[test]
    fn test_unknown_role_demotes_to_viewer() {
        let row = UserRow {
            id: 8,
            username: "sam".into(),
            email: "sam@example.com".into(),
            first_name: "Sam".into(),
            last_name: "Obi".into(),
            role: "warlord".into(),
            permissions: None,
            asset_access: None,
        };

        let principal = principal_from_row(row);
        assert_eq!(principal.role, Role::Viewer);
        assert!(principal.locations.is_empty());
    }
}
