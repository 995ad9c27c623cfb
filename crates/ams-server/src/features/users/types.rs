//! User directory types

use serde::Serialize;

use crate::auth::{AccessSet, Role};

/// Directory entry returned by the user lookup. Credential material and
/// raw permission blobs stay out of the response.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub department: Option<String>,
    pub locations: Vec<String>,
}

/// Raw user row as stored; normalized into a [`DirectoryUser`] before any
/// policy logic touches it.
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub department: Option<String>,
    pub permissions: Option<serde_json::Value>,
    pub asset_access: Option<serde_json::Value>,
}

/// A user row with decoded permission/location sets.
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Option<Role>,
    pub role_raw: String,
    pub department: Option<String>,
    pub permissions: AccessSet,
    pub locations: AccessSet,
}

impl DirectoryUser {
    pub fn from_row(row: UserRow) -> Self {
        Self {
            id: row.id,
            full_name: format!("{} {}", row.first_name, row.last_name),
            username: row.username,
            email: row.email,
            role: row.role.parse::<Role>().ok(),
            role_raw: row.role,
            department: row.department,
            permissions: AccessSet::parse(row.permissions.as_ref()),
            locations: AccessSet::parse(row.asset_access.as_ref()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn has_permission(&self, token: &str) -> bool {
        self.permissions.contains(token) || self.permissions.contains("all")
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role_raw.clone(),
            department: self.department.clone(),
            locations: self.locations.to_vec(),
        }
    }
}

/// Column list shared by the user queries.
pub const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, role, department, permissions, asset_access";
