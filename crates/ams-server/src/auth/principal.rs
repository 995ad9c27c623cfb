//! Principal model: role, permission set, authorized-location set
//!
//! Permission and location values are stored as JSONB but legacy rows may
//! hold an encoded string instead of a native array. [`AccessSet::parse`]
//! is the single boundary where that is normalized; decoding failure
//! degrades to a single-element set and is never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

pub type UserId = i64;

/// Closed role enumeration.
///
/// `Admin` implies unconditional allow in the policy engine regardless of
/// permission or location sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    MaintenanceManager,
    AuctionManager,
    DisposalManager,
    TransferManager,
    User,
    Viewer,
    Auditor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::MaintenanceManager => "maintenance_manager",
            Self::AuctionManager => "auction_manager",
            Self::DisposalManager => "disposal_manager",
            Self::TransferManager => "transfer_manager",
            Self::User => "user",
            Self::Viewer => "viewer",
            Self::Auditor => "auditor",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "maintenance_manager" => Ok(Self::MaintenanceManager),
            "auction_manager" => Ok(Self::AuctionManager),
            "disposal_manager" => Ok(Self::DisposalManager),
            "transfer_manager" => Ok(Self::TransferManager),
            "user" => Ok(Self::User),
            "viewer" => Ok(Self::Viewer),
            "auditor" => Ok(Self::Auditor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Canonical ordered set for permission tokens and location names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessSet(BTreeSet<String>);

impl AccessSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a stored JSONB value into a set.
    ///
    /// - native array → set of its string elements
    /// - string holding an encoded array → decoded set
    /// - any other string → single-element set (degraded, not an error)
    /// - NULL or anything else → empty set
    pub fn parse(raw: Option<&JsonValue>) -> Self {
        match raw {
            None | Some(JsonValue::Null) => Self::default(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect(),
            Some(JsonValue::String(s)) => match serde_json::from_str::<Vec<String>>(s) {
                Ok(items) => items.into_iter().collect(),
                Err(_) => std::iter::once(s.clone()).collect(),
            },
            Some(_) => Self::default(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// True when the two sets have at least one common element.
    pub fn intersects(&self, other: &AccessSet) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<String> for AccessSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for AccessSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| s.to_string()).collect())
    }
}

/// An authenticated actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub permissions: AccessSet,
    pub locations: AccessSet,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// A permission token is honored directly or through the "all" grant.
    pub fn has_permission(&self, token: &str) -> bool {
        self.permissions.contains(token) || self.permissions.contains("all")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_round_trip() {
        for role in [
            Role::Admin,
            Role::Manager,
            Role::MaintenanceManager,
            Role::AuctionManager,
            Role::DisposalManager,
            Role::TransferManager,
            Role::User,
            Role::Viewer,
            Role::Auditor,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_access_set_from_array() {
        let value = json!(["Lagos", "Abuja"]);
        let set = AccessSet::parse(Some(&value));
        assert!(set.contains("Lagos"));
        assert!(set.contains("Abuja"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_access_set_from_encoded_string() {
        let value = json!("[\"WH-1\", \"WH-2\"]");
        let set = AccessSet::parse(Some(&value));
        assert!(set.contains("WH-1"));
        assert!(set.contains("WH-2"));
    }

    #[test]
    fn test_access_set_degrades_to_singleton() {
        // A plain (non-array) string is treated as a one-element set
        let value = json!("Lagos");
        let set = AccessSet::parse(Some(&value));
        assert_eq!(set.to_vec(), vec!["Lagos".to_string()]);

        // Broken encoding falls back the same way
        let value = json!("[not valid json");
        let set = AccessSet::parse(Some(&value));
        assert_eq!(set.len(), 1);
        assert!(set.contains("[not valid json"));
    }

    #[test]
    fn test_access_set_null_is_empty() {
        assert!(AccessSet::parse(None).is_empty());
        assert!(AccessSet::parse(Some(&JsonValue::Null)).is_empty());
        assert!(AccessSet::parse(Some(&json!(42))).is_empty());
    }

    #[test]
    fn test_intersects() {
        let a: AccessSet = ["Lagos", "Abuja"].into_iter().collect();
        let b: AccessSet = ["Abuja", "Kano"].into_iter().collect();
        let c: AccessSet = ["Kano"].into_iter().collect();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(!a.intersects(&AccessSet::new()));
    }

    #[test]
    fn test_all_permission_grant() {
        let principal = Principal {
            id: 1,
            username: "jo".into(),
            email: "jo@example.com".into(),
            full_name: "Jo Doe".into(),
            role: Role::Manager,
            permissions: ["all"].into_iter().collect(),
            locations: AccessSet::new(),
        };
        assert!(principal.has_permission("assets"));
        assert!(principal.has_permission("maintenance"));
    }
}
