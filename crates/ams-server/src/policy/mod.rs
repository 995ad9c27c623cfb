//! Location/role-scoped access resolution
//!
//! Answers, for a (principal, resource class, access mode) tuple, one of
//! allow-all / allow-filtered-by-locations / deny. The engine is a pure
//! function of its inputs, with no storage access and no hidden state, so
//! each rule is independently testable.
//!
//! Rule order:
//! 1. `admin` is unconditionally allowed.
//! 2. Class carve-outs: auction/disposal managers are read-only for
//!    assets; the audit trail is restricted to admin/auditor.
//! 3. Writes on a class require a matching permission token or the class's
//!    dedicated manager role (maintenance-manager standing also covers
//!    asset/maintenance writes, scoped to own locations).
//! 4. Location-partitioned classes (assets, maintenance) resolve to the
//!    principal's location set; an empty set is a deny, since no location scope
//!    configured means no access. List endpoints map that deny to an empty
//!    result, single-record endpoints to an authorization failure.
//! 5. Remaining classes are not location-partitioned; record-level rules
//!    (ownership, shared location) stay in the handlers, built on
//!    [`share_location`].

use crate::auth::{AccessSet, Principal, Role};

/// Resource classes known to the policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Assets,
    Maintenance,
    Transfers,
    Auctions,
    Disposals,
    Users,
    Departments,
    Locations,
    Notifications,
    Reports,
    AuditTrail,
}

impl ResourceClass {
    /// Permission token honored for writes on this class, if any.
    pub fn permission_token(self) -> Option<&'static str> {
        match self {
            Self::Assets => Some("assets"),
            Self::Maintenance => Some("maintenance"),
            Self::Transfers => Some("transfers"),
            Self::Auctions => Some("auctions"),
            Self::Disposals => Some("disposal"),
            _ => None,
        }
    }

    /// Dedicated manager role for this class, if any.
    pub fn manager_role(self) -> Option<Role> {
        match self {
            Self::Maintenance => Some(Role::MaintenanceManager),
            Self::Transfers => Some(Role::TransferManager),
            Self::Auctions => Some(Role::AuctionManager),
            Self::Disposals => Some(Role::DisposalManager),
            _ => None,
        }
    }

    /// Whether visibility of this class is partitioned by asset location.
    pub fn is_location_partitioned(self) -> bool {
        matches!(self, Self::Assets | Self::Maintenance)
    }
}

/// Read vs. mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The role may only view this class.
    ReadOnlyRole,
    /// No permission token and no qualifying role.
    MissingPermission,
    /// No authorized locations configured for a partitioned class.
    NoLocationScope,
    /// The class is limited to specific roles.
    RestrictedClass,
}

impl DenyReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::ReadOnlyRole => "This role can only view the requested resource",
            Self::MissingPermission => "You don't have permission for this operation",
            Self::NoLocationScope => "No asset access configured",
            Self::RestrictedClass => "Access to this resource is restricted",
        }
    }
}

/// Policy outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Unrestricted access to the class.
    AllowAll,
    /// Access restricted to records whose location is in the set.
    AllowLocations(AccessSet),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Deny(_))
    }
}

/// Resolve class-level access for a principal.
pub fn evaluate(principal: &Principal, class: ResourceClass, mode: AccessMode) -> Decision {
    if principal.is_admin() {
        return Decision::AllowAll;
    }

    // Carve-outs come before the generic checks.
    if class == ResourceClass::AuditTrail {
        return if principal.role == Role::Auditor {
            Decision::AllowAll
        } else {
            Decision::Deny(DenyReason::RestrictedClass)
        };
    }

    if class == ResourceClass::Assets
        && mode == AccessMode::Write
        && matches!(principal.role, Role::AuctionManager | Role::DisposalManager)
    {
        return Decision::Deny(DenyReason::ReadOnlyRole);
    }

    if class == ResourceClass::Users && mode == AccessMode::Write {
        // Only admins manage user records; admins returned above.
        return Decision::Deny(DenyReason::RestrictedClass);
    }

    if class.is_location_partitioned() {
        // Maintenance-manager standing scopes to own locations without a
        // separate asset permission.
        let maintenance_standing =
            principal.role == Role::MaintenanceManager || principal.has_permission("maintenance");

        if mode == AccessMode::Write {
            let permitted = maintenance_standing
                || class
                    .permission_token()
                    .map(|token| principal.has_permission(token))
                    .unwrap_or(false);
            if !permitted {
                return Decision::Deny(DenyReason::MissingPermission);
            }
        }

        return if principal.locations.is_empty() {
            Decision::Deny(DenyReason::NoLocationScope)
        } else {
            Decision::AllowLocations(principal.locations.clone())
        };
    }

    // Non-partitioned classes: reads are open to authenticated principals
    // (record-level rules apply in the handlers); writes need the class's
    // permission token or its dedicated manager role.
    if mode == AccessMode::Write {
        let has_token = class
            .permission_token()
            .map(|token| principal.has_permission(token))
            .unwrap_or(false);
        let has_role = class
            .manager_role()
            .map(|role| principal.role == role)
            .unwrap_or(false);
        if !has_token && !has_role {
            return Decision::Deny(DenyReason::MissingPermission);
        }
    }

    Decision::AllowAll
}

/// Whether a decision admits a record at the given location.
pub fn allows_location(decision: &Decision, location: Option<&str>) -> bool {
    match decision {
        Decision::AllowAll => true,
        Decision::AllowLocations(set) => location.map(|l| set.contains(l)).unwrap_or(false),
        Decision::Deny(_) => false,
    }
}

/// Shared-location tie-break: access is granted iff the intersection of
/// the two location sets is non-empty.
pub fn share_location(a: &AccessSet, b: &AccessSet) -> bool {
    a.intersects(b)
}

/// Map a permission token to the manager role expected to carry it, used
/// by the user-directory lookup.
pub fn permission_role(permission: &str) -> Role {
    match permission {
        "maintenance" => Role::MaintenanceManager,
        "disposal" | "disposals" => Role::DisposalManager,
        "auction" | "auctions" => Role::AuctionManager,
        "transfer" | "transfers" => Role::TransferManager,
        _ => Role::Manager,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessSet;

    fn principal(role: Role, permissions: &[&str], locations: &[&str]) -> Principal {
        Principal {
            id: 1,
            username: "test".into(),
            email: "test@example.com".into(),
            full_name: "Test User".into(),
            role,
            permissions: permissions.iter().copied().collect(),
            locations: locations.iter().copied().collect(),
        }
    }

    #[test]
    fn test_admin_always_allowed() {
        // Regardless of permission/location sets, including empty ones
        let admin = principal(Role::Admin, &[], &[]);
        for class in [
            ResourceClass::Assets,
            ResourceClass::Maintenance,
            ResourceClass::Transfers,
            ResourceClass::Auctions,
            ResourceClass::Disposals,
            ResourceClass::Users,
            ResourceClass::AuditTrail,
        ] {
            assert_eq!(evaluate(&admin, class, AccessMode::Read), Decision::AllowAll);
            assert_eq!(evaluate(&admin, class, AccessMode::Write), Decision::AllowAll);
        }
    }

    #[test]
    fn test_empty_location_set_denies_partitioned_class() {
        let user = principal(Role::User, &["assets"], &[]);
        assert_eq!(
            evaluate(&user, ResourceClass::Assets, AccessMode::Read),
            Decision::Deny(DenyReason::NoLocationScope)
        );
        assert_eq!(
            evaluate(&user, ResourceClass::Assets, AccessMode::Write),
            Decision::Deny(DenyReason::NoLocationScope)
        );
    }

    #[test]
    fn test_location_scoped_read() {
        let user = principal(Role::User, &[], &["Lagos"]);
        match evaluate(&user, ResourceClass::Assets, AccessMode::Read) {
            Decision::AllowLocations(set) => {
                assert!(set.contains("Lagos"));
                assert_eq!(set.len(), 1);
            },
            other => panic!("expected location filter, got {:?}", other),
        }
    }

    #[test]
    fn test_asset_write_requires_permission() {
        let no_permission = principal(Role::User, &[], &["Lagos"]);
        assert_eq!(
            evaluate(&no_permission, ResourceClass::Assets, AccessMode::Write),
            Decision::Deny(DenyReason::MissingPermission)
        );

        let with_permission = principal(Role::User, &["assets"], &["Lagos"]);
        assert!(matches!(
            evaluate(&with_permission, ResourceClass::Assets, AccessMode::Write),
            Decision::AllowLocations(_)
        ));
    }

    #[test]
    fn test_maintenance_manager_scoped_to_own_locations() {
        let mm = principal(Role::MaintenanceManager, &[], &["Lagos"]);
        assert!(matches!(
            evaluate(&mm, ResourceClass::Assets, AccessMode::Write),
            Decision::AllowLocations(_)
        ));
        assert!(matches!(
            evaluate(&mm, ResourceClass::Maintenance, AccessMode::Write),
            Decision::AllowLocations(_)
        ));

        // The permission route works the same as the role
        let via_permission = principal(Role::User, &["maintenance"], &["Lagos"]);
        assert!(matches!(
            evaluate(&via_permission, ResourceClass::Assets, AccessMode::Write),
            Decision::AllowLocations(_)
        ));
    }

    #[test]
    fn test_auction_disposal_managers_read_only_for_assets() {
        for role in [Role::AuctionManager, Role::DisposalManager] {
            let manager = principal(role, &["assets"], &["Lagos"]);
            assert_eq!(
                evaluate(&manager, ResourceClass::Assets, AccessMode::Write),
                Decision::Deny(DenyReason::ReadOnlyRole)
            );
            // Reads still go through the location filter
            assert!(matches!(
                evaluate(&manager, ResourceClass::Assets, AccessMode::Read),
                Decision::AllowLocations(_)
            ));
        }
    }

    #[test]
    fn test_workflow_writes_require_role_or_token() {
        let plain = principal(Role::User, &[], &[]);
        assert_eq!(
            evaluate(&plain, ResourceClass::Auctions, AccessMode::Write),
            Decision::Deny(DenyReason::MissingPermission)
        );

        let auction_manager = principal(Role::AuctionManager, &[], &[]);
        assert_eq!(
            evaluate(&auction_manager, ResourceClass::Auctions, AccessMode::Write),
            Decision::AllowAll
        );

        let by_token = principal(Role::User, &["disposal"], &[]);
        assert_eq!(
            evaluate(&by_token, ResourceClass::Disposals, AccessMode::Write),
            Decision::AllowAll
        );

        let transfer_manager = principal(Role::TransferManager, &[], &[]);
        assert_eq!(
            evaluate(&transfer_manager, ResourceClass::Transfers, AccessMode::Write),
            Decision::AllowAll
        );
    }

    #[test]
    fn test_non_partitioned_reads_open() {
        let viewer = principal(Role::Viewer, &[], &[]);
        assert_eq!(
            evaluate(&viewer, ResourceClass::Transfers, AccessMode::Read),
            Decision::AllowAll
        );
        assert_eq!(
            evaluate(&viewer, ResourceClass::Users, AccessMode::Read),
            Decision::AllowAll
        );
    }

    #[test]
    fn test_audit_trail_restricted() {
        let auditor = principal(Role::Auditor, &[], &[]);
        assert_eq!(
            evaluate(&auditor, ResourceClass::AuditTrail, AccessMode::Read),
            Decision::AllowAll
        );

        let manager = principal(Role::Manager, &["all"], &["Lagos"]);
        assert_eq!(
            evaluate(&manager, ResourceClass::AuditTrail, AccessMode::Read),
            Decision::Deny(DenyReason::RestrictedClass)
        );
    }

    #[test]
    fn test_user_writes_admin_only() {
        let manager = principal(Role::Manager, &["all"], &[]);
        assert_eq!(
            evaluate(&manager, ResourceClass::Users, AccessMode::Write),
            Decision::Deny(DenyReason::RestrictedClass)
        );
    }

    #[test]
    fn test_allows_location() {
        let filtered = Decision::AllowLocations(["Lagos"].into_iter().collect());
        assert!(allows_location(&filtered, Some("Lagos")));
        assert!(!allows_location(&filtered, Some("Abuja")));
        assert!(!allows_location(&filtered, None));
        assert!(allows_location(&Decision::AllowAll, None));
        assert!(!allows_location(&Decision::Deny(DenyReason::NoLocationScope), Some("Lagos")));
    }

    #[test]
    fn test_share_location_iff_intersection() {
        let a: AccessSet = ["Lagos", "Abuja"].into_iter().collect();
        let b: AccessSet = ["Abuja"].into_iter().collect();
        let c: AccessSet = ["Kano"].into_iter().collect();
        assert!(share_location(&a, &b));
        assert!(!share_location(&a, &c));
        assert!(!share_location(&AccessSet::new(), &a));
        assert!(!share_location(&AccessSet::new(), &AccessSet::new()));
    }

    #[test]
    fn test_permission_role_mapping() {
        assert_eq!(permission_role("maintenance"), Role::MaintenanceManager);
        assert_eq!(permission_role("auction"), Role::AuctionManager);
        assert_eq!(permission_role("auctions"), Role::AuctionManager);
        assert_eq!(permission_role("disposal"), Role::DisposalManager);
        assert_eq!(permission_role("transfers"), Role::TransferManager);
        assert_eq!(permission_role("anything-else"), Role::Manager);
    }
}
