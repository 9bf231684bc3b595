//! Roles and capability sets.
//!
//! Roles are not a strict hierarchy: a partner sees everything but cannot
//! approve, an employee can submit but sees only their own claims. Instead
//! of re-deriving permissions from role strings at every call site, the
//! authorization boundary computes a capability set once and handlers check
//! capabilities only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access plus development tooling.
    Superadmin,
    /// Full operational control.
    Admin,
    /// Read-everything partner; submits own expenses.
    Partner,
    /// Basic operation: submit and track own expenses.
    Employee,
}

impl Role {
    /// All roles.
    pub const ALL: [Self; 4] = [Self::Superadmin, Self::Admin, Self::Partner, Self::Employee];

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "superadmin" => Some(Self::Superadmin),
            "admin" => Some(Self::Admin),
            "partner" => Some(Self::Partner),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::Partner => "partner",
            Self::Employee => "employee",
        }
    }

    /// Roles whose holders receive pending-expense notifications and may
    /// transition expenses out of `pending`.
    #[must_use]
    pub fn approval_roles() -> &'static [Self] {
        &[Self::Superadmin, Self::Admin]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create expense claims.
    SubmitExpenses,
    /// See one's own expense claims.
    ViewOwnExpenses,
    /// See every user's expense claims.
    ViewAllExpenses,
    /// Transition expenses to approved.
    ApproveExpenses,
    /// Transition expenses to rejected.
    RejectExpenses,
    /// Record fund injections.
    ManageFunds,
    /// Create and administer users.
    ManageUsers,
    /// See reports and the dashboard.
    ViewReports,
    /// Export data out of the system.
    ExportData,
}

const SUPERADMIN_CAPS: &[Capability] = &[
    Capability::SubmitExpenses,
    Capability::ViewOwnExpenses,
    Capability::ViewAllExpenses,
    Capability::ApproveExpenses,
    Capability::RejectExpenses,
    Capability::ManageFunds,
    Capability::ManageUsers,
    Capability::ViewReports,
    Capability::ExportData,
];

const ADMIN_CAPS: &[Capability] = &[
    Capability::SubmitExpenses,
    Capability::ViewOwnExpenses,
    Capability::ViewAllExpenses,
    Capability::ApproveExpenses,
    Capability::RejectExpenses,
    Capability::ManageFunds,
    Capability::ManageUsers,
    Capability::ViewReports,
    Capability::ExportData,
];

const PARTNER_CAPS: &[Capability] = &[
    Capability::SubmitExpenses,
    Capability::ViewOwnExpenses,
    Capability::ViewAllExpenses,
    Capability::ViewReports,
    Capability::ExportData,
];

const EMPLOYEE_CAPS: &[Capability] = &[Capability::SubmitExpenses, Capability::ViewOwnExpenses];

/// The full permission set of a role, computed once at the authorization
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    role: Role,
    caps: &'static [Capability],
}

impl Capabilities {
    /// Computes the capability set for a role.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        let caps = match role {
            Role::Superadmin => SUPERADMIN_CAPS,
            Role::Admin => ADMIN_CAPS,
            Role::Partner => PARTNER_CAPS,
            Role::Employee => EMPLOYEE_CAPS,
        };
        Self { role, caps }
    }

    /// The role this set was derived from.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns true if the set contains the capability.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        self.caps.contains(&capability)
    }

    /// Iterates over the granted capabilities.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.caps.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_role_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("SUPERADMIN"), Some(Role::Superadmin));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_approval_roles() {
        let approvers = Role::approval_roles();
        assert!(approvers.contains(&Role::Superadmin));
        assert!(approvers.contains(&Role::Admin));
        assert!(!approvers.contains(&Role::Partner));
        assert!(!approvers.contains(&Role::Employee));
    }

    #[test]
    fn test_admin_capabilities() {
        let caps = Capabilities::for_role(Role::Admin);
        assert!(caps.allows(Capability::ApproveExpenses));
        assert!(caps.allows(Capability::RejectExpenses));
        assert!(caps.allows(Capability::ManageFunds));
        assert!(caps.allows(Capability::ManageUsers));
        assert!(caps.allows(Capability::ViewAllExpenses));
    }

    #[test]
    fn test_partner_is_read_mostly() {
        let caps = Capabilities::for_role(Role::Partner);
        assert!(caps.allows(Capability::ViewAllExpenses));
        assert!(caps.allows(Capability::ViewReports));
        assert!(caps.allows(Capability::SubmitExpenses));
        assert!(!caps.allows(Capability::ApproveExpenses));
        assert!(!caps.allows(Capability::RejectExpenses));
        assert!(!caps.allows(Capability::ManageFunds));
        assert!(!caps.allows(Capability::ManageUsers));
    }

    #[test]
    fn test_employee_is_operation_only() {
        let caps = Capabilities::for_role(Role::Employee);
        assert!(caps.allows(Capability::SubmitExpenses));
        assert!(caps.allows(Capability::ViewOwnExpenses));
        assert!(!caps.allows(Capability::ViewAllExpenses));
        assert!(!caps.allows(Capability::ViewReports));
        assert!(!caps.allows(Capability::ApproveExpenses));
    }

    #[test]
    fn test_approval_roles_match_capability() {
        // The fan-out role list and the capability set must agree.
        for role in Role::ALL {
            let can_approve = Capabilities::for_role(role).allows(Capability::ApproveExpenses);
            assert_eq!(Role::approval_roles().contains(&role), can_approve);
        }
    }

    #[rstest]
    #[case(Role::Superadmin, true)]
    #[case(Role::Admin, true)]
    #[case(Role::Partner, false)]
    #[case(Role::Employee, false)]
    fn test_approval_capability_by_role(#[case] role: Role, #[case] can_approve: bool) {
        let caps = Capabilities::for_role(role);
        assert_eq!(caps.allows(Capability::ApproveExpenses), can_approve);
        assert_eq!(caps.allows(Capability::RejectExpenses), can_approve);
        // Submitting is universal.
        assert!(caps.allows(Capability::SubmitExpenses));
    }
}
