//! # Access Policy
//!
//! Decides, for a caller and an operation, whether the operation may run.
//!
//! ## Capability Matrix
//! ```text
//! ┌──────────────────────────┬───────────┬──────┬───────┬───────┐
//! │ Operation                │ anonymous │ USER │ OWNER │ ADMIN │
//! ├──────────────────────────┼───────────┼──────┼───────┼───────┤
//! │ list stores              │     ✓     │  ✓   │   ✓   │   ✓   │
//! │ view own ratings         │     -     │  ✓   │   ✓   │   ✗   │
//! │ rate store               │     401   │  ✓   │   ✓   │   ✓   │
//! │ change password          │     401   │  ✓   │   ✓   │   ✓   │
//! │ owner dashboard          │     401   │ 403  │   ✓   │  403  │
//! │ admin: users/stores/stats│     401   │ 403  │  403  │   ✓   │
//! └──────────────────────────┴───────────┴──────┴───────┴───────┘
//! ```
//!
//! Every decision is an exhaustive `match` on [`Role`]; adding a role is a
//! compile error until each operation states what it may do.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::types::Role;

/// An authenticated caller, resolved from a bearer token outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Identity {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether listings should carry this caller's own rating per store.
    ///
    /// Admins act for the platform, not as raters, so they never get it.
    pub fn can_view_own_ratings(&self) -> bool {
        Operation::ViewOwnRatings.permits(self.role)
    }
}

/// Every operation the platform exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListStores,
    ViewOwnRatings,
    RateStore,
    ChangePassword,
    OwnerDashboard,
    AdminCreateUser,
    AdminCreateStore,
    AdminListUsers,
    AdminViewUser,
    AdminListStores,
    AdminStats,
}

impl Operation {
    /// Whether anonymous callers may run this operation.
    pub const fn is_public(&self) -> bool {
        matches!(self, Operation::ListStores)
    }

    /// Whether a caller holding `role` may run this operation.
    pub const fn permits(&self, role: Role) -> bool {
        match self {
            Operation::ListStores | Operation::RateStore | Operation::ChangePassword => {
                match role {
                    Role::User | Role::Owner | Role::Admin => true,
                }
            }
            Operation::ViewOwnRatings => match role {
                Role::User | Role::Owner => true,
                Role::Admin => false,
            },
            Operation::OwnerDashboard => match role {
                Role::Owner => true,
                Role::User | Role::Admin => false,
            },
            Operation::AdminCreateUser
            | Operation::AdminCreateStore
            | Operation::AdminListUsers
            | Operation::AdminViewUser
            | Operation::AdminListStores
            | Operation::AdminStats => match role {
                Role::Admin => true,
                Role::User | Role::Owner => false,
            },
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Operation::ListStores => "list stores",
            Operation::ViewOwnRatings => "view own ratings",
            Operation::RateStore => "rate a store",
            Operation::ChangePassword => "change password",
            Operation::OwnerDashboard => "view the owner dashboard",
            Operation::AdminCreateUser => "create users",
            Operation::AdminCreateStore => "create stores",
            Operation::AdminListUsers => "list users",
            Operation::AdminViewUser => "view user details",
            Operation::AdminListStores => "list all stores",
            Operation::AdminStats => "view platform statistics",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Authorizes an operation that may run without an identity.
///
/// Returns the caller unchanged so it can be used for scoping (e.g. "my
/// rating"). Fails only when an identity is present but its role is
/// not permitted.
pub fn authorize<'a>(
    caller: Option<&'a Identity>,
    operation: Operation,
) -> Result<Option<&'a Identity>, AccessError> {
    match caller {
        None if operation.is_public() => Ok(None),
        None => Err(AccessError::Unauthorized { operation }),
        Some(identity) if operation.permits(identity.role) => Ok(Some(identity)),
        Some(identity) => Err(AccessError::Forbidden {
            operation,
            role: identity.role,
        }),
    }
}

/// Authorizes an operation that always needs an identity.
pub fn require<'a>(
    caller: Option<&'a Identity>,
    operation: Operation,
) -> Result<&'a Identity, AccessError> {
    match caller {
        None => Err(AccessError::Unauthorized { operation }),
        Some(identity) if operation.permits(identity.role) => Ok(identity),
        Some(identity) => Err(AccessError::Forbidden {
            operation,
            role: identity.role,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> Identity {
        Identity::new("u-1", role)
    }

    #[test]
    fn test_anonymous_may_only_list() {
        assert_eq!(authorize(None, Operation::ListStores), Ok(None));

        for op in [
            Operation::RateStore,
            Operation::ChangePassword,
            Operation::OwnerDashboard,
            Operation::AdminStats,
        ] {
            assert_eq!(
                require(None, op),
                Err(AccessError::Unauthorized { operation: op })
            );
        }
    }

    #[test]
    fn test_owner_dashboard_unauthorized_vs_forbidden() {
        assert!(matches!(
            require(None, Operation::OwnerDashboard),
            Err(AccessError::Unauthorized { .. })
        ));
        assert_eq!(
            require(Some(&caller(Role::User)), Operation::OwnerDashboard),
            Err(AccessError::Forbidden {
                operation: Operation::OwnerDashboard,
                role: Role::User,
            })
        );
        assert!(require(Some(&caller(Role::Admin)), Operation::OwnerDashboard).is_err());
        assert!(require(Some(&caller(Role::Owner)), Operation::OwnerDashboard).is_ok());
    }

    #[test]
    fn test_admin_operations_are_admin_only() {
        let admin = caller(Role::Admin);
        let owner = caller(Role::Owner);
        let user = caller(Role::User);

        for op in [
            Operation::AdminCreateUser,
            Operation::AdminCreateStore,
            Operation::AdminListUsers,
            Operation::AdminViewUser,
            Operation::AdminListStores,
            Operation::AdminStats,
        ] {
            assert!(require(Some(&admin), op).is_ok());
            assert!(matches!(
                require(Some(&owner), op),
                Err(AccessError::Forbidden { .. })
            ));
            assert!(matches!(
                require(Some(&user), op),
                Err(AccessError::Forbidden { .. })
            ));
        }
    }

    #[test]
    fn test_every_role_may_rate_and_change_password() {
        for role in Role::ALL {
            assert!(require(Some(&caller(role)), Operation::RateStore).is_ok());
            assert!(require(Some(&caller(role)), Operation::ChangePassword).is_ok());
            assert!(authorize(Some(&caller(role)), Operation::ListStores).is_ok());
        }
    }

    #[test]
    fn test_own_rating_view_excludes_admin() {
        assert!(caller(Role::User).can_view_own_ratings());
        assert!(caller(Role::Owner).can_view_own_ratings());
        assert!(!caller(Role::Admin).can_view_own_ratings());
    }
}
