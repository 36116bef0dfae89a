//! # Domain Types
//!
//! Core domain types used throughout Rateboard.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │      Store      │   │     Rating      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  owner_id (FK?) │   │  user_id (FK)   │       │
//! │  │  name           │   │  name           │◄──│  store_id (FK)  │       │
//! │  │  email (unique) │   │  email?         │   │  value (1..=5)  │       │
//! │  │  role           │   │  address?       │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  UNIQUE (user_id, store_id) on ratings: one rating per rater per store │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The password hash never appears in these types; it stays inside the
//! database layer and the credential check.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::{RATING_MAX, RATING_MIN};

// =============================================================================
// Role
// =============================================================================

/// The single role a user holds. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular rater.
    User,
    /// Platform administrator.
    Admin,
    /// Store owner.
    Owner,
}

impl Role {
    /// All roles, in the order they are listed in error messages.
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Owner];

    /// Wire/database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Owner => "OWNER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    /// Parses the exact upper-case spelling used on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            "OWNER" => Ok(Role::Owner),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, 20-60 characters.
    pub name: String,

    /// Login email, stored lower-cased.
    pub email: String,

    /// Postal address, up to 400 characters.
    pub address: Option<String>,

    /// Role, fixed at creation.
    pub role: Role,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// What a client learns about the logged-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct IdentitySummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for IdentitySummary {
    fn from(user: &User) -> Self {
        IdentitySummary {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// A store that can be rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Store {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, 1-120 characters.
    pub name: String,

    /// Contact email.
    pub email: Option<String>,

    /// Postal address, up to 400 characters.
    pub address: Option<String>,

    /// Owning user (role OWNER). Unowned stores are allowed.
    pub owner_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Rating
// =============================================================================

/// A validated rating value in `1..=5`.
///
/// Only obtainable through [`RatingValue::new`] or
/// [`crate::validation::parse_rating`], so a value that reaches storage is
/// always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct RatingValue(u8);

impl RatingValue {
    /// Creates a rating value, rejecting anything outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: "rating".to_string(),
                min: RATING_MIN,
                max: RATING_MAX,
            });
        }
        // In range 1..=5, fits u8.
        Ok(RatingValue(value as u8))
    }

    /// Returns the value as stored in the database.
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0 as i64
    }
}

/// One user's rating of one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Rating {
    pub id: String,
    pub user_id: String,
    pub store_id: String,

    /// 1-5 inclusive (enforced by a CHECK constraint as well).
    pub value: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A rating joined with its rater and store, as shown to owners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RatingDetail {
    pub id: String,
    pub store_id: String,
    pub store_name: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub rating: i64,
}

// =============================================================================
// Listings
// =============================================================================

/// A store as seen on the public listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreListItem {
    pub id: String,
    pub name: String,
    pub address: Option<String>,

    /// Mean of all ratings; `None` when the store has none.
    pub overall_rating: Option<f64>,

    /// The caller's own rating; `None` for anonymous callers, admins,
    /// or when the caller has not rated this store.
    pub my_rating: Option<i64>,
}

/// A store as seen on the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminStoreListItem {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: i64,
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    /// Maps the items, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Platform-wide row counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PlatformStats {
    pub users: i64,
    pub stores: i64,
    pub ratings: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
