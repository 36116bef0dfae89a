//! # rateboard-core: Pure Business Logic for Rateboard
//!
//! This crate is the **heart** of Rateboard. It contains the rating rules,
//! field validators and access policy as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rateboard Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser client                               │   │
//! │  │    Stores list ──► Rate ──► Owner dashboard ──► Admin pages     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP (Bearer JWT)            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum + services)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ rateboard-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │validation│ │  access  │ │    aggregate     │  │   │
//! │  │   │ User     │ │ name     │ │ Identity │ │ StoreAggregate   │  │   │
//! │  │   │ Store    │ │ email    │ │ Operation│ │ OwnerRollup      │  │   │
//! │  │   │ Rating   │ │ password │ │ authorize│ │                  │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rateboard-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Store, Rating, listings)
//! - [`validation`] - Field validators, first failure wins
//! - [`access`] - Role-based access policy
//! - [`aggregate`] - Average/count math and owner rollups
//! - [`query`] - Listing filters, sorting, paging
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rateboard_core::access::{require, Identity, Operation};
//! use rateboard_core::aggregate::StoreAggregate;
//! use rateboard_core::Role;
//!
//! let owner = Identity::new("owner-1", Role::Owner);
//! assert!(require(Some(&owner), Operation::OwnerDashboard).is_ok());
//! assert!(require(None, Operation::OwnerDashboard).is_err());
//!
//! let agg = StoreAggregate::from_values([4, 5]);
//! assert_eq!(agg.average, Some(4.5));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod aggregate;
pub mod error;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Identity, Operation};
pub use aggregate::{OwnerRollup, StoreAggregate, StoreAverage};
pub use error::{AccessError, CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Person name length bounds (trimmed, in characters).
pub const NAME_MIN: usize = 20;
pub const NAME_MAX: usize = 60;

/// Store name upper bound.
pub const STORE_NAME_MAX: usize = 120;

/// Address upper bound. Empty is allowed.
pub const ADDRESS_MAX: usize = 400;

/// Password length bounds.
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 16;

/// A password needs at least one of these.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>_-+=";

/// Rating bounds, inclusive.
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// Search/filter term upper bound.
pub const SEARCH_TERM_MAX: usize = 100;

/// Listing page size when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on page size.
pub const MAX_PAGE_SIZE: u32 = 100;
