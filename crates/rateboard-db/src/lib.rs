//! # rateboard-db: Database Layer for Rateboard
//!
//! This crate provides database access for Rateboard.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rateboard Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/stores/:id/rate)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  rateboard-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ StoreRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ RatingRepo    │    │              │  │   │
//! │  │   │ Management    │    │ AggregateRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./data/rateboard.db                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (users, stores, ratings, aggregates)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rateboard_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/rateboard.db")).await?;
//!
//! let stores = db.stores().list(&query).await?;
//! let ids: Vec<&str> = stores.items.iter().map(|s| s.id.as_str()).collect();
//! let aggregates = db.aggregates().batch_store_aggregates(&ids).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::aggregate::AggregateRepository;
pub use repository::rating::{RatingRepository, UpsertOutcome};
pub use repository::store::StoreRepository;
pub use repository::user::{NewUserRecord, UserCredentials, UserRepository};
