//! # Rateboard API
//!
//! HTTP/JSON server for the store rating platform.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Rateboard API                                  │
//! │                                                                         │
//! │  HTTP ──► routes (axum) ──► Caller extractor ──► AuthService::identify  │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  ┌────────────────┐  ┌────────────────┐  ┌──────────────┐  ┌──────────┐ │
//! │  │  AuthService   │  │  StoreService  │  │ AdminService │  │ OwnerSvc │ │
//! │  │                │  │                │  │              │  │          │ │
//! │  │ • signup       │  │ • list         │  │ • users      │  │ • dash-  │ │
//! │  │ • login        │  │ • rate         │  │ • stores     │  │   board  │ │
//! │  │ • change pw    │  │                │  │ • stats      │  │          │ │
//! │  └────────────────┘  └────────────────┘  └──────────────┘  └──────────┘ │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  rateboard-core (access, validation, queries)                           │
//! │  rateboard-db   (SQLite repositories)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `rateboard.toml` in the working directory, overridden by environment
//! variables with the `RATEBOARD_` prefix:
//! - `RATEBOARD_HTTP_PORT` - listen port (default: 8080)
//! - `RATEBOARD_DATABASE_PATH` - SQLite file, or `:memory:`
//! - `RATEBOARD_JWT_SECRET` - token signing secret
//! - `RATEBOARD_JWT_LIFETIME_SECS` - token lifetime (default: 7 days)
//! - `RATEBOARD_CORS_ORIGIN` - the one allowed browser origin

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::build_router;

use auth::{JwtManager, PasswordService};
use rateboard_db::Database;
use services::{AdminService, AuthService, OwnerService, StoreService};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
    pub jwt: JwtManager,
    pub passwords: PasswordService,
}

/// State handle passed to every handler.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Builds the state from an open database and a validated config.
    pub fn new(db: Database, config: ApiConfig) -> Result<Self, ApiError> {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);
        let passwords = PasswordService::from_config(&config)?;

        Ok(AppState {
            db,
            config,
            jwt,
            passwords,
        })
    }

    /// Replaces the password hasher. Tests use this for cheap parameters.
    pub fn with_passwords(mut self, passwords: PasswordService) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    pub fn stores(&self) -> StoreService<'_> {
        StoreService::new(self)
    }

    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(self)
    }

    pub fn owner(&self) -> OwnerService<'_> {
        OwnerService::new(self)
    }
}
