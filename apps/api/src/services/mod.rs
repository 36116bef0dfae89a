//! # Services
//!
//! One service per area of the operation table. Every service method
//! starts with the access check for its operation, then validates input,
//! then touches storage.
//!
//! ```text
//! ┌────────────────┬──────────────────────────────────────────────────────┐
//! │ AuthService    │ signup, login, change_password, identify             │
//! │ StoreService   │ list (public, optional identity), rate               │
//! │ AdminService   │ create_user, create_store, list_users, view_user,    │
//! │                │ list_stores, stats                                   │
//! │ OwnerService   │ dashboard                                            │
//! └────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! Services borrow [`AppState`](crate::AppState) and are created per call:
//! `state.stores().list(caller, &params)`.

use serde::Deserialize;

use rateboard_core::query::RawListParams;

pub mod admin_service;
pub mod auth_service;
pub mod owner_service;
pub mod store_service;

pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use owner_service::OwnerService;
pub use store_service::StoreService;

/// Listing query-string parameters shared by store and user listings.
///
/// Endpoints ignore the filters that do not apply to them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    pub q: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListParams {
    /// Borrowed view for the core query parsers.
    pub fn as_raw(&self) -> RawListParams<'_> {
        RawListParams {
            q: self.q.as_deref(),
            name: self.name.as_deref(),
            email: self.email.as_deref(),
            address: self.address.as_deref(),
            role: self.role.as_deref(),
            sort_by: self.sort_by.as_deref(),
            order: self.order.as_deref(),
            page: self.page,
            limit: self.limit,
        }
    }
}

/// `{ "ok": true }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Ack = Ack { ok: true };
}
