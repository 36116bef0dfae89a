//! Admin service.
//!
//! User and store management plus platform statistics. Every method
//! requires the ADMIN role.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::services::{AuthService, ListParams};
use crate::AppState;
use rateboard_core::access::{require, Identity, Operation};
use rateboard_core::query::{StoreQuery, UserQuery};
use rateboard_core::validation::{validate_account, validate_store};
use rateboard_core::{
    AdminStoreListItem, CoreError, Page, PlatformStats, Role, Store, StoreAggregate, StoreAverage,
    User,
};

// =============================================================================
// DTOs
// =============================================================================

/// Admin create-user payload. `role` defaults to USER.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<String>,
}

/// Minimal store reference for the admin user view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRef {
    pub id: String,
    pub name: String,
}

/// Rating summary across an owner's stores.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRatings {
    pub stores: Vec<StoreRef>,
    pub stats: Vec<StoreAverage>,
}

/// A user as seen by an admin; owners also carry their rating summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetail {
    pub user: User,
    pub owner_ratings: Option<OwnerRatings>,
}

// =============================================================================
// Service
// =============================================================================

/// Admin service.
pub struct AdminService<'a> {
    state: &'a AppState,
}

impl<'a> AdminService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        AdminService { state }
    }

    /// Creates a user with any role.
    pub async fn create_user(
        &self,
        caller: Option<&Identity>,
        req: &CreateUserRequest,
    ) -> Result<CreatedUser, ApiError> {
        let admin = require(caller, Operation::AdminCreateUser)?;

        let account = validate_account(
            &req.name,
            &req.email,
            req.address.as_deref(),
            &req.password,
        )?;
        let role = match req.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(role) => role.parse::<Role>()?,
            None => Role::User,
        };

        let user = AuthService::new(self.state)
            .register(&account, &req.password, role)
            .await?;

        info!(admin_id = %admin.user_id, user_id = %user.id, role = %user.role, "User created");
        Ok(CreatedUser {
            id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    /// Creates a store, optionally owned by an existing OWNER.
    pub async fn create_store(
        &self,
        caller: Option<&Identity>,
        req: &CreateStoreRequest,
    ) -> Result<Store, ApiError> {
        let admin = require(caller, Operation::AdminCreateStore)?;

        let new_store = validate_store(
            &req.name,
            req.email.as_deref(),
            req.address.as_deref(),
            req.owner_id.as_deref(),
        )?;

        if let Some(owner_id) = &new_store.owner_id {
            let owner = self
                .state
                .db
                .users()
                .get_by_id(owner_id)
                .await?
                .ok_or_else(|| CoreError::not_found("User", owner_id.clone()))?;
            match owner.role {
                Role::Owner => {}
                role @ (Role::User | Role::Admin) => {
                    return Err(CoreError::NotAnOwner {
                        user_id: owner.id,
                        role,
                    }
                    .into());
                }
            }
        }

        let store = self.state.db.stores().insert(&new_store).await?;

        info!(admin_id = %admin.user_id, store_id = %store.id, "Store created");
        Ok(store)
    }

    /// Lists users with name/email/address/role filters.
    pub async fn list_users(
        &self,
        caller: Option<&Identity>,
        params: &ListParams,
    ) -> Result<Page<User>, ApiError> {
        require(caller, Operation::AdminListUsers)?;

        let query = UserQuery::parse(&params.as_raw())?;
        Ok(self.state.db.users().list(&query).await?)
    }

    /// One user; for owners, the average and count of each owned store.
    pub async fn view_user(
        &self,
        caller: Option<&Identity>,
        user_id: &str,
    ) -> Result<AdminUserDetail, ApiError> {
        require(caller, Operation::AdminViewUser)?;

        let user = self
            .state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;

        let owner_ratings = match user.role {
            Role::Owner => {
                let rollup = self.state.db.aggregates().owner_rollup(&user.id).await?;
                Some(OwnerRatings {
                    stores: rollup
                        .stores
                        .into_iter()
                        .map(|s| StoreRef {
                            id: s.id,
                            name: s.name,
                        })
                        .collect(),
                    stats: rollup.averages,
                })
            }
            Role::User | Role::Admin => None,
        };

        Ok(AdminUserDetail {
            user,
            owner_ratings,
        })
    }

    /// Lists all stores with email, owner, average and rating count.
    pub async fn list_stores(
        &self,
        caller: Option<&Identity>,
        params: &ListParams,
    ) -> Result<Page<AdminStoreListItem>, ApiError> {
        require(caller, Operation::AdminListStores)?;

        let query = StoreQuery::parse(&params.as_raw())?;
        let page = self.state.db.stores().list(&query).await?;
        let ids: Vec<&str> = page.items.iter().map(|s| s.id.as_str()).collect();
        let aggregates = self.state.db.aggregates().batch_store_aggregates(&ids).await?;

        Ok(page.map(|store| {
            let aggregate = aggregates
                .get(&store.id)
                .copied()
                .unwrap_or(StoreAggregate::EMPTY);
            AdminStoreListItem {
                id: store.id,
                name: store.name,
                email: store.email,
                address: store.address,
                owner_id: store.owner_id,
                rating: aggregate.average,
                rating_count: aggregate.count,
            }
        }))
    }

    /// Row counts for users, stores and ratings.
    pub async fn stats(&self, caller: Option<&Identity>) -> Result<PlatformStats, ApiError> {
        require(caller, Operation::AdminStats)?;

        let db = &self.state.db;
        let (user_repo, store_repo, rating_repo) = (db.users(), db.stores(), db.ratings());
        let (users, stores, ratings) = tokio::try_join!(
            user_repo.count(),
            store_repo.count(),
            rating_repo.count()
        )?;

        Ok(PlatformStats {
            users,
            stores,
            ratings,
        })
    }
}
