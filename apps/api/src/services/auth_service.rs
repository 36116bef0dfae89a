//! Authentication service.
//!
//! Signup, login, change-password, and resolving a bearer token to an
//! [`Identity`].

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::services::Ack;
use crate::AppState;
use rateboard_core::access::{require, Identity, Operation};
use rateboard_core::validation::{validate_account, validate_password, NewAccount};
use rateboard_core::{CoreError, IdentitySummary, Role, User};
use rateboard_db::NewUserRecord;

// =============================================================================
// DTOs
// =============================================================================

/// Signup payload. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: IdentitySummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

// =============================================================================
// Service
// =============================================================================

/// Authentication service.
pub struct AuthService<'a> {
    state: &'a AppState,
}

impl<'a> AuthService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        AuthService { state }
    }

    /// Self-service signup. Always creates a USER.
    pub async fn signup(&self, req: &SignupRequest) -> Result<SignupResponse, ApiError> {
        let account = validate_account(
            &req.name,
            &req.email,
            req.address.as_deref(),
            &req.password,
        )?;

        let user = self.register(&account, &req.password, Role::User).await?;

        info!(user_id = %user.id, "User signed up");
        Ok(SignupResponse {
            id: user.id,
            email: user.email,
        })
    }

    /// Checks credentials and issues a token.
    ///
    /// Unknown email and wrong password give the same error and take
    /// comparable time.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let email = req.email.trim().to_lowercase();

        let credentials = self
            .state
            .db
            .users()
            .get_credentials_by_email(&email)
            .await?;

        let Some(credentials) = credentials else {
            self.state.passwords.verify_dummy(&req.password).await?;
            warn!("Login failed");
            return Err(CoreError::InvalidCredentials.into());
        };

        if !self
            .state
            .passwords
            .verify(&req.password, &credentials.password_hash)
            .await?
        {
            warn!(user_id = %credentials.user.id, "Login failed");
            return Err(CoreError::InvalidCredentials.into());
        }

        let user = credentials.user;
        let token = self.state.jwt.issue(&user.id, user.role)?;

        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(LoginResponse {
            token,
            user: IdentitySummary::from(&user),
        })
    }

    /// Replaces the caller's password.
    ///
    /// The current password is not asked for.
    pub async fn change_password(
        &self,
        caller: Option<&Identity>,
        req: &ChangePasswordRequest,
    ) -> Result<Ack, ApiError> {
        let identity = require(caller, Operation::ChangePassword)?;
        validate_password("newPassword", &req.new_password)?;

        let hash = self.state.passwords.hash(&req.new_password).await?;
        self.state
            .db
            .users()
            .update_password_hash(&identity.user_id, &hash)
            .await?;

        info!(user_id = %identity.user_id, "Password changed");
        Ok(Ack::OK)
    }

    /// Resolves a bearer token to the identity of a user that still exists.
    pub async fn identify(&self, token: &str) -> Result<Identity, ApiError> {
        let claims = self.state.jwt.validate(token)?;

        let user = self
            .state
            .db
            .users()
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

        Ok(Identity::new(user.id, user.role))
    }

    /// Hashes the password and stores a validated account.
    ///
    /// Shared by signup and admin-create. A taken email (in any letter
    /// case, including one that loses an insert race) is a Conflict.
    pub(crate) async fn register(
        &self,
        account: &NewAccount,
        password: &str,
        role: Role,
    ) -> Result<User, ApiError> {
        let users = self.state.db.users();

        if users.get_by_email(&account.email).await?.is_some() {
            return Err(email_taken(&account.email));
        }

        let password_hash = self.state.passwords.hash(password).await?;

        users
            .insert(&NewUserRecord {
                name: account.name.clone(),
                email: account.email.clone(),
                address: account.address.clone(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    email_taken(&account.email)
                } else {
                    e.into()
                }
            })
    }
}

fn email_taken(email: &str) -> ApiError {
    CoreError::EmailTaken {
        email: email.to_string(),
    }
    .into()
}
