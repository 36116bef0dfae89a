//! Authentication module.
//!
//! Handles JWT token generation and validation, and Argon2id password
//! hashing.
//!
//! ## Token Flow
//! ```text
//! login ──► PasswordService::verify ──► JwtManager::issue ──► token
//!
//! request ──► "Authorization: Bearer <token>"
//!                 │
//!                 ▼
//!          JwtManager::validate ──► Claims { sub, role, iat, exp, jti }
//!                 │
//!                 ▼
//!          reload user by `sub` (role comes from storage, not the token)
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ApiError;
use rateboard_core::Role;

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Role at issue time. Informational; access checks use the stored role.
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager (HS256).
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Generate a token for a user.
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate and decode a token. Expired, tampered and foreign tokens
    /// are all Unauthorized.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                ApiError::unauthorized("Invalid or expired token")
            })
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Argon2id password hashing.
///
/// Hashing and verification are CPU-bound and run on the blocking pool.
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
    /// Verified against when the account does not exist, so an unknown
    /// email costs as much as a wrong password.
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordService")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl PasswordService {
    /// Creates a password service with explicit Argon2 costs.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, ApiError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| ApiError::internal(format!("Invalid argon2 parameters: {e}")))?;
        let dummy_hash = hash_with(&params, "rateboard-dummy-password")?;
        Ok(PasswordService { params, dummy_hash })
    }

    /// Creates a password service from the configured costs.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )
    }

    /// Hash a password for storage (PHC string format).
    pub async fn hash(&self, password: &str) -> Result<String, ApiError> {
        let params = self.params.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_with(&params, &password))
            .await
            .map_err(|e| ApiError::internal(format!("Hashing task failed: {e}")))?
    }

    /// Verify a password against a stored hash. Malformed hashes never match.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || verify_with(&password, &hash))
            .await
            .map_err(|e| ApiError::internal(format!("Verification task failed: {e}")))
    }

    /// Burn one verification for an account that does not exist.
    pub async fn verify_dummy(&self, password: &str) -> Result<(), ApiError> {
        self.verify(password, &self.dummy_hash).await.map(|_| ())
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))
}

fn verify_with(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    // Parameters are read from the PHC string, so hashes made with older
    // costs still verify.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_passwords() -> PasswordService {
        PasswordService::new(8, 1, 1).unwrap()
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager.issue("user-001", Role::Owner).unwrap();
        let claims = manager.validate(&token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::new("secret-a", 3600)
            .issue("user-001", Role::User)
            .unwrap();

        assert!(JwtManager::new("secret-b", 3600).validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway.
        let manager = JwtManager::new("test-secret", -120);
        let token = manager.issue("user-001", Role::User).unwrap();
        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let passwords = cheap_passwords();
        let hash = passwords.hash("Abc@12345").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Abc@12345"));
        assert!(passwords.verify("Abc@12345", &hash).await.unwrap());
        assert!(!passwords.verify("Abc@12346", &hash).await.unwrap());
        assert!(!passwords.verify("Abc@12345", "not-a-phc-string").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_dummy_completes() {
        assert!(cheap_passwords().verify_dummy("whatever").await.is_ok());
    }
}
