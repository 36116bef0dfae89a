//! # Error Types
//!
//! Domain-specific error types for rateboard-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rateboard-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── AccessError      - Unauthorized / Forbidden                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rateboard-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Client                 │
//! │        AccessError ────────────────→ ApiError                          │
//! │        DbError ────────────────────→ ApiError                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, role)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a stable machine-readable kind

use thiserror::Error;

use crate::access::Operation;
use crate::types::Role;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Email is already registered.
    ///
    /// ## When This Occurs
    /// - Signup with an email that exists (case-insensitive)
    /// - Admin creates a user with an existing email
    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    /// Login failed.
    ///
    /// Deliberately does not say whether the account exists or the
    /// password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A store owner reference points at a user without the OWNER role.
    #[error("User {user_id} has role {role} and cannot own stores")]
    NotAnOwner { user_id: String, role: Role },

    /// Access policy rejected the operation.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Access Error
// =============================================================================

/// Access policy failures.
///
/// ## Unauthorized vs Forbidden
/// ```text
/// caller = None            → Unauthorized  (401: who are you?)
/// caller = Some(wrong role) → Forbidden    (403: not allowed)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No identity presented where one is required.
    #[error("Authentication required for {operation}")]
    Unauthorized { operation: Operation },

    /// Identity present but its role lacks the capability.
    #[error("Role {role} is not permitted to {operation}")]
    Forbidden { operation: Operation, role: Role },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Every message names the field and the violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field length outside an inclusive range.
    #[error("{field} must be {min}-{max} characters")]
    LengthOutOfRange { field: String, min: usize, max: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be a whole number.
    #[error("{field} must be an integer")]
    NotAnInteger { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value lacks a required character class.
    #[error("{field} must include at least one {requirement}")]
    MissingCharacter { field: String, requirement: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Returns the offending field name.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::LengthOutOfRange { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotAnInteger { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::MissingCharacter { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
