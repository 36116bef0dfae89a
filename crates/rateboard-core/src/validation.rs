//! # Validation Module
//!
//! Input validation utilities for Rateboard.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser client                                               │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API service (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules, first failure wins                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (value BETWEEN 1 AND 5)                                     │
//! │  ├── UNIQUE (email), UNIQUE (user_id, store_id)                        │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation failures never reach storage.
//!
//! ## Usage
//! ```rust
//! use rateboard_core::validation::{validate_name, validate_password};
//!
//! assert!(validate_name("name", "A Perfectly Sized Full Name Field").is_ok());
//! assert!(validate_password("password", "Abc@12345").is_ok());
//! assert!(validate_password("password", "Abc12345").is_err());
//! ```

use serde_json::Value;

use crate::error::ValidationError;
use crate::types::RatingValue;
use crate::{
    ADDRESS_MAX, NAME_MAX, NAME_MIN, PASSWORD_MAX, PASSWORD_MIN, PASSWORD_SPECIALS, RATING_MAX,
    RATING_MIN, SEARCH_TERM_MAX, STORE_NAME_MAX,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a person's name.
///
/// ## Rules
/// - Trimmed length between 20 and 60 characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use rateboard_core::validation::validate_name;
///
/// assert!(validate_name("name", "Short Name").is_err());
/// assert!(validate_name("name", "A Perfectly Sized Full Name Field").is_ok());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();
    let len = name.chars().count();

    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(ValidationError::LengthOutOfRange {
            field: field.to_string(),
            min: NAME_MIN,
            max: NAME_MAX,
        });
    }

    Ok(name.to_string())
}

/// Validates a store name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 120 characters
pub fn validate_store_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > STORE_NAME_MAX {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: STORE_NAME_MAX,
        });
    }

    Ok(name.to_string())
}

/// Validates an email address and normalizes it for storage.
///
/// ## Rules
/// - Shape `local@domain.tld`
/// - No whitespace, exactly one `@`
/// - At least one `.` after the `@`, with text on both sides of it
///
/// ## Returns
/// The trimmed, lower-cased email. Matching is case-insensitive
/// everywhere, so this is the only spelling that reaches the database.
pub fn validate_email(field: &str, email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if !is_email_shape(email) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(email.to_lowercase())
}

/// Validates an optional email (store contact).
///
/// Absent or blank is fine; anything else must pass [`validate_email`].
pub fn validate_optional_email(field: &str, email: Option<&str>) -> ValidationResult<Option<String>> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(email) => validate_email(field, email).map(Some),
    }
}

fn is_email_shape(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() {
        return false;
    }

    // Some dot with a non-empty label on each side.
    domain
        .match_indices('.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

/// Validates an optional address.
///
/// ## Rules
/// - At most 400 characters (empty is valid)
///
/// ## Returns
/// `None` for absent or blank input, otherwise the address as given.
pub fn validate_address(field: &str, address: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(address) = address else {
        return Ok(None);
    };

    if address.chars().count() > ADDRESS_MAX {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: ADDRESS_MAX,
        });
    }

    if address.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(address.to_string()))
}

/// Validates password strength.
///
/// ## Rules
/// - 8 to 16 characters
/// - At least one uppercase ASCII letter
/// - At least one character from `!@#$%^&*(),.?":{}|<>_-+=`
///
/// ## Example
/// ```rust
/// use rateboard_core::validation::validate_password;
///
/// assert!(validate_password("password", "Abc@12345").is_ok());
/// assert!(validate_password("password", "Abc12345").is_err()); // no special
/// ```
pub fn validate_password(field: &str, password: &str) -> ValidationResult<()> {
    let len = password.chars().count();

    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(ValidationError::LengthOutOfRange {
            field: field.to_string(),
            min: PASSWORD_MIN,
            max: PASSWORD_MAX,
        });
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::MissingCharacter {
            field: field.to_string(),
            requirement: "uppercase letter".to_string(),
        });
    }

    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(ValidationError::MissingCharacter {
            field: field.to_string(),
            requirement: "special character".to_string(),
        });
    }

    Ok(())
}

/// Validates a free-text search or filter term.
///
/// ## Rules
/// - Blank means "no filter"
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed term, or `None` when blank.
pub fn validate_search_term(field: &str, term: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if term.chars().count() > SEARCH_TERM_MAX {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: SEARCH_TERM_MAX,
        });
    }

    Ok(Some(term.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a raw rating from a request body.
///
/// ## Rules
/// - Integral JSON numbers (`4`, `4.0`) or integer strings (`"4"`)
/// - Between 1 and 5 inclusive
///
/// ## User Workflow
/// ```text
/// POST /api/stores/{id}/rate  { "rating": ... }
///       │
///       ▼
/// parse_rating(raw) ← THIS FUNCTION
///       │
///       ├── 3.5, true, null, "abc" → "rating must be an integer"
///       ├── 0, 6                   → "rating must be between 1 and 5"
///       └── 1..=5                  → RatingValue → upsert
/// ```
pub fn parse_rating(raw: &Value) -> ValidationResult<RatingValue> {
    let not_integer = || ValidationError::NotAnInteger {
        field: "rating".to_string(),
    };

    let value = match raw {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.is_finite() => {
                if f < RATING_MIN as f64 || f > RATING_MAX as f64 {
                    return Err(out_of_range());
                }
                f as i64
            }
            _ => return Err(not_integer()),
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_integer())?,
        _ => return Err(not_integer()),
    };

    RatingValue::new(value)
}

fn out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "rating".to_string(),
        min: RATING_MIN,
        max: RATING_MAX,
    }
}

// =============================================================================
// Batch Validators
// =============================================================================

/// A validated account payload (signup or admin-create).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

/// Validates an account payload in field order: name, email, address,
/// password. The first failing rule is returned.
pub fn validate_account(
    name: &str,
    email: &str,
    address: Option<&str>,
    password: &str,
) -> ValidationResult<NewAccount> {
    let name = validate_name("name", name)?;
    let email = validate_email("email", email)?;
    let address = validate_address("address", address)?;
    validate_password("password", password)?;

    Ok(NewAccount {
        name,
        email,
        address,
    })
}

/// A validated store payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStore {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<String>,
}

/// Validates a store payload in field order: name, email, address.
///
/// The owner reference is only normalized here (blank → `None`); whether
/// it points at an OWNER is checked against storage by the caller.
pub fn validate_store(
    name: &str,
    email: Option<&str>,
    address: Option<&str>,
    owner_id: Option<&str>,
) -> ValidationResult<NewStore> {
    let name = validate_store_name(name)?;
    let email = validate_optional_email("email", email)?;
    let address = validate_address("address", address)?;
    let owner_id = owner_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Ok(NewStore {
        name,
        email,
        address,
        owner_id,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
