//! # Repository Module
//!
//! Database repository implementations for Rateboard.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Service (apps/api)                                                    │
//! │       │                                                                 │
//! │       │  db.ratings().upsert(user_id, store_id, value)                 │
//! │       ▼                                                                 │
//! │  UserRepository       insert, lookups, credentials, list, count        │
//! │  StoreRepository      insert, lookups, list, list_by_owner, count      │
//! │  RatingRepository     upsert, my_ratings, list_for_stores, count       │
//! │  AggregateRepository  store_aggregate, batch_store_aggregates,         │
//! │                       owner_rollup                                     │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, bound parameters only)                  │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listing queries are assembled with [`sqlx::QueryBuilder`]. Filter
//! values are always bound; sort columns come from closed enums in
//! `rateboard_core::query`.

use uuid::Uuid;

pub mod aggregate;
pub mod rating;
pub mod store;
pub mod user;

/// Escape character used by every `LIKE` filter.
pub(crate) const LIKE_ESCAPE: char = '\\';

/// Builds a `%term%` pattern with `%`, `_` and the escape character escaped,
/// for use with `LIKE ? ESCAPE '\'`.
///
/// SQLite `LIKE` is case-insensitive for ASCII, which is what the listing
/// filters want.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use rateboard_core::validation::NewStore;
    use rateboard_core::{Role, Store, User};

    use crate::repository::user::NewUserRecord;
    use crate::{Database, DbConfig};

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Inserts a user whose name is padded to satisfy the length CHECK.
    pub async fn user(db: &Database, email: &str, role: Role) -> User {
        db.users()
            .insert(&NewUserRecord {
                name: format!("{email:<20}").replace(' ', "x"),
                email: email.to_string(),
                address: None,
                password_hash: "not-a-real-hash".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    pub async fn store(db: &Database, name: &str, owner: Option<&User>) -> Store {
        db.stores()
            .insert(&NewStore {
                name: name.to_string(),
                email: None,
                address: Some(format!("{name} street")),
                owner_id: owner.map(|o| o.id.clone()),
            })
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("mart"), "%mart%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_generate_id_is_uuid() {
        let id = generate_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, generate_id());
    }
}
