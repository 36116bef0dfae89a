//! # Rating Repository
//!
//! Database operations for ratings.
//!
//! ## Upsert Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    upsert(user, store, value)                           │
//! │                                                                         │
//! │  store exists? ──no──► DbError::NotFound                               │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  UPDATE ... RETURNING ──row──► Ok(created: false)                      │
//! │       │ no row                                                          │
//! │       ▼                                                                 │
//! │  INSERT ──ok──► Ok(created: true)                                      │
//! │       │ UNIQUE (user_id, store_id) failed                              │
//! │       │ (a concurrent first rating won the race)                       │
//! │       ▼                                                                 │
//! │  UPDATE ... RETURNING ──► Ok(created: false)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UNIQUE constraint is the arbiter: two concurrent first ratings by
//! the same user for the same store still end as exactly one row, holding
//! whichever value was written last.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use rateboard_core::{Rating, RatingDetail, RatingValue};

const RATING_COLUMNS: &str = "id, user_id, store_id, value, created_at, updated_at";

/// Result of [`RatingRepository::upsert`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub rating: Rating,
    /// True when this call created the row, false when it replaced a value.
    pub created: bool,
}

/// Repository for rating database operations.
#[derive(Debug, Clone)]
pub struct RatingRepository {
    pool: SqlitePool,
}

impl RatingRepository {
    /// Creates a new RatingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RatingRepository { pool }
    }

    /// Creates or replaces the caller's rating of a store.
    ///
    /// ## Returns
    /// * `Ok(UpsertOutcome)` - The stored rating
    /// * `Err(DbError::NotFound)` - The store does not exist
    pub async fn upsert(
        &self,
        user_id: &str,
        store_id: &str,
        value: RatingValue,
    ) -> DbResult<UpsertOutcome> {
        let store_found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stores WHERE id = ?1")
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        if store_found.is_none() {
            return Err(DbError::not_found("Store", store_id));
        }

        if let Some(rating) = self.update_existing(user_id, store_id, value).await? {
            debug!(user_id, store_id, value = value.get(), "Rating replaced");
            return Ok(UpsertOutcome {
                rating,
                created: false,
            });
        }

        match self.insert_new(user_id, store_id, value).await {
            Ok(rating) => {
                debug!(user_id, store_id, value = value.get(), "Rating created");
                Ok(UpsertOutcome {
                    rating,
                    created: true,
                })
            }
            Err(e) if e.is_unique_violation() => {
                warn!(user_id, store_id, "Concurrent first rating, retrying as update");
                let rating = self
                    .update_existing(user_id, store_id, value)
                    .await?
                    .ok_or_else(|| {
                        DbError::Internal("rating vanished after unique violation".to_string())
                    })?;
                Ok(UpsertOutcome {
                    rating,
                    created: false,
                })
            }
            // The store was removed between the existence check and the insert.
            Err(DbError::ForeignKeyViolation { .. }) => Err(DbError::not_found("Store", store_id)),
            Err(e) => Err(e),
        }
    }

    async fn update_existing(
        &self,
        user_id: &str,
        store_id: &str,
        value: RatingValue,
    ) -> DbResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(&format!(
            r#"
            UPDATE ratings SET value = ?1, updated_at = ?2
            WHERE user_id = ?3 AND store_id = ?4
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(value.get())
        .bind(Utc::now())
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn insert_new(&self, user_id: &str, store_id: &str, value: RatingValue) -> DbResult<Rating> {
        let now = Utc::now();
        let rating = Rating {
            id: generate_id(),
            user_id: user_id.to_string(),
            store_id: store_id.to_string(),
            value: value.get(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO ratings (id, user_id, store_id, value, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&rating.id)
        .bind(&rating.user_id)
        .bind(&rating.store_id)
        .bind(rating.value)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(rating)
    }

    /// Gets one user's rating of one store.
    pub async fn find(&self, user_id: &str, store_id: &str) -> DbResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = ?1 AND store_id = ?2"
        ))
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    /// Returns `store_id → value` for the stores among `store_ids` that
    /// `user_id` has rated. Unrated stores are absent from the map.
    pub async fn my_ratings(
        &self,
        user_id: &str,
        store_ids: &[&str],
    ) -> DbResult<HashMap<String, i64>> {
        if store_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT store_id, value FROM ratings WHERE user_id = ");
        qb.push_bind(user_id.to_string());
        qb.push(" AND store_id IN (");
        let mut ids = qb.separated(", ");
        for id in store_ids {
            ids.push_bind(id.to_string());
        }
        ids.push_unseparated(")");

        let rows: Vec<(String, i64)> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().collect())
    }

    /// Lists every rating of the given stores, joined with rater and store
    /// names, ordered by store name then rater name.
    pub async fn list_for_stores(&self, store_ids: &[&str]) -> DbResult<Vec<RatingDetail>> {
        if store_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                r.id,
                r.store_id,
                s.name AS store_name,
                r.user_id,
                u.name AS user_name,
                u.email AS user_email,
                r.value AS rating
            FROM ratings r
            INNER JOIN stores s ON s.id = r.store_id
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.store_id IN (
            "#,
        );
        let mut ids = qb.separated(", ");
        for id in store_ids {
            ids.push_bind(id.to_string());
        }
        ids.push_unseparated(") ORDER BY s.name ASC, u.name ASC, r.id ASC");

        let details = qb
            .build_query_as::<RatingDetail>()
            .fetch_all(&self.pool)
            .await?;

        Ok(details)
    }

    /// Counts all ratings.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use rateboard_core::Role;

    fn value(v: i64) -> RatingValue {
        RatingValue::new(v).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_replaces() {
        let db = test_support::db().await;
        let user = test_support::user(&db, "rater@example.com", Role::User).await;
        let store = test_support::store(&db, "Fresh Mart", None).await;

        let first = db.ratings().upsert(&user.id, &store.id, value(3)).await.unwrap();
        assert!(first.created);
        assert_eq!(first.rating.value, 3);

        let second = db.ratings().upsert(&user.id, &store.id, value(5)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.rating.id, first.rating.id);
        assert_eq!(second.rating.value, 5);

        assert_eq!(db.ratings().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_unknown_store() {
        let db = test_support::db().await;
        let user = test_support::user(&db, "rater@example.com", Role::User).await;

        let err = db
            .ratings()
            .upsert(&user.id, "missing-store", value(4))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.ratings().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_race_falls_back_to_update() {
        let db = test_support::db().await;
        let user = test_support::user(&db, "rater@example.com", Role::User).await;
        let store = test_support::store(&db, "Tech Hub", None).await;
        let repo = db.ratings();

        // A second insert for the same pair is what the losing side of a
        // race sees; upsert must absorb it.
        repo.insert_new(&user.id, &store.id, value(2)).await.unwrap();
        let err = repo
            .insert_new(&user.id, &store.id, value(4))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let outcome = repo.upsert(&user.id, &store.id, value(4)).await.unwrap();
        assert!(!outcome.created);
        assert_eq!(repo.find(&user.id, &store.id).await.unwrap().unwrap().value, 4);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_ratings_leave_one_row() {
        let db = test_support::db().await;
        let user = test_support::user(&db, "rater@example.com", Role::User).await;
        let store = test_support::store(&db, "Daily Needs", None).await;

        let handles: Vec<_> = (1..=5)
            .map(|v| {
                let repo = db.ratings();
                let (user_id, store_id) = (user.id.clone(), store.id.clone());
                tokio::spawn(async move { repo.upsert(&user_id, &store_id, value(v)).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(db.ratings().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_my_ratings_only_returns_rated_stores() {
        let db = test_support::db().await;
        let user = test_support::user(&db, "rater@example.com", Role::User).await;
        let other = test_support::user(&db, "other@example.com", Role::User).await;
        let a = test_support::store(&db, "Store A", None).await;
        let b = test_support::store(&db, "Store B", None).await;

        db.ratings().upsert(&user.id, &a.id, value(4)).await.unwrap();
        db.ratings().upsert(&other.id, &b.id, value(1)).await.unwrap();

        let mine = db
            .ratings()
            .my_ratings(&user.id, &[a.id.as_str(), b.id.as_str()])
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine.get(&a.id), Some(&4));

        assert!(db.ratings().my_ratings(&user.id, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_for_stores_joins_rater() {
        let db = test_support::db().await;
        let owner = test_support::user(&db, "owner@example.com", Role::Owner).await;
        let user = test_support::user(&db, "rater@example.com", Role::User).await;
        let store = test_support::store(&db, "Fresh Mart", Some(&owner)).await;
        let elsewhere = test_support::store(&db, "Elsewhere", None).await;

        db.ratings().upsert(&user.id, &store.id, value(5)).await.unwrap();
        db.ratings().upsert(&user.id, &elsewhere.id, value(2)).await.unwrap();

        let details = db
            .ratings()
            .list_for_stores(&[store.id.as_str()])
            .await
            .unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].store_name, "Fresh Mart");
        assert_eq!(details[0].user_email, "rater@example.com");
        assert_eq!(details[0].rating, 5);
    }
}
