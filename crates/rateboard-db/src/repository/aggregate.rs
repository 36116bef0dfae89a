//! # Aggregate Repository
//!
//! Average rating and rating count per store, computed from the ratings
//! table on every read. Nothing is cached, so a rating written by one
//! request is visible to the next.
//!
//! ## Batch Lookup
//! ```text
//! store_ids: [A, B, C]
//!      │
//!      ▼
//! SELECT store_id, SUM(value), COUNT(*) FROM ratings
//! WHERE store_id IN (A, B, C) GROUP BY store_id
//!      │
//!      ▼
//! { A: (4.5, 2), B: (3.0, 1) }  +  C missing → StoreAggregate::EMPTY
//! ```
//!
//! One grouped query per page, instead of one query per store.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::rating::RatingRepository;
use crate::repository::store::StoreRepository;
use rateboard_core::{OwnerRollup, StoreAggregate};

/// Repository for per-store rating aggregates.
#[derive(Debug, Clone)]
pub struct AggregateRepository {
    pool: SqlitePool,
}

impl AggregateRepository {
    /// Creates a new AggregateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AggregateRepository { pool }
    }

    /// Average and count for one store. Unknown or unrated stores give
    /// [`StoreAggregate::EMPTY`].
    pub async fn store_aggregate(&self, store_id: &str) -> DbResult<StoreAggregate> {
        let (sum, count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(value), 0), COUNT(*) FROM ratings WHERE store_id = ?1",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreAggregate::from_sum_count(sum, count))
    }

    /// Aggregates for many stores in one grouped query.
    ///
    /// Every requested id is a key in the result; ids without ratings map
    /// to [`StoreAggregate::EMPTY`].
    pub async fn batch_store_aggregates(
        &self,
        store_ids: &[&str],
    ) -> DbResult<HashMap<String, StoreAggregate>> {
        let mut result: HashMap<String, StoreAggregate> = store_ids
            .iter()
            .map(|id| (id.to_string(), StoreAggregate::EMPTY))
            .collect();

        if store_ids.is_empty() {
            return Ok(result);
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT store_id, SUM(value), COUNT(*) FROM ratings WHERE store_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in store_ids {
            ids.push_bind(id.to_string());
        }
        ids.push_unseparated(") GROUP BY store_id");

        let rows: Vec<(String, i64, i64)> = qb.build_query_as().fetch_all(&self.pool).await?;

        debug!(requested = store_ids.len(), rated = rows.len(), "Batch aggregates");

        for (store_id, sum, count) in rows {
            result.insert(store_id, StoreAggregate::from_sum_count(sum, count));
        }

        Ok(result)
    }

    /// Everything an owner's dashboard shows: owned stores, one average per
    /// store, and every rating of those stores with the rater's details.
    ///
    /// An owner without stores gets an empty rollup, not an error.
    pub async fn owner_rollup(&self, owner_id: &str) -> DbResult<OwnerRollup> {
        let stores = StoreRepository::new(self.pool.clone())
            .list_by_owner(owner_id)
            .await?;
        if stores.is_empty() {
            return Ok(OwnerRollup::default());
        }

        let ids: Vec<&str> = stores.iter().map(|s| s.id.as_str()).collect();
        let aggregates = self.batch_store_aggregates(&ids).await?;
        let ratings = RatingRepository::new(self.pool.clone())
            .list_for_stores(&ids)
            .await?;

        debug!(owner_id, stores = stores.len(), ratings = ratings.len(), "Owner rollup");
        Ok(OwnerRollup::assemble(stores, &aggregates, ratings))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use rateboard_core::{RatingValue, Role};

    #[tokio::test]
    async fn test_store_aggregate_mean_and_count() {
        let db = test_support::db().await;
        let store = test_support::store(&db, "Fresh Mart", None).await;

        assert_eq!(
            db.aggregates().store_aggregate(&store.id).await.unwrap(),
            StoreAggregate::EMPTY
        );

        for (email, v) in [("a@example.com", 4), ("b@example.com", 5)] {
            let user = test_support::user(&db, email, Role::User).await;
            db.ratings()
                .upsert(&user.id, &store.id, RatingValue::new(v).unwrap())
                .await
                .unwrap();
        }

        let agg = db.aggregates().store_aggregate(&store.id).await.unwrap();
        assert_eq!(agg.average, Some(4.5));
        assert_eq!(agg.count, 2);
    }

    #[tokio::test]
    async fn test_rerating_changes_average_not_count() {
        let db = test_support::db().await;
        let store = test_support::store(&db, "Tech Hub", None).await;
        let user = test_support::user(&db, "a@example.com", Role::User).await;

        for v in [1, 5] {
            db.ratings()
                .upsert(&user.id, &store.id, RatingValue::new(v).unwrap())
                .await
                .unwrap();
        }

        let agg = db.aggregates().store_aggregate(&store.id).await.unwrap();
        assert_eq!(agg.average, Some(5.0));
        assert_eq!(agg.count, 1);
    }

    #[tokio::test]
    async fn test_batch_fills_missing_ids() {
        let db = test_support::db().await;
        let rated = test_support::store(&db, "Rated", None).await;
        let unrated = test_support::store(&db, "Unrated", None).await;
        let user = test_support::user(&db, "a@example.com", Role::User).await;
        db.ratings()
            .upsert(&user.id, &rated.id, RatingValue::new(3).unwrap())
            .await
            .unwrap();

        let map = db
            .aggregates()
            .batch_store_aggregates(&[rated.id.as_str(), unrated.id.as_str(), "ghost"])
            .await
            .unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map[&rated.id].average, Some(3.0));
        assert_eq!(map[&unrated.id], StoreAggregate::EMPTY);
        assert_eq!(map["ghost"], StoreAggregate::EMPTY);

        assert!(db.aggregates().batch_store_aggregates(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_rollup() {
        let db = test_support::db().await;
        let owner = test_support::user(&db, "owner@example.com", Role::Owner).await;
        let rater = test_support::user(&db, "rater@example.com", Role::User).await;
        let fresh = test_support::store(&db, "Fresh Mart", Some(&owner)).await;
        let tech = test_support::store(&db, "Tech Hub", Some(&owner)).await;
        test_support::store(&db, "Daily Needs", None).await;

        db.ratings()
            .upsert(&rater.id, &fresh.id, RatingValue::new(4).unwrap())
            .await
            .unwrap();

        let rollup = db.aggregates().owner_rollup(&owner.id).await.unwrap();
        assert_eq!(rollup.stores.len(), 2);
        assert_eq!(rollup.averages.len(), 2);
        assert_eq!(rollup.averages[0].store_id, fresh.id);
        assert_eq!(rollup.averages[0].average, Some(4.0));
        assert_eq!(rollup.averages[1].store_id, tech.id);
        assert_eq!(rollup.averages[1].average, None);
        assert_eq!(rollup.ratings.len(), 1);
        assert_eq!(rollup.ratings[0].user_id, rater.id);

        let empty = db.aggregates().owner_rollup(&rater.id).await.unwrap();
        assert!(empty.is_empty());
        assert!(empty.averages.is_empty());
    }
}
