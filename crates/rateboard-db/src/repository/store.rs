//! # Store Repository
//!
//! Database operations for stores.
//!
//! ## Listing Filters
//! ```text
//! q        → name LIKE %q% OR address LIKE %q%
//! name     → name LIKE %name%
//! email    → email LIKE %email%
//! address  → address LIKE %address%
//! (all present filters are ANDed; stores with NULL email/address never
//!  match a filter on that column)
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{contains_pattern, generate_id};
use rateboard_core::query::{StoreFilter, StoreQuery};
use rateboard_core::validation::NewStore;
use rateboard_core::{Page, Store};

const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at, updated_at";

/// Repository for store database operations.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    /// Creates a new StoreRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Inserts a new store and returns it.
    ///
    /// The owner reference must already have been checked by the caller;
    /// a dangling id surfaces as `DbError::ForeignKeyViolation`.
    pub async fn insert(&self, new_store: &NewStore) -> DbResult<Store> {
        let now = Utc::now();
        let store = Store {
            id: generate_id(),
            name: new_store.name.clone(),
            email: new_store.email.clone(),
            address: new_store.address.clone(),
            owner_id: new_store.owner_id.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %store.id, name = %store.name, "Inserting store");

        sqlx::query(
            r#"
            INSERT INTO stores (id, name, email, address, owner_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(&store.email)
        .bind(&store.address)
        .bind(&store.owner_id)
        .bind(store.created_at)
        .bind(store.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(store)
    }

    /// Gets a store by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// True when a store with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stores WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Lists stores matching a filter, sorted and paged.
    ///
    /// Ties on the sort column are broken by id so paging is stable.
    pub async fn list(&self, query: &StoreQuery) -> DbResult<Page<Store>> {
        let mut count_qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM stores WHERE 1 = 1");
        push_store_filters(&mut count_qb, &query.filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {STORE_COLUMNS} FROM stores WHERE 1 = 1"));
        push_store_filters(&mut qb, &query.filter);
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            query.sort.column(),
            query.order.as_sql()
        ));
        qb.push(" LIMIT ")
            .push_bind(query.pagination.limit())
            .push(" OFFSET ")
            .push_bind(query.pagination.offset());

        let items = qb.build_query_as::<Store>().fetch_all(&self.pool).await?;

        debug!(total, returned = items.len(), "Listed stores");
        Ok(Page { items, total })
    }

    /// Lists every store owned by `owner_id`, by name.
    pub async fn list_by_owner(&self, owner_id: &str) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE owner_id = ?1 ORDER BY name ASC, id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    /// Counts all stores.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn push_like(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, term: &str) {
    qb.push(format!("{column} LIKE "))
        .push_bind(contains_pattern(term))
        .push(" ESCAPE '\\'");
}

fn push_store_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &StoreFilter) {
    if let Some(q) = &filter.q {
        qb.push(" AND (");
        push_like(qb, "name", q);
        qb.push(" OR ");
        push_like(qb, "address", q);
        qb.push(")");
    }

    let column_filters = [
        ("name", &filter.name),
        ("email", &filter.email),
        ("address", &filter.address),
    ];
    for (column, term) in column_filters {
        if let Some(term) = term {
            qb.push(" AND ");
            push_like(qb, column, term);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support;
    use rateboard_core::query::{RawListParams, SortOrder, StoreSortField};
    use rateboard_core::Role;

    #[tokio::test]
    async fn test_insert_get_exists() {
        let db = test_support::db().await;
        let owner = test_support::user(&db, "owner@example.com", Role::Owner).await;
        let store = test_support::store(&db, "Fresh Mart", Some(&owner)).await;

        let loaded = db.stores().get_by_id(&store.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Fresh Mart");
        assert_eq!(loaded.owner_id.as_deref(), Some(owner.id.as_str()));

        assert!(db.stores().exists(&store.id).await.unwrap());
        assert!(!db.stores().exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_rejects_dangling_owner() {
        let db = test_support::db().await;
        let err = db
            .stores()
            .insert(&NewStore {
                name: "Ghost Shop".to_string(),
                email: None,
                address: None,
                owner_id: Some("no-such-user".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_search_matches_name_or_address() {
        let db = test_support::db().await;
        test_support::store(&db, "Fresh Mart", None).await;
        test_support::store(&db, "Tech Hub", None).await;
        test_support::store(&db, "Daily Needs", None).await;

        // Address is "<name> street", so "street" matches every store.
        let query = StoreQuery::parse(&RawListParams {
            q: Some("STREET"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(db.stores().list(&query).await.unwrap().total, 3);

        let query = StoreQuery::parse(&RawListParams {
            q: Some("hub"),
            ..Default::default()
        })
        .unwrap();
        let page = db.stores().list(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Tech Hub");
    }

    #[tokio::test]
    async fn test_list_sorted_and_paged() {
        let db = test_support::db().await;
        for name in ["Bravo", "Alpha", "Delta", "Charlie"] {
            test_support::store(&db, name, None).await;
        }

        let query = StoreQuery {
            sort: StoreSortField::Name,
            order: SortOrder::Desc,
            ..Default::default()
        };
        let page = db.stores().list(&query).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Delta", "Charlie", "Bravo", "Alpha"]);

        let query = StoreQuery::parse(&RawListParams {
            page: Some(2),
            limit: Some(3),
            ..Default::default()
        })
        .unwrap();
        let page = db.stores().list(&query).await.unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Delta");
    }

    #[tokio::test]
    async fn test_list_by_owner_and_count() {
        let db = test_support::db().await;
        let owner = test_support::user(&db, "owner@example.com", Role::Owner).await;
        test_support::store(&db, "Second", Some(&owner)).await;
        test_support::store(&db, "First", Some(&owner)).await;
        test_support::store(&db, "Unowned", None).await;

        let owned = db.stores().list_by_owner(&owner.id).await.unwrap();
        let names: Vec<_> = owned.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(db.stores().count().await.unwrap(), 3);
    }
}
