//! # User Repository
//!
//! Database operations for user accounts.
//!
//! ## Key Operations
//! - Account creation (signup and admin-create share `insert`)
//! - Lookup by id / email (email is case-insensitive: `COLLATE NOCASE`)
//! - Credential lookup for login (the only place the hash leaves the table)
//! - Filtered, sorted, paged admin listing
//!
//! The password hash is never part of [`User`]; it is read only through
//! [`UserRepository::get_credentials_by_email`].

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{contains_pattern, generate_id};
use rateboard_core::query::{UserFilter, UserQuery};
use rateboard_core::{Page, Role, User};

const USER_COLUMNS: &str = "id, name, email, address, role, created_at, updated_at";

/// A user row ready to be inserted. Fields are already validated.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// A user together with the stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    id: String,
    name: String,
    email: String,
    address: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    password_hash: String,
}

impl From<CredentialRow> for UserCredentials {
    fn from(row: CredentialRow) -> Self {
        UserCredentials {
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                address: row.address,
                role: row.role,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        }
    }
}

/// Repository for user database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.users();
/// let user = repo.get_by_email("owner@demo.com").await?;
/// let page = repo.list(&query).await?;
/// ```
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user and returns it.
    ///
    /// ## Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DbError::UniqueViolation)` - The email is already registered
    ///   (in any letter case)
    pub async fn insert(&self, record: &NewUserRecord) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            id: generate_id(),
            name: record.name.clone(),
            email: record.email.clone(),
            address: record.address.clone(),
            role: record.role,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, role = %user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, address, password_hash, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.address)
        .bind(&record.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &record.email),
            other => other,
        })?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by email, ignoring letter case.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user and its password hash by email, for login.
    pub async fn get_credentials_by_email(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserCredentials::from))
    }

    /// Replaces a user's password hash.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No user with that id
    pub async fn update_password_hash(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        debug!(id = %id, "Password hash updated");
        Ok(())
    }

    /// Lists users matching a filter, sorted and paged.
    ///
    /// Text filters are case-insensitive substring matches; the role filter
    /// is exact. `total` counts all matches, not just this page.
    pub async fn list(&self, query: &UserQuery) -> DbResult<Page<User>> {
        let mut count_qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
        push_user_filters(&mut count_qb, &query.filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1 = 1"));
        push_user_filters(&mut qb, &query.filter);
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            query.sort.column(),
            query.order.as_sql()
        ));
        qb.push(" LIMIT ")
            .push_bind(query.pagination.limit())
            .push(" OFFSET ")
            .push_bind(query.pagination.offset());

        let items = qb.build_query_as::<User>().fetch_all(&self.pool).await?;

        debug!(total, returned = items.len(), "Listed users");
        Ok(Page { items, total })
    }

    /// Counts all users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn push_user_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &UserFilter) {
    let text_filters = [
        ("name", &filter.name),
        ("email", &filter.email),
        ("address", &filter.address),
    ];
    for (column, term) in text_filters {
        if let Some(term) = term {
            qb.push(format!(" AND {column} LIKE "))
                .push_bind(contains_pattern(term))
                .push(" ESCAPE '\\'");
        }
    }
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
