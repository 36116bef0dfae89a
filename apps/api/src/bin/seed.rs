//! # Demo Seed
//!
//! Wipes the configured database and loads a small demo data set:
//!
//! ```text
//! admin@demo.com / Admin@123   ADMIN
//! owner@demo.com / Owner@123   OWNER  ──► Fresh Mart, Tech Hub
//! user@demo.com  / User@1234   USER   ──► rates Fresh Mart 4, Tech Hub 5
//!                                         Daily Needs (no owner)
//! ```
//!
//! Uses the same configuration sources as the server.

use std::path::Path;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rateboard_api::auth::PasswordService;
use rateboard_api::ApiConfig;
use rateboard_core::validation::{validate_account, validate_store};
use rateboard_core::{RatingValue, Role, Store, User};
use rateboard_db::{Database, NewUserRecord};

struct SeedAccount {
    name: &'static str,
    email: &'static str,
    address: &'static str,
    password: &'static str,
    role: Role,
}

const ACCOUNTS: [SeedAccount; 3] = [
    SeedAccount {
        name: "Administrator Account AAA BBB",
        email: "admin@demo.com",
        address: "HQ, City",
        password: "Admin@123",
        role: Role::Admin,
    },
    SeedAccount {
        name: "Store Owner Example QQQ RRR",
        email: "owner@demo.com",
        address: "Owner Address",
        password: "Owner@123",
        role: Role::Owner,
    },
    SeedAccount {
        name: "Normal User Sample XXX YYY",
        email: "user@demo.com",
        address: "User Address",
        password: "User@1234",
        role: Role::User,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let db_config = config.db_config();
    if !db_config.is_in_memory() {
        if let Some(parent) = Path::new(&config.database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let db = Database::new(db_config)
        .await
        .context("Failed to open database")?;
    let passwords = PasswordService::from_config(&config)?;

    reset(&db).await?;
    info!(database = %config.database_path, "Tables cleared");

    let mut users = Vec::with_capacity(ACCOUNTS.len());
    for account in &ACCOUNTS {
        users.push(create_account(&db, &passwords, account).await?);
    }
    let owner = &users[1];
    let rater = &users[2];

    let fresh = create_store(&db, "Fresh Mart", "fresh@store.com", "123 Market Street", Some(owner)).await?;
    let tech = create_store(&db, "Tech Hub", "tech@store.com", "42 Silicon Road", Some(owner)).await?;
    create_store(&db, "Daily Needs", "daily@store.com", "7 Main Bazaar", None).await?;

    let ratings = db.ratings();
    ratings.upsert(&rater.id, &fresh.id, RatingValue::new(4)?).await?;
    ratings.upsert(&rater.id, &tech.id, RatingValue::new(5)?).await?;

    db.close().await;
    info!("Seed complete. Admin: admin@demo.com / Admin@123");
    Ok(())
}

/// Deletes every row, children first.
async fn reset(db: &Database) -> anyhow::Result<()> {
    let mut tx = db.pool().begin().await?;
    for table in ["ratings", "stores", "users"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

async fn create_account(
    db: &Database,
    passwords: &PasswordService,
    account: &SeedAccount,
) -> anyhow::Result<User> {
    let valid = validate_account(
        account.name,
        account.email,
        Some(account.address),
        account.password,
    )?;
    let password_hash = passwords.hash(account.password).await?;

    let user = db
        .users()
        .insert(&NewUserRecord {
            name: valid.name,
            email: valid.email,
            address: valid.address,
            password_hash,
            role: account.role,
        })
        .await?;

    info!(email = %user.email, role = %user.role, "Account created");
    Ok(user)
}

async fn create_store(
    db: &Database,
    name: &str,
    email: &str,
    address: &str,
    owner: Option<&User>,
) -> anyhow::Result<Store> {
    let new_store = validate_store(
        name,
        Some(email),
        Some(address),
        owner.map(|o| o.id.as_str()),
    )?;
    let store = db.stores().insert(&new_store).await?;

    info!(store = %store.name, "Store created");
    Ok(store)
}
