//! Shared fixtures for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rateboard_api::auth::PasswordService;
use rateboard_api::{ApiConfig, AppState, SharedState};
use rateboard_core::validation::NewStore;
use rateboard_core::{Identity, Role, Store, User};
use rateboard_db::{Database, DbConfig, NewUserRecord};

/// Password every fixture account is created with.
pub const PASSWORD: &str = "Passw0rd!";

/// Fresh in-memory state with a cheap password hasher.
pub async fn state() -> SharedState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let passwords = PasswordService::new(8, 1, 1).unwrap();
    let state = AppState::new(db, ApiConfig::default())
        .unwrap()
        .with_passwords(passwords);
    Arc::new(state)
}

/// Inserts an account directly, bypassing the role rules of signup.
pub async fn account(state: &AppState, email: &str, role: Role) -> User {
    let password_hash = state.passwords.hash(PASSWORD).await.unwrap();
    state
        .db
        .users()
        .insert(&NewUserRecord {
            name: "Fixture Account Name For Tests".to_string(),
            email: email.to_string(),
            address: Some("1 Fixture Lane".to_string()),
            password_hash,
            role,
        })
        .await
        .unwrap()
}

pub async fn store(state: &AppState, name: &str, owner: Option<&User>) -> Store {
    state
        .db
        .stores()
        .insert(&NewStore {
            name: name.to_string(),
            email: None,
            address: Some(format!("{name} Road")),
            owner_id: owner.map(|o| o.id.clone()),
        })
        .await
        .unwrap()
}

pub fn identity(user: &User) -> Identity {
    Identity::new(user.id.clone(), user.role)
}
