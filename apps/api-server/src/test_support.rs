//! Helpers shared by the server's unit tests.

use std::sync::Arc;

use quill_infra::{Argon2PasswordService, DatabaseConfig, Db, JwtConfig, JwtTokenService, Transaction};
use quill_migration::{Migrator, MigratorTrait};
use quill_shared::dto::UserResponse;
use serde_json::json;

use crate::actions::{ActionRunner, CreateUser};
use crate::state::AppState;

pub const TEST_PASSWORD: &str = "secret1";

/// Fresh, migrated in-memory database.
pub async fn test_db() -> Db {
    let db = Db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(db.connection(), None)
        .await
        .expect("run migrations");
    db
}

pub fn test_runner(db: Db) -> ActionRunner {
    test_runner_with(db, true)
}

pub fn test_runner_with(db: Db, validate_results: bool) -> ActionRunner {
    let passwords = Argon2PasswordService::with_cost(1024, 1).expect("argon2 params");
    let tokens = JwtTokenService::new(JwtConfig::new("test-secret"));
    ActionRunner::new(db, Arc::new(passwords), Arc::new(tokens), validate_results)
}

pub fn test_state(db: Db) -> AppState {
    let actions = test_runner(db);
    AppState {
        tokens: Arc::new(JwtTokenService::new(JwtConfig::new("test-secret"))),
        actions,
        secure_cookies: false,
    }
}

/// Create "Ada Lovelace" with the given email and [`TEST_PASSWORD`].
pub async fn create_user(runner: &ActionRunner, tx: &Transaction, email: &str) -> UserResponse {
    runner
        .run_in(
            tx,
            &CreateUser,
            None,
            json!({
                "email": email,
                "password": TEST_PASSWORD,
                "firstName": "Ada",
                "lastName": "Lovelace"
            }),
        )
        .await
        .expect("create user")
}
