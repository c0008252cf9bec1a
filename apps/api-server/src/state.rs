//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, TokenService};
use quill_infra::{Argon2PasswordService, Db, Environment, JwtTokenService};

use crate::actions::ActionRunner;
use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub actions: ActionRunner,
    pub tokens: Arc<dyn TokenService>,
    /// Mark the auth cookie `Secure`. On in production.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: Db, config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        tracing::info!(
            validate_action_results = config.validate_action_results,
            "Application state initialized"
        );

        Self {
            actions: ActionRunner::new(
                db,
                passwords,
                tokens.clone(),
                config.validate_action_results,
            ),
            tokens,
            secure_cookies: config.environment == Environment::Production,
        }
    }
}
