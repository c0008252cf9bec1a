//! Actions - named request handlers with validated props and results.
//!
//! Every HTTP endpoint that touches the database goes through an [`Action`].
//! The [`ActionRunner`] parses and validates the raw JSON props, opens a
//! transaction, executes the action and commits or rolls back.

mod auth;
mod posts;
mod users;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use quill_core::ports::{AuthError, PasswordService, TokenService};
use quill_core::{DomainError, RepoError};
use quill_infra::{Db, Transaction};

pub use auth::Login;
pub use posts::{CreatePost, DeletePost, GetPost, ListPosts, UpdatePost};
pub use users::{CreateUser, DeleteUser, GetUser, UpdateUser};

/// A validated, transactional unit of work.
#[async_trait]
pub trait Action: Send + Sync {
    /// Name used in logs and error messages.
    const NAME: &'static str;

    type Props: DeserializeOwned + Validate + Send;
    type Output: Serialize + Validate + Send;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: Self::Props,
    ) -> Result<Self::Output, ActionError>;
}

/// Everything an action can reach while it runs.
pub struct ActionContext<'a> {
    pub tx: &'a Transaction,
    /// Authenticated user id, if any.
    pub caller: Option<i32>,
    pub passwords: &'a dyn PasswordService,
    pub tokens: &'a dyn TokenService,
}

impl ActionContext<'_> {
    /// The authenticated caller, or `Unauthorized`.
    pub fn require_caller(&self) -> Result<i32, DomainError> {
        self.caller.ok_or(DomainError::Unauthorized)
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{action} validation failed: {message}")]
    InvalidProps {
        action: &'static str,
        message: String,
        details: Option<Value>,
    },

    #[error("{action} result validation failed: {message}")]
    InvalidResult {
        action: &'static str,
        message: String,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ActionError {
    /// Map a repository `NotFound` onto the domain error for the missing row.
    pub(crate) fn from_repo(err: RepoError, missing: DomainError) -> Self {
        match err {
            RepoError::NotFound => missing.into(),
            other => other.into(),
        }
    }
}

/// Runs actions against the database.
#[derive(Clone)]
pub struct ActionRunner {
    db: Db,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    validate_results: bool,
}

impl ActionRunner {
    pub fn new(
        db: Db,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        validate_results: bool,
    ) -> Self {
        Self {
            db,
            passwords,
            tokens,
            validate_results,
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Run an action in its own transaction.
    ///
    /// Props are checked before the transaction opens. The transaction is
    /// committed only when the action (and result validation) succeeds.
    pub async fn run<A: Action>(
        &self,
        action: &A,
        caller: Option<i32>,
        raw: Value,
    ) -> Result<A::Output, ActionError> {
        let props = parse_props::<A>(raw)?;
        let tx = self.db.begin().await?;

        match self.execute(&tx, action, caller, props).await {
            Ok(output) => {
                tx.commit().await?;
                tracing::debug!(action = A::NAME, "Action committed");
                Ok(output)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(action = A::NAME, error = %rollback_err, "Rollback failed");
                }
                tracing::debug!(action = A::NAME, error = %err, "Action rolled back");
                Err(err)
            }
        }
    }

    /// Run an action inside a transaction owned by the caller.
    pub async fn run_in<A: Action>(
        &self,
        tx: &Transaction,
        action: &A,
        caller: Option<i32>,
        raw: Value,
    ) -> Result<A::Output, ActionError> {
        let props = parse_props::<A>(raw)?;
        self.execute(tx, action, caller, props).await
    }

    async fn execute<A: Action>(
        &self,
        tx: &Transaction,
        action: &A,
        caller: Option<i32>,
        props: A::Props,
    ) -> Result<A::Output, ActionError> {
        let ctx = ActionContext {
            tx,
            caller,
            passwords: self.passwords.as_ref(),
            tokens: self.tokens.as_ref(),
        };

        let output = action.execute(&ctx, props).await?;

        if self.validate_results {
            output
                .validate()
                .map_err(|errors| ActionError::InvalidResult {
                    action: A::NAME,
                    message: errors.to_string(),
                })?;
        }

        Ok(output)
    }
}

/// Deserialize and validate raw JSON props for an action.
pub fn parse_props<A: Action>(raw: Value) -> Result<A::Props, ActionError> {
    let props: A::Props =
        serde_json::from_value(raw).map_err(|err| ActionError::InvalidProps {
            action: A::NAME,
            message: err.to_string(),
            details: None,
        })?;

    props.validate().map_err(|errors| ActionError::InvalidProps {
        action: A::NAME,
        message: errors.to_string(),
        details: serde_json::to_value(&errors).ok(),
    })?;

    Ok(props)
}
