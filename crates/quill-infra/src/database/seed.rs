//! Database seeds - demo content for development databases.

use async_trait::async_trait;

use quill_core::domain::{NewPost, NewUser};
use quill_core::error::RepoError;
use quill_core::ports::{AuthError, PasswordService, PostRepository, UserRepository};

use super::connections::{Db, Transaction};

pub const DEMO_EMAIL: &str = "demo@quill.dev";
pub const DEMO_PASSWORD: &str = "quill-demo";

/// Seed errors.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// A named unit of seed data. Seeds must be safe to run more than once.
#[async_trait]
pub trait Seed: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, tx: &Transaction, passwords: &dyn PasswordService)
    -> Result<(), SeedError>;
}

/// The seeds run by the `seed` command, in order.
pub fn default_seeds() -> Vec<Box<dyn Seed>> {
    vec![Box::new(DemoContent)]
}

/// A demo user with a couple of posts.
pub struct DemoContent;

#[async_trait]
impl Seed for DemoContent {
    fn name(&self) -> &'static str {
        "demo_content"
    }

    async fn run(
        &self,
        tx: &Transaction,
        passwords: &dyn PasswordService,
    ) -> Result<(), SeedError> {
        let users = tx.users();
        if users.find_by_email(DEMO_EMAIL).await?.is_some() {
            tracing::info!("Demo user already present, skipping");
            return Ok(());
        }

        let user = users
            .create(NewUser {
                email: DEMO_EMAIL.to_string(),
                password_hash: passwords.hash(DEMO_PASSWORD)?,
                first_name: "Demo".to_string(),
                last_name: "User".to_string(),
            })
            .await?;

        let posts = tx.posts();
        for (title, content) in [
            ("Welcome to Quill", "This post was created by the demo seed."),
            ("Second post", "Log in as the demo user to edit or delete it."),
        ] {
            posts
                .create(NewPost {
                    title: title.to_string(),
                    content: content.to_string(),
                    creator_id: Some(user.id),
                })
                .await?;
        }

        Ok(())
    }
}

/// Run `seeds` in a single transaction and return the names that ran.
/// A failing seed rolls back everything.
pub async fn run_seeds(
    db: &Db,
    seeds: &[Box<dyn Seed>],
    passwords: &dyn PasswordService,
) -> Result<Vec<&'static str>, SeedError> {
    let tx = db.begin().await?;
    let mut ran = Vec::with_capacity(seeds.len());

    for seed in seeds {
        tracing::info!(seed = seed.name(), "Running seed");
        if let Err(e) = seed.run(&tx, passwords).await {
            tracing::error!(seed = seed.name(), error = %e, "Seed failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            return Err(e);
        }
        ran.push(seed.name());
    }

    tx.commit().await?;
    Ok(ran)
}
