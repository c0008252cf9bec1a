use quill_core::domain::{NewPost, NewUser, PostChanges, UserChanges};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};
use quill_migration::{Migrator, MigratorTrait};

use super::seed::{DEMO_EMAIL, Seed, SeedError, default_seeds, run_seeds};
use super::{DatabaseConfig, Db, Transaction};
use crate::auth::Argon2PasswordService;
use crate::environment::Environment;

async fn test_db() -> Db {
    let db = Db::connect(&DatabaseConfig::in_memory()).await.unwrap();
    Migrator::up(db.connection(), None).await.unwrap();
    db
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "hash".to_string(),
        first_name: "First".to_string(),
        last_name: "Last".to_string(),
    }
}

fn new_post(title: &str, creator_id: Option<i32>) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "content".to_string(),
        creator_id,
    }
}

#[test]
fn test_sqlite_pools_hold_one_connection() {
    let defaults = DatabaseConfig::for_environment(Environment::Production);
    assert_eq!(defaults.pool_bounds(), (1, 1));

    let oversized = DatabaseConfig {
        max_connections: 10,
        min_connections: 4,
        ..defaults
    };
    assert_eq!(oversized.pool_bounds(), (1, 1));

    let server = DatabaseConfig {
        url: "postgres://localhost/quill".to_string(),
        max_connections: 10,
        min_connections: 20,
    };
    assert_eq!(server.pool_bounds(), (10, 10));
}

#[tokio::test]
async fn test_create_and_find_user() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    let user = tx.users().create(new_user("ada@example.com")).await.unwrap();
    assert!(user.id > 0);

    let by_id = tx.users().find_by_id(user.id).await.unwrap();
    assert_eq!(by_id, Some(user.clone()));

    let by_email = tx.users().find_by_email("ada@example.com").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(user.id));

    tx.rollback().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_email_is_constraint_violation() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    tx.users().create(new_user("dup@example.com")).await.unwrap();
    let err = tx
        .users()
        .create(new_user("dup@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Constraint(_)));
}

#[tokio::test]
async fn test_update_user_changes_only_given_fields() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    let user = tx.users().create(new_user("grace@example.com")).await.unwrap();
    let updated = tx
        .users()
        .update(
            user.id,
            UserChanges {
                first_name: Some("Grace".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Grace");
    assert_eq!(updated.last_name, "Last");
    assert_eq!(updated.email, "grace@example.com");
    assert!(updated.updated_at >= user.updated_at);
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    let err = tx
        .users()
        .update(404, UserChanges::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    let err = tx.posts().delete(404).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn test_deleting_creator_orphans_posts() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    let user = tx.users().create(new_user("writer@example.com")).await.unwrap();
    let post = tx
        .posts()
        .create(new_post("Hello", Some(user.id)))
        .await
        .unwrap();

    tx.users().delete(user.id).await.unwrap();

    let post = tx.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(post.creator_id, None);
}

#[tokio::test]
async fn test_post_for_unknown_creator_is_rejected() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    let err = tx
        .posts()
        .create(new_post("Ghost", Some(999)))
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Constraint(_)));
}

#[tokio::test]
async fn test_list_posts_filters_by_creator() {
    let db = test_db().await;
    let tx = db.begin().await.unwrap();

    let alice = tx.users().create(new_user("alice@example.com")).await.unwrap();
    let bob = tx.users().create(new_user("bob@example.com")).await.unwrap();
    let posts = tx.posts();
    posts.create(new_post("a1", Some(alice.id))).await.unwrap();
    posts.create(new_post("b1", Some(bob.id))).await.unwrap();
    posts.create(new_post("a2", Some(alice.id))).await.unwrap();

    let all = posts.list(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let titles: Vec<_> = posts
        .list(Some(alice.id))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["a1", "a2"]);

    let renamed = posts
        .update(
            all[1].id,
            PostChanges {
                title: Some("b1 (edited)".to_string()),
                content: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "b1 (edited)");
    assert_eq!(renamed.content, "content");
}

#[tokio::test]
async fn test_rollback_discards_writes() {
    let db = test_db().await;

    let tx = db.begin().await.unwrap();
    tx.users().create(new_user("temp@example.com")).await.unwrap();
    tx.rollback().await.unwrap();

    let tx = db.begin().await.unwrap();
    let found = tx.users().find_by_email("temp@example.com").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_seeds_are_idempotent() {
    let db = test_db().await;
    let passwords = Argon2PasswordService::new();
    let seeds = default_seeds();

    let ran = run_seeds(&db, &seeds, &passwords).await.unwrap();
    assert_eq!(ran, vec!["demo_content"]);
    run_seeds(&db, &seeds, &passwords).await.unwrap();

    let tx = db.begin().await.unwrap();
    let demo = tx.users().find_by_email(DEMO_EMAIL).await.unwrap().unwrap();
    assert_eq!(tx.users().list().await.unwrap().len(), 1);
    assert_eq!(tx.posts().list(Some(demo.id)).await.unwrap().len(), 2);
}

struct FailingSeed;

#[async_trait::async_trait]
impl Seed for FailingSeed {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn run(
        &self,
        _tx: &Transaction,
        _passwords: &dyn quill_core::ports::PasswordService,
    ) -> Result<(), SeedError> {
        Err(SeedError::Repo(RepoError::Query("boom".to_string())))
    }
}

#[tokio::test]
async fn test_failing_seed_rolls_back_earlier_seeds() {
    let db = test_db().await;
    let passwords = Argon2PasswordService::new();
    let mut seeds = default_seeds();
    seeds.push(Box::new(FailingSeed));

    assert!(run_seeds(&db, &seeds, &passwords).await.is_err());

    let tx = db.begin().await.unwrap();
    assert!(tx.users().list().await.unwrap().is_empty());
}
