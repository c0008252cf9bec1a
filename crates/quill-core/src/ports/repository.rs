use async_trait::async_trait;

use crate::domain::{NewPost, NewUser, Post, PostChanges, User, UserChanges};
use crate::error::RepoError;

/// Generic repository trait defining the operations every table supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its primary key.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its primary key. Missing rows are `RepoError::NotFound`.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn list(&self) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;

    /// List posts in id order, optionally only those created by `creator_id`.
    async fn list(&self, creator_id: Option<i32>) -> Result<Vec<Post>, RepoError>;
}
