//! SeaORM repository implementations bound to a transaction.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, NotSet, PrimaryKeyTrait,
    QueryFilter, QueryOrder, Set,
};

use quill_core::domain::{NewPost, NewUser, Post, PostChanges, User, UserChanges};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::connections::repo_error;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// Links a SeaORM entity to the domain type its rows convert into.
pub trait DomainEntity: EntityTrait {
    type Domain: From<Self::Model> + Send + 'static;
}

impl DomainEntity for UserEntity {
    type Domain = User;
}

impl DomainEntity for PostEntity {
    type Domain = Post;
}

/// Generic repository over one entity, running inside a transaction.
pub struct SeaBaseRepository<'t, E>
where
    E: EntityTrait,
{
    pub(crate) txn: &'t DatabaseTransaction,
    _entity: PhantomData<E>,
}

impl<'t, E> SeaBaseRepository<'t, E>
where
    E: EntityTrait,
{
    pub fn new(txn: &'t DatabaseTransaction) -> Self {
        Self {
            txn,
            _entity: PhantomData,
        }
    }
}

/// SQLite user repository.
pub type SeaUserRepository<'t> = SeaBaseRepository<'t, UserEntity>;

/// SQLite post repository.
pub type SeaPostRepository<'t> = SeaBaseRepository<'t, PostEntity>;

#[async_trait]
impl<'t, E> BaseRepository<E::Domain, i32> for SeaBaseRepository<'t, E>
where
    E: DomainEntity,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    async fn find_by_id(&self, id: i32) -> Result<Option<E::Domain>, RepoError> {
        let result = E::find_by_id(id).one(self.txn).await.map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(self.txn)
            .await
            .map_err(repo_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// Mask an email for logging to avoid PII in logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl<'t> UserRepository for SeaUserRepository<'t> {
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: NotSet,
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.txn)
        .await
        .map_err(repo_error)?;

        tracing::debug!(user_id = model.id, "User created");
        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, RepoError> {
        let existing = UserEntity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(repo_error)?
            .ok_or(RepoError::NotFound)?;

        let mut active: user::ActiveModel = existing.into();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.txn).await.map_err(repo_error)?;
        Ok(model.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.txn)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(self.txn)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl<'t> PostRepository for SeaPostRepository<'t> {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let now = Utc::now();
        let model = post::ActiveModel {
            id: NotSet,
            title: Set(new_post.title),
            content: Set(new_post.content),
            creator_id: Set(new_post.creator_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.txn)
        .await
        .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(repo_error)?
            .ok_or(RepoError::NotFound)?;

        let mut active: post::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.txn).await.map_err(repo_error)?;
        Ok(model.into())
    }

    async fn list(&self, creator_id: Option<i32>) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find().order_by_asc(post::Column::Id);
        if let Some(creator_id) = creator_id {
            query = query.filter(post::Column::CreatorId.eq(creator_id));
        }

        let result = query.all(self.txn).await.map_err(repo_error)?;
        Ok(result.into_iter().map(Into::into).collect())
    }
}
