//! User account actions.

use async_trait::async_trait;

use quill_core::DomainError;
use quill_core::domain::{NewUser, User, UserChanges};
use quill_core::ports::{BaseRepository, UserRepository};
use quill_shared::dto::{
    CreateUserRequest, DeletedResponse, UpdateUserRequest, UserIdRequest, UserResponse,
};

use super::{Action, ActionContext, ActionError};

pub(crate) fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Register a new account.
pub struct CreateUser;

#[async_trait]
impl Action for CreateUser {
    const NAME: &'static str = "createUser";
    type Props = CreateUserRequest;
    type Output = UserResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: CreateUserRequest,
    ) -> Result<UserResponse, ActionError> {
        let users = ctx.tx.users();
        let email = normalize_email(&props.email);

        if users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate(format!("Email {email} is already registered")).into());
        }

        let password_hash = ctx.passwords.hash(&props.password)?;
        let user = users
            .create(NewUser {
                email,
                password_hash,
                first_name: props.first_name,
                last_name: props.last_name,
            })
            .await?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user_response(user))
    }
}

pub struct GetUser;

#[async_trait]
impl Action for GetUser {
    const NAME: &'static str = "getUser";
    type Props = UserIdRequest;
    type Output = UserResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: UserIdRequest,
    ) -> Result<UserResponse, ActionError> {
        ctx.tx
            .users()
            .find_by_id(props.id)
            .await?
            .map(user_response)
            .ok_or_else(|| DomainError::user_not_found(props.id).into())
    }
}

/// Update the caller's own account.
pub struct UpdateUser;

#[async_trait]
impl Action for UpdateUser {
    const NAME: &'static str = "updateUser";
    type Props = UpdateUserRequest;
    type Output = UserResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: UpdateUserRequest,
    ) -> Result<UserResponse, ActionError> {
        let caller = ctx.require_caller()?;
        if caller != props.id {
            return Err(DomainError::Forbidden("You can only update your own account".into()).into());
        }

        let users = ctx.tx.users();
        let email = props.email.as_deref().map(normalize_email);

        if let Some(email) = &email {
            if let Some(existing) = users.find_by_email(email).await? {
                if existing.id != props.id {
                    return Err(
                        DomainError::Duplicate(format!("Email {email} is already registered")).into(),
                    );
                }
            }
        }

        let password_hash = props
            .password
            .as_deref()
            .map(|password| ctx.passwords.hash(password))
            .transpose()?;

        let changes = UserChanges {
            email,
            password_hash,
            first_name: props.first_name,
            last_name: props.last_name,
        };

        let user = users
            .update(props.id, changes)
            .await
            .map_err(|err| ActionError::from_repo(err, DomainError::user_not_found(props.id)))?;

        Ok(user_response(user))
    }
}

/// Delete the caller's own account. Their posts stay, without a creator.
pub struct DeleteUser;

#[async_trait]
impl Action for DeleteUser {
    const NAME: &'static str = "deleteUser";
    type Props = UserIdRequest;
    type Output = DeletedResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: UserIdRequest,
    ) -> Result<DeletedResponse, ActionError> {
        let caller = ctx.require_caller()?;
        if caller != props.id {
            return Err(DomainError::Forbidden("You can only delete your own account".into()).into());
        }

        ctx.tx
            .users()
            .delete(props.id)
            .await
            .map_err(|err| ActionError::from_repo(err, DomainError::user_not_found(props.id)))?;

        tracing::info!(user_id = props.id, "User deleted");
        Ok(DeletedResponse { id: props.id })
    }
}
