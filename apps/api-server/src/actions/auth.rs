//! Credential actions.

use async_trait::async_trait;

use quill_core::ports::{AuthError, UserRepository};
use quill_shared::dto::{AuthResponse, LoginRequest};

use super::users::{normalize_email, user_response};
use super::{Action, ActionContext, ActionError};

/// Exchange email and password for an auth token.
pub struct Login;

#[async_trait]
impl Action for Login {
    const NAME: &'static str = "login";
    type Props = LoginRequest;
    type Output = AuthResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: LoginRequest,
    ) -> Result<AuthResponse, ActionError> {
        let user = ctx
            .tx
            .users()
            .find_by_email(&normalize_email(&props.email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !ctx.passwords.verify(&props.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = ctx.tokens.generate_token(user.id, &user.email)?;
        let expires_in = u64::try_from(ctx.tokens.expiration_seconds()).map_err(|_| {
            AuthError::TokenGeneration("token lifetime is negative".to_string())
        })?;

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: user_response(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TEST_PASSWORD, create_user, test_db, test_runner};
    use serde_json::json;

    #[actix_web::test]
    async fn test_login_issues_valid_token() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        let ada = create_user(&runner, &tx, "ada@example.com").await;

        let auth = runner
            .run_in(
                &tx,
                &Login,
                None,
                json!({ "email": "ADA@example.com", "password": TEST_PASSWORD }),
            )
            .await
            .unwrap();

        assert_eq!(auth.token_type, "Bearer");
        assert_eq!(auth.user.id, ada.id);
        assert_eq!(auth.expires_in, 30 * 24 * 3600);

        let claims = runner.tokens.validate_token(&auth.access_token).unwrap();
        assert_eq!(claims.user_id, ada.id);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[actix_web::test]
    async fn test_login_rejects_bad_credentials() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        create_user(&runner, &tx, "ada@example.com").await;

        let err = runner
            .run_in(&tx, &Login, None, json!({ "email": "ada@example.com", "password": "nope" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Auth(AuthError::InvalidCredentials)));

        let err = runner
            .run_in(&tx, &Login, None, json!({ "email": "who@example.com", "password": "nope" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Auth(AuthError::InvalidCredentials)));
    }
}
