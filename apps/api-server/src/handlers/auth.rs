//! Authentication handlers.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, web};
use quill_shared::ApiResponse;
use serde_json::{Value, json};

use crate::actions::{GetUser, Login};
use crate::middleware::auth::{AUTH_COOKIE, Identity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::respond;

fn auth_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .finish()
}

/// POST /api/auth/login
///
/// Returns the token and also stores it in the `authToken` cookie.
pub async fn login(state: web::Data<AppState>, body: web::Json<Value>) -> AppResult<HttpResponse> {
    let auth = state.actions.run(&Login, None, body.into_inner()).await?;

    let mut cookie = auth_cookie(auth.access_token.clone(), state.secure_cookies);
    cookie.set_max_age(Duration::seconds(auth.expires_in as i64));

    tracing::info!(user_id = auth.user.id, "User logged in");
    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::new(auth)))
}

/// POST /api/auth/logout
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = auth_cookie(String::new(), state.secure_cookies);
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::new(json!({ "loggedOut": true })))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .actions
        .run(&GetUser, Some(identity.user_id), json!({ "id": identity.user_id }))
        .await?;
    Ok(respond(user))
}
