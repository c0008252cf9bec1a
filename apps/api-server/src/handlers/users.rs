//! User handlers.

use actix_web::{HttpResponse, web};
use serde_json::{Value, json};

use crate::actions::{CreateUser, DeleteUser, GetUser, ListPosts, UpdateUser};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::{respond, with_id};

/// POST /api/user
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let user = state.actions.run(&CreateUser, None, body.into_inner()).await?;
    Ok(respond(user))
}

/// GET /api/user/{id}
pub async fn get_user(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let user = state
        .actions
        .run(&GetUser, None, json!({ "id": path.into_inner() }))
        .await?;
    Ok(respond(user))
}

/// PUT /api/user/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let props = with_id(body.into_inner(), path.into_inner());
    let user = state
        .actions
        .run(&UpdateUser, Some(identity.user_id), props)
        .await?;
    Ok(respond(user))
}

/// DELETE /api/user/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let deleted = state
        .actions
        .run(&DeleteUser, Some(identity.user_id), json!({ "id": path.into_inner() }))
        .await?;
    Ok(respond(deleted))
}

/// GET /api/user/{id}/posts
pub async fn user_posts(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let posts = state
        .actions
        .run(&ListPosts, None, json!({ "creatorId": path.into_inner() }))
        .await?;
    Ok(respond(posts))
}
