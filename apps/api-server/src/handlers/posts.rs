//! Post handlers.

use actix_web::{HttpResponse, web};
use quill_shared::dto::ListPostsRequest;
use serde_json::{Value, json};

use crate::actions::{CreatePost, DeletePost, GetPost, ListPosts, UpdatePost};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::{respond, with_id};

/// GET /api/post?creatorId=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsRequest>,
) -> AppResult<HttpResponse> {
    let posts = state
        .actions
        .run(&ListPosts, None, json!({ "creatorId": query.creator_id }))
        .await?;
    Ok(respond(posts))
}

/// POST /api/post
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let post = state
        .actions
        .run(&CreatePost, Some(identity.user_id), body.into_inner())
        .await?;
    Ok(respond(post))
}

/// GET /api/post/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let caller = identity.0.map(|identity| identity.user_id);
    let post = state
        .actions
        .run(&GetPost, caller, json!({ "id": path.into_inner() }))
        .await?;
    Ok(respond(post))
}

/// PUT /api/post/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let props = with_id(body.into_inner(), path.into_inner());
    let post = state
        .actions
        .run(&UpdatePost, Some(identity.user_id), props)
        .await?;
    Ok(respond(post))
}

/// DELETE /api/post/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let deleted = state
        .actions
        .run(&DeletePost, Some(identity.user_id), json!({ "id": path.into_inner() }))
        .await?;
    Ok(respond(deleted))
}
