//! Post actions.

use async_trait::async_trait;

use quill_core::DomainError;
use quill_core::domain::{NewPost, Post, PostChanges};
use quill_core::ports::{BaseRepository, PostRepository};
use quill_shared::dto::{
    CreatePostRequest, DeletedResponse, ListPostsRequest, PostIdRequest, PostList, PostResponse,
    UpdatePostRequest,
};

use super::{Action, ActionContext, ActionError};

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        creator_id: post.creator_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// Load a post and check that the caller created it.
async fn owned_post(ctx: &ActionContext<'_>, id: i32) -> Result<Post, ActionError> {
    let caller = ctx.require_caller()?;
    let post = ctx
        .tx
        .posts()
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::post_not_found(id))?;

    if !post.is_owned_by(caller) {
        return Err(DomainError::Forbidden("Only the creator can modify this post".into()).into());
    }
    Ok(post)
}

/// Publish a post as the caller.
pub struct CreatePost;

#[async_trait]
impl Action for CreatePost {
    const NAME: &'static str = "createPost";
    type Props = CreatePostRequest;
    type Output = PostResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: CreatePostRequest,
    ) -> Result<PostResponse, ActionError> {
        let caller = ctx.require_caller()?;
        let post = ctx
            .tx
            .posts()
            .create(NewPost {
                title: props.title,
                content: props.content,
                creator_id: Some(caller),
            })
            .await?;

        tracing::info!(post_id = post.id, creator_id = caller, "Post created");
        Ok(post_response(post))
    }
}

pub struct GetPost;

#[async_trait]
impl Action for GetPost {
    const NAME: &'static str = "getPost";
    type Props = PostIdRequest;
    type Output = PostResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: PostIdRequest,
    ) -> Result<PostResponse, ActionError> {
        ctx.tx
            .posts()
            .find_by_id(props.id)
            .await?
            .map(post_response)
            .ok_or_else(|| DomainError::post_not_found(props.id).into())
    }
}

/// List posts, optionally only those by one creator.
pub struct ListPosts;

#[async_trait]
impl Action for ListPosts {
    const NAME: &'static str = "listPosts";
    type Props = ListPostsRequest;
    type Output = PostList;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: ListPostsRequest,
    ) -> Result<PostList, ActionError> {
        let posts = ctx.tx.posts().list(props.creator_id).await?;

        Ok(PostList {
            posts: posts.into_iter().map(post_response).collect(),
        })
    }
}

pub struct UpdatePost;

#[async_trait]
impl Action for UpdatePost {
    const NAME: &'static str = "updatePost";
    type Props = UpdatePostRequest;
    type Output = PostResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: UpdatePostRequest,
    ) -> Result<PostResponse, ActionError> {
        owned_post(ctx, props.id).await?;

        let changes = PostChanges {
            title: props.title,
            content: props.content,
        };
        let post = ctx
            .tx
            .posts()
            .update(props.id, changes)
            .await
            .map_err(|err| ActionError::from_repo(err, DomainError::post_not_found(props.id)))?;

        Ok(post_response(post))
    }
}

pub struct DeletePost;

#[async_trait]
impl Action for DeletePost {
    const NAME: &'static str = "deletePost";
    type Props = PostIdRequest;
    type Output = DeletedResponse;

    async fn execute(
        &self,
        ctx: &ActionContext<'_>,
        props: PostIdRequest,
    ) -> Result<DeletedResponse, ActionError> {
        owned_post(ctx, props.id).await?;

        ctx.tx
            .posts()
            .delete(props.id)
            .await
            .map_err(|err| ActionError::from_repo(err, DomainError::post_not_found(props.id)))?;

        tracing::info!(post_id = props.id, "Post deleted");
        Ok(DeletedResponse { id: props.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, test_db, test_runner};
    use serde_json::json;

    #[actix_web::test]
    async fn test_create_post_sets_creator() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        let ada = create_user(&runner, &tx, "ada@example.com").await;

        let post = runner
            .run_in(
                &tx,
                &CreatePost,
                Some(ada.id),
                json!({ "title": "Notes", "content": "On the analytical engine" }),
            )
            .await
            .unwrap();

        assert_eq!(post.creator_id, Some(ada.id));
        assert_eq!(post.title, "Notes");
    }

    #[actix_web::test]
    async fn test_create_post_rejects_empty_title() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        let ada = create_user(&runner, &tx, "ada@example.com").await;

        let err = runner
            .run_in(&tx, &CreatePost, Some(ada.id), json!({ "title": "", "content": "x" }))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("validation failed"));
    }

    #[actix_web::test]
    async fn test_list_posts_by_creator() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        let ada = create_user(&runner, &tx, "ada@example.com").await;
        let grace = create_user(&runner, &tx, "grace@example.com").await;

        for (caller, title) in [(ada.id, "First"), (grace.id, "Second"), (ada.id, "Third")] {
            runner
                .run_in(&tx, &CreatePost, Some(caller), json!({ "title": title, "content": "..." }))
                .await
                .unwrap();
        }

        let all = runner.run_in(&tx, &ListPosts, None, json!({})).await.unwrap();
        assert_eq!(all.posts.len(), 3);

        let by_ada = runner
            .run_in(&tx, &ListPosts, None, json!({ "creatorId": ada.id }))
            .await
            .unwrap();
        let titles: Vec<_> = by_ada.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["First", "Third"]);
    }

    #[actix_web::test]
    async fn test_only_creator_can_modify() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        let ada = create_user(&runner, &tx, "ada@example.com").await;
        let grace = create_user(&runner, &tx, "grace@example.com").await;

        let post = runner
            .run_in(&tx, &CreatePost, Some(ada.id), json!({ "title": "Mine", "content": "..." }))
            .await
            .unwrap();

        let err = runner
            .run_in(&tx, &UpdatePost, Some(grace.id), json!({ "id": post.id, "title": "Hers" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Domain(DomainError::Forbidden(_))));

        let err = runner
            .run_in(&tx, &DeletePost, Some(grace.id), json!({ "id": post.id }))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Domain(DomainError::Forbidden(_))));

        let updated = runner
            .run_in(&tx, &UpdatePost, Some(ada.id), json!({ "id": post.id, "title": "Still mine" }))
            .await
            .unwrap();
        assert_eq!(updated.title, "Still mine");
        assert_eq!(updated.content, "...");
    }

    #[actix_web::test]
    async fn test_delete_post() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        let ada = create_user(&runner, &tx, "ada@example.com").await;

        let post = runner
            .run_in(&tx, &CreatePost, Some(ada.id), json!({ "title": "Gone", "content": "soon" }))
            .await
            .unwrap();
        runner
            .run_in(&tx, &DeletePost, Some(ada.id), json!({ "id": post.id }))
            .await
            .unwrap();

        let err = runner
            .run_in(&tx, &GetPost, None, json!({ "id": post.id }))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Domain(DomainError::NotFound { entity_type: "Post", .. })));
    }

    #[actix_web::test]
    async fn test_missing_post_is_not_found_before_ownership() {
        let db = test_db().await;
        let runner = test_runner(db.clone());
        let tx = db.begin().await.unwrap();
        let ada = create_user(&runner, &tx, "ada@example.com").await;

        let err = runner
            .run_in(&tx, &DeletePost, Some(ada.id), json!({ "id": 404 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Domain(DomainError::NotFound { id: 404, .. })));
    }
}
