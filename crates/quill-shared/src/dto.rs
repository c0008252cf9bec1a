//! Data Transfer Objects - request/response types for the API.
//!
//! Request types double as action props: they are deserialized from untrusted
//! JSON and then checked with their `validator` rules. Response types are
//! `Validate` too so the server can check its own results during development.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
}

/// Partial update of a user. The id comes from the request path.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub id: i32,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserIdRequest {
    pub id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostIdRequest {
    pub id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostRequest {
    pub id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsRequest {
    pub creator_id: Option<i32>,
}

/// A user's public information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(email)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(length(min = 1))]
    pub title: String,
    pub content: String,
    pub creator_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostList {
    pub posts: Vec<PostResponse>,
}

impl Validate for PostList {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.posts.iter().try_for_each(Validate::validate)
    }
}

/// Authentication token plus the user it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[validate(length(min = 1))]
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[validate(nested)]
    pub user: UserResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DeletedResponse {
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_user_request_uses_camel_case() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "email": "test-email@test.com",
            "password": "secret",
            "firstName": "firstname",
            "lastName": "lastname",
        }))
        .unwrap();

        assert_eq!(req.first_name, "firstname");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_user_request_rejects_bad_email() {
        let req = CreateUserRequest {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
            first_name: "a".to_string(),
            last_name: "b".to_string(),
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_update_user_request_skips_absent_fields() {
        let req: UpdateUserRequest = serde_json::from_value(json!({ "id": 4 })).unwrap();
        assert!(req.validate().is_ok());

        let req: UpdateUserRequest =
            serde_json::from_value(json!({ "id": 4, "firstName": "" })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_post_list_validates_every_post() {
        let now = Utc::now();
        let post = |title: &str| PostResponse {
            id: 1,
            title: title.to_string(),
            content: "body".to_string(),
            creator_id: None,
            created_at: now,
            updated_at: now,
        };

        assert!(PostList { posts: vec![post("a"), post("b")] }.validate().is_ok());
        assert!(PostList { posts: vec![post("a"), post("")] }.validate().is_err());
    }

    #[test]
    fn test_list_posts_request_reads_creator_id() {
        let req: ListPostsRequest = serde_json::from_value(json!({ "creatorId": 9 })).unwrap();
        assert_eq!(req.creator_id, Some(9));
    }
}
