use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - a piece of content written by a user.
///
/// `creator_id` becomes `None` when the creator is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub creator_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether `user_id` created this post. Orphaned posts are owned by nobody.
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.creator_id == Some(user_id)
    }
}

/// Fields required to insert a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub creator_id: Option<i32>,
}

/// Partial update for a post.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}
