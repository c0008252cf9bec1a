//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{NewPost, Post, PostChanges};
pub use user::{NewUser, User, UserChanges};
