//! # Quill Core
//!
//! The domain layer of the Quill API.
//! This crate contains the users/posts model and the ports that infrastructure implements.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
