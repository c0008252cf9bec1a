//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! SQLite persistence through SeaORM, JWT tokens, Argon2 password hashing
//! and database seeds.

pub mod auth;
pub mod database;
pub mod environment;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, Db, Transaction};
pub use environment::Environment;
