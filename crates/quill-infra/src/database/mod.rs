//! Database access: connection pool, per-request transactions and repositories.

mod connections;
mod repository;

pub mod entity;
pub mod seed;

pub use connections::{DatabaseConfig, Db, Transaction, repo_error};
pub use repository::{DomainEntity, SeaBaseRepository, SeaPostRepository, SeaUserRepository};

#[cfg(test)]
mod tests;
