use std::time::Duration;

use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, DbErr, SqlErr, TransactionTrait,
};

use quill_core::error::RepoError;

use super::repository::{SeaPostRepository, SeaUserRepository};
use crate::environment::Environment;

/// Configuration for the SQLite database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// File database named after the environment, e.g. `production.sqlite3`.
    /// The file is created when missing.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            url: Self::default_url(environment),
            max_connections: 1,
            min_connections: 1,
        }
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same database.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        }
    }

    /// Load from `DATABASE_URL`, `DB_MAX_CONNECTIONS` and `DB_MIN_CONNECTIONS`,
    /// defaulting to the environment's SQLite file.
    pub fn from_env(environment: Environment) -> Self {
        let defaults = Self::for_environment(environment);

        Self {
            url: std::env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_connections),
        }
    }

    pub fn default_url(environment: Environment) -> String {
        format!("sqlite://{}.sqlite3?mode=rwc", environment.as_str())
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    /// `(min, max)` pool size actually used.
    ///
    /// SQLite allows one writer at a time and a second connection fails with
    /// `database is locked` instead of waiting, so SQLite pools hold exactly one
    /// connection and requests queue for it.
    pub fn pool_bounds(&self) -> (u32, u32) {
        if self.is_sqlite() {
            if self.max_connections > 1 {
                tracing::warn!(
                    requested = self.max_connections,
                    "SQLite pool limited to a single connection"
                );
            }
            return (1, 1);
        }

        let max = self.max_connections.max(1);
        (self.min_connections.min(max), max)
    }
}

/// Handle to the database pool. Cheap to clone.
///
/// All reads and writes go through a [`Transaction`] obtained from [`Db::begin`].
#[derive(Clone)]
pub struct Db {
    conn: DatabaseConnection,
}

impl Db {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!(url = %config.url, "Connecting to database");
        let (min_connections, max_connections) = config.pool_bounds();

        let opts = ConnectOptions::new(&config.url)
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false)
            .to_owned();

        let conn = Database::connect(opts).await?;
        tracing::info!(
            "Database connected (pool: {}..{})",
            min_connections,
            max_connections
        );

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Start a transaction. It rolls back unless [`Transaction::commit`] is called.
    pub async fn begin(&self) -> Result<Transaction, RepoError> {
        let txn = self.conn.begin().await.map_err(repo_error)?;
        Ok(Transaction { txn })
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.conn.close().await
    }
}

/// An open database transaction with repositories bound to it.
pub struct Transaction {
    txn: DatabaseTransaction,
}

impl Transaction {
    pub fn users(&self) -> SeaUserRepository<'_> {
        SeaUserRepository::new(&self.txn)
    }

    pub fn posts(&self) -> SeaPostRepository<'_> {
        SeaPostRepository::new(&self.txn)
    }

    pub async fn commit(self) -> Result<(), RepoError> {
        self.txn.commit().await.map_err(repo_error)
    }

    pub async fn rollback(self) -> Result<(), RepoError> {
        self.txn.rollback().await.map_err(repo_error)
    }
}

/// Map a SeaORM error onto the repository error the domain understands.
pub fn repo_error(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            return RepoError::Constraint(format!("unique constraint violated: {msg}"));
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            return RepoError::Constraint(format!("foreign key constraint violated: {msg}"));
        }
        _ => {}
    }

    match err {
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}
