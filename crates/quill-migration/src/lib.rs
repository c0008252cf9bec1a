//! # Quill Migrations
//!
//! Schema migrations for the `user` and `post` tables and a small runner
//! shared by the migration CLI and tests.

pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

mod m20190212_182006_create_user_table;
mod m20190212_182007_create_post_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20190212_182006_create_user_table::Migration),
            Box::new(m20190212_182007_create_post_table::Migration),
        ]
    }
}

/// A migration operation. `Up`/`Down` take an optional step count; `None`
/// means all pending (or all applied) migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up(Option<u32>),
    Down(Option<u32>),
    Fresh,
    Reset,
    Refresh,
    Status,
}

/// Run `command` against `db`, logging applied/defined counts before and after.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let before = diagnostics(db).await?;
    tracing::info!(
        database = %before.name,
        applied = before.applied,
        defined = before.defined,
        "Running {command:?}"
    );

    let result = match command {
        MigrationCommand::Up(steps) => Migrator::up(db, steps).await,
        MigrationCommand::Down(steps) => Migrator::down(db, steps).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            if command != MigrationCommand::Status {
                let after = diagnostics(db).await?;
                tracing::info!(
                    applied = after.applied,
                    defined = after.defined,
                    latest = after.latest.as_deref().unwrap_or("<none>"),
                    "{command:?} complete"
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "{command:?} failed");
            Err(e)
        }
    }
}

#[derive(Debug)]
struct Diagnostics {
    name: String,
    applied: usize,
    defined: usize,
    latest: Option<String>,
}

async fn diagnostics(db: &DatabaseConnection) -> Result<Diagnostics, DbErr> {
    let stmt = Statement::from_string(
        db.get_database_backend(),
        "SELECT file FROM pragma_database_list WHERE name = 'main'".to_string(),
    );
    let name = match db.query_one(stmt).await? {
        Some(row) => match row.try_get::<String>("", "file") {
            Ok(file) if file.is_empty() => ":memory:".to_string(),
            Ok(file) => file,
            Err(_) => "<unknown>".to_string(),
        },
        None => "<unknown>".to_string(),
    };

    Ok(Diagnostics {
        name,
        applied: count_applied_migrations(db).await?,
        defined: Migrator::migrations().len(),
        latest: latest_migration(db).await?,
    })
}

/// Number of applied migrations. Zero when the migrations table does not exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) | Err(DbErr::Query(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Name of the most recently applied migration, if any.
pub async fn latest_migration(db: &DatabaseConnection) -> Result<Option<String>, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.last().map(|m| m.name().to_string())),
        Err(DbErr::Exec(_)) | Err(DbErr::Query(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
