//! Migration and seed CLI.
//!
//! ```text
//! migration up [-n STEPS]
//! migration down [-n STEPS]
//! migration fresh | reset | refresh | status
//! migration seed
//! ```

use clap::{Parser, Subcommand};

use quill_infra::database::seed::{default_seeds, run_seeds};
use quill_infra::{Argon2PasswordService, DatabaseConfig, Db, Environment};
use quill_migration::{MigrationCommand, migrate};

#[derive(Parser)]
#[command(name = "migration")]
#[command(about = "Quill database migration and seed tool")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Database URL. Defaults to DATABASE_URL, then `<APP_ENV>.sqlite3`.
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations.
    Up {
        #[arg(short = 'n', long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations (all unless -n is given).
    Down {
        #[arg(short = 'n', long)]
        steps: Option<u32>,
    },
    /// Drop all tables and reapply every migration.
    Fresh,
    /// Roll back every applied migration.
    Reset,
    /// Roll back every applied migration, then reapply them.
    Refresh,
    /// Show the status of every migration.
    Status,
    /// Insert demo data.
    Seed,
}

impl Command {
    fn migration(&self) -> Option<MigrationCommand> {
        match *self {
            Command::Up { steps } => Some(MigrationCommand::Up(steps)),
            Command::Down { steps } => Some(MigrationCommand::Down(steps)),
            Command::Fresh => Some(MigrationCommand::Fresh),
            Command::Reset => Some(MigrationCommand::Reset),
            Command::Refresh => Some(MigrationCommand::Refresh),
            Command::Status => Some(MigrationCommand::Status),
            Command::Seed => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter("info,sqlx=warn")
        .init();

    let args = Args::parse();
    let environment = Environment::from_env();

    let mut config = DatabaseConfig::from_env(environment);
    if let Some(url) = args.database_url {
        config.url = url;
    }
    tracing::info!(%environment, "Using database {}", config.url);

    let db = Db::connect(&config).await?;

    match args.command.migration() {
        Some(command) => migrate(db.connection(), command).await?,
        None => {
            let started = std::time::Instant::now();
            let passwords = Argon2PasswordService::new();
            let ran = run_seeds(&db, &default_seeds(), &passwords).await?;
            for name in &ran {
                tracing::info!("  {name}");
            }
            tracing::info!("Seeded in {:?}", started.elapsed());
        }
    }

    db.close().await?;
    Ok(())
}
