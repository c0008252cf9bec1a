//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use quill_infra::{Db, Environment};

mod actions;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

#[cfg(test)]
mod test_support;

use config::AppConfig;
use middleware::auth::AuthPassthrough;
use middleware::security_headers::security_headers;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();
    telemetry::init_telemetry(&TelemetryConfig::from_env(environment));

    let config = AppConfig::load(environment)?;

    tracing::info!(
        %environment,
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    let db = Db::connect(&config.database).await?;
    let state = AppState::new(db.clone(), &config);

    HttpServer::new(move || {
        App::new()
            .wrap(AuthPassthrough::new(state.tokens.clone()))
            .wrap(security_headers())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped, closing database pool");
    db.close().await?;

    Ok(())
}
