// SPDX-License-Identifier: MIT

//! Coachbench API Server
//!
//! Multi-tenant coaching-session backend: training sessions, athlete-device
//! pairing, and test result recording.

use coachbench::{config::Config, db::PgDatabase, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Coachbench API");

    // Connect the persistence gateway
    let db = PgDatabase::new(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    let state = Arc::new(AppState::new(config.clone(), Arc::new(db)));

    // Build router
    let app = coachbench::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coachbench=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
