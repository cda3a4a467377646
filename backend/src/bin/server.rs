//! Cruise track search HTTP server.
//!
//! Initializes the track store, sets up the HTTP router and starts serving
//! requests.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store (default)
//! cargo run --bin cruise-tracks-server
//!
//! # PostGIS store
//! REPOSITORY_TYPE=postgres DATABASE_URL=postgres://tracks@localhost/tracks \
//!   cargo run --bin cruise-tracks-server --features "postgres-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `local` or `postgres` when no `repository.toml` is found
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `SEARCH_*`: search default overrides, see `cruise_tracks::config`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cruise_tracks::config::SearchConfig;
use cruise_tracks::db::{self, RepositoryConfig};
use cruise_tracks::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting cruise track search server");

    let repository = Arc::clone(db::init_repository().await?);
    info!("Repository initialized successfully");

    let search_config = match RepositoryConfig::from_default_location()? {
        Some(config) => config.search_config(),
        None => SearchConfig::from_env(),
    };
    info!(
        "Search defaults: years {}..={}, max_coords {}, store timeout {} ms",
        search_config.min_time,
        search_config.max_time,
        search_config.max_coords,
        search_config.store_timeout_ms
    );

    let state = AppState::new(repository, search_config);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
