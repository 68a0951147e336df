//! Navtree HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 3001, default DB path)
//! cargo run --bin navtree-server
//!
//! # Custom port and database
//! NAVTREE_PORT=3002 NAVTREE_DB_PATH=/tmp/navtree.db cargo run --bin navtree-server
//! ```
//!
//! # Environment Variables
//!
//! See [`navtree_server::config`] for the full list. `RUST_LOG` sets the
//! logging level (e.g. "info", "debug", "navtree_core=trace").

use navtree_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Navtree HTTP Server");

    let config = ServerConfig::from_env()?;

    tracing::info!("Port: {}", config.port);
    tracing::info!("Database: {}", config.db_path.display());
    tracing::info!("Access file: {}", config.access_file.display());
    tracing::info!("Role gate: {:?}", config.role_gate);

    navtree_server::start_server(config).await?;

    Ok(())
}
