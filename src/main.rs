//! Memory Match Server
//!
//! Serves the theme catalog, deck dealing, leaderboard and room relay
//! over WebSocket.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memory_match::{GameServer, MemoryStore, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Memory Match Server v{}", VERSION);

    let config = ServerConfig::from_env().context("reading configuration")?;
    info!(
        "Max connections: {}, room buffer: {}, unknown events: {:?}",
        config.max_connections, config.room_capacity, config.unknown_events
    );

    let store = Arc::new(MemoryStore::new());
    let server = GameServer::new(config, store).context("starting game server")?;

    let run = server.run();
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => {
            result.context("server stopped")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for shutdown signal")?;
            info!("Interrupt received, shutting down");
            server.shutdown();
            run.await.context("server stopped")?;

            // Let open connections deliver their shutdown notice
            let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
            while server.connection_count().await > 0 && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }

    Ok(())
}
