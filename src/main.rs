//! The town crier: relays release announcements into Discord threads.
//!
//! Callers `POST` an announcement naming a channel and a thread within it,
//! along with the bot token to post as. See [announcement].

use config::{Config, Mode};
use discord::api::DiscordClient;
use dotenvy::dotenv;
use router::Deps;
use std::{net::SocketAddr, process};
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{error, info, warn};

mod announcement;
mod config;
mod de;
mod discord;
mod error;
mod router;
mod server;

/// Application entrypoint. Initialises tracing, reads configuration from the
/// environment, binds to 0.0.0.0, and starts the server.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let has_dotenv = dotenv().is_ok();
    if !has_dotenv {
        warn!("No .env found");
    }

    let config = Config::from_env().unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.unwrap_or_else(|e| {
        error!("Failed to bind to {}: {}", addr, e);
        process::exit(1);
    });

    server_(listener, config).await;
}

/// Initialise a server without graceful shutdown.
async fn server_(listener: TcpListener, config: Config) {
    let (tx, rx) = oneshot::channel::<()>();
    server(listener, config, rx).await;
    // Keep the sender alive for as long as the server runs, so that the
    // shutdown signal never resolves.
    drop(tx);
}

/// Initialise a server with graceful shutdown via `rx`.
async fn server(listener: TcpListener, config: Config, rx: oneshot::Receiver<()>) {
    match listener.local_addr() {
        Ok(addr) => info!("Listening on {}", addr),
        Err(e) => warn!("Listening on unknown address: {}", e),
    }

    if config.mode == Mode::Development {
        warn!("Running in development mode; error responses include diagnostics");
    }

    let deps = Deps {
        discord_client: DiscordClient::new(config.discord_api_base),
        mode: config.mode,
    };

    server::serve(listener, router::new(deps), rx).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_real_version_api() {
        let (tx, rx) = oneshot::channel::<()>();

        // Port 0 requests that the OS assigns us an available port.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = Config {
            port,
            mode: Mode::Production,
            discord_api_base: "any".to_owned(),
        };

        // Move the server into the background so that it's not blocking.
        tokio::spawn(async move { server(listener, config, rx).await });

        let res = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{}/version", port))
            .send()
            .await
            .unwrap();

        tx.send(()).unwrap();

        assert_eq!(res.status().as_u16(), StatusCode::OK.as_u16());
        assert!(res.text().await.unwrap().contains("\"status\":\"Running\""));
    }
}
