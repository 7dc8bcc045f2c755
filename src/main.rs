#![cfg_attr(not(test), deny(clippy::panic))]

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use table_fish_server::config;
use table_fish_server::logging;
use table_fish_server::server::{LobbyServer, ServerConfig};
use table_fish_server::storage::StoreConfig;
use table_fish_server::websocket;

/// Table Fish -- lightweight WebSocket lobby server for tabletop games
#[derive(Parser, Debug)]
#[command(name = "table-fish-server")]
#[command(about = "A lightweight, in-memory WebSocket lobby server for turn-based tabletop games")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = Arc::new(config::load());

    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // config::load() already validated warn-only; capture the result here
    // for a proper exit code and to fail startup on a broken config.
    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Storage backend: InMemory");
                println!("  Guest logins: {}", cfg.security.guest_logins);
                println!("  Chat backlog limit: {}", cfg.server.chat_backlog_limit);
                println!("  History limit: {}", cfg.server.history_limit);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    // In normal operation, propagate validation errors
    validation_result?;

    // Initialize logging from config.
    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "Starting Table Fish server");

    let server_config = ServerConfig {
        chat_backlog_limit: cfg.server.chat_backlog_limit,
        history_limit: cfg.server.history_limit,
        motd: cfg.server.motd.clone(),
        queue_capacity: cfg.websocket.queue_capacity,
        max_message_size: cfg.websocket.max_message_size,
        guest_logins: cfg.security.guest_logins,
    };

    let server = LobbyServer::new(server_config, StoreConfig::InMemory).await?;

    let app = websocket::create_router(&cfg.security.cors_origins).with_state(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.security.cors_origins,
        "Server started - WebSocket: /v1/ws, Login: /v1/login, Metrics: /v1/metrics"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn test_cli_default_no_flags() {
        let cli = Cli::try_parse_from(["table-fish-server"]).unwrap();
        assert!(!cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_short() {
        let cli = Cli::try_parse_from(["table-fish-server", "-c"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_print_config() {
        let cli = Cli::try_parse_from(["table-fish-server", "--print-config"]).unwrap();
        assert!(!cli.validate_config);
        assert!(cli.print_config);
    }

    #[test]
    fn test_cli_validate_and_print_config_conflict() {
        // --validate-config and --print-config are mutually exclusive
        let result =
            Cli::try_parse_from(["table-fish-server", "--validate-config", "--print-config"]);
        assert!(result.is_err());
    }
}
