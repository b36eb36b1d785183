#![cfg_attr(not(test), deny(clippy::panic))]

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tabletop_tavern_core::server::AppContext;
use tabletop_tavern_core::store::memory::InMemoryRoomStore;
use tabletop_tavern_core::store::mongo::MongoRoomStore;
use tabletop_tavern_core::store::RoomStore;
use tabletop_tavern_core::{config, logging, websocket};

/// Tabletop Tavern -- real-time room-coordination core for the virtual
/// tabletop (presence, seats, dice prompts, synchronized audio, active-map
/// state) plus the REST control plane that mutates the same state.
#[derive(Parser, Debug)]
#[command(name = "tabletop-tavern-core")]
#[command(about = "Room-coordination server for the Tabletop Tavern virtual tabletop")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = Arc::new(config::load());

    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Mongo database: {}", cfg.mongo.database);
                println!("  Reconnect grace (s): {}", cfg.server.reconnect_grace_secs);
                println!("  Max logs per room: {}", cfg.server.max_logs);
                println!("  CORS origins: {}", cfg.cors.allowed_origins);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result.map_err(|e| anyhow::anyhow!("{e}"))?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));

    let store: Arc<dyn RoomStore> = match MongoRoomStore::connect(&cfg.mongo).await {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::warn!(error = %err, "failed to connect to document store, falling back to an in-memory store");
            Arc::new(InMemoryRoomStore::new())
        }
    };

    let ctx = AppContext::new(store, cfg.clone());

    let app = websocket::routes::create_router(&cfg.cors.allowed_origins).with_state(ctx.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Tabletop Tavern core listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(ctx))
        .await?;

    Ok(())
}

/// Waits for `ctrl_c`, then closes every room the connection manager still
/// tracks so clients see a clean disconnect rather than a dropped socket.
async fn shutdown_signal(ctx: AppContext) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received, closing tracked room connections");
    ctx.close_all_connections();
}

#[cfg(test)]
mod cli_tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn test_cli_default_no_flags() {
        let cli = Cli::try_parse_from(["tabletop-tavern-core"]).unwrap();
        assert!(!cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_long() {
        let cli = Cli::try_parse_from(["tabletop-tavern-core", "--validate-config"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_short() {
        let cli = Cli::try_parse_from(["tabletop-tavern-core", "-c"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_print_config() {
        let cli = Cli::try_parse_from(["tabletop-tavern-core", "--print-config"]).unwrap();
        assert!(!cli.validate_config);
        assert!(cli.print_config);
    }

    #[test]
    fn test_cli_validate_and_print_config_conflict() {
        let result = Cli::try_parse_from([
            "tabletop-tavern-core",
            "--validate-config",
            "--print-config",
        ]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("cannot be used with"));
    }

    #[test]
    fn test_cli_help_contains_flags() {
        let result = Cli::try_parse_from(["tabletop-tavern-core", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        let help_text = err.to_string();
        assert!(help_text.contains("--validate-config"));
        assert!(help_text.contains("--print-config"));
        assert!(help_text.contains("-c"));
    }

    #[test]
    fn test_cli_version() {
        let result = Cli::try_parse_from(["tabletop-tavern-core", "--version"]);
        assert!(result.is_err());
    }
}
