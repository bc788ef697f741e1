//! chatlens server binary.
//!
//! Loads the configuration pair, constructs the forwarder and the document
//! stores once, and serves the HTTP surface until interrupted.

use anyhow::Result;
use chatlens_core::config::{ConfigManager, LoggingConfig};
use chatlens_core::forwarder::CompletionForwarder;
use chatlens_server::{shutdown_signal, AppState, ChatLensServer, ServerConfig};
use clap::Parser;
use log::LevelFilter;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[clap(author, version, about = "chatlens - debugging proxy for chat-completion APIs")]
struct Cli {
    #[clap(
        long,
        short,
        default_value = "config/config.yaml",
        help = "Path to the application configuration file"
    )]
    config: String,

    #[clap(
        long,
        help = "Bind address (overrides host/port from the configuration, e.g. 127.0.0.1:8080)"
    )]
    bind_addr: Option<String>,

    #[clap(long, short, help = "Log level (overrides the configuration)")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = ConfigManager::load(&cli.config).await?;
    init_logging(cli.log_level.as_deref(), settings.app_config().logging.as_ref())?;

    log::info!("configuration loaded from {}", cli.config);
    log::info!(
        "upstream provider: {} (model {})",
        settings.model_config().provider_url,
        settings.model_config().model_name
    );

    let forwarder =
        CompletionForwarder::new(settings.model_config(), Some(settings.app_config()));

    let bind_addr = match cli.bind_addr {
        Some(addr) => addr,
        None => format!(
            "{}:{}",
            settings.app_config().host(),
            settings.app_config().port()
        ),
    };
    let bind_socket_addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind_addr, e))?;

    let server_config = ServerConfig::default().with_bind_addr(bind_socket_addr);
    let state = AppState::new(forwarder, settings, server_config)?;
    let server = ChatLensServer::new(state);

    log::info!("starting chatlens server on {}...", bind_socket_addr);
    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        log::error!("server failed: {}", e);
        return Err(e.into());
    }

    log::info!("chatlens server shut down gracefully.");
    Ok(())
}

/// Initialize env_logger from the CLI flag and the config's logging section.
/// An explicit CLI level wins; a configured log file replaces the console
/// when `console` is disabled.
fn init_logging(cli_level: Option<&str>, logging: Option<&LoggingConfig>) -> Result<()> {
    let level = cli_level
        .map(str::to_string)
        .or_else(|| logging.map(|l| l.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let filter = level.parse().unwrap_or(LevelFilter::Info);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(filter);

    if let Some(logging) = logging {
        if let (Some(file), false) = (&logging.file, logging.console) {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut options = std::fs::OpenOptions::new();
            options.create(true);
            if logging.append {
                options.append(true);
            } else {
                options.write(true).truncate(true);
            }
            let file = options.open(file)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    builder.init();
    Ok(())
}
