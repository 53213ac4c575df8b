//! PlugSpot server
//!
//! ```sh
//! # Run with the default config (~/.config/plugspot/config.toml)
//! plugspot
//!
//! # Custom config path and port
//! plugspot --config /etc/plugspot/config.toml --api-port 8080
//!
//! # Validate the config without starting
//! plugspot --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use plugspot::config::{default_config_path, AppConfig};
use plugspot::server::{init_tracing, BoxError, ServerHandle, ServerOptions};

/// PlugSpot: peer-to-peer EV charger rental marketplace backend.
#[derive(Parser, Debug)]
#[command(
    name = "plugspot",
    version,
    about = "Peer-to-peer EV charger rental marketplace backend",
    long_about = "PlugSpot REST API: charger listings, bookings with Stripe payments, \
                  reviews and host payouts.\n\n\
                  Default config: ~/.config/plugspot/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PLUGSPOT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration in {}: {}", config_path.display(), e);
            std::process::exit(2);
        }
    };

    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Environment : {:?}", config.environment);
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Storage     : {:?} {}", config.database.backend, config.database.connection_url());
        println!("   Payments    : {:?}", config.payments.mode);
        println!("   Email       : {:?}", config.email.mode);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    info!(path = %config_path.display(), "Configuration loaded");

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.wait().await;
    Ok(())
}
