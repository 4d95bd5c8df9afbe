//! klipper-mcp: MCP server for inspecting Klipper 3D printers
//!
//! Parses printer configuration, reads logs and reports printer status
//! through the Moonraker API. All tools are read-only.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use klipper_mcp::config;
use klipper_mcp::mcp::server::McpServer;
use klipper_mcp::mcp::tools::ToolHandler;
use klipper_mcp::moonraker::MoonrakerClient;

/// MCP server for inspecting Klipper 3D printers.
///
/// Exposes configuration parsing, validation, logs and printer status
/// from a Moonraker instance as tools for AI assistants.
#[derive(Parser, Debug)]
#[command(name = "klipper-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Moonraker base URL, overriding the config file and MOONRAKER_URL
    #[arg(long, value_name = "URL")]
    moonraker_url: Option<String>,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. stdout belongs to the protocol.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(args: &Args) -> Result<config::Config, klipper_mcp::error::ConfigError> {
    let mut cfg = config::load_config(args.config.as_deref())?;
    if let Some(url) = &args.moonraker_url {
        cfg.moonraker.url.clone_from(url);
        cfg.validate()?;
    }
    Ok(cfg)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = match load(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if args.config.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig is read from: {}", default_path.display());
                    eprintln!("See config/example-config.json");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // GPLv3 Section 5d notice
    eprintln!(
        "klipper-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        moonraker = %cfg.moonraker.url,
        timeout_secs = cfg.moonraker.timeout_secs,
        "Starting klipper-mcp server"
    );

    let client = match MoonrakerClient::new(&cfg.moonraker) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create Moonraker client");
            return ExitCode::FAILURE;
        }
    };

    let mut server = McpServer::new(ToolHandler::new(client, cfg.logs.default_lines));

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!("MCP server ready, waiting for client connection...");

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
