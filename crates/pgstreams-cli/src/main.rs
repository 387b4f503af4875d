//! Streams API demo: logs every gateway event and reacts to scanned codes.

mod demo;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pgstreams_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT};
use pgstreams_gateway::{Gateway, GatewayConfig};
use tracing_subscriber::EnvFilter;

/// Talk to a ProGlove gateway over its serial Streams API.
#[derive(Parser, Debug)]
#[command(name = "pgstreams", version)]
struct Args {
    /// Logging level.
    #[arg(short = 'L', long, value_enum, default_value_t = LogLevel::Debug, value_name = "LEVEL")]
    logging_level: LogLevel,

    /// Serial baud rate.
    #[arg(short = 'b', long, default_value_t = DEFAULT_BAUD_RATE, value_name = "VALUE")]
    baudrate: u32,

    /// Path to the serial device (e.g. COM1, /dev/ttyACM0).
    #[arg(short = 'p', long, default_value = DEFAULT_PORT)]
    port: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.logging_level.directive())),
        )
        .with_ansi(true)
        .init();

    let config = GatewayConfig::new(&args.port).with_baud_rate(args.baudrate);
    let mut gateway = Gateway::new(config, demo::DemoHandler);

    gateway
        .start()
        .with_context(|| format!("failed to open gateway on {}", args.port))?;
    tracing::info!(port = %args.port, "gateway started, press Ctrl-C to exit");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    tracing::info!("shutting down");
    gateway.stop();

    Ok(())
}
