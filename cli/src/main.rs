//! Lumen CLI
//!
//! Runs the OTLP collector from the command line and optionally tails
//! incoming telemetry to stdout.
//!
//! # Usage
//!
//! ```bash
//! lumen serve
//! lumen serve --port 4317 --capacity 2000 --follow
//! ```

#![deny(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use collector::{Collector, CollectorConfig};
use std::sync::Arc;

/// Lumen - local OTLP telemetry collector
#[derive(Parser)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the OTLP gRPC collector
    Serve {
        /// Host address to bind
        #[arg(long, env = "LUMEN_HOST", default_value = "0.0.0.0")]
        host: String,

        /// OTLP gRPC port
        #[arg(short, long, env = "LUMEN_PORT", default_value_t = 4317)]
        port: u16,

        /// Ring buffer capacity per signal type
        #[arg(long, env = "LUMEN_CAPACITY", default_value_t = 1000)]
        capacity: usize,

        /// Print each received item to stdout as a JSON line
        #[arg(long)]
        follow: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            capacity,
            follow,
        }) => serve(host, port, capacity, follow).await,
        None => {
            println!("Lumen v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

async fn serve(host: String, port: u16, capacity: usize, follow: bool) -> Result<()> {
    let config = CollectorConfig {
        host,
        port,
        trace_capacity: capacity,
        metric_capacity: capacity,
        log_capacity: capacity,
        ..CollectorConfig::default()
    };

    let collector = Arc::new(Collector::new(config));

    if follow {
        let gate = Arc::clone(&collector);
        collector.on_event(Box::new(move |event| {
            if gate.is_streaming() {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "failed to encode event"),
                }
            }
        }));
        collector.start_streaming();
    }

    let addr = collector.start().await?;
    tracing::info!(%addr, "collector running, press Ctrl+C to stop");

    shutdown_signal().await;

    collector.stop().await?;

    let stats = collector.stats();
    tracing::info!(
        traces = stats.trace_count,
        metrics = stats.metric_count,
        logs = stats.log_count,
        "final buffer counts"
    );

    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
