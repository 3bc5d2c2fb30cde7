//! HTTP Server Binary for the Argus live view
//!
//! Runs the polling collector and the read-only HTTP API in one process:
//! the collector keeps the rolling store current while the API serves
//! snapshots and status to a dashboard.
//!
//! Usage:
//!   cargo run --bin http_server -- --host 0.0.0.0 --port 8050

use argus::client::{BmsApiClient, BmsEndpoint};
use argus::collector::{Collector, CollectorConfig};
use argus::config::Settings;
use argus::http::start_server;
use argus::sink::{InfluxSink, RecordSink};
use argus::store::RollingStore;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "Argus HTTP Server")]
#[command(about = "Live view API server for the Argus BMS collector", long_about = None)]
struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value = "8050")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    println!("Argus BMS Collector - HTTP API Server");
    println!();

    let settings = Settings::from_env()?;

    println!("Initializing collector...");
    println!("  BMS endpoint: {}", settings.bms_url);
    println!("  Poll interval: {}s", settings.poll_interval_secs);
    println!("  History capacity: {} points per sensor", settings.history_capacity);
    println!();

    let client = Arc::new(BmsApiClient::new(BmsEndpoint {
        url: settings.bms_url.clone(),
        bearer_token: settings.bms_token.clone(),
        installation_id: settings.installation_id.clone(),
        timeout_secs: settings.request_timeout_secs,
    })?);

    let store = Arc::new(RollingStore::with_filter(
        settings.history_capacity,
        settings.point_filter,
    ));

    let sink: Option<Arc<dyn RecordSink>> = match &settings.influx {
        Some(influx) => {
            println!("  Persistent sink: {}", influx.url);
            Some(Arc::new(InfluxSink::new(influx.clone())?))
        }
        None => {
            println!("  Persistent sink: disabled");
            None
        }
    };
    println!();

    let collector = Arc::new(Collector::new(
        CollectorConfig {
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            stale_after_intervals: settings.stale_after_intervals,
        },
        client,
        Arc::clone(&store),
        sink,
    ));

    // First poll happens immediately, so the first page view is never empty.
    let collector_task = Arc::clone(&collector);
    let poll_handle = tokio::spawn(async move {
        collector_task.run().await;
    });

    let addr = format!("{}:{}", args.host, args.port);
    println!("Starting HTTP server...");
    println!();

    // Set up graceful shutdown
    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C signal handler");
        println!();
        println!("Shutdown signal received, stopping server...");
    };

    // Run server with graceful shutdown
    tokio::select! {
        result = start_server(&addr, Arc::clone(&store), Arc::clone(&collector)) => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = shutdown_signal => {
            println!("Server shut down gracefully");
        }
    }

    // Let the in-flight cycle, if any, finish before exiting.
    collector.stop();
    let _ = poll_handle.await;

    Ok(())
}
