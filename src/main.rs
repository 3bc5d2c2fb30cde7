//! Argus - Live BMS telemetry collector daemon
//!
//! Polls the configured BMS REST endpoint on a fixed interval, keeps a
//! bounded rolling history per point in memory, and optionally forwards
//! every batch to InfluxDB. Configuration comes from the environment; see
//! the config module docs for the variable list.
//!
//! Usage:
//!   argus                     Run the polling loop until Ctrl+C
//!   argus --once              Run a single poll cycle and exit
//!   argus --snapshot out.json Fetch once, write a JSON snapshot, and exit

use argus::client::{BmsApiClient, BmsEndpoint};
use argus::collector::{Collector, CollectorConfig};
use argus::config::Settings;
use argus::sink::{InfluxSink, RecordSink};
use argus::store::RollingStore;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "argus")]
#[command(about = "Argus - Live BMS telemetry collector")]
struct Args {
    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Fetch once, write a JSON snapshot to the given file, and exit
    #[arg(long)]
    snapshot: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let settings = Settings::from_env()?;

    let client = Arc::new(BmsApiClient::new(BmsEndpoint {
        url: settings.bms_url.clone(),
        bearer_token: settings.bms_token.clone(),
        installation_id: settings.installation_id.clone(),
        timeout_secs: settings.request_timeout_secs,
    })?);

    if let Some(path) = args.snapshot {
        println!("Fetching current data from {}...", settings.bms_url);
        let count = client.save_snapshot(&path).await?;
        println!("Saved {} points to {}", count, path);
        return Ok(());
    }

    println!("Argus BMS Collector");
    println!("===================\n");
    println!("Configuration:");
    println!("  BMS endpoint: {}", settings.bms_url);
    println!("  Installation: {}", settings.installation_id);
    println!("  Poll interval: {}s", settings.poll_interval_secs);
    println!("  History capacity: {} points per sensor", settings.history_capacity);
    println!("  Point filter: {:?}", settings.point_filter);
    println!(
        "  Persistent sink: {}",
        settings.influx.as_ref().map_or("disabled".to_string(), |cfg| cfg.url.clone())
    );
    println!();

    let store = Arc::new(RollingStore::with_filter(
        settings.history_capacity,
        settings.point_filter,
    ));

    let sink: Option<Arc<dyn RecordSink>> = match &settings.influx {
        Some(influx) => Some(Arc::new(InfluxSink::new(influx.clone())?)),
        None => None,
    };

    let collector = Arc::new(Collector::new(
        CollectorConfig {
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            stale_after_intervals: settings.stale_after_intervals,
        },
        client,
        Arc::clone(&store),
        sink,
    ));

    if args.once {
        collector.run_cycle().await;
        print_summary(&collector, &store);
        return Ok(());
    }

    let collector_for_signal = Arc::clone(&collector);
    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C, stopping...");
        collector_for_signal.stop();
    })?;

    println!("Press Ctrl+C to stop gracefully\n");
    collector.run().await;

    print_summary(&collector, &store);
    Ok(())
}

fn print_summary(collector: &Collector, store: &RollingStore) {
    let metrics = collector.metrics();

    println!("\nCollector Summary");
    println!("=================");
    println!("Polls completed:  {}", metrics.polls_completed);
    println!("Polls failed:     {} ({:.1}% success)", metrics.polls_failed, metrics.poll_success_rate());
    println!("Points ingested:  {} ({:.1} per poll)", metrics.points_ingested, metrics.points_per_poll());
    println!("Points skipped:   {}", metrics.points_skipped);
    println!("Sink batches:     {}", metrics.sink_batches);
    println!("Sink errors:      {}", metrics.sink_errors);
    println!("Sensors tracked:  {}", store.series_count());
    println!("Elapsed time:     {:.2}s", metrics.elapsed_seconds);
}
