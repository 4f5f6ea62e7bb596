use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use knx_bridge::{
    AddressCatalog, BridgeConfig, BusClient, ChangeDispatcher, DatatypeMap, EndpointRegistrar,
    ProjectFile, ProjectSource, StreamBus,
};
use knxbridge_sinks::{MetricSink, Output};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "knx_bridge=info,knxbridge_sinks=info";

#[derive(Parser, Debug)]
#[command(name = "knx-bridge")]
#[command(about = "Writes KNX group address value changes to a time-series sink")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project export listing the group addresses (overrides the config file)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Decoder table replacing the built-in one (overrides the config file)
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Telegram gateway address, host:port (overrides the config file)
    #[arg(long)]
    connect: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        BridgeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(project) = args.project {
        config.project_file = project;
    }
    if let Some(table) = args.table {
        config.datatype_table = Some(table);
    }
    if let Some(connect) = args.connect {
        config.bus.connect = Some(connect);
    }

    init_logging(config.log.json);
    run(config).await
}

fn init_logging(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    }
}

async fn run(config: BridgeConfig) -> Result<()> {
    let map = match &config.datatype_table {
        Some(path) => DatatypeMap::load(path)
            .with_context(|| format!("Failed to load decoder table {}", path.display()))?,
        None => DatatypeMap::builtin().context("Failed to load built-in decoder table")?,
    };
    info!(
        "Decoder table {}: {} datatypes, {} value kinds",
        map.version(),
        map.forward().len(),
        map.reverse().len()
    );

    let raw = ProjectFile::new(&config.project_file)
        .load()
        .context("Failed to load project export")?;
    let catalog = AddressCatalog::resolve(raw, &map);
    info!(
        "Resolved {} of {} group addresses",
        catalog.resolved_count(),
        catalog.len()
    );

    let mut bus = match &config.bus.connect {
        Some(addr) => StreamBus::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to telegram gateway {}", addr))?,
        None => StreamBus::stdin(),
    }
    .with_datatypes(&map);

    let summary = EndpointRegistrar::register(&catalog, &mut bus);
    if summary.registered == 0 {
        warn!("No endpoint was registered, nothing will be written");
    }

    let output = Output::from_config(&config.sink).context("Failed to create sink")?;
    info!("Writing metrics to {}", output.description());

    let dispatcher = ChangeDispatcher::builder(output)
        .workers(config.dispatch.workers)
        .queue_depth(config.dispatch.queue_depth)
        .build();

    let (events_tx, events_rx) = mpsc::channel(config.bus.event_buffer.max(1));
    let mut bus_task = bus.spawn(events_tx);
    let dispatch = dispatcher.start(events_rx);

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutting down");
            bus_task.abort();
        }
        _ = &mut bus_task => {
            info!("Bus closed, shutting down");
        }
    }

    let stats = dispatch.shutdown().await;
    info!("Wrote {} records, {} failed", stats.written, stats.failed);

    Ok(())
}
