//! Process entry point: loads configuration for both services, wires the
//! I->T event channel between them, and drives everything on one
//! multi-thread `tokio` runtime. Mirrors `andreypfau-mcrs`'s
//! root-package-as-binary plus `crates/*`-workspace shape.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worldmap_config::{IngestConfig, TileConfig};
use worldmap_ingest::{run_session, TcpUpstreamRelay};
use worldmap_viewer::{accept_loop, bind, read_client_messages, FanOutLoop};
use worldmap_world::World;

/// Reconnect/disconnect grace period after which a viewer's delivery state
/// is garbage-collected (§5's "bounded retention" rule). Not itself a
/// config knob in §6.4/§6.5, so it lives here rather than in
/// `worldmap-config`.
const VIEWER_GC_GRACE: Duration = Duration::from_secs(5 * 60);
const GC_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "worldmap-server", about = "Ingests a live world session and fans out rendered tiles to viewers")]
struct Cli {
    /// Path to the ingest service's TOML config (§6.4).
    #[arg(long, default_value = "ingest.toml")]
    ingest_config: PathBuf,

    /// Path to the tile service's TOML config (§6.5).
    #[arg(long, default_value = "tile.toml")]
    tile_config: PathBuf,
}

fn monotonic_now(epoch: Instant) -> u64 {
    epoch.elapsed().as_millis() as u64
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let ingest_config: IngestConfig = worldmap_config::load(&cli.ingest_config)?;
    ingest_config.validate()?;
    let tile_config: TileConfig = worldmap_config::load(&cli.tile_config)?;
    tile_config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&tile_config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let epoch = Instant::now();

    let (event_tx, mut event_rx) = mpsc::channel(1024);

    if ingest_config.relay.enabled {
        let relay = TcpUpstreamRelay::new(ingest_config.relay.host.clone(), ingest_config.relay.port);
        let world = World::new();
        let events = event_tx.clone();
        tokio::spawn(async move {
            run_session(relay, world, events).await;
        });
        info!(host = %ingest_config.relay.host, port = ingest_config.relay.port, "ingest session started");
    } else {
        warn!("relay disabled in config, tile service will run with no upstream data");
    }

    let mut fanout = FanOutLoop::new(tile_config.cache_size, tile_config.batch_size)?;

    let listener = bind(("0.0.0.0", tile_config.port)).await?;
    info!(port = tile_config.port, "viewer listener bound");
    let (conn_tx, mut conn_rx) = mpsc::channel(256);
    tokio::spawn(accept_loop(listener, conn_tx, 0));

    // A plain TCP viewer has no stable identity of its own in §6.3's
    // message set, so `conn_id` doubles as `client_id` here; embedders with
    // a real identity source can call `FanOutLoop::reconnect_viewer` directly.
    let (disconnect_tx, mut disconnect_rx) = mpsc::channel(256);

    let mut tick_interval = tokio::time::interval(Duration::from_millis(tile_config.tick_interval_ms));
    let mut gc_interval = tokio::time::interval(GC_SWEEP_INTERVAL);

    loop {
        tokio::select! {
            Some((conn_id, transport, read_half)) = conn_rx.recv() => {
                let now = monotonic_now(epoch);
                fanout.connect_viewer(conn_id, Box::new(transport), conn_id, now);
                let disconnects = disconnect_tx.clone();
                tokio::spawn(async move {
                    read_client_messages(read_half, conn_id).await;
                    let _ = disconnects.send(conn_id).await;
                });
            }
            Some(conn_id) = disconnect_rx.recv() => {
                fanout.disconnect_viewer(conn_id);
            }
            Some(event) = event_rx.recv() => {
                let now = monotonic_now(epoch);
                fanout.handle_ingest_event(event, now).await;
            }
            _ = tick_interval.tick() => {
                let now = monotonic_now(epoch);
                fanout.tick(now).await;
            }
            _ = gc_interval.tick() => {
                let now = monotonic_now(epoch);
                fanout.gc_old_sent(now, VIEWER_GC_GRACE.as_millis() as u64);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
