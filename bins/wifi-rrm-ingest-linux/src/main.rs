use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wifi_rrm_core::{merge_value, ConfigTree, LayeredConfig, MacAddress};
use wifi_rrm_ingest::{worker_runtime, DeviceHistoryCache, IngestConfig, IngestEvent, Ingestor};
use wifi_rrm_protocol::{
    encode_configure_request, encode_scan_request, ConfigureRequest, ScanEntryResult, ScanReport,
    WifiScanRequest,
};

/// Simulated access points reporting scans.
const DEMO_DEVICES: [&str; 3] = ["02:00:00:00:0a:01", "02:00:00:00:0a:02", "02:00:00:00:0a:03"];

/// Neighbor BSSIDs with the VHT operation element each one advertises.
const DEMO_NEIGHBORS: [(&str, &str); 4] = [
    ("74:83:c2:10:00:01", "AToAUAE="),
    ("74:83:c2:10:00:02", "ASoAAAA="),
    ("74:83:c2:10:00:03", "AJUAAAA="),
    ("74:83:c2:10:00:04", "ACQAAAA="),
];

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,wifi_rrm_ingest=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(std::env::args().nth(1).as_deref())?;
    tracing::info!(
        "wifi-rrm ingest starting with {} workers, {} entries per device",
        config.worker_threads,
        config.history.per_device_capacity
    );

    let runtime = worker_runtime(&config)?;
    runtime.block_on(serve(config))
}

/// Defaults, with the JSON file at `path` merged over them.
fn load_config(path: Option<&str>) -> anyhow::Result<IngestConfig> {
    let mut value = serde_json::to_value(IngestConfig::default())?;
    if let Some(path) = path {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let overlay: Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {path}"))?;
        merge_value(&mut value, &overlay);
    }
    Ok(serde_json::from_value(value)?)
}

async fn serve(config: IngestConfig) -> anyhow::Result<()> {
    let ingestor = Ingestor::new(config);
    let event_tx = ingestor.event_sender();
    let history = ingestor.history();

    log_outbound_requests()?;

    let ingest_handle = tokio::spawn(ingestor.run());

    // Start demo data generator
    let demo_handle = tokio::spawn(async move {
        generate_demo_reports(event_tx).await;
    });

    // Stand-in for the RF model: read history on its own schedule
    let reader_handle = tokio::spawn(async move {
        summarize_history(history).await;
    });

    tracing::info!("wifi-rrm ingest ready");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        result = ingest_handle => {
            match result {
                Ok(stats) => tracing::warn!("Ingestor stopped: {:?}", stats),
                Err(e) => tracing::error!("Ingestor task failed: {}", e),
            }
        }
        _ = demo_handle => {
            tracing::warn!("Demo report generator stopped");
        }
        _ = reader_handle => {
            tracing::warn!("History reader stopped");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Log the requests a controller would publish towards the fleet.
fn log_outbound_requests() -> anyhow::Result<()> {
    let mut layers = LayeredConfig::new(tree(json!({
        "radios": {"5G": {"channel": "auto", "txPower": 20}},
        "rrm": {"enabled": true}
    })));
    layers.apply_zone("lobby", &tree(json!({"radios": {"5G": {"txPower": 14}}})));

    let device: MacAddress = DEMO_DEVICES[0].parse()?;
    layers.apply_device(device, &tree(json!({"radios": {"5G": {"channel": 149}}})));

    let effective = layers.effective(Some("lobby"), Some(&device));
    let request = ConfigureRequest::now(device.to_string(), effective);
    tracing::info!("Configure request: {}", encode_configure_request(&request)?);

    for serial in DEMO_DEVICES {
        let request = WifiScanRequest::verbose(serial);
        tracing::debug!("Scan request: {}", encode_scan_request(&request)?);
    }
    Ok(())
}

fn tree(value: Value) -> ConfigTree {
    match value {
        Value::Object(map) => map,
        _ => ConfigTree::new(),
    }
}

/// Generate demo scan reports
async fn generate_demo_reports(event_tx: mpsc::Sender<IngestEvent>) {
    let mut interval = tokio::time::interval(Duration::from_secs(2));
    let mut round: i32 = 0;

    loop {
        interval.tick().await;
        round = round.wrapping_add(1);

        for (d, serial) in DEMO_DEVICES.iter().enumerate() {
            let scan = DEMO_NEIGHBORS
                .iter()
                .enumerate()
                .map(|(n, (bssid, vht_oper))| ScanEntryResult {
                    bssid: bssid.to_string(),
                    ssid: Some(format!("demo-{n}")),
                    signal: -40 - (d as i32 * 7) - (n as i32 * 5) - (round % 6),
                    tsf: chrono::Utc::now().timestamp_micros().max(0) as u64,
                    channel: None,
                    frequency: None,
                    last_seen: Some(0),
                    capability: Some(if n % 2 == 0 { 0x0411 } else { 0x0401 }),
                    ht_oper: None,
                    vht_oper: Some(vht_oper.to_string()),
                })
                .collect();

            let report = ScanReport {
                serial: serial.to_string(),
                scan,
            };

            if event_tx.send(IngestEvent::ScanReport(report)).await.is_err() {
                tracing::warn!("Ingestor has gone away, stopping demo reports");
                return;
            }
        }
    }
}

async fn summarize_history(history: Arc<DeviceHistoryCache>) {
    let mut interval = tokio::time::interval(Duration::from_secs(10));

    loop {
        interval.tick().await;

        for (device, entries) in history.snapshot() {
            let neighbors: BTreeSet<_> = entries.iter().map(|e| e.bssid).collect();
            let strongest = entries.iter().max_by_key(|e| e.signal);
            match strongest {
                Some(entry) => tracing::info!(
                    "{}: {} entries from {} neighbors, strongest {} at {} dBm ({})",
                    device,
                    entries.len(),
                    neighbors.len(),
                    entry.bssid,
                    entry.signal,
                    entry
                        .vht_oper
                        .as_ref()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "no VHT".to_string())
                ),
                None => tracing::info!("{}: no neighbors", device),
            }
        }
    }
}
