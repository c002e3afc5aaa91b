//! Scan report ingestion.
//!
//! This module provides the ingestion loop that:
//! - Receives scan reports from the message-bus consumer
//! - Normalizes them into scan entries stamped with the receive time
//! - Writes them into the shared device history
//!
//! The loop is the only writer. Readers (the RF model, diagnostics) hold a
//! clone of the history handle and read it on their own schedule.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wifi_rrm_core::history::Evicted;
use wifi_rrm_core::{DeviceHistoryCache, HistoryConfig, HistoryStore};
use wifi_rrm_protocol::{decode_scan_report, to_scan_entries, CodecError, ScanReport};

/// Configuration for the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestConfig {
    /// Prefix for worker thread names.
    pub worker_name: String,
    /// Number of runtime worker threads.
    pub worker_threads: usize,
    /// Capacity of the event queue.
    pub queue_depth: usize,
    /// Device history sizing.
    pub history: HistoryConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            worker_name: "rrm-ingest".to_string(),
            worker_threads: 2,
            queue_depth: 1024,
            history: HistoryConfig::default(),
        }
    }
}

/// Errors raised by the ingestion pipeline itself.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to build worker runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Events that can be sent to the ingestor.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    /// An already-decoded scan report.
    ScanReport(ScanReport),
    /// Scan report JSON as delivered by the bus.
    RawScanReport(String),
}

/// Result of ingesting one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub accepted: usize,
    pub rejected: usize,
    pub dropped_elements: usize,
    pub evicted: usize,
}

/// Running totals over the life of an ingestor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub reports: u64,
    pub rejected_reports: u64,
    pub entries: u64,
    pub rejected_entries: u64,
    pub dropped_elements: u64,
    pub evictions: u64,
}

impl IngestStats {
    fn record(&mut self, outcome: &ReportOutcome) {
        self.reports += 1;
        self.entries += outcome.accepted as u64;
        self.rejected_entries += outcome.rejected as u64;
        self.dropped_elements += outcome.dropped_elements as u64;
        self.evictions += outcome.evicted as u64;
    }
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Normalize one report and write its entries into `store`.
///
/// Entries are processed independently: a rejected entry is logged and
/// skipped. Only a report whose device serial cannot be parsed is rejected
/// as a whole.
pub fn process_report<S: HistoryStore + ?Sized>(
    store: &S,
    report: &ScanReport,
    received_at_ms: i64,
) -> Result<ReportOutcome, CodecError> {
    let normalized = to_scan_entries(report, received_at_ms)?;
    let device = normalized.device;
    let mut outcome = ReportOutcome::default();

    for result in normalized.entries {
        let decoded = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Rejected scan entry from {}: {}", device, e);
                outcome.rejected += 1;
                continue;
            }
        };

        for e in &decoded.dropped_elements {
            warn!(
                "Dropped element for {} from {}: {}",
                decoded.entry.bssid, device, e
            );
        }
        outcome.dropped_elements += decoded.dropped_elements.len();

        match store.put(device, decoded.entry) {
            Evicted::Nothing => {}
            Evicted::Entry(old) => {
                debug!("Evicted {} from history of {}", old.bssid, device);
                outcome.evicted += 1;
            }
            Evicted::Device(dropped) => {
                debug!("Evicted history of device {}", dropped);
                outcome.evicted += 1;
            }
        }
        outcome.accepted += 1;
    }

    debug!(
        "Ingested report from {}: {} accepted, {} rejected",
        device, outcome.accepted, outcome.rejected
    );
    Ok(outcome)
}

/// The scan report ingestor.
pub struct Ingestor {
    config: IngestConfig,
    history: Arc<DeviceHistoryCache>,
    /// Channel for receiving events from the bus consumer.
    event_tx: mpsc::Sender<IngestEvent>,
    event_rx: mpsc::Receiver<IngestEvent>,
}

impl Ingestor {
    /// Create a new ingestor with an empty history.
    pub fn new(config: IngestConfig) -> Self {
        let history = Arc::new(DeviceHistoryCache::new(config.history.clone()));
        let (event_tx, event_rx) = mpsc::channel(config.queue_depth.max(1));

        Self {
            config,
            history,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for submitting events to the ingestor.
    pub fn event_sender(&self) -> mpsc::Sender<IngestEvent> {
        self.event_tx.clone()
    }

    /// Shared read handle on the device history.
    pub fn history(&self) -> Arc<DeviceHistoryCache> {
        self.history.clone()
    }

    /// Process events until every sender has been dropped.
    pub async fn run(self) -> IngestStats {
        let Ingestor {
            config,
            history,
            event_tx,
            mut event_rx,
        } = self;
        // Only external senders keep the loop alive.
        drop(event_tx);

        info!(
            "Scan ingestion started ({} entries per device, device limit {:?})",
            config.history.per_device_capacity, config.history.max_devices
        );
        let mut stats = IngestStats::default();

        while let Some(event) = event_rx.recv().await {
            let received_at_ms = now_ms();
            let report = match event {
                IngestEvent::ScanReport(report) => report,
                IngestEvent::RawScanReport(text) => match decode_scan_report(&text) {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("Dropping undecodable scan report: {}", e);
                        stats.rejected_reports += 1;
                        continue;
                    }
                },
            };

            match process_report(history.as_ref(), &report, received_at_ms) {
                Ok(outcome) => stats.record(&outcome),
                Err(e) => {
                    warn!("Dropping scan report: {}", e);
                    stats.rejected_reports += 1;
                }
            }
        }

        info!(
            "Scan ingestion stopped after {} reports ({} rejected)",
            stats.reports, stats.rejected_reports
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_rrm_core::MacAddress;
    use wifi_rrm_protocol::ScanEntryResult;

    fn result(bssid: &str, signal: i32) -> ScanEntryResult {
        ScanEntryResult {
            bssid: bssid.to_string(),
            ssid: None,
            signal,
            tsf: 0,
            channel: None,
            frequency: None,
            last_seen: None,
            capability: None,
            ht_oper: None,
            vht_oper: None,
        }
    }

    #[test]
    fn test_process_report_counts() {
        let store = DeviceHistoryCache::with_capacity(2);
        let mut bad_element = result("00:00:00:00:00:03", -70);
        bad_element.vht_oper = Some("AAAA".to_string());

        let report = ScanReport {
            serial: "aabbccddeeff".to_string(),
            scan: vec![
                result("00:00:00:00:00:01", -50),
                result("bogus", -60),
                result("00:00:00:00:00:02", -55),
                bad_element,
            ],
        };

        let outcome = process_report(&store, &report, 42).unwrap();
        assert_eq!(
            outcome,
            ReportOutcome {
                accepted: 3,
                rejected: 1,
                dropped_elements: 1,
                evicted: 1,
            }
        );

        let device = MacAddress::parse("aabbccddeeff").unwrap();
        let history = store.get(&device).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|e| e.unix_time_ms == 42));
    }

    #[test]
    fn test_process_report_bad_serial() {
        let store = DeviceHistoryCache::default();
        let report = ScanReport {
            serial: "ap-17".to_string(),
            scan: vec![result("00:00:00:00:00:01", -50)],
        };

        assert!(process_report(&store, &report, 0).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ingest_config_defaults() {
        let config: IngestConfig =
            serde_json::from_str(r#"{"workerName": "edge", "history": {"perDeviceCapacity": 16}}"#)
                .unwrap();
        assert_eq!(config.worker_name, "edge");
        assert_eq!(config.queue_depth, 1024);
        assert_eq!(config.history.per_device_capacity, 16);
        assert_eq!(config.history.max_devices, None);
    }
}
