//! # wifi-rrm-ingest
//!
//! Ingestion pipeline around the telemetry core: a single writer task that
//! normalizes scan reports into the shared device history, and a tokio
//! runtime with named worker threads to run it on.

pub mod ingest;
pub mod runtime;

pub use ingest::{
    now_ms, process_report, IngestConfig, IngestError, IngestEvent, IngestStats, Ingestor,
    ReportOutcome,
};
pub use runtime::worker_runtime;
pub use wifi_rrm_core::{DeviceHistoryCache, HistoryConfig, HistoryStore, MacAddress, ScanEntry};
