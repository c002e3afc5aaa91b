//! # wifi-rrm-core
//!
//! Core telemetry normalization for access-point neighbor scans.
//!
//! This crate provides:
//! - Canonical MAC address identity (`mac`)
//! - Fixed-layout 802.11 Operation element decoders (`element`, `vht`, `ht`)
//! - The normalized scan entry model (`model`)
//! - A bounded, recency-ordered per-device history (`lru`, `history`)
//! - Structural config tree merging and layered overrides (`config`)
//!
//! This crate is intentionally runtime-agnostic and contains no async code
//! and no I/O, so it can sit behind any ingestion pipeline.

pub mod config;
pub mod element;
pub mod history;
pub mod ht;
pub mod lru;
pub mod mac;
pub mod model;
pub mod vht;

pub use config::{merge, merge_into, merge_value, ConfigTree, LayeredConfig};
pub use element::{decode, decode_base64, ElementError, InformationElement};
pub use history::{DeviceHistory, DeviceHistoryCache, HistoryConfig, HistoryStore};
pub use ht::HtOperationElement;
pub use mac::{MacAddress, MacParseError};
pub use model::ScanEntry;
pub use vht::{ChannelWidth, VhtOperationElement};
