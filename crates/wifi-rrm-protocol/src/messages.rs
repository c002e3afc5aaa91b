//! Protocol message types.
//!
//! This module defines the JSON messages exchanged with the device gateway:
//! - Device → RRM: wifi scan reports
//! - RRM → Device: scan requests and configuration pushes

use serde::{Deserialize, Serialize};
use wifi_rrm_core::ConfigTree;

// ============================================================================
// Scan Reports (Device → RRM)
// ============================================================================

/// A wifi scan report from one access point.
///
/// # Example
/// ```json
/// {
///   "serial": "aabbccddeeff",
///   "scan": [
///     {"bssid": "11:22:33:44:55:66", "ssid": "guest", "signal": -61,
///      "tsf": 8412345, "channel": 36, "frequency": 5180,
///      "vht_oper": "ACQAAAA="}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Serial number of the reporting device (its MAC address).
    pub serial: String,

    /// Neighbors seen in this scan.
    #[serde(default)]
    pub scan: Vec<ScanEntryResult>,
}

/// One neighbor as reported by the device, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEntryResult {
    pub bssid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,

    /// Signal strength in dBm.
    pub signal: i32,

    /// Device-local TSF counter, unknown epoch.
    #[serde(default)]
    pub tsf: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u16>,

    /// Center frequency in MHz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<u64>,

    /// Capability information field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<u16>,

    /// Base64 HT Operation element payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ht_oper: Option<String>,

    /// Base64 VHT Operation element payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vht_oper: Option<String>,
}

// ============================================================================
// Requests (RRM → Device)
// ============================================================================

/// Ask a device to run a wifi scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiScanRequest {
    pub serial_number: String,
    pub verbose: bool,
    pub active_scan: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<serde_json::Value>,
}

impl WifiScanRequest {
    /// A verbose passive scan, which returns decoded elements.
    pub fn verbose(serial_number: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            verbose: true,
            active_scan: false,
            selector: None,
        }
    }
}

/// Push an effective configuration to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequest {
    pub serial_number: String,
    /// Configuration revision, as Unix seconds.
    pub uuid: i64,
    pub configuration: ConfigTree,
    /// When to apply, as Unix seconds; 0 means now.
    #[serde(default)]
    pub when: i64,
}

impl ConfigureRequest {
    /// Request applying `configuration` now, stamped with the current time.
    pub fn now(serial_number: impl Into<String>, configuration: ConfigTree) -> Self {
        Self {
            serial_number: serial_number.into(),
            uuid: chrono::Utc::now().timestamp(),
            configuration,
            when: 0,
        }
    }
}
