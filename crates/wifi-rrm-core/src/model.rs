//! Normalized scan telemetry.
//!
//! A [`ScanEntry`] is one neighbor observation reported by an access point,
//! after its identity has been canonicalized and its operation elements
//! decoded. Entries are created once at ingestion and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ht::HtOperationElement;
use crate::mac::MacAddress;
use crate::vht::VhtOperationElement;

/// One neighbor observed in a device's wifi scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEntry {
    /// The neighbor radio's BSSID.
    pub bssid: MacAddress,

    /// Received signal strength in dBm.
    pub signal: i32,

    /// Device-local TSF counter. Its epoch differs per device, so it must
    /// never be used to order entries from different devices.
    pub tsf: u64,

    /// Wall-clock receive time in Unix milliseconds, assigned on ingestion.
    pub unix_time_ms: i64,

    /// Network name, if the neighbor broadcast one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,

    /// Primary channel reported alongside the scan result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u16>,

    /// Center frequency in MHz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,

    /// Milliseconds since the neighbor was last heard, as reported by the device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<u64>,

    /// Capability Information field from the neighbor's beacon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ht_oper: Option<HtOperationElement>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vht_oper: Option<VhtOperationElement>,
}

impl ScanEntry {
    /// Create an entry with only the required fields set.
    pub fn new(bssid: MacAddress, signal: i32, tsf: u64, unix_time_ms: i64) -> Self {
        Self {
            bssid,
            signal,
            tsf,
            unix_time_ms,
            ssid: None,
            channel: None,
            frequency: None,
            last_seen: None,
            capability: None,
            ht_oper: None,
            vht_oper: None,
        }
    }

    /// Attach a decoded VHT Operation element.
    pub fn with_vht_oper(mut self, vht_oper: VhtOperationElement) -> Self {
        self.vht_oper = Some(vht_oper);
        self
    }

    /// Attach a decoded HT Operation element.
    pub fn with_ht_oper(mut self, ht_oper: HtOperationElement) -> Self {
        self.ht_oper = Some(ht_oper);
        self
    }

    /// Whether the neighbor advertises privacy (bit 4 of the capability field).
    pub fn is_protected(&self) -> Option<bool> {
        self.capability.map(|cap| cap & (1 << 4) != 0)
    }

    /// Best known primary channel: the reported channel, else the one
    /// carried in the operation elements.
    pub fn primary_channel(&self) -> Option<u16> {
        self.channel
            .or_else(|| self.ht_oper.map(|ht| u16::from(ht.primary_channel)))
            .or_else(|| self.vht_oper.map(|vht| u16::from(vht.channel1)))
    }
}

impl fmt::Display for ScanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScanEntry[signal={}, bssid={}, unixTimeMs={}]",
            self.signal, self.bssid, self.unix_time_ms
        )
    }
}
