//! Scan report codec.
//!
//! Decodes scan report JSON and normalizes each reported neighbor into a
//! [`ScanEntry`]. Failures are per item: a neighbor with an unreadable BSSID
//! is rejected on its own, and an element payload that fails to decode is
//! dropped from its entry while the rest of the entry is kept.

use thiserror::Error;
use wifi_rrm_core::{
    decode_base64, ElementError, HtOperationElement, MacAddress, MacParseError, ScanEntry,
    VhtOperationElement,
};

use crate::messages::{ConfigureRequest, ScanEntryResult, ScanReport, WifiScanRequest};

/// Errors that reject a whole message.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("Failed to decode message: {0}")]
    Json(#[from] serde_json::Error),

    /// The report's device serial is not a MAC address.
    #[error("Invalid device serial {serial:?}: {source}")]
    InvalidSerial {
        serial: String,
        #[source]
        source: MacParseError,
    },
}

/// Errors that reject a single scan entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("Invalid BSSID {bssid:?}: {source}")]
    InvalidBssid {
        bssid: String,
        #[source]
        source: MacParseError,
    },
}

/// A normalized entry plus any element payloads that had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntry {
    pub entry: ScanEntry,
    pub dropped_elements: Vec<ElementError>,
}

/// A scan report with its device identity resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReport {
    pub device: MacAddress,
    pub entries: Vec<Result<DecodedEntry, EntryError>>,
}

/// Decode a scan report from JSON text.
pub fn decode_scan_report(text: &str) -> Result<ScanReport, CodecError> {
    serde_json::from_str(text).map_err(CodecError::from)
}

/// Encode a scan request for the device gateway.
pub fn encode_scan_request(request: &WifiScanRequest) -> Result<String, CodecError> {
    serde_json::to_string(request).map_err(CodecError::from)
}

/// Encode a configuration push for the device gateway.
pub fn encode_configure_request(request: &ConfigureRequest) -> Result<String, CodecError> {
    serde_json::to_string(request).map_err(CodecError::from)
}

/// Normalize every entry of a report, stamping each with `received_at_ms`.
pub fn to_scan_entries(
    report: &ScanReport,
    received_at_ms: i64,
) -> Result<NormalizedReport, CodecError> {
    let device = MacAddress::parse(&report.serial).map_err(|source| CodecError::InvalidSerial {
        serial: report.serial.clone(),
        source,
    })?;

    let entries = report
        .scan
        .iter()
        .map(|result| to_scan_entry(result, received_at_ms))
        .collect();

    Ok(NormalizedReport { device, entries })
}

/// Normalize a single reported neighbor.
pub fn to_scan_entry(
    result: &ScanEntryResult,
    received_at_ms: i64,
) -> Result<DecodedEntry, EntryError> {
    let bssid = MacAddress::parse(&result.bssid).map_err(|source| EntryError::InvalidBssid {
        bssid: result.bssid.clone(),
        source,
    })?;

    let mut dropped_elements = Vec::new();
    let ht_oper = result
        .ht_oper
        .as_deref()
        .and_then(|text| keep_or_drop(decode_base64::<HtOperationElement>(text), &mut dropped_elements));
    let vht_oper = result
        .vht_oper
        .as_deref()
        .and_then(|text| keep_or_drop(decode_base64::<VhtOperationElement>(text), &mut dropped_elements));

    let entry = ScanEntry {
        ssid: result.ssid.clone(),
        channel: result.channel,
        frequency: result.frequency,
        last_seen: result.last_seen,
        capability: result.capability,
        ht_oper,
        vht_oper,
        ..ScanEntry::new(bssid, result.signal, result.tsf, received_at_ms)
    };

    Ok(DecodedEntry {
        entry,
        dropped_elements,
    })
}

fn keep_or_drop<E>(decoded: Result<E, ElementError>, dropped: &mut Vec<ElementError>) -> Option<E> {
    decoded.map_err(|err| dropped.push(err)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wifi_rrm_core::VhtOperationElement;

    const REPORT: &str = r#"{
        "serial": "AA-BB-CC-DD-EE-FF",
        "scan": [
            {"bssid": "11:22:33:44:55:66", "ssid": "guest", "signal": -61,
             "tsf": 8412345, "channel": 149, "frequency": 5745,
             "capability": 1041, "vht_oper": "AJUAAAA="},
            {"bssid": "not-a-mac", "signal": -70},
            {"bssid": "112233445567", "signal": -75, "vht_oper": "AJUA"}
        ]
    }"#;

    #[test]
    fn test_normalize_report() {
        let report = decode_scan_report(REPORT).unwrap();
        let normalized = to_scan_entries(&report, 1_700_000_000_123).unwrap();

        assert_eq!(normalized.device.to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(normalized.entries.len(), 3);

        let first = normalized.entries[0].as_ref().unwrap();
        assert!(first.dropped_elements.is_empty());
        assert_eq!(first.entry.bssid.to_string(), "11:22:33:44:55:66");
        assert_eq!(first.entry.signal, -61);
        assert_eq!(first.entry.tsf, 8_412_345);
        assert_eq!(first.entry.unix_time_ms, 1_700_000_000_123);
        assert_eq!(first.entry.ssid.as_deref(), Some("guest"));
        assert_eq!(first.entry.capability, Some(1041));
        assert_eq!(first.entry.is_protected(), Some(true));
        assert_eq!(
            first.entry.vht_oper,
            Some(VhtOperationElement::new(0, 149, 0, [0; 8]))
        );
        assert!(first.entry.ht_oper.is_none());
    }

    #[test]
    fn test_bad_bssid_rejects_only_that_entry() {
        let report = decode_scan_report(REPORT).unwrap();
        let normalized = to_scan_entries(&report, 0).unwrap();

        assert!(matches!(
            normalized.entries[1],
            Err(EntryError::InvalidBssid { ref bssid, .. }) if bssid == "not-a-mac"
        ));
        assert!(normalized.entries[0].is_ok());
        assert!(normalized.entries[2].is_ok());
    }

    #[test]
    fn test_malformed_element_is_dropped_not_fatal() {
        let report = decode_scan_report(REPORT).unwrap();
        let normalized = to_scan_entries(&report, 0).unwrap();

        let third = normalized.entries[2].as_ref().unwrap();
        assert!(third.entry.vht_oper.is_none());
        assert_eq!(
            third.dropped_elements,
            vec![ElementError::WrongLength {
                element: "VHT Operation",
                expected: 5,
                actual: 3
            }]
        );
    }

    #[test]
    fn test_invalid_serial_rejects_report() {
        let report = decode_scan_report(r#"{"serial": "gateway-1", "scan": []}"#).unwrap();
        let err = to_scan_entries(&report, 0).unwrap_err();
        assert!(matches!(err, CodecError::InvalidSerial { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            decode_scan_report("{not json"),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn test_encode_scan_request() {
        let json = encode_scan_request(&WifiScanRequest::verbose("aabbccddeeff")).unwrap();
        assert!(json.contains("\"serialNumber\":\"aabbccddeeff\""));
    }
}
