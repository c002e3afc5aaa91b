//! VHT (802.11ac) Operation element.
//!
//! Payload layout (5 bytes):
//!
//! | byte | field |
//! |------|-------|
//! | 0    | channel width indicator |
//! | 1    | channel center frequency segment 0 (primary channel) |
//! | 2    | channel center frequency segment 1 (0 when unused) |
//! | 3-4  | basic VHT-MCS and NSS set, 2 bits per spatial stream |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::InformationElement;

/// Number of spatial streams described by the MCS map.
pub const MAX_SPATIAL_STREAMS: usize = 8;

/// Decoded VHT Operation element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VhtOperationElement {
    /// Raw channel width code. Unknown codes are kept as-is.
    pub channel_width_indicator: u8,
    /// Primary (segment 0) center channel number.
    pub channel1: u8,
    /// Segment 1 center channel number, 0 when unused.
    pub channel2: u8,
    /// MCS support tier (0-3) for 1 through 8 spatial streams.
    pub vht_mcs_for_nss: [u8; MAX_SPATIAL_STREAMS],
}

impl VhtOperationElement {
    /// Build an element from already-decoded field values.
    pub fn new(
        channel_width_indicator: u8,
        channel1: u8,
        channel2: u8,
        vht_mcs_for_nss: [u8; MAX_SPATIAL_STREAMS],
    ) -> Self {
        Self {
            channel_width_indicator,
            channel1,
            channel2,
            vht_mcs_for_nss,
        }
    }

    /// Interpret the width indicator.
    pub fn channel_width(&self) -> ChannelWidth {
        ChannelWidth::from(self.channel_width_indicator)
    }
}

impl InformationElement for VhtOperationElement {
    const NAME: &'static str = "VHT Operation";
    const LEN: usize = 5;

    fn from_payload(payload: &[u8]) -> Self {
        // Each MCS byte holds four 2-bit entries, first stream in the top pair.
        let mut vht_mcs_for_nss = [0u8; MAX_SPATIAL_STREAMS];
        for (i, mcs) in vht_mcs_for_nss.iter_mut().enumerate() {
            let byte = payload[3 + i / 4];
            let shift = 6 - 2 * (i % 4);
            *mcs = (byte >> shift) & 0b11;
        }

        Self {
            channel_width_indicator: payload[0],
            channel1: payload[1],
            channel2: payload[2],
            vht_mcs_for_nss,
        }
    }
}

impl fmt::Display for VhtOperationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VhtOperationElement[width={}, channel1={}, channel2={}, mcs={:?}]",
            self.channel_width_indicator, self.channel1, self.channel2, self.vht_mcs_for_nss
        )
    }
}

/// Channel width named by a VHT width indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelWidth {
    /// 20 or 40 MHz, as signalled by the HT Operation element.
    Mhz20Or40,
    /// 80, 160 or 80+80 MHz, told apart by the segment channels.
    Mhz80Plus,
    /// Any other code, passed through untouched.
    Unknown(u8),
}

impl From<u8> for ChannelWidth {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Mhz20Or40,
            1 => Self::Mhz80Plus,
            other => Self::Unknown(other),
        }
    }
}
