//! HT (802.11n) Operation element.
//!
//! Payload layout (22 bytes): the primary channel, a 40-bit HT Operation
//! Information field, then the 16-byte basic HT-MCS set. Bits of the
//! information field are numbered from the least significant bit of byte 1.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::InformationElement;

/// Decoded HT Operation element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtOperationElement {
    pub primary_channel: u8,
    /// 0 = none, 1 = above, 3 = below.
    pub secondary_channel_offset: u8,
    /// True if any channel width is allowed, false for 20 MHz only.
    pub sta_channel_width: bool,
    pub rifs_mode: bool,
    pub ht_protection: u8,
    pub nongreenfield_ht_stas_present: bool,
    pub obss_non_ht_stas_present: bool,
    pub channel_center_frequency_segment2: u8,
    pub dual_beacon: bool,
    pub dual_cts_protection: bool,
    pub stbc_beacon: bool,
    pub basic_ht_mcs_set: [u8; 16],
}

impl InformationElement for HtOperationElement {
    const NAME: &'static str = "HT Operation";
    const LEN: usize = 22;

    fn from_payload(payload: &[u8]) -> Self {
        let mut info_bytes = [0u8; 8];
        info_bytes[..5].copy_from_slice(&payload[1..6]);
        let info = u64::from_le_bytes(info_bytes);
        let bit = |n: u32| (info >> n) & 1 == 1;

        let mut basic_ht_mcs_set = [0u8; 16];
        basic_ht_mcs_set.copy_from_slice(&payload[6..22]);

        Self {
            primary_channel: payload[0],
            secondary_channel_offset: (info & 0b11) as u8,
            sta_channel_width: bit(2),
            rifs_mode: bit(3),
            ht_protection: ((info >> 8) & 0b11) as u8,
            nongreenfield_ht_stas_present: bit(10),
            obss_non_ht_stas_present: bit(12),
            channel_center_frequency_segment2: ((info >> 13) & 0xff) as u8,
            dual_beacon: bit(30),
            dual_cts_protection: bit(31),
            stbc_beacon: bit(32),
            basic_ht_mcs_set,
        }
    }
}

impl fmt::Display for HtOperationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HtOperationElement[primary={}, secondaryOffset={}, width={}, protection={}, segment2={}]",
            self.primary_channel,
            self.secondary_channel_offset,
            self.sta_channel_width,
            self.ht_protection,
            self.channel_center_frequency_segment2
        )
    }
}
