//! Canonical MAC address identity.
//!
//! Devices and neighbor BSSIDs show up in telemetry with whatever separator
//! style the reporting firmware prefers: `aa:bb:cc:dd:ee:ff`,
//! `aa-bb-cc-dd-ee-ff`, `aabb.ccdd.eeff` or twelve bare hex digits. All of
//! them parse to the same 48-bit [`MacAddress`], and every address formats
//! back to a single lowercase, colon-separated form.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Lowercase hex digits used when formatting addresses.
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Separators accepted (and ignored) when parsing.
const SEPARATORS: [char; 3] = [':', '-', '.'];

/// Number of hex digits in a 48-bit address.
const DIGIT_COUNT: usize = 12;

/// Largest value representable in 48 bits.
const MAX_VALUE: u64 = (1 << 48) - 1;

/// A 48-bit IEEE 802 MAC address.
///
/// Stored as an unsigned integer with the most significant octet first, so
/// ordering and hashing follow the numeric value of the address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(u64);

impl MacAddress {
    /// Parse an address from text.
    ///
    /// Separators (`:`, `-`, `.`) are stripped wherever they appear; the
    /// remaining characters must be exactly twelve hex digits in either case.
    pub fn parse(text: &str) -> Result<Self, MacParseError> {
        let mut value: u64 = 0;
        let mut count = 0usize;

        for (position, ch) in text.char_indices() {
            if SEPARATORS.contains(&ch) {
                continue;
            }
            let digit = ch
                .to_digit(16)
                .ok_or(MacParseError::InvalidDigit { ch, position })?;
            if count < DIGIT_COUNT {
                value = (value << 4) | u64::from(digit);
            }
            count += 1;
        }

        if count != DIGIT_COUNT {
            return Err(MacParseError::WrongDigitCount { count });
        }
        Ok(Self(value))
    }

    /// Build an address from its six octets, most significant first.
    pub fn from_octets(octets: [u8; 6]) -> Self {
        let mut buf = [0u8; 8];
        buf[2..].copy_from_slice(&octets);
        Self(u64::from_be_bytes(buf))
    }

    /// Build an address from its integer form.
    ///
    /// Returns `None` if the value does not fit in 48 bits.
    pub fn from_u64(value: u64) -> Option<Self> {
        (value <= MAX_VALUE).then_some(Self(value))
    }

    /// The address as a 48-bit integer.
    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// The six octets of the address, most significant first.
    pub fn octets(self) -> [u8; 6] {
        let bytes = self.0.to_be_bytes();
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&bytes[2..]);
        octets
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [b':'; 17];
        for (i, octet) in self.octets().iter().enumerate() {
            buf[i * 3] = HEX_DIGITS[usize::from(octet >> 4)];
            buf[i * 3 + 1] = HEX_DIGITS[usize::from(octet & 0x0f)];
        }
        let text = std::str::from_utf8(&buf).map_err(|_| fmt::Error)?;
        f.write_str(text)
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self::from_octets(octets)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}

/// Errors that can occur when parsing a MAC address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacParseError {
    /// The text did not contain exactly twelve hex digits.
    #[error("invalid MAC address: expected 12 hex digits, found {count}")]
    WrongDigitCount { count: usize },

    /// A character other than a hex digit or separator was found.
    #[error("invalid MAC address: unexpected character {ch:?} at offset {position}")]
    InvalidDigit { ch: char, position: usize },
}
