//! Decode contract for fixed-layout 802.11 information elements.
//!
//! Scan results carry element payloads either as raw bytes or as base64 text.
//! Every element subtype has a fixed payload length; a payload of any other
//! length is malformed. Byte values themselves are never range checked: all
//! values 0-255 are legal and are always read as unsigned.
//!
//! Decoding holds no shared state and base64 input is decoded into a stack
//! buffer, so many elements can be decoded concurrently without allocation.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use thiserror::Error;

/// Largest payload any supported element declares.
const MAX_ELEMENT_LEN: usize = 64;

/// Standard alphabet; trailing `=` padding is optional.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A fixed-layout information element payload.
pub trait InformationElement: Sized {
    /// Human-readable element name used in error messages.
    const NAME: &'static str;

    /// Exact payload length in bytes.
    const LEN: usize;

    /// Build the element from a payload.
    ///
    /// Callers go through [`decode`], which guarantees `payload.len() == Self::LEN`.
    fn from_payload(payload: &[u8]) -> Self;
}

/// Errors produced when an element payload cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The decoded payload has the wrong length for this element.
    #[error("malformed {element} element: expected {expected} bytes, got {actual}")]
    WrongLength {
        element: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The payload text is not valid base64.
    #[error("malformed {element} element: invalid base64 ({reason})")]
    InvalidBase64 {
        element: &'static str,
        reason: String,
    },
}

/// Decode an element from its raw payload bytes.
pub fn decode<E: InformationElement>(payload: &[u8]) -> Result<E, ElementError> {
    if payload.len() != E::LEN {
        return Err(ElementError::WrongLength {
            element: E::NAME,
            expected: E::LEN,
            actual: payload.len(),
        });
    }
    Ok(E::from_payload(payload))
}

/// Decode an element from base64 payload text.
pub fn decode_base64<E: InformationElement>(text: &str) -> Result<E, ElementError> {
    let text = text.trim();
    let invalid = |err: &dyn std::fmt::Display| ElementError::InvalidBase64 {
        element: E::NAME,
        reason: err.to_string(),
    };

    let mut buf = [0u8; MAX_ELEMENT_LEN];
    if base64::decoded_len_estimate(text.len()) > buf.len() {
        // Far too long for any element; decode on the heap only to report the length.
        let bytes = PAYLOAD_ENGINE.decode(text).map_err(|e| invalid(&e))?;
        return decode(&bytes);
    }

    let len = PAYLOAD_ENGINE.decode_slice(text, &mut buf).map_err(|e| invalid(&e))?;
    decode(&buf[..len])
}
