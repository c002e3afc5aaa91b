//! # wifi-rrm-protocol
//!
//! Message types exchanged with the device gateway and the codec that turns
//! raw scan reports into normalized [`wifi_rrm_core::ScanEntry`] values.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;
