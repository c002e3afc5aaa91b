//! Bounded per-device scan history.
//!
//! The cache keeps, for every reporting device, its most recent scan entries
//! in arrival order, up to a per-device capacity. Every report appends, so a
//! neighbor heard in successive scans leaves one entry per scan. Recency is
//! tracked at two levels: entries within a device's history, and devices
//! within the cache.
//! Reading or writing a device marks it most recently used; when a device
//! limit is configured, the least recently used device is dropped first.
//!
//! All locking is internal. One ingestion worker writes while any number of
//! readers take snapshots; each operation runs under a single lock, so an
//! eviction and the insertion that caused it are observed together.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::lru::LruCache;
use crate::mac::MacAddress;
use crate::model::ScanEntry;

/// Sizing for [`DeviceHistoryCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Maximum entries kept per device.
    pub per_device_capacity: usize,
    /// Maximum number of devices tracked. `None` means no limit.
    pub max_devices: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            per_device_capacity: 256,
            max_devices: None,
        }
    }
}

/// What a `put` pushed out of the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Evicted {
    Nothing,
    /// The device's least recently used entry.
    Entry(ScanEntry),
    /// A whole device history, when the device limit was reached.
    Device(MacAddress),
}

/// Scan history for a single device, keyed by arrival sequence.
#[derive(Debug, Clone)]
pub struct DeviceHistory {
    entries: LruCache<u64, ScanEntry>,
    next_seq: u64,
}

impl DeviceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            next_seq: 0,
        }
    }

    /// Append an entry.
    ///
    /// Returns the least recently used entry if the history was full.
    pub fn push(&mut self, entry: ScanEntry) -> Option<ScanEntry> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.put(seq, entry).map(|(_, evicted)| evicted)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity().unwrap_or(usize::MAX)
    }

    /// Copy of the history, most recently used first.
    pub fn entries(&self) -> Vec<ScanEntry> {
        self.entries.iter().map(|(_, entry)| entry.clone()).collect()
    }
}

/// Store of device scan histories.
pub trait HistoryStore: Send + Sync {
    /// Append an entry to a device's history, creating the history if needed.
    fn put(&self, device: MacAddress, entry: ScanEntry) -> Evicted;

    /// Snapshot of a device's history, most recent first. Marks the device
    /// most recently used.
    fn get(&self, device: &MacAddress) -> Option<Vec<ScanEntry>>;

    /// Like `get`, without touching recency.
    fn peek(&self, device: &MacAddress) -> Option<Vec<ScanEntry>>;

    /// Devices currently tracked, most recently used first.
    fn devices(&self) -> Vec<MacAddress>;
}

/// In-memory, bounded [`HistoryStore`].
#[derive(Debug)]
pub struct DeviceHistoryCache {
    config: HistoryConfig,
    devices: Mutex<LruCache<MacAddress, DeviceHistory>>,
}

impl DeviceHistoryCache {
    pub fn new(config: HistoryConfig) -> Self {
        let devices = match config.max_devices {
            Some(max) => LruCache::new(max),
            None => LruCache::unbounded(),
        };
        Self {
            config,
            devices: Mutex::new(devices),
        }
    }

    /// Cache with the given per-device capacity and no device limit.
    pub fn with_capacity(per_device_capacity: usize) -> Self {
        Self::new(HistoryConfig {
            per_device_capacity,
            ..HistoryConfig::default()
        })
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Number of devices tracked.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget a device's history.
    pub fn remove(&self, device: &MacAddress) -> Option<Vec<ScanEntry>> {
        self.lock().remove(device).map(|history| history.entries())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Every device's history, for periodic whole-fleet consumers.
    /// Does not touch recency.
    pub fn snapshot(&self) -> BTreeMap<MacAddress, Vec<ScanEntry>> {
        self.lock()
            .iter()
            .map(|(device, history)| (*device, history.entries()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<MacAddress, DeviceHistory>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DeviceHistoryCache {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryStore for DeviceHistoryCache {
    fn put(&self, device: MacAddress, entry: ScanEntry) -> Evicted {
        let mut devices = self.lock();

        if let Some(history) = devices.get_mut(&device) {
            return match history.push(entry) {
                Some(old) => Evicted::Entry(old),
                None => Evicted::Nothing,
            };
        }

        let mut history = DeviceHistory::new(self.config.per_device_capacity);
        history.push(entry);
        match devices.put(device, history) {
            Some((dropped, _)) => Evicted::Device(dropped),
            None => Evicted::Nothing,
        }
    }

    fn get(&self, device: &MacAddress) -> Option<Vec<ScanEntry>> {
        self.lock().get(device).map(DeviceHistory::entries)
    }

    fn peek(&self, device: &MacAddress) -> Option<Vec<ScanEntry>> {
        self.lock().peek(device).map(DeviceHistory::entries)
    }

    fn devices(&self) -> Vec<MacAddress> {
        self.lock().iter().map(|(device, _)| *device).collect()
    }
}
