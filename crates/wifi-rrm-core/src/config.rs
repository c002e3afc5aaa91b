//! Configuration tree merging.
//!
//! Device configuration is assembled from layers: a fleet-wide default, then
//! zone (site) overrides, then per-device exceptions. Each layer is a JSON
//! object tree; layers are combined with a structural merge where nested
//! objects merge key by key and anything else in the overlay replaces the
//! base value outright.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mac::MacAddress;

/// A configuration tree: string keys mapping to scalars, arrays or subtrees.
pub type ConfigTree = Map<String, Value>;

/// Merge `overlay` into `base` in place.
///
/// Where both sides hold an object the merge recurses; otherwise the
/// overlay's value wins, including when the two sides have different types.
/// Keys present only in `base` are kept. Never fails.
pub fn merge_into(base: &mut ConfigTree, overlay: &ConfigTree) {
    for (key, value) in overlay {
        if let (Some(Value::Object(base_child)), Value::Object(overlay_child)) =
            (base.get_mut(key), value)
        {
            merge_into(base_child, overlay_child);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// Merge two trees, leaving both inputs untouched.
pub fn merge(base: &ConfigTree, overlay: &ConfigTree) -> ConfigTree {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay);
    merged
}

/// [`merge_into`] for arbitrary JSON values. Non-object overlays replace
/// the base.
pub fn merge_value(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => merge_into(base, overlay),
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Fleet, zone and device configuration layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayeredConfig {
    /// Applies to every device.
    pub fleet: ConfigTree,
    /// Overrides per zone name.
    pub zones: BTreeMap<String, ConfigTree>,
    /// Overrides per device.
    pub devices: BTreeMap<MacAddress, ConfigTree>,
}

impl LayeredConfig {
    pub fn new(fleet: ConfigTree) -> Self {
        Self {
            fleet,
            ..Self::default()
        }
    }

    /// Merge an override into a zone's layer.
    pub fn apply_zone(&mut self, zone: &str, overlay: &ConfigTree) {
        merge_into(self.zones.entry(zone.to_string()).or_default(), overlay);
    }

    /// Merge an override into a device's layer.
    pub fn apply_device(&mut self, device: MacAddress, overlay: &ConfigTree) {
        merge_into(self.devices.entry(device).or_default(), overlay);
    }

    /// Effective configuration: fleet, then zone, then device.
    /// Layers that do not exist are skipped.
    pub fn effective(&self, zone: Option<&str>, device: Option<&MacAddress>) -> ConfigTree {
        let mut tree = self.fleet.clone();
        if let Some(layer) = zone.and_then(|z| self.zones.get(z)) {
            merge_into(&mut tree, layer);
        }
        if let Some(layer) = device.and_then(|d| self.devices.get(d)) {
            merge_into(&mut tree, layer);
        }
        tree
    }
}
