//! Discovery output parsing and deduplication
//!
//! `bluetoothctl` reports devices as lines such as
//! `[NEW] Device AA:BB:CC:DD:EE:FF Headset` while scanning, and as
//! `Device AA:BB:CC:DD:EE:FF Headset` when listing known devices. Both forms
//! go through [`parse_device_line`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::device::{BluetoothDevice, MacAddress};
use super::error::InvalidDiscoveryModeError;

/// How a scan collects devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiscoveryMode {
    /// Read the scan process output line by line for the whole window
    #[default]
    Streaming,
    /// Scan for the whole window, then list known devices once
    Snapshot,
}

impl DiscoveryMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Snapshot => "snapshot",
        }
    }
}

impl FromStr for DiscoveryMode {
    type Err = InvalidDiscoveryModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "streaming" | "stream" => Ok(Self::Streaming),
            "snapshot" => Ok(Self::Snapshot),
            _ => Err(InvalidDiscoveryModeError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal control sequences and readline markers emitted by interactive tools
static CONTROL_SEQUENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]|[\x01\x02\r]").expect("control sequence pattern is valid")
});

/// `[TAG] Device <MAC> <rest>` with an optional tag
static DEVICE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\[(?P<tag>[A-Z]+)\]\s+)?Device\s+(?P<mac>[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5})(?:\s+(?P<rest>.*))?$",
    )
    .expect("device line pattern is valid")
});

/// `Key: value` payload of a property-change notification
static PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<key>[A-Za-z][A-Za-z0-9 ]*):\s*(?P<value>.*)$")
        .expect("property pattern is valid")
});

/// Remove ANSI colour codes, carriage returns and readline markers
pub fn strip_control_sequences(line: &str) -> String {
    CONTROL_SEQUENCE.replace_all(line, "").into_owned()
}

/// Parse one line of tool output into a sighting.
///
/// Returns `None` for lines that do not mention a device, and for removal
/// notifications (`[DEL]`). Property changes (`[CHG] Device <MAC> RSSI: -60`)
/// yield the MAC with an empty name, except `Name:` and `Alias:` which carry
/// the new name.
pub fn parse_device_line(line: &str) -> Option<BluetoothDevice> {
    let clean = strip_control_sequences(line);
    let caps = DEVICE_LINE.captures(clean.trim())?;

    let tag = caps.name("tag").map(|m| m.as_str());
    if matches!(tag, Some(t) if t != "NEW" && t != "CHG") {
        return None;
    }

    let mac: MacAddress = caps.name("mac")?.as_str().parse().ok()?;
    let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or("");

    let name = if tag == Some("CHG") {
        match PROPERTY.captures(rest) {
            Some(prop) => match &prop["key"] {
                "Name" | "Alias" => prop["value"].trim().to_string(),
                _ => String::new(),
            },
            None => rest.to_string(),
        }
    } else {
        rest.to_string()
    };

    Some(BluetoothDevice::new(mac.clone(), display_name(name, &mac)))
}

/// Unnamed devices are listed under their address with dashes
fn display_name(name: String, mac: &MacAddress) -> String {
    if name.eq_ignore_ascii_case(&mac.as_str().replace(':', "-")) {
        String::new()
    } else {
        name
    }
}

/// Devices seen during one discovery run, in first-seen order.
#[derive(Debug, Default)]
pub struct DiscoveredDevices {
    devices: Vec<BluetoothDevice>,
    index: HashMap<MacAddress, usize>,
}

impl DiscoveredDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting. Returns `true` when the MAC was not seen before.
    ///
    /// A known MAC keeps its position and its first non-empty name.
    pub fn observe(&mut self, device: BluetoothDevice) -> bool {
        match self.index.get(&device.mac) {
            Some(&pos) => {
                let existing = &mut self.devices[pos];
                if existing.name.is_empty() && !device.name.is_empty() {
                    existing.name = device.name;
                }
                false
            }
            None => {
                self.index.insert(device.mac.clone(), self.devices.len());
                self.devices.push(device);
                true
            }
        }
    }

    /// Parse and record a raw output line
    pub fn observe_line(&mut self, line: &str) -> bool {
        parse_device_line(line).is_some_and(|device| self.observe(device))
    }

    /// Parse and record every line of a block of output
    pub fn observe_output(&mut self, output: &str) {
        for line in output.lines() {
            self.observe_line(line);
        }
    }

    /// Whether any recorded device still lacks a name
    pub fn has_unnamed(&self) -> bool {
        self.devices.iter().any(|d| d.name.is_empty())
    }

    /// Fill empty names of already recorded devices from a device listing.
    ///
    /// MACs not seen during the run are ignored.
    pub fn fill_names(&mut self, listing: impl IntoIterator<Item = BluetoothDevice>) {
        for device in listing {
            if device.name.is_empty() {
                continue;
            }
            if let Some(&pos) = self.index.get(&device.mac) {
                let existing = &mut self.devices[pos];
                if existing.name.is_empty() {
                    existing.name = device.name;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn into_devices(self) -> Vec<BluetoothDevice> {
        self.devices
    }
}
