//! Sound-server sink record

use super::{MacAddress, Volume};

/// Substring in a sink's internal name marking a Bluetooth transport
pub const BLUETOOTH_TRANSPORT_TAG: &str = "bluez";

/// One output endpoint as reported by the sound server
#[derive(Debug, Clone, PartialEq)]
pub struct Sink {
    /// Internal sink name, unique per sound server
    pub id: String,
    /// Human-readable description
    pub display_name: String,
    pub volume: Volume,
    pub muted: bool,
}

impl Sink {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            volume: Volume::default(),
            muted: false,
        }
    }

    /// Whether the sink name carries the Bluetooth transport tag
    pub fn is_bluetooth(&self) -> bool {
        self.id.to_lowercase().contains(BLUETOOTH_TRANSPORT_TAG)
    }

    /// MAC embedded in a Bluetooth sink's name, if any.
    /// Non-Bluetooth sinks never yield a MAC.
    pub fn embedded_mac(&self) -> Option<MacAddress> {
        if !self.is_bluetooth() {
            return None;
        }
        MacAddress::find_in(&self.id)
    }
}
