//! Bluetooth peripheral record

use serde::{Deserialize, Serialize};

use super::MacAddress;

/// A paired or discovered Bluetooth peripheral, keyed by MAC address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothDevice {
    pub mac: MacAddress,
    /// Advertised name; empty when the device has not announced one
    pub name: String,
    /// Live connection status, only present when it was queried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

impl BluetoothDevice {
    pub fn new(mac: MacAddress, name: impl Into<String>) -> Self {
        Self {
            mac,
            name: name.into(),
            connected: None,
        }
    }

    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = Some(connected);
        self
    }

    /// Connected according to the last status query; unknown counts as offline
    pub fn is_connected(&self) -> bool {
        self.connected.unwrap_or(false)
    }
}
