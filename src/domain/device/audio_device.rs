//! Merged audio device view

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BluetoothDevice, MacAddress, Sink, Volume};

/// Prefix of ids synthesized for paired devices that have no sink yet
pub const PLACEHOLDER_ID_PREFIX: &str = "bt_";

/// Whether a device can currently play audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Offline,
}

impl ConnectionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the merged device inventory: either a live sink or a
/// paired Bluetooth peripheral that has no sink yet.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDevice {
    pub id: String,
    pub display_name: String,
    pub volume: Volume,
    pub muted: bool,
    pub is_active: bool,
    pub is_bluetooth_backed: bool,
    pub connection_state: ConnectionState,
    pub mac_address: Option<MacAddress>,
}

impl AudioDevice {
    /// Device view of a live sink
    pub fn from_sink(sink: &Sink, is_active: bool) -> Self {
        Self {
            id: sink.id.clone(),
            display_name: sink.display_name.clone(),
            volume: sink.volume,
            muted: sink.muted,
            is_active,
            is_bluetooth_backed: sink.is_bluetooth(),
            connection_state: ConnectionState::Connected,
            mac_address: sink.embedded_mac(),
        }
    }

    /// Placeholder for a paired device the sound server does not list
    pub fn placeholder(device: &BluetoothDevice) -> Self {
        let connection_state = if device.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Offline
        };

        Self {
            id: placeholder_id(&device.mac),
            display_name: device.name.clone(),
            volume: Volume::MUTE,
            muted: false,
            is_active: false,
            is_bluetooth_backed: true,
            connection_state,
            mac_address: Some(device.mac.clone()),
        }
    }
}

/// Id synthesized for a sink-less paired device: `bt_AA_BB_CC_DD_EE_FF`
pub fn placeholder_id(mac: &MacAddress) -> String {
    format!("{}{}", PLACEHOLDER_ID_PREFIX, mac.to_underscored())
}
