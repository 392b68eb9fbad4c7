//! Request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::device::{AudioDevice, BluetoothDevice, ConnectionState};

/// Wire form of [`AudioDevice`], volume as a whole percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDeviceDto {
    pub id: String,
    pub display_name: String,
    pub volume_percent: u32,
    pub muted: bool,
    pub is_active: bool,
    pub is_bluetooth_backed: bool,
    pub connection_state: ConnectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

impl From<&AudioDevice> for AudioDeviceDto {
    fn from(device: &AudioDevice) -> Self {
        Self {
            id: device.id.clone(),
            display_name: device.display_name.clone(),
            volume_percent: device.volume.percent(),
            muted: device.muted,
            is_active: device.is_active,
            is_bluetooth_backed: device.is_bluetooth_backed,
            connection_state: device.connection_state,
            mac_address: device.mac_address.as_ref().map(|mac| mac.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceListResponse {
    pub devices: Vec<AudioDeviceDto>,
}

impl DeviceListResponse {
    pub fn from_devices(devices: &[AudioDevice]) -> Self {
        Self {
            devices: devices.iter().map(AudioDeviceDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRequest {
    /// Target level in percent
    pub volume: f64,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeResponse {
    pub status: String,
    pub volume: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectRequest {
    pub device_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectResponse {
    pub status: String,
    /// Playing streams moved onto the new default sink
    #[serde(default)]
    pub moved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BluetoothRequest {
    pub mac: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanQuery {
    /// `15s`, `1m30s` or plain seconds
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub devices: Vec<BluetoothDevice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub bluetooth_busy: bool,
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    /// Pairing status, present for failed pair and connect attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
