//! Device domain module

mod audio_device;
mod bluetooth_device;
mod mac;
mod sink;
mod volume;

pub use audio_device::{placeholder_id, AudioDevice, ConnectionState, PLACEHOLDER_ID_PREFIX};
pub use bluetooth_device::BluetoothDevice;
pub use mac::MacAddress;
pub use sink::{Sink, BLUETOOTH_TRANSPORT_TAG};
pub use volume::{Volume, MAX_VOLUME_FRACTION};
