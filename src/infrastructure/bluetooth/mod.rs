//! Bluetooth adapters

mod bluetoothctl;
mod scan;

pub use bluetoothctl::BluetoothctlGateway;
pub use scan::BluetoothctlScan;
