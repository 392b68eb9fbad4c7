//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio_gateway;
pub mod bluetooth_gateway;
pub mod config;
pub mod device_store;

// Re-export common types
pub use audio_gateway::{AudioGateway, AudioGatewayError};
pub use bluetooth_gateway::{BluetoothGateway, BluetoothGatewayError, CommandOutput, ScanProcess};
pub use config::ConfigStore;
pub use device_store::{LastDeviceStore, StoreError};
