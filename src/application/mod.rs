//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod bluetooth;
pub mod discovery;
pub mod gate;
pub mod inventory;
pub mod ports;
pub mod timeouts;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export use cases
pub use bluetooth::{BluetoothControlConfig, BluetoothControlError, BluetoothControlUseCase};
pub use discovery::{DiscoveryError, DiscoverySession};
pub use gate::{BluetoothGate, BluetoothPermit};
pub use inventory::{DeviceInventoryUseCase, InventoryError, VolumeChange};
pub use timeouts::{StepTimedOut, StepTimeouts};
