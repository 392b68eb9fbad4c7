//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces, driving the
//! `pactl` and `bluetoothctl` command line tools and local files.

pub mod audio;
pub mod bluetooth;
pub mod config;
pub mod process;
pub mod state;

// Re-export adapters
pub use audio::PactlAudioGateway;
pub use bluetooth::BluetoothctlGateway;
pub use config::XdgConfigStore;
pub use state::FileLastDeviceStore;
