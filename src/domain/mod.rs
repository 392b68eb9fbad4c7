//! Domain layer - Core business logic
//!
//! Contains value objects, device correlation, discovery parsing, the
//! pairing state machine, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod correlation;
pub mod device;
pub mod discovery;
pub mod duration;
pub mod error;
pub mod pairing;

// Re-export common types
pub use config::AppConfig;
pub use correlation::correlate;
pub use device::{AudioDevice, BluetoothDevice, ConnectionState, MacAddress, Sink, Volume};
pub use discovery::{DiscoveredDevices, DiscoveryMode};
pub use duration::Duration;
pub use error::*;
pub use pairing::{PairingOutcome, PairingSession, PairingState, PairingStatus};
