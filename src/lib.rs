//! audio-control - HTTP control plane for host audio
//!
//! Lists the sound server's sinks merged with paired Bluetooth devices,
//! sets volume and the default output, and discovers, pairs and connects
//! Bluetooth audio peripherals through `pactl` and `bluetoothctl`.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, device correlation, pairing state machine
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (pactl, bluetoothctl, files)
//! - **Server**: axum routes over the use cases
//! - **CLI**: Argument parsing, HTTP client, signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod server;
