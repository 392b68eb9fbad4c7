//! CLI layer - Command-line interface
//!
//! Argument parsing, the HTTP client used by the client subcommands,
//! output formatting, signal handling and the command runners.

pub mod app;
pub mod args;
pub mod client;
pub mod config_cmd;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{run_client, run_serve, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, DeviceArgs, ServeArgs};
pub use client::{ClientError, ControlClient};
pub use presenter::Presenter;
