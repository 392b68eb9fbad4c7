//! CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};

/// Service address used by the client subcommands
pub const DEFAULT_URL: &str = "http://127.0.0.1:8080";

/// audio-control - control host audio sinks and Bluetooth audio devices
#[derive(Parser, Debug)]
#[command(name = "audio-control")]
#[command(version)]
#[command(about = "HTTP control plane for audio sinks and Bluetooth audio devices")]
#[command(long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Address of a running service
    #[arg(
        long,
        value_name = "URL",
        env = "AUDIO_CONTROL_URL",
        default_value = DEFAULT_URL,
        global = true
    )]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),
    /// List sinks and paired Bluetooth devices
    Devices,
    /// Show the default sink
    Active,
    /// Set the volume in percent
    Volume {
        /// Target level, 100 being nominal
        percent: f64,
        /// Sink id (defaults to the active device)
        #[arg(short = 'd', long, value_name = "ID")]
        device: Option<String>,
    },
    /// Make a sink the default output
    Select {
        /// Sink id
        id: String,
    },
    /// Scan for nearby Bluetooth devices
    Scan {
        /// Scan duration (e.g., 10s, 1m)
        #[arg(short = 'd', long, value_name = "TIME")]
        duration: Option<String>,
    },
    /// Pair, trust and connect a Bluetooth device
    Pair(DeviceArgs),
    /// Connect a paired Bluetooth device
    Connect(DeviceArgs),
    /// Connect the last connected Bluetooth device
    Reconnect,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `serve`
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen address (e.g., 0.0.0.0:8080)
    #[arg(short = 'b', long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Default Bluetooth scan duration (e.g., 15s)
    #[arg(long, value_name = "TIME")]
    pub scan_duration: Option<String>,

    /// How scans collect devices: streaming or snapshot
    #[arg(long, value_name = "MODE")]
    pub discovery_mode: Option<String>,
}

/// Target of `pair` and `connect`
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Device address (e.g., AA:BB:CC:DD:EE:FF)
    pub mac: String,

    /// Display name for logs
    #[arg(short = 'n', long, default_value = "")]
    pub name: String,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "bind",
    "scan_duration",
    "settle_delay",
    "discovery_mode",
    "remember_last_device",
    "tools.pactl",
    "tools.bluetoothctl",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
