//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::discovery::DiscoveryMode;
use crate::domain::duration::Duration;

/// Default listen address of the HTTP service
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// External tool locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub pactl: Option<String>,
    pub bluetoothctl: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind: Option<String>,
    pub scan_duration: Option<String>,
    pub settle_delay: Option<String>,
    pub discovery_mode: Option<String>,
    pub remember_last_device: Option<bool>,
    pub tools: Option<ToolsConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            bind: Some(DEFAULT_BIND.to_string()),
            scan_duration: Some(Duration::default_scan_duration().to_string()),
            settle_delay: Some(Duration::default_settle_delay().to_string()),
            discovery_mode: Some(DiscoveryMode::default().to_string()),
            remember_last_device: Some(true),
            tools: Some(ToolsConfig {
                pactl: Some("pactl".to_string()),
                bluetoothctl: Some("bluetoothctl".to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            bind: other.bind.or(self.bind),
            scan_duration: other.scan_duration.or(self.scan_duration),
            settle_delay: other.settle_delay.or(self.settle_delay),
            discovery_mode: other.discovery_mode.or(self.discovery_mode),
            remember_last_device: other.remember_last_device.or(self.remember_last_device),
            tools: Self::merge_tools_config(self.tools, other.tools),
        }
    }

    fn merge_tools_config(
        base: Option<ToolsConfig>,
        other: Option<ToolsConfig>,
    ) -> Option<ToolsConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(ToolsConfig {
                pactl: o.pactl.or(b.pactl),
                bluetoothctl: o.bluetoothctl.or(b.bluetoothctl),
            }),
        }
    }

    /// Get bind address, or the default if not set
    pub fn bind_or_default(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    /// Get scan duration, or default if not set/invalid
    pub fn scan_duration_or_default(&self) -> Duration {
        self.scan_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_scan_duration)
            .clamp_scan()
    }

    /// Get settle delay, or default if not set/invalid
    pub fn settle_delay_or_default(&self) -> Duration {
        self.settle_delay
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_settle_delay)
    }

    /// Get discovery mode, or streaming if not set/invalid
    pub fn discovery_mode_or_default(&self) -> DiscoveryMode {
        self.discovery_mode
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get remember_last_device setting, or true if not set
    pub fn remember_last_device_or_default(&self) -> bool {
        self.remember_last_device.unwrap_or(true)
    }

    /// Get the pactl executable, or "pactl" if not set
    pub fn pactl_or_default(&self) -> &str {
        self.tools
            .as_ref()
            .and_then(|t| t.pactl.as_deref())
            .unwrap_or("pactl")
    }

    /// Get the bluetoothctl executable, or "bluetoothctl" if not set
    pub fn bluetoothctl_or_default(&self) -> &str {
        self.tools
            .as_ref()
            .and_then(|t| t.bluetoothctl.as_deref())
            .unwrap_or("bluetoothctl")
    }
}
