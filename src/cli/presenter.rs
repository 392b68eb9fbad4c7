//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::device::{BluetoothDevice, ConnectionState};
use crate::domain::pairing::{PairingOutcome, PairingStatus};
use crate::server::dto::AudioDeviceDto;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// One line per device, the active one marked
    pub fn devices(&self, devices: &[AudioDeviceDto]) {
        if devices.is_empty() {
            self.info("No audio devices");
            return;
        }
        for device in devices {
            self.output(&format_device(device));
        }
    }

    pub fn bluetooth_devices(&self, devices: &[BluetoothDevice]) {
        if devices.is_empty() {
            self.info("No Bluetooth devices found");
            return;
        }
        for device in devices {
            let name = if device.name.is_empty() {
                "(unnamed)".dimmed().to_string()
            } else {
                device.name.clone()
            };
            self.output(&format!("{}  {}", device.mac.as_str().cyan(), name));
        }
    }

    /// Report a pairing outcome; `partial` is a warning, not a failure
    pub fn outcome(&self, outcome: &PairingOutcome) {
        match outcome.status {
            PairingStatus::Ok => self.success(&outcome.message),
            PairingStatus::Partial => self.warn(&outcome.message),
            PairingStatus::Error => self.error(&outcome.message),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// `* WH-1000XM4  42%  [bluetooth]  (bluez_output...)`
pub fn format_device(device: &AudioDeviceDto) -> String {
    let marker = if device.is_active {
        "*".green().bold().to_string()
    } else {
        " ".to_string()
    };

    let mut tags = Vec::new();
    if device.is_bluetooth_backed {
        tags.push("bluetooth".to_string());
    }
    if device.muted {
        tags.push("muted".to_string());
    }
    if device.connection_state != ConnectionState::Connected {
        tags.push(device.connection_state.to_string());
    }
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", tags.join(", "))
    };

    format!(
        "{} {}  {:>3}%{}  ({})",
        marker,
        device.display_name,
        device.volume_percent,
        tags.as_str().yellow(),
        device.id.as_str().dimmed()
    )
}
