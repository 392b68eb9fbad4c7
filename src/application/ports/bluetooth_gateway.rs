//! Bluetooth control port interfaces

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::device::{BluetoothDevice, MacAddress};
use crate::domain::duration::Duration;

/// Bluetooth tool errors
#[derive(Debug, Clone, Error)]
pub enum BluetoothGatewayError {
    #[error("Bluetooth control tool not found: {0}")]
    ToolNotFound(String),

    #[error("Failed to start Bluetooth control tool: {0}")]
    SpawnFailed(String),

    #[error("Bluetooth command failed: {0}")]
    CommandFailed(String),

    #[error("Failed to read scan output: {0}")]
    ReadFailed(String),
}

impl BluetoothGatewayError {
    /// Whether the Bluetooth subsystem could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ToolNotFound(_) | Self::SpawnFailed(_))
    }
}

/// Captured result of one tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Exited with status 0
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Raw diagnostic text: stderr when it has content, stdout otherwise
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// A running scan whose output is read line by line
#[async_trait]
pub trait ScanProcess: Send {
    /// Next line of output, or `None` once the process closed its output
    async fn next_line(&mut self) -> Result<Option<String>, BluetoothGatewayError>;

    /// Stop the scan process. Safe to call more than once.
    async fn terminate(&mut self) -> Result<(), BluetoothGatewayError>;
}

/// Port for the Bluetooth subsystem
#[async_trait]
pub trait BluetoothGateway: Send + Sync {
    /// Devices holding a pairing record
    async fn list_paired(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError>;

    /// Every device the Bluetooth daemon currently knows about
    async fn list_known(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError>;

    /// Live connection status of one device
    async fn query_connected(&self, mac: &MacAddress) -> Result<bool, BluetoothGatewayError>;

    /// Start discovery as a long-running process.
    ///
    /// # Arguments
    /// * `max` - Upper bound after which the tool stops scanning on its own
    async fn start_scan(&self, max: Duration) -> Result<Box<dyn ScanProcess>, BluetoothGatewayError>;

    /// Turn discovery off on the adapter
    async fn stop_scan(&self) -> Result<(), BluetoothGatewayError>;

    async fn pair(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError>;

    async fn trust(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError>;

    async fn connect(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError>;
}

#[async_trait]
impl<T: BluetoothGateway + ?Sized> BluetoothGateway for Arc<T> {
    async fn list_paired(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        self.as_ref().list_paired().await
    }

    async fn list_known(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        self.as_ref().list_known().await
    }

    async fn query_connected(&self, mac: &MacAddress) -> Result<bool, BluetoothGatewayError> {
        self.as_ref().query_connected(mac).await
    }

    async fn start_scan(&self, max: Duration) -> Result<Box<dyn ScanProcess>, BluetoothGatewayError> {
        self.as_ref().start_scan(max).await
    }

    async fn stop_scan(&self) -> Result<(), BluetoothGatewayError> {
        self.as_ref().stop_scan().await
    }

    async fn pair(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.as_ref().pair(mac).await
    }

    async fn trust(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.as_ref().trust(mac).await
    }

    async fn connect(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.as_ref().connect(mac).await
    }
}
