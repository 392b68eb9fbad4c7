//! Last-device marker port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::device::MacAddress;

/// Marker storage errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Failed to read last device: {0}")]
    ReadFailed(String),

    #[error("Failed to write last device: {0}")]
    WriteFailed(String),
}

/// Port for the single-slot record of the last connected device
#[async_trait]
pub trait LastDeviceStore: Send + Sync {
    /// Load the stored MAC, `None` when nothing was stored or the record
    /// is unreadable as a MAC
    async fn load(&self) -> Result<Option<MacAddress>, StoreError>;

    /// Replace the stored MAC
    async fn save(&self, mac: &MacAddress) -> Result<(), StoreError>;
}

/// Blanket implementation for boxed store types
#[async_trait]
impl LastDeviceStore for Box<dyn LastDeviceStore> {
    async fn load(&self) -> Result<Option<MacAddress>, StoreError> {
        self.as_ref().load().await
    }

    async fn save(&self, mac: &MacAddress) -> Result<(), StoreError> {
        self.as_ref().save(mac).await
    }
}
