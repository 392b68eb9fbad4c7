//! Device inventory use case

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::correlation::correlate;
use crate::domain::device::{AudioDevice, BluetoothDevice, Sink, Volume};
use crate::domain::error::VolumeError;

use super::gate::BluetoothGate;
use super::ports::{AudioGateway, AudioGatewayError, BluetoothGateway};
use super::timeouts::{bounded, StepTimedOut, StepTimeouts};

/// Errors from the inventory use case
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Audio(#[from] AudioGatewayError),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("No active device found")]
    NoActiveDevice,

    #[error(transparent)]
    InvalidVolume(#[from] VolumeError),

    #[error(transparent)]
    Timeout(#[from] StepTimedOut),
}

/// Result of a volume change
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeChange {
    pub device_id: String,
    pub volume: Volume,
}

/// Merged device listing plus volume and default-sink control
pub struct DeviceInventoryUseCase<A, B>
where
    A: AudioGateway,
    B: BluetoothGateway,
{
    audio: A,
    bluetooth: B,
    gate: BluetoothGate,
    timeouts: StepTimeouts,
}

impl<A, B> DeviceInventoryUseCase<A, B>
where
    A: AudioGateway,
    B: BluetoothGateway,
{
    pub fn new(audio: A, bluetooth: B, gate: BluetoothGate, timeouts: StepTimeouts) -> Self {
        Self {
            audio,
            bluetooth,
            gate,
            timeouts,
        }
    }

    /// Every live sink plus a placeholder for each paired device without one.
    ///
    /// Bluetooth failures only cost the placeholders; sound server failures
    /// fail the request.
    pub async fn list_devices(&self) -> Result<Vec<AudioDevice>, InventoryError> {
        let (sinks, default_sink) = self.sinks().await?;
        let paired = self.paired_devices().await;
        let devices = correlate(&sinks, default_sink.as_deref(), &paired);
        debug!(
            sinks = sinks.len(),
            paired = paired.len(),
            devices = devices.len(),
            "inventory built"
        );
        Ok(devices)
    }

    /// The default sink
    pub async fn active_device(&self) -> Result<AudioDevice, InventoryError> {
        let (sinks, default_sink) = self.sinks().await?;
        let id = default_sink.ok_or(InventoryError::NoActiveDevice)?;
        sinks
            .iter()
            .find(|sink| sink.id == id)
            .map(|sink| AudioDevice::from_sink(sink, true))
            .ok_or(InventoryError::NoActiveDevice)
    }

    /// Set the volume of `device_id`, or of the default sink when omitted.
    ///
    /// # Arguments
    /// * `percent` - Target level, 100 being nominal
    pub async fn set_volume(
        &self,
        percent: f64,
        device_id: Option<&str>,
    ) -> Result<VolumeChange, InventoryError> {
        let volume = Volume::from_percent(percent)?;
        let (sinks, default_sink) = self.sinks().await?;

        let target = match device_id {
            Some(id) => id.to_string(),
            None => default_sink.ok_or(InventoryError::NoActiveDevice)?,
        };
        ensure_sink(&sinks, &target)?;

        bounded(
            "set volume",
            self.timeouts.query,
            self.audio.set_volume(&target, volume),
        )
        .await??;

        info!(device = %target, %volume, "volume set");
        Ok(VolumeChange {
            device_id: target,
            volume,
        })
    }

    /// Make `id` the default sink and move playing streams onto it.
    ///
    /// # Returns
    /// The number of streams moved
    pub async fn select_device(&self, id: &str) -> Result<usize, InventoryError> {
        let (sinks, _) = self.sinks().await?;
        ensure_sink(&sinks, id)?;

        bounded(
            "set default sink",
            self.timeouts.query,
            self.audio.set_default_sink(id),
        )
        .await??;

        let moved = match bounded(
            "move streams",
            self.timeouts.query,
            self.audio.move_all_streams_to(id),
        )
        .await
        {
            Ok(Ok(moved)) => moved,
            Ok(Err(e)) => {
                warn!(device = id, error = %e, "failed to move streams");
                0
            }
            Err(e) => {
                warn!(device = id, error = %e, "failed to move streams");
                0
            }
        };

        info!(device = id, moved, "default sink selected");
        Ok(moved)
    }

    async fn sinks(&self) -> Result<(Vec<Sink>, Option<String>), InventoryError> {
        let sinks = bounded("list sinks", self.timeouts.query, self.audio.list_sinks()).await??;
        let default_sink = bounded(
            "get default sink",
            self.timeouts.query,
            self.audio.default_sink_id(),
        )
        .await??;
        Ok((sinks, default_sink))
    }

    /// Paired devices with their live connection status
    async fn paired_devices(&self) -> Vec<BluetoothDevice> {
        let _permit = self.gate.acquire("list paired").await;

        let paired = match bounded(
            "list paired devices",
            self.timeouts.query,
            self.bluetooth.list_paired(),
        )
        .await
        {
            Ok(Ok(paired)) => paired,
            Ok(Err(e)) => {
                warn!(error = %e, "paired devices unavailable");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "paired devices unavailable");
                return Vec::new();
            }
        };

        let mut devices = Vec::with_capacity(paired.len());
        for device in paired {
            let status = bounded(
                "query connection",
                self.timeouts.query,
                self.bluetooth.query_connected(&device.mac),
            )
            .await;
            match status {
                Ok(Ok(connected)) => devices.push(device.with_connected(connected)),
                Ok(Err(e)) => {
                    warn!(mac = %device.mac, error = %e, "connection status unknown");
                    devices.push(device);
                }
                Err(e) => {
                    warn!(mac = %device.mac, error = %e, "connection status unknown");
                    devices.push(device);
                }
            }
        }
        devices
    }
}

fn ensure_sink(sinks: &[Sink], id: &str) -> Result<(), InventoryError> {
    if sinks.iter().any(|sink| sink.id == id) {
        Ok(())
    } else {
        Err(InventoryError::DeviceNotFound(id.to_string()))
    }
}
