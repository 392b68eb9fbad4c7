//! Sound server port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::device::{Sink, Volume};

/// Sound server errors
#[derive(Debug, Clone, Error)]
pub enum AudioGatewayError {
    #[error("Sound server unavailable: {0}")]
    Unavailable(String),

    #[error("Sink not found: {0}")]
    SinkNotFound(String),

    #[error("Sound server command failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected sound server output: {0}")]
    InvalidOutput(String),
}

/// Port for the sound server (sinks, default sink, volume, streams)
#[async_trait]
pub trait AudioGateway: Send + Sync {
    /// List output sinks in the order the sound server reports them
    async fn list_sinks(&self) -> Result<Vec<Sink>, AudioGatewayError>;

    /// Name of the sink new streams play on, if one is set
    async fn default_sink_id(&self) -> Result<Option<String>, AudioGatewayError>;

    /// Make `id` the default sink
    async fn set_default_sink(&self, id: &str) -> Result<(), AudioGatewayError>;

    /// Set the volume of every channel of sink `id`
    async fn set_volume(&self, id: &str, volume: Volume) -> Result<(), AudioGatewayError>;

    /// Move every playing stream to sink `id`.
    ///
    /// Individual streams that refuse to move are skipped.
    ///
    /// # Returns
    /// The number of streams moved
    async fn move_all_streams_to(&self, id: &str) -> Result<usize, AudioGatewayError>;
}

#[async_trait]
impl<T: AudioGateway + ?Sized> AudioGateway for Arc<T> {
    async fn list_sinks(&self) -> Result<Vec<Sink>, AudioGatewayError> {
        self.as_ref().list_sinks().await
    }

    async fn default_sink_id(&self) -> Result<Option<String>, AudioGatewayError> {
        self.as_ref().default_sink_id().await
    }

    async fn set_default_sink(&self, id: &str) -> Result<(), AudioGatewayError> {
        self.as_ref().set_default_sink(id).await
    }

    async fn set_volume(&self, id: &str, volume: Volume) -> Result<(), AudioGatewayError> {
        self.as_ref().set_volume(id, volume).await
    }

    async fn move_all_streams_to(&self, id: &str) -> Result<usize, AudioGatewayError> {
        self.as_ref().move_all_streams_to(id).await
    }
}
