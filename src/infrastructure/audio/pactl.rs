//! pactl sound server adapter
//!
//! Works against PulseAudio and PipeWire (through pipewire-pulse). Sink
//! listing relies on `pactl --format=json`, available since PulseAudio 16.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::ports::{AudioGateway, AudioGatewayError, CommandOutput};
use crate::domain::device::{Sink, Volume};
use crate::infrastructure::process::{run_tool, ToolError};

/// Raw volume value of 100% (PA_VOLUME_NORM)
const VOLUME_NORM: f64 = 65536.0;

#[derive(Debug, Deserialize)]
struct PactlSink {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    mute: bool,
    #[serde(default)]
    volume: HashMap<String, PactlChannelVolume>,
}

#[derive(Debug, Deserialize)]
struct PactlChannelVolume {
    value: u32,
}

/// Sound server adapter driving the `pactl` command line tool
pub struct PactlAudioGateway {
    program: String,
}

impl PactlAudioGateway {
    pub fn new() -> Self {
        Self::with_program("pactl")
    }

    /// Use a specific `pactl` executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput, AudioGatewayError> {
        let output = run_tool(&self.program, args).await.map_err(|e| match e {
            ToolError::NotFound { .. } => AudioGatewayError::Unavailable(e.to_string()),
            ToolError::Io { .. } => AudioGatewayError::Unavailable(e.to_string()),
        })?;

        if output.success() {
            return Ok(output);
        }

        let diagnostic = output.diagnostic().to_string();
        Err(if diagnostic.contains("Connection failure") || diagnostic.contains("Connection refused") {
            AudioGatewayError::Unavailable(diagnostic)
        } else if diagnostic.contains("No such entity") {
            AudioGatewayError::SinkNotFound(diagnostic)
        } else {
            AudioGatewayError::CommandFailed(diagnostic)
        })
    }

    /// Parse `pactl --format=json list sinks`
    fn parse_sinks(json: &str) -> Result<Vec<Sink>, AudioGatewayError> {
        let raw: Vec<PactlSink> = serde_json::from_str(json)
            .map_err(|e| AudioGatewayError::InvalidOutput(e.to_string()))?;

        raw.into_iter()
            .map(|sink| {
                let volume = Self::mean_volume(&sink.volume)?;
                let display_name = if sink.description.is_empty() {
                    sink.name.clone()
                } else {
                    sink.description
                };
                Ok(Sink {
                    id: sink.name,
                    display_name,
                    volume,
                    muted: sink.mute,
                })
            })
            .collect()
    }

    /// Mean of the channel volumes as a fraction of nominal
    fn mean_volume(channels: &HashMap<String, PactlChannelVolume>) -> Result<Volume, AudioGatewayError> {
        if channels.is_empty() {
            return Ok(Volume::MUTE);
        }
        let total: f64 = channels.values().map(|c| f64::from(c.value)).sum();
        let fraction = total / channels.len() as f64 / VOLUME_NORM;
        Volume::reported(fraction)
            .map_err(|e| AudioGatewayError::InvalidOutput(e.to_string()))
    }

    /// Raw value for `pactl set-sink-volume`
    fn raw_volume(volume: Volume) -> u32 {
        (volume.fraction() * VOLUME_NORM).round() as u32
    }

    /// Stream indexes from `pactl list short sink-inputs`
    fn parse_sink_input_ids(output: &str) -> Vec<String> {
        output
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .filter(|id| id.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
            .collect()
    }
}

impl Default for PactlAudioGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioGateway for PactlAudioGateway {
    async fn list_sinks(&self) -> Result<Vec<Sink>, AudioGatewayError> {
        let output = self.run(&["--format=json", "list", "sinks"]).await?;
        Self::parse_sinks(&output.stdout)
    }

    async fn default_sink_id(&self) -> Result<Option<String>, AudioGatewayError> {
        let output = self.run(&["get-default-sink"]).await?;
        let id = output.stdout.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    async fn set_default_sink(&self, id: &str) -> Result<(), AudioGatewayError> {
        self.run(&["set-default-sink", id]).await?;
        Ok(())
    }

    async fn set_volume(&self, id: &str, volume: Volume) -> Result<(), AudioGatewayError> {
        let raw = Self::raw_volume(volume).to_string();
        self.run(&["set-sink-volume", id, &raw]).await?;
        Ok(())
    }

    async fn move_all_streams_to(&self, id: &str) -> Result<usize, AudioGatewayError> {
        let output = self.run(&["list", "short", "sink-inputs"]).await?;
        let streams = Self::parse_sink_input_ids(&output.stdout);

        let mut moved = 0;
        for stream in &streams {
            match self.run(&["move-sink-input", stream, id]).await {
                Ok(_) => moved += 1,
                Err(e) => warn!(stream = %stream, sink = id, error = %e, "stream not moved"),
            }
        }
        debug!(sink = id, moved, total = streams.len(), "streams moved");
        Ok(moved)
    }
}
