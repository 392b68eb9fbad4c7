//! HTTP client for a running service

use std::time::Duration as StdDuration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::device::BluetoothDevice;
use crate::domain::duration::Duration;
use crate::domain::pairing::PairingOutcome;
use crate::server::dto::{
    AudioDeviceDto, BluetoothRequest, DeviceListResponse, ErrorBody, HealthResponse,
    ScanResponse, SelectRequest, SelectResponse, VolumeRequest, VolumeResponse,
};

/// Upper bound for ordinary requests; pairing may run pair, trust and
/// connect back to back
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(90);

/// Slack on top of the scan window for process cleanup
const SCAN_SLACK: StdDuration = StdDuration::from_secs(30);

/// Errors talking to the service
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Cannot reach audio-control service at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("{detail}")]
    Api {
        status: u16,
        detail: String,
        /// Pairing status carried by failed pair and connect responses
        pairing_status: Option<String>,
    },

    #[error("Unexpected response from service: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Typed wrapper around the `/api` routes
pub struct ControlClient {
    base_url: String,
    http: reqwest::Client,
}

impl ControlClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.request(Method::GET, "/api/health")).await
    }

    pub async fn devices(&self) -> Result<Vec<AudioDeviceDto>, ClientError> {
        let list: DeviceListResponse = self.send(self.request(Method::GET, "/api/devices")).await?;
        Ok(list.devices)
    }

    pub async fn active(&self) -> Result<AudioDeviceDto, ClientError> {
        self.send(self.request(Method::GET, "/api/active")).await
    }

    pub async fn set_volume(
        &self,
        percent: f64,
        device_id: Option<&str>,
    ) -> Result<VolumeResponse, ClientError> {
        let body = VolumeRequest {
            volume: percent,
            device_id: device_id.map(str::to_string),
        };
        self.send_json(Method::POST, "/api/volume", &body).await
    }

    pub async fn select(&self, id: &str) -> Result<SelectResponse, ClientError> {
        let body = SelectRequest {
            device_name: id.to_string(),
        };
        self.send_json(Method::POST, "/api/device/select", &body).await
    }

    /// Scan for `duration`, or the service default when `None`
    pub async fn scan(&self, duration: Option<Duration>) -> Result<Vec<BluetoothDevice>, ClientError> {
        let window = duration
            .unwrap_or_else(Duration::max_scan_duration)
            .clamp_scan()
            .as_std();

        let mut request = self
            .request(Method::GET, "/api/bluetooth/scan")
            .timeout(window + SCAN_SLACK);
        if let Some(duration) = duration {
            request = request.query(&[("duration", duration.to_string())]);
        }

        let response: ScanResponse = self.send(request).await?;
        Ok(response.devices)
    }

    pub async fn pair(&self, mac: &str, name: &str) -> Result<PairingOutcome, ClientError> {
        self.send_json(Method::POST, "/api/bluetooth/pair", &bluetooth_request(mac, name))
            .await
    }

    pub async fn connect(&self, mac: &str, name: &str) -> Result<PairingOutcome, ClientError> {
        self.send_json(Method::POST, "/api/bluetooth/connect", &bluetooth_request(mac, name))
            .await
    }

    pub async fn reconnect(&self) -> Result<PairingOutcome, ClientError> {
        self.send(self.request(Method::POST, "/api/bluetooth/reconnect"))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .timeout(REQUEST_TIMEOUT)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(method, path).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|e| ClientError::Unreachable {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        debug!(status = %response.status(), url = %response.url(), "response received");

        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()));
        }
        Err(api_error(response).await)
    }
}

fn bluetooth_request(mac: &str, name: &str) -> BluetoothRequest {
    BluetoothRequest {
        mac: mac.to_string(),
        name: name.to_string(),
    }
}

/// Decode an error response, falling back to the raw body
async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            detail: body.detail,
            pairing_status: body.status,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            detail: if text.trim().is_empty() {
                status.to_string()
            } else {
                text.trim().to_string()
            },
            pairing_status: None,
        },
    }
}
