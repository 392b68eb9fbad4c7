//! HTTP error mapping

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;

use crate::application::ports::AudioGatewayError;
use crate::application::{BluetoothControlError, DiscoveryError, InventoryError};
use crate::domain::error::{DurationParseError, MacParseError};
use crate::domain::pairing::{FailureCause, PairingOutcome, PairingStatus};

use super::dto::ErrorBody;

/// Error returned by a route handler, rendered as `{"detail": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = ErrorBody {
            detail: self.to_string(),
            status: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AudioGatewayError> for ApiError {
    fn from(e: AudioGatewayError) -> Self {
        match e {
            AudioGatewayError::Unavailable(_) => Self::Unavailable(e.to_string()),
            AudioGatewayError::SinkNotFound(_) => Self::NotFound(e.to_string()),
            _ => Self::Internal(e.to_string()),
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::Audio(e) => e.into(),
            InventoryError::DeviceNotFound(_) | InventoryError::NoActiveDevice => {
                Self::NotFound(e.to_string())
            }
            InventoryError::InvalidVolume(_) => Self::BadRequest(e.to_string()),
            InventoryError::Timeout(_) => Self::Timeout(e.to_string()),
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(e: DiscoveryError) -> Self {
        match &e {
            DiscoveryError::Gateway(inner) if inner.is_unavailable() => {
                Self::Unavailable(e.to_string())
            }
            DiscoveryError::Gateway(_) => Self::Internal(e.to_string()),
            DiscoveryError::Timeout(_) => Self::Timeout(e.to_string()),
        }
    }
}

impl From<BluetoothControlError> for ApiError {
    fn from(e: BluetoothControlError) -> Self {
        match e {
            BluetoothControlError::Discovery(e) => e.into(),
            BluetoothControlError::NoLastDevice => Self::NotFound(e.to_string()),
            BluetoothControlError::Store(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<MacParseError> for ApiError {
    fn from(e: MacParseError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<DurationParseError> for ApiError {
    fn from(e: DurationParseError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

/// Pairing outcome rendered with the status code its class maps to
pub struct OutcomeResponse(pub PairingOutcome);

impl OutcomeResponse {
    pub fn status_code(&self) -> StatusCode {
        match (self.0.status, self.0.cause) {
            (PairingStatus::Ok, _) => StatusCode::OK,
            (PairingStatus::Partial, _) => StatusCode::CONFLICT,
            (PairingStatus::Error, Some(FailureCause::Timeout)) => StatusCode::GATEWAY_TIMEOUT,
            (PairingStatus::Error, Some(FailureCause::Unavailable)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            (PairingStatus::Error, None) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OutcomeResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::OK {
            return (status, Json(self.0)).into_response();
        }

        let body = ErrorBody {
            detail: self.0.message,
            status: Some(self.0.status.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
