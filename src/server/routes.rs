//! Route handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::device::MacAddress;
use crate::domain::duration::Duration;

use super::dto::{
    AudioDeviceDto, BluetoothRequest, DeviceListResponse, HealthResponse, ScanQuery,
    ScanResponse, SelectRequest, SelectResponse, VolumeRequest, VolumeResponse,
};
use super::error::{ApiError, OutcomeResponse};
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn list_devices(State(state): State<AppState>) -> ApiResult<DeviceListResponse> {
    let devices = state.inventory.list_devices().await?;
    Ok(Json(DeviceListResponse::from_devices(&devices)))
}

pub async fn active_device(State(state): State<AppState>) -> ApiResult<AudioDeviceDto> {
    let device = state.inventory.active_device().await?;
    Ok(Json(AudioDeviceDto::from(&device)))
}

pub async fn set_volume(
    State(state): State<AppState>,
    body: Result<Json<VolumeRequest>, JsonRejection>,
) -> ApiResult<VolumeResponse> {
    let Json(req) = body?;
    let change = state
        .inventory
        .set_volume(req.volume, req.device_id.as_deref())
        .await?;
    Ok(Json(VolumeResponse {
        status: "ok".to_string(),
        volume: change.volume.percent(),
    }))
}

pub async fn select_device(
    State(state): State<AppState>,
    body: Result<Json<SelectRequest>, JsonRejection>,
) -> ApiResult<SelectResponse> {
    let Json(req) = body?;
    let moved = state.inventory.select_device(&req.device_name).await?;
    Ok(Json(SelectResponse {
        status: "ok".to_string(),
        moved,
    }))
}

pub async fn pair(
    State(state): State<AppState>,
    body: Result<Json<BluetoothRequest>, JsonRejection>,
) -> Result<OutcomeResponse, ApiError> {
    let Json(req) = body?;
    let mac: MacAddress = req.mac.parse()?;
    Ok(OutcomeResponse(state.bluetooth.pair(&mac, &req.name).await))
}

pub async fn connect(
    State(state): State<AppState>,
    body: Result<Json<BluetoothRequest>, JsonRejection>,
) -> Result<OutcomeResponse, ApiError> {
    let Json(req) = body?;
    let mac: MacAddress = req.mac.parse()?;
    Ok(OutcomeResponse(state.bluetooth.connect(&mac, &req.name).await))
}

pub async fn reconnect(State(state): State<AppState>) -> Result<OutcomeResponse, ApiError> {
    let outcome = state.bluetooth.reconnect_last().await?;
    Ok(OutcomeResponse(outcome))
}

/// Run a scan in its own task.
///
/// If the client goes away the handler future is dropped, which cancels the
/// token; the task then terminates the scan process and switches discovery
/// off before releasing the Bluetooth gate.
pub async fn scan(
    State(state): State<AppState>,
    query: Result<Query<ScanQuery>, QueryRejection>,
) -> ApiResult<ScanResponse> {
    let Query(query) = query?;
    let duration = match query.duration.as_deref() {
        Some(raw) => parse_scan_duration(raw)?,
        None => state.scan_duration,
    };

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let bluetooth = state.bluetooth.clone();
    let task = tokio::spawn(async move { bluetooth.scan(duration, &cancel).await });

    let devices = task.await.map_err(|e| {
        warn!(error = %e, "scan task failed");
        ApiError::Internal(format!("Scan task failed: {e}"))
    })??;
    debug!(devices = devices.len(), "scan finished");
    Ok(Json(ScanResponse { devices }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        bluetooth_busy: state.gate.is_busy(),
    })
}

/// Accept `15s`/`1m30s` as well as bare seconds
fn parse_scan_duration(raw: &str) -> Result<Duration, ApiError> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        return match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ApiError::BadRequest(format!("Invalid scan duration: \"{raw}\""))),
        };
    }
    Ok(raw.parse()?)
}
