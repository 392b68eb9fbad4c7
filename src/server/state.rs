//! Shared handler state

use std::sync::Arc;

use crate::application::ports::{AudioGateway, BluetoothGateway, LastDeviceStore};
use crate::application::{
    BluetoothControlConfig, BluetoothControlUseCase, BluetoothGate, DeviceInventoryUseCase,
};
use crate::domain::duration::Duration;

pub type SharedAudio = Arc<dyn AudioGateway>;
pub type SharedBluetooth = Arc<dyn BluetoothGateway>;

pub type Inventory = DeviceInventoryUseCase<SharedAudio, SharedBluetooth>;
pub type BluetoothControl = BluetoothControlUseCase<SharedBluetooth, Box<dyn LastDeviceStore>>;

/// Use cases behind the HTTP routes.
///
/// Both use cases share one [`BluetoothGate`], so inventory queries wait
/// for a running scan or pairing.
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<Inventory>,
    pub bluetooth: Arc<BluetoothControl>,
    pub gate: BluetoothGate,
    /// Scan window used when a request does not name one
    pub scan_duration: Duration,
}

impl AppState {
    pub fn new(
        audio: SharedAudio,
        bluetooth: SharedBluetooth,
        store: Box<dyn LastDeviceStore>,
        config: BluetoothControlConfig,
        scan_duration: Duration,
    ) -> Self {
        let gate = BluetoothGate::new();
        let inventory = DeviceInventoryUseCase::new(
            audio,
            Arc::clone(&bluetooth),
            gate.clone(),
            config.timeouts,
        );
        let control = BluetoothControlUseCase::new(bluetooth, store, gate.clone(), config);

        Self {
            inventory: Arc::new(inventory),
            bluetooth: Arc::new(control),
            gate,
            scan_duration: scan_duration.clamp_scan(),
        }
    }
}
