//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use audio_control::application::ports::{
    AudioGateway, AudioGatewayError, BluetoothGateway, BluetoothGatewayError, CommandOutput,
    LastDeviceStore, ScanProcess, StoreError,
};
use audio_control::application::{BluetoothControlConfig, StepTimeouts};
use audio_control::domain::device::{BluetoothDevice, MacAddress, Sink, Volume};
use audio_control::domain::duration::Duration;
use audio_control::server::{self, AppState};

pub fn mac(s: &str) -> MacAddress {
    s.parse().unwrap()
}

pub fn sink(id: &str, name: &str, percent: f64) -> Sink {
    Sink {
        volume: Volume::from_percent(percent).unwrap(),
        ..Sink::new(id, name)
    }
}

/// Sound server with an in-memory sink table
#[derive(Default)]
pub struct FakeAudio {
    pub sinks: Mutex<Vec<Sink>>,
    pub default_sink: Mutex<Option<String>>,
    pub unavailable: bool,
}

impl FakeAudio {
    pub fn with_sinks(sinks: Vec<Sink>, default_sink: Option<&str>) -> Self {
        Self {
            sinks: Mutex::new(sinks),
            default_sink: Mutex::new(default_sink.map(str::to_string)),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), AudioGatewayError> {
        if self.unavailable {
            return Err(AudioGatewayError::Unavailable(
                "Connection failure: Connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AudioGateway for FakeAudio {
    async fn list_sinks(&self) -> Result<Vec<Sink>, AudioGatewayError> {
        self.check()?;
        Ok(self.sinks.lock().unwrap().clone())
    }

    async fn default_sink_id(&self) -> Result<Option<String>, AudioGatewayError> {
        self.check()?;
        Ok(self.default_sink.lock().unwrap().clone())
    }

    async fn set_default_sink(&self, id: &str) -> Result<(), AudioGatewayError> {
        self.check()?;
        *self.default_sink.lock().unwrap() = Some(id.to_string());
        Ok(())
    }

    async fn set_volume(&self, id: &str, volume: Volume) -> Result<(), AudioGatewayError> {
        self.check()?;
        let mut sinks = self.sinks.lock().unwrap();
        let sink = sinks
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AudioGatewayError::SinkNotFound(id.to_string()))?;
        sink.volume = volume;
        Ok(())
    }

    async fn move_all_streams_to(&self, _id: &str) -> Result<usize, AudioGatewayError> {
        self.check()?;
        Ok(1)
    }
}

/// Bluetooth subsystem answering from fixed tables
#[derive(Default)]
pub struct FakeBluetooth {
    pub paired: Vec<BluetoothDevice>,
    pub connected: Vec<MacAddress>,
    pub scan_lines: Vec<String>,
    pub pair_output: Option<CommandOutput>,
    pub connect_output: Option<CommandOutput>,
    pub missing_tool: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBluetooth {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), BluetoothGatewayError> {
        self.calls.lock().unwrap().push(call);
        if self.missing_tool {
            return Err(BluetoothGatewayError::ToolNotFound(
                "bluetoothctl not found".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BluetoothGateway for FakeBluetooth {
    async fn list_paired(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        self.record("list-paired".to_string())?;
        Ok(self.paired.clone())
    }

    async fn list_known(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        self.record("list-known".to_string())?;
        Ok(self.paired.clone())
    }

    async fn query_connected(&self, mac: &MacAddress) -> Result<bool, BluetoothGatewayError> {
        self.record(format!("info {mac}"))?;
        Ok(self.connected.contains(mac))
    }

    async fn start_scan(&self, max: Duration) -> Result<Box<dyn ScanProcess>, BluetoothGatewayError> {
        self.record(format!("scan-on {}", max.as_secs()))?;
        Ok(Box::new(FakeScan {
            lines: self.scan_lines.iter().cloned().collect(),
        }))
    }

    async fn stop_scan(&self) -> Result<(), BluetoothGatewayError> {
        self.record("scan-off".to_string())
    }

    async fn pair(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.record(format!("pair {mac}"))?;
        Ok(self
            .pair_output
            .clone()
            .unwrap_or_else(|| CommandOutput::new(0, "Pairing successful", "")))
    }

    async fn trust(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.record(format!("trust {mac}"))?;
        Ok(CommandOutput::new(0, "trust succeeded", ""))
    }

    async fn connect(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.record(format!("connect {mac}"))?;
        Ok(self
            .connect_output
            .clone()
            .unwrap_or_else(|| CommandOutput::new(0, "Connection successful", "")))
    }
}

/// Emits its lines, then stays silent until terminated
struct FakeScan {
    lines: VecDeque<String>,
}

#[async_trait]
impl ScanProcess for FakeScan {
    async fn next_line(&mut self) -> Result<Option<String>, BluetoothGatewayError> {
        match self.lines.pop_front() {
            Some(line) => Ok(Some(line)),
            None => std::future::pending().await,
        }
    }

    async fn terminate(&mut self) -> Result<(), BluetoothGatewayError> {
        Ok(())
    }
}

/// In-memory last device marker
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub stored: Arc<Mutex<Option<MacAddress>>>,
}

#[async_trait]
impl LastDeviceStore for MemoryStore {
    async fn load(&self) -> Result<Option<MacAddress>, StoreError> {
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, mac: &MacAddress) -> Result<(), StoreError> {
        *self.stored.lock().unwrap() = Some(mac.clone());
        Ok(())
    }
}

/// Control config without settle wait, for fast tests
pub fn fast_config() -> BluetoothControlConfig {
    BluetoothControlConfig {
        settle_delay: Duration::from_millis(0),
        timeouts: StepTimeouts::default(),
        ..Default::default()
    }
}

pub fn state(audio: FakeAudio, bluetooth: Arc<FakeBluetooth>, store: MemoryStore) -> AppState {
    AppState::new(
        Arc::new(audio),
        bluetooth,
        Box::new(store),
        fast_config(),
        Duration::from_millis(300),
    )
}

/// A server on an ephemeral port, stopped on drop
pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start(state: AppState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            server::serve(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
