//! Scripted port implementations shared by the use case tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::device::{BluetoothDevice, MacAddress, Sink, Volume};
use crate::domain::duration::Duration;

use super::ports::{
    AudioGateway, AudioGatewayError, BluetoothGateway, BluetoothGatewayError, CommandOutput,
    LastDeviceStore, ScanProcess, StoreError,
};

pub(crate) fn mac(s: &str) -> MacAddress {
    s.parse().unwrap()
}

/// Records calls in order
#[derive(Debug, Default, Clone)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.0.lock().unwrap().iter().any(|c| c == call)
    }
}

#[derive(Default)]
pub(crate) struct MockAudio {
    pub sinks: Vec<Sink>,
    pub default_sink: Option<String>,
    pub unavailable: bool,
    pub fail_moves: bool,
    pub log: CallLog,
}

impl MockAudio {
    pub fn with_sinks(sinks: Vec<Sink>, default_sink: Option<&str>) -> Self {
        Self {
            sinks,
            default_sink: default_sink.map(str::to_string),
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), AudioGatewayError> {
        if self.unavailable {
            Err(AudioGatewayError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AudioGateway for MockAudio {
    async fn list_sinks(&self) -> Result<Vec<Sink>, AudioGatewayError> {
        self.check()?;
        Ok(self.sinks.clone())
    }

    async fn default_sink_id(&self) -> Result<Option<String>, AudioGatewayError> {
        self.check()?;
        Ok(self.default_sink.clone())
    }

    async fn set_default_sink(&self, id: &str) -> Result<(), AudioGatewayError> {
        self.check()?;
        self.log.push(format!("set-default {id}"));
        Ok(())
    }

    async fn set_volume(&self, id: &str, volume: Volume) -> Result<(), AudioGatewayError> {
        self.check()?;
        self.log.push(format!("set-volume {id} {}", volume.percent()));
        Ok(())
    }

    async fn move_all_streams_to(&self, id: &str) -> Result<usize, AudioGatewayError> {
        self.check()?;
        if self.fail_moves {
            return Err(AudioGatewayError::CommandFailed("no sink inputs".into()));
        }
        self.log.push(format!("move-streams {id}"));
        Ok(2)
    }
}

/// Scripted result of a pair, trust or connect call
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Exit(CommandOutput),
    Fail(BluetoothGatewayError),
    Hang,
}

impl Step {
    pub fn ok() -> Self {
        Self::Exit(CommandOutput::new(0, "", ""))
    }

    pub fn exit(code: i32, stdout: &str, stderr: &str) -> Self {
        Self::Exit(CommandOutput::new(code, stdout, stderr))
    }

    async fn run(&self) -> Result<CommandOutput, BluetoothGatewayError> {
        match self {
            Self::Exit(output) => Ok(output.clone()),
            Self::Fail(err) => Err(err.clone()),
            Self::Hang => std::future::pending().await,
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::ok()
    }
}

/// What the scan process does after its scripted lines
#[derive(Debug, Clone, Default)]
pub(crate) enum ScanEnd {
    /// Keeps running until terminated
    #[default]
    Open,
    Eof,
    Fail,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScanScript {
    /// Lines with their emission offset from scan start
    pub lines: Vec<(StdDuration, String)>,
    pub end: ScanEnd,
}

impl ScanScript {
    pub fn line(mut self, at_secs: u64, line: &str) -> Self {
        self.lines.push((StdDuration::from_secs(at_secs), line.to_string()));
        self
    }

    pub fn ending(mut self, end: ScanEnd) -> Self {
        self.end = end;
        self
    }
}

#[derive(Default)]
pub(crate) struct MockBluetooth {
    pub paired: Vec<BluetoothDevice>,
    pub connected: Vec<MacAddress>,
    pub known: Vec<BluetoothDevice>,
    pub listing: Option<Step>,
    pub pair: Step,
    pub trust: Step,
    pub connect: Step,
    pub scan: ScanScript,
    pub scan_unavailable: bool,
    pub scan_terminated: Arc<AtomicBool>,
    pub log: CallLog,
}

impl MockBluetooth {
    pub fn terminated(&self) -> bool {
        self.scan_terminated.load(Ordering::SeqCst)
    }

    /// Listing behaviour override: `Fail` and `Hang` apply, `Exit` is ignored
    async fn listing(&self) -> Result<(), BluetoothGatewayError> {
        match &self.listing {
            Some(step @ (Step::Fail(_) | Step::Hang)) => step.run().await.map(|_| ()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl BluetoothGateway for MockBluetooth {
    async fn list_paired(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        self.log.push("list-paired");
        self.listing().await?;
        Ok(self.paired.clone())
    }

    async fn list_known(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        self.log.push("list-known");
        self.listing().await?;
        Ok(self.known.clone())
    }

    async fn query_connected(&self, mac: &MacAddress) -> Result<bool, BluetoothGatewayError> {
        self.log.push(format!("info {mac}"));
        Ok(self.connected.contains(mac))
    }

    async fn start_scan(&self, max: Duration) -> Result<Box<dyn ScanProcess>, BluetoothGatewayError> {
        self.log.push(format!("scan-on {}", max.as_secs()));
        if self.scan_unavailable {
            return Err(BluetoothGatewayError::ToolNotFound("bluetoothctl".into()));
        }
        Ok(Box::new(MockScan {
            started: Instant::now(),
            lines: self.scan.lines.iter().cloned().collect(),
            end: self.scan.end.clone(),
            terminated: self.scan_terminated.clone(),
            log: self.log.clone(),
        }))
    }

    async fn stop_scan(&self) -> Result<(), BluetoothGatewayError> {
        self.log.push("scan-off");
        Ok(())
    }

    async fn pair(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.log.push(format!("pair {mac}"));
        self.pair.run().await
    }

    async fn trust(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.log.push(format!("trust {mac}"));
        self.trust.run().await
    }

    async fn connect(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.log.push(format!("connect {mac}"));
        self.connect.run().await
    }
}

struct MockScan {
    started: Instant,
    lines: VecDeque<(StdDuration, String)>,
    end: ScanEnd,
    terminated: Arc<AtomicBool>,
    log: CallLog,
}

#[async_trait]
impl ScanProcess for MockScan {
    async fn next_line(&mut self) -> Result<Option<String>, BluetoothGatewayError> {
        // Only pop after the wait so a cancelled read loses nothing
        if let Some(at) = self.lines.front().map(|(at, _)| *at) {
            tokio::time::sleep_until(self.started + at).await;
            return Ok(self.lines.pop_front().map(|(_, line)| line));
        }
        match self.end {
            ScanEnd::Open => std::future::pending().await,
            ScanEnd::Eof => Ok(None),
            ScanEnd::Fail => Err(BluetoothGatewayError::ReadFailed("broken pipe".into())),
        }
    }

    async fn terminate(&mut self) -> Result<(), BluetoothGatewayError> {
        self.log.push("scan-terminate");
        self.terminated.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockStore {
    pub stored: Mutex<Option<MacAddress>>,
    pub saves: Mutex<u32>,
    pub fail_writes: bool,
}

impl MockStore {
    pub fn holding(mac: MacAddress) -> Self {
        Self {
            stored: Mutex::new(Some(mac)),
            ..Default::default()
        }
    }

    pub fn stored(&self) -> Option<MacAddress> {
        self.stored.lock().unwrap().clone()
    }

    pub fn saves(&self) -> u32 {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl LastDeviceStore for MockStore {
    async fn load(&self) -> Result<Option<MacAddress>, StoreError> {
        Ok(self.stored())
    }

    async fn save(&self, mac: &MacAddress) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteFailed("read-only file system".into()));
        }
        *self.stored.lock().unwrap() = Some(mac.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
