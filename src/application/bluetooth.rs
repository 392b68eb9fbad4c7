//! Bluetooth control use case
//!
//! Pairing runs pair, trust and connect in sequence through a
//! [`PairingSession`]. An existing pairing record counts as a successful pair
//! step, a failed trust step is only logged, and a connect failure after a
//! successful pair is reported as a partial outcome since a later plain
//! connect can still succeed. Nothing is retried automatically.

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::device::{BluetoothDevice, MacAddress};
use crate::domain::discovery::DiscoveryMode;
use crate::domain::duration::Duration;
use crate::domain::pairing::diagnostic::reports_connected;
use crate::domain::pairing::{
    classify, DiagnosticClass, InvalidStateTransition, PairingOutcome, PairingSession,
    PairingStatus,
};

use super::discovery::{DiscoveryError, DiscoverySession};
use super::gate::BluetoothGate;
use super::ports::{BluetoothGateway, CommandOutput, LastDeviceStore, StoreError};
use super::timeouts::{bounded, StepTimeouts};

/// Errors from the Bluetooth control use case
#[derive(Debug, Error)]
pub enum BluetoothControlError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("No previously connected device to reconnect")]
    NoLastDevice,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration for Bluetooth control
#[derive(Debug, Clone)]
pub struct BluetoothControlConfig {
    /// Wait after a successful connect so the sound server can add the sink
    pub settle_delay: Duration,
    /// Record the last connected device for reconnects
    pub remember_last_device: bool,
    pub discovery_mode: DiscoveryMode,
    pub timeouts: StepTimeouts,
}

impl Default for BluetoothControlConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::default_settle_delay(),
            remember_last_device: true,
            discovery_mode: DiscoveryMode::default(),
            timeouts: StepTimeouts::default(),
        }
    }
}

/// Pair, connect, reconnect and scan, one operation at a time
pub struct BluetoothControlUseCase<B, S>
where
    B: BluetoothGateway,
    S: LastDeviceStore,
{
    bluetooth: B,
    store: S,
    gate: BluetoothGate,
    config: BluetoothControlConfig,
}

impl<B, S> BluetoothControlUseCase<B, S>
where
    B: BluetoothGateway,
    S: LastDeviceStore,
{
    pub fn new(bluetooth: B, store: S, gate: BluetoothGate, config: BluetoothControlConfig) -> Self {
        Self {
            bluetooth,
            store,
            gate,
            config,
        }
    }

    /// Pair, trust and connect a device
    pub async fn pair(&self, mac: &MacAddress, name: &str) -> PairingOutcome {
        let _permit = self.gate.acquire("pair").await;
        info!(%mac, name, "pairing device");

        let mut session = PairingSession::new();
        let outcome = match self.run_pair(&mut session, mac).await {
            Ok(outcome) => outcome,
            Err(e) => PairingOutcome::error(e.to_string()),
        };
        log_outcome(mac, &outcome);
        outcome
    }

    /// Connect an already paired device
    pub async fn connect(&self, mac: &MacAddress, name: &str) -> PairingOutcome {
        let _permit = self.gate.acquire("connect").await;
        info!(%mac, name, "connecting device");

        let mut session = PairingSession::new();
        let outcome = match self.run_connect_only(&mut session, mac).await {
            Ok(outcome) => outcome,
            Err(e) => PairingOutcome::error(e.to_string()),
        };
        log_outcome(mac, &outcome);
        outcome
    }

    /// Connect the device recorded by the last successful connect
    pub async fn reconnect_last(&self) -> Result<PairingOutcome, BluetoothControlError> {
        let mac = self
            .store
            .load()
            .await?
            .ok_or(BluetoothControlError::NoLastDevice)?;
        info!(%mac, "reconnecting last device");
        Ok(self.connect(&mac, "").await)
    }

    /// Discover nearby devices for `duration`
    pub async fn scan(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<BluetoothDevice>, BluetoothControlError> {
        let _permit = self.gate.acquire("scan").await;
        let devices = DiscoverySession::new(
            &self.bluetooth,
            self.config.discovery_mode,
            self.config.timeouts,
        )
        .run(duration, cancel)
        .await?;
        Ok(devices)
    }

    async fn run_pair(
        &self,
        session: &mut PairingSession,
        mac: &MacAddress,
    ) -> Result<PairingOutcome, InvalidStateTransition> {
        session.begin_pairing()?;
        let output = match self
            .step("pair", self.config.timeouts.pair, self.bluetooth.pair(mac))
            .await
        {
            Ok(output) => output,
            Err(outcome) => {
                session.fail()?;
                return Ok(outcome);
            }
        };

        if !output.success() {
            if classify(output.diagnostic()) != DiagnosticClass::AlreadyPaired {
                session.fail()?;
                return Ok(PairingOutcome::error(format!(
                    "Pairing failed: {}",
                    output.diagnostic()
                )));
            }
            info!(%mac, "device already paired");
        }
        session.pair_accepted()?;

        match self
            .step("trust", self.config.timeouts.trust, self.bluetooth.trust(mac))
            .await
        {
            Ok(output) if output.success() => debug!(%mac, "device trusted"),
            Ok(output) => warn!(%mac, diagnostic = output.diagnostic(), "trust failed, continuing"),
            Err(outcome) if outcome.cause.is_some() => {
                session.fail()?;
                return Ok(outcome);
            }
            Err(outcome) => warn!(%mac, error = %outcome.message, "trust failed, continuing"),
        }

        session.begin_connecting()?;
        self.run_connect(session, mac).await
    }

    async fn run_connect_only(
        &self,
        session: &mut PairingSession,
        mac: &MacAddress,
    ) -> Result<PairingOutcome, InvalidStateTransition> {
        session.begin_connecting()?;
        self.run_connect(session, mac).await
    }

    async fn run_connect(
        &self,
        session: &mut PairingSession,
        mac: &MacAddress,
    ) -> Result<PairingOutcome, InvalidStateTransition> {
        let output = match self
            .step("connect", self.config.timeouts.connect, self.bluetooth.connect(mac))
            .await
        {
            Ok(output) => output,
            Err(outcome) => {
                session.fail()?;
                return Ok(outcome);
            }
        };

        if connection_succeeded(&output) {
            session.connection_established()?;
            self.remember(mac).await;

            debug!(delay = %self.config.settle_delay, "waiting for audio sink to appear");
            tokio::time::sleep(self.config.settle_delay.as_std()).await;

            let message = if session.paired() {
                "Paired and connected successfully"
            } else {
                "Connected successfully"
            };
            return Ok(PairingOutcome::ok(message));
        }

        session.connection_refused()?;
        let diagnostic = output.diagnostic();
        let outcome = match session.state().status() {
            Some(PairingStatus::Partial) if diagnostic.is_empty() => {
                PairingOutcome::partial("Paired but connection failed")
            }
            Some(PairingStatus::Partial) => {
                PairingOutcome::partial(format!("Paired but connection failed: {diagnostic}"))
            }
            _ => PairingOutcome::error(format!("Connection failed: {diagnostic}")),
        };
        Ok(outcome)
    }

    /// Run one tool step under its time bound. Timeouts and gateway errors
    /// come back as finished error outcomes.
    async fn step<F>(
        &self,
        step: &'static str,
        limit: std::time::Duration,
        call: F,
    ) -> Result<CommandOutput, PairingOutcome>
    where
        F: Future<Output = Result<CommandOutput, super::ports::BluetoothGatewayError>>,
    {
        match bounded(step, limit, call).await {
            Ok(Ok(output)) => {
                debug!(
                    step,
                    exit_code = ?output.exit_code,
                    stdout = %output.stdout.trim(),
                    stderr = %output.stderr.trim(),
                    "step finished"
                );
                Ok(output)
            }
            Ok(Err(e)) if e.is_unavailable() => Err(PairingOutcome::unavailable(e.to_string())),
            Ok(Err(e)) => Err(PairingOutcome::error(e.to_string())),
            Err(e) => Err(PairingOutcome::timed_out(e.to_string())),
        }
    }

    /// Best-effort update of the last-device marker
    async fn remember(&self, mac: &MacAddress) {
        if !self.config.remember_last_device {
            return;
        }
        match self.store.load().await {
            Ok(Some(stored)) if stored == *mac => return,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not read last device"),
        }
        match self.store.save(mac).await {
            Ok(()) => debug!(%mac, "last device recorded"),
            Err(e) => warn!(%mac, error = %e, "could not record last device"),
        }
    }
}

/// Exit 0, the tool's success marker, or an already-connected diagnostic
fn connection_succeeded(output: &CommandOutput) -> bool {
    output.success()
        || reports_connected(&output.stdout)
        || classify(output.diagnostic()) == DiagnosticClass::AlreadyConnected
}

fn log_outcome(mac: &MacAddress, outcome: &PairingOutcome) {
    match outcome.status {
        PairingStatus::Ok => info!(%mac, message = %outcome.message, "Bluetooth operation succeeded"),
        PairingStatus::Partial => warn!(%mac, message = %outcome.message, "Bluetooth operation partially succeeded"),
        PairingStatus::Error => warn!(%mac, message = %outcome.message, "Bluetooth operation failed"),
    }
}
