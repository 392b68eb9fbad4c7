//! Bluetooth discovery session
//!
//! A scan runs for a fixed window. In streaming mode the output of the scan
//! process is read line by line for the whole window; in snapshot mode the
//! window is waited out and the daemon's device list is read once at the end.
//! Either way the scan process is terminated and discovery is switched off
//! before returning, on success, error and cancellation alike.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::device::BluetoothDevice;
use crate::domain::discovery::{DiscoveredDevices, DiscoveryMode};
use crate::domain::duration::Duration;

use super::ports::{BluetoothGateway, BluetoothGatewayError, ScanProcess};
use super::timeouts::{bounded, StepTimedOut, StepTimeouts};

/// Errors from a discovery run
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Bluetooth scan failed: {0}")]
    Gateway(#[from] BluetoothGatewayError),

    #[error(transparent)]
    Timeout(#[from] StepTimedOut),
}

/// One timed scan against a Bluetooth gateway.
///
/// The caller is responsible for holding the Bluetooth gate.
pub struct DiscoverySession<'a, B: BluetoothGateway + ?Sized> {
    gateway: &'a B,
    mode: DiscoveryMode,
    timeouts: StepTimeouts,
}

impl<'a, B: BluetoothGateway + ?Sized> DiscoverySession<'a, B> {
    pub fn new(gateway: &'a B, mode: DiscoveryMode, timeouts: StepTimeouts) -> Self {
        Self {
            gateway,
            mode,
            timeouts,
        }
    }

    /// Scan for `duration` and return devices in first-seen order.
    ///
    /// Cancelling `cancel` ends the wait early; cleanup still runs and the
    /// devices seen so far are returned.
    pub async fn run(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<BluetoothDevice>, DiscoveryError> {
        let duration = duration.clamp_scan();
        info!(mode = %self.mode, duration = %duration, "starting Bluetooth scan");

        let mut seen = DiscoveredDevices::new();

        let collected = match bounded(
            "start scan",
            self.timeouts.query,
            self.gateway.start_scan(duration),
        )
        .await
        {
            Ok(Ok(mut process)) => {
                let collected = self
                    .collect(process.as_mut(), duration, cancel, &mut seen)
                    .await;
                if let Err(e) = process.terminate().await {
                    warn!(error = %e, "failed to terminate scan process");
                }
                collected
            }
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(e.into()),
        };

        self.stop_scan().await;
        collected?;

        if self.mode == DiscoveryMode::Snapshot {
            let known = bounded(
                "list known devices",
                self.timeouts.query,
                self.gateway.list_known(),
            )
            .await??;
            for device in known {
                seen.observe(device);
            }
        } else if seen.has_unnamed() {
            self.fill_cached_names(&mut seen).await;
        }

        info!(found = seen.len(), "Bluetooth scan finished");
        Ok(seen.into_devices())
    }

    async fn collect(
        &self,
        process: &mut dyn ScanProcess,
        duration: Duration,
        cancel: &CancellationToken,
        seen: &mut DiscoveredDevices,
    ) -> Result<(), DiscoveryError> {
        let deadline = tokio::time::sleep(duration.as_std());
        tokio::pin!(deadline);

        if self.mode == DiscoveryMode::Snapshot {
            tokio::select! {
                _ = &mut deadline => debug!("scan window elapsed"),
                _ = cancel.cancelled() => info!("scan cancelled"),
            }
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!("scan window elapsed");
                    return Ok(());
                }
                _ = cancel.cancelled() => {
                    info!("scan cancelled");
                    return Ok(());
                }
                line = process.next_line() => match line? {
                    Some(line) => {
                        debug!(line = %line, "scan output");
                        if seen.observe_line(&line) {
                            debug!(found = seen.len(), "device discovered");
                        }
                    }
                    None => {
                        debug!("scan process closed its output");
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Devices already cached by the daemon may only report property
    /// changes while scanning; take their names from the known list.
    async fn fill_cached_names(&self, seen: &mut DiscoveredDevices) {
        match bounded(
            "list known devices",
            self.timeouts.query,
            self.gateway.list_known(),
        )
        .await
        {
            Ok(Ok(known)) => seen.fill_names(known),
            Ok(Err(e)) => warn!(error = %e, "could not resolve device names"),
            Err(e) => warn!(error = %e, "could not resolve device names"),
        }
    }

    async fn stop_scan(&self) {
        match bounded("scan off", self.timeouts.scan_stop, self.gateway.stop_scan()).await {
            Ok(Ok(())) => debug!("discovery switched off"),
            Ok(Err(e)) => warn!(error = %e, "failed to switch discovery off"),
            Err(e) => warn!(error = %e, "failed to switch discovery off"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{mac, MockBluetooth, ScanEnd, ScanScript, Step};
    use std::time::Duration as StdDuration;
    use tokio::time::Instant;

    async fn scan(
        gateway: &MockBluetooth,
        mode: DiscoveryMode,
        secs: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<BluetoothDevice>, DiscoveryError> {
        DiscoverySession::new(gateway, mode, StepTimeouts::default())
            .run(Duration::from_secs(secs), cancel)
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_dedups_new_and_changed_notifications() {
        let gateway = MockBluetooth {
            scan: ScanScript::default()
                .line(1, "[NEW] Device 11:22:33:44:55:66 Foo")
                .line(3, "[CHG] Device 11:22:33:44:55:66 Foo"),
            ..Default::default()
        };

        let started = Instant::now();
        let devices = scan(&gateway, DiscoveryMode::Streaming, 5, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].mac, mac("11:22:33:44:55:66"));
        assert_eq!(devices[0].name, "Foo");
        assert_eq!(started.elapsed(), StdDuration::from_secs(5));
        assert!(gateway.terminated());
        assert_eq!(
            gateway.log.calls(),
            vec!["scan-on 5", "scan-terminate", "scan-off"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_keeps_discovery_order_and_ignores_noise() {
        let gateway = MockBluetooth {
            scan: ScanScript::default()
                .line(0, "Discovery started")
                .line(0, "[CHG] Controller 00:1A:7D:DA:71:13 Discovering: yes")
                .line(1, "[NEW] Device AA:BB:CC:DD:EE:FF AA-BB-CC-DD-EE-FF")
                .line(2, "[NEW] Device 11:22:33:44:55:66 Speaker")
                .line(3, "[CHG] Device AA:BB:CC:DD:EE:FF Name: Headset")
                .line(4, "[CHG] Device 11:22:33:44:55:66 RSSI: -61"),
            ..Default::default()
        };

        let devices = scan(&gateway, DiscoveryMode::Streaming, 10, &CancellationToken::new())
            .await
            .unwrap();

        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Headset", "Speaker"]);
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_names_cached_devices_from_known_list() {
        let gateway = MockBluetooth {
            known: vec![
                BluetoothDevice::new(mac("11:22:33:44:55:66"), "Kitchen Speaker"),
                BluetoothDevice::new(mac("AA:BB:CC:DD:EE:FF"), "Not Seen"),
            ],
            scan: ScanScript::default().line(1, "[CHG] Device 11:22:33:44:55:66 RSSI: -60"),
            ..Default::default()
        };

        let devices = scan(&gateway, DiscoveryMode::Streaming, 5, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            devices,
            vec![BluetoothDevice::new(mac("11:22:33:44:55:66"), "Kitchen Speaker")]
        );
        assert_eq!(
            gateway.log.calls(),
            vec!["scan-on 5", "scan-terminate", "scan-off", "list-known"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_name_lookup_keeps_scan_result() {
        let gateway = MockBluetooth {
            listing: Some(Step::Fail(BluetoothGatewayError::ToolNotFound("bluetoothctl".into()))),
            scan: ScanScript::default().line(1, "[CHG] Device 11:22:33:44:55:66 RSSI: -60"),
            ..Default::default()
        };

        let devices = scan(&gateway, DiscoveryMode::Streaming, 5, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "");
    }

    #[tokio::test(start_paused = true)]
    async fn lines_after_the_window_are_not_collected() {
        let gateway = MockBluetooth {
            scan: ScanScript::default()
                .line(1, "[NEW] Device 11:22:33:44:55:66 Early")
                .line(8, "[NEW] Device AA:BB:CC:DD:EE:FF Late"),
            ..Default::default()
        };

        let devices = scan(&gateway, DiscoveryMode::Streaming, 5, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Early");
    }

    #[tokio::test(start_paused = true)]
    async fn early_end_of_output_finishes_scan() {
        let gateway = MockBluetooth {
            scan: ScanScript::default()
                .line(1, "[NEW] Device 11:22:33:44:55:66 Foo")
                .ending(ScanEnd::Eof),
            ..Default::default()
        };

        let started = Instant::now();
        let devices = scan(&gateway, DiscoveryMode::Streaming, 15, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(started.elapsed(), StdDuration::from_secs(1));
        assert!(gateway.log.contains("scan-off"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_cuts_wait_short_and_cleans_up() {
        let gateway = MockBluetooth {
            scan: ScanScript::default()
                .line(1, "[NEW] Device 11:22:33:44:55:66 Foo")
                .line(4, "[NEW] Device AA:BB:CC:DD:EE:FF Bar"),
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(StdDuration::from_secs(2)).await;
                cancel.cancel();
            });
        }

        let started = Instant::now();
        let devices = scan(&gateway, DiscoveryMode::Streaming, 15, &cancel)
            .await
            .unwrap();

        assert_eq!(started.elapsed(), StdDuration::from_secs(2));
        assert_eq!(devices.len(), 1);
        assert!(gateway.terminated());
        assert!(gateway.log.contains("scan-off"));
    }

    #[tokio::test(start_paused = true)]
    async fn read_error_still_cleans_up() {
        let gateway = MockBluetooth {
            scan: ScanScript::default()
                .line(1, "[NEW] Device 11:22:33:44:55:66 Foo")
                .ending(ScanEnd::Fail),
            ..Default::default()
        };

        let err = scan(&gateway, DiscoveryMode::Streaming, 5, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::Gateway(BluetoothGatewayError::ReadFailed(_))));
        assert!(gateway.terminated());
        assert!(gateway.log.contains("scan-off"));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_tool_still_switches_discovery_off() {
        let gateway = MockBluetooth {
            scan_unavailable: true,
            ..Default::default()
        };

        let err = scan(&gateway, DiscoveryMode::Streaming, 5, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::Gateway(ref e) if e.is_unavailable()));
        assert_eq!(gateway.log.calls(), vec!["scan-on 5", "scan-off"]);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_lists_known_devices_after_window() {
        let gateway = MockBluetooth {
            known: vec![
                BluetoothDevice::new(mac("11:22:33:44:55:66"), "Foo"),
                BluetoothDevice::new(mac("AA:BB:CC:DD:EE:FF"), ""),
                BluetoothDevice::new(mac("11:22:33:44:55:66"), "Foo again"),
            ],
            scan: ScanScript::default().line(1, "[NEW] Device 99:99:99:99:99:99 Ignored"),
            ..Default::default()
        };

        let started = Instant::now();
        let devices = scan(&gateway, DiscoveryMode::Snapshot, 5, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(started.elapsed(), StdDuration::from_secs(5));
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "Foo");
        assert_eq!(
            gateway.log.calls(),
            vec!["scan-on 5", "scan-terminate", "scan-off", "list-known"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_listing_timeout() {
        let gateway = MockBluetooth {
            listing: Some(Step::Hang),
            ..Default::default()
        };

        let err = scan(&gateway, DiscoveryMode::Snapshot, 1, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout(_)));
        assert!(err.to_string().starts_with("Operation timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn long_requests_are_clamped() {
        let gateway = MockBluetooth::default();
        scan(&gateway, DiscoveryMode::Streaming, 3600, &CancellationToken::new())
            .await
            .unwrap();
        assert!(gateway.log.contains("scan-on 120"));
    }
}
