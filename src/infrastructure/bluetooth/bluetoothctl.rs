//! bluetoothctl adapter

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{
    BluetoothGateway, BluetoothGatewayError, CommandOutput, ScanProcess,
};
use crate::domain::device::{BluetoothDevice, MacAddress};
use crate::domain::discovery::DiscoveredDevices;
use crate::domain::duration::Duration;
use crate::infrastructure::process::{run_tool, spawn_error, tool_command, ToolError};

use super::scan::BluetoothctlScan;

/// Extra time the scan process is given beyond the requested window
const SCAN_TIMEOUT_MARGIN_SECS: u64 = 2;

/// Bluetooth adapter driving the BlueZ `bluetoothctl` tool
pub struct BluetoothctlGateway {
    program: String,
}

impl BluetoothctlGateway {
    pub fn new() -> Self {
        Self::with_program("bluetoothctl")
    }

    /// Use a specific `bluetoothctl` executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput, BluetoothGatewayError> {
        run_tool(&self.program, args).await.map_err(map_tool_error)
    }

    /// Run a listing command and parse the `Device <MAC> <name>` lines
    async fn list(&self, args: &[&str]) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        let output = self.run(args).await?;
        if !output.success() {
            return Err(BluetoothGatewayError::CommandFailed(
                output.diagnostic().to_string(),
            ));
        }
        Ok(parse_listing(&output.stdout))
    }
}

impl Default for BluetoothctlGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn map_tool_error(e: ToolError) -> BluetoothGatewayError {
    match e {
        ToolError::NotFound { .. } => BluetoothGatewayError::ToolNotFound(e.to_string()),
        ToolError::Io { .. } => BluetoothGatewayError::SpawnFailed(e.to_string()),
    }
}

fn parse_listing(output: &str) -> Vec<BluetoothDevice> {
    let mut devices = DiscoveredDevices::new();
    devices.observe_output(output);
    devices.into_devices()
}

/// `bluetoothctl info` reports `Connected: yes` for live links
fn parse_connected(info: &str) -> bool {
    info.lines()
        .any(|line| line.trim().eq_ignore_ascii_case("Connected: yes"))
}

#[async_trait]
impl BluetoothGateway for BluetoothctlGateway {
    async fn list_paired(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        match self.list(&["devices", "Paired"]).await {
            Ok(devices) => Ok(devices),
            Err(BluetoothGatewayError::CommandFailed(diagnostic)) => {
                // BlueZ before 5.65 only knows the older command
                debug!(%diagnostic, "falling back to paired-devices");
                self.list(&["paired-devices"]).await
            }
            Err(e) => Err(e),
        }
    }

    async fn list_known(&self) -> Result<Vec<BluetoothDevice>, BluetoothGatewayError> {
        self.list(&["devices"]).await
    }

    async fn query_connected(&self, mac: &MacAddress) -> Result<bool, BluetoothGatewayError> {
        let output = self.run(&["info", mac.as_str()]).await?;
        Ok(parse_connected(&output.stdout))
    }

    async fn start_scan(&self, max: Duration) -> Result<Box<dyn ScanProcess>, BluetoothGatewayError> {
        let timeout = (max.as_secs() + SCAN_TIMEOUT_MARGIN_SECS).to_string();
        let command = tool_command(&self.program, &["--timeout", &timeout, "scan", "on"]);
        let scan = BluetoothctlScan::spawn(command)
            .map_err(|e| map_tool_error(spawn_error(&self.program, e)))?;
        debug!(timeout_secs = %timeout, "scan process started");
        Ok(Box::new(scan))
    }

    async fn stop_scan(&self) -> Result<(), BluetoothGatewayError> {
        let output = self.run(&["scan", "off"]).await?;
        if output.success() {
            Ok(())
        } else {
            Err(BluetoothGatewayError::CommandFailed(
                output.diagnostic().to_string(),
            ))
        }
    }

    async fn pair(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.run(&["pair", mac.as_str()]).await
    }

    async fn trust(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.run(&["trust", mac.as_str()]).await
    }

    async fn connect(&self, mac: &MacAddress) -> Result<CommandOutput, BluetoothGatewayError> {
        self.run(&["connect", mac.as_str()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_listing() {
        let devices = parse_listing(
            "Device AA:BB:CC:DD:EE:FF WH-1000XM4\nDevice 11:22:33:44:55:66 Kitchen Speaker\n",
        );
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "WH-1000XM4");
        assert_eq!(devices[1].mac.as_str(), "11:22:33:44:55:66");
        assert!(devices.iter().all(|d| d.connected.is_none()));
    }

    #[test]
    fn parses_connection_status() {
        let info = "Device AA:BB:CC:DD:EE:FF (public)\n\
                    \tName: WH-1000XM4\n\
                    \tPaired: yes\n\
                    \tTrusted: yes\n\
                    \tConnected: yes\n";
        assert!(parse_connected(info));
        assert!(!parse_connected(&info.replace("Connected: yes", "Connected: no")));
        assert!(!parse_connected("Device AA:BB:CC:DD:EE:FF not available"));
    }

    #[cfg(unix)]
    mod fake_tool {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;
        use tempfile::TempDir;

        /// Write an executable shell script standing in for bluetoothctl
        fn fake_bluetoothctl(body: &str) -> (TempDir, PathBuf) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("bluetoothctl");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            (dir, path)
        }

        #[tokio::test]
        async fn paired_listing_falls_back_to_old_command() {
            let (_dir, path) = fake_bluetoothctl(
                r#"case "$1" in
  devices) echo "Invalid command" >&2; exit 1 ;;
  paired-devices) echo "Device AA:BB:CC:DD:EE:FF Headset" ;;
esac"#,
            );
            let gateway = BluetoothctlGateway::with_program(path.to_string_lossy());
            let paired = gateway.list_paired().await.unwrap();
            assert_eq!(paired.len(), 1);
            assert_eq!(paired[0].name, "Headset");
        }

        #[tokio::test]
        async fn pair_output_is_passed_through() {
            let (_dir, path) = fake_bluetoothctl(
                r#"echo "Attempting to pair with $2"
echo "Failed to pair: org.bluez.Error.AlreadyExists" >&2
exit 1"#,
            );
            let gateway = BluetoothctlGateway::with_program(path.to_string_lossy());
            let output = gateway.pair(&"aa:bb:cc:dd:ee:ff".parse().unwrap()).await.unwrap();
            assert_eq!(output.exit_code, Some(1));
            assert_eq!(output.stdout.trim(), "Attempting to pair with AA:BB:CC:DD:EE:FF");
            assert_eq!(output.diagnostic(), "Failed to pair: org.bluez.Error.AlreadyExists");
        }

        #[tokio::test]
        async fn scan_streams_lines() {
            let (_dir, path) = fake_bluetoothctl(
                r#"[ "$1" = "--timeout" ] || exit 2
echo "Discovery started"
echo "[NEW] Device 11:22:33:44:55:66 Foo"
exec sleep 30"#,
            );
            let gateway = BluetoothctlGateway::with_program(path.to_string_lossy());
            let mut scan = gateway.start_scan(Duration::from_secs(5)).await.unwrap();

            assert_eq!(scan.next_line().await.unwrap().as_deref(), Some("Discovery started"));
            assert_eq!(
                scan.next_line().await.unwrap().as_deref(),
                Some("[NEW] Device 11:22:33:44:55:66 Foo")
            );
            scan.terminate().await.unwrap();
        }

        #[tokio::test]
        async fn missing_tool() {
            let gateway = BluetoothctlGateway::with_program("/nonexistent/bluetoothctl");
            let err = gateway.list_known().await.unwrap_err();
            assert!(err.is_unavailable());
        }
    }
}
