//! Long-running `bluetoothctl scan on` process

use std::process::Stdio;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::application::ports::{BluetoothGatewayError, ScanProcess};

/// How long an interrupted scan gets to exit before it is killed
const INTERRUPT_GRACE: StdDuration = StdDuration::from_secs(1);

/// A spawned scan whose stdout is read line by line
pub struct BluetoothctlScan {
    child: Child,
    stdout: BufReader<ChildStdout>,
    buf: Vec<u8>,
    finished: bool,
}

impl BluetoothctlScan {
    /// Spawn `command` with its stdout piped
    pub fn spawn(mut command: Command) -> std::io::Result<Self> {
        let mut child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("scan process has no stdout"))?;

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            buf: Vec::new(),
            finished: false,
        })
    }

    /// Send SIGINT so the tool can switch discovery off itself
    #[cfg(unix)]
    fn interrupt(&self) {
        if let Some(id) = self.child.id() {
            if let Err(e) = signal::kill(Pid::from_raw(id as i32), Signal::SIGINT) {
                debug!(error = %e, "failed to interrupt scan process");
            }
        }
    }

    #[cfg(not(unix))]
    fn interrupt(&self) {}
}

#[async_trait]
impl ScanProcess for BluetoothctlScan {
    async fn next_line(&mut self) -> Result<Option<String>, BluetoothGatewayError> {
        if self.finished {
            return Ok(None);
        }

        // Partial reads stay in `buf`, so a cancelled call loses nothing
        let read = self
            .stdout
            .read_until(b'\n', &mut self.buf)
            .await
            .map_err(|e| BluetoothGatewayError::ReadFailed(e.to_string()))?;

        if read == 0 && self.buf.is_empty() {
            self.finished = true;
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&self.buf)
            .trim_end_matches(['\n', '\r'])
            .to_string();
        self.buf.clear();
        Ok(Some(line))
    }

    async fn terminate(&mut self) -> Result<(), BluetoothGatewayError> {
        if self
            .child
            .try_wait()
            .map_err(|e| BluetoothGatewayError::CommandFailed(e.to_string()))?
            .is_some()
        {
            return Ok(());
        }

        self.interrupt();
        match tokio::time::timeout(INTERRUPT_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(%status, "scan process exited");
                Ok(())
            }
            Ok(Err(e)) => Err(BluetoothGatewayError::CommandFailed(e.to_string())),
            Err(_) => {
                debug!("scan process ignored interrupt, killing");
                self.child
                    .kill()
                    .await
                    .map_err(|e| BluetoothGatewayError::CommandFailed(e.to_string()))
            }
        }
    }
}
