//! Serialization of Bluetooth operations
//!
//! The Bluetooth adapter is one stateful resource: a single discovery and a
//! single pairing agent at a time. Every use case that talks to the
//! Bluetooth gateway holds a [`BluetoothPermit`] for the duration.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Process-wide mutual exclusion gate for Bluetooth operations.
///
/// Cloning yields a handle to the same gate.
#[derive(Debug, Clone, Default)]
pub struct BluetoothGate {
    lock: Arc<Mutex<()>>,
}

/// Held while a Bluetooth operation is in flight; released on drop
#[derive(Debug)]
pub struct BluetoothPermit {
    operation: &'static str,
    _guard: OwnedMutexGuard<()>,
}

impl BluetoothGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other Bluetooth operation is running
    pub async fn acquire(&self, operation: &'static str) -> BluetoothPermit {
        let guard = match self.lock.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(operation, "waiting for running Bluetooth operation");
                self.lock.clone().lock_owned().await
            }
        };
        debug!(operation, "Bluetooth gate acquired");
        BluetoothPermit {
            operation,
            _guard: guard,
        }
    }

    /// Whether an operation currently holds the gate
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

impl Drop for BluetoothPermit {
    fn drop(&mut self) {
        debug!(operation = self.operation, "Bluetooth gate released");
    }
}
