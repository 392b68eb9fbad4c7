//! Shutdown signal handling for the service

use tokio::sync::watch;
use tracing::{info, warn};

/// Signals that stop the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

/// Broadcasts the first shutdown signal to any number of waiters
pub struct ShutdownSignal {
    receiver: watch::Receiver<Option<ShutdownReason>>,
}

impl ShutdownSignal {
    /// Install the SIGINT and SIGTERM handlers
    #[cfg(unix)]
    pub fn install() -> Result<Self, std::io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        let (sender, receiver) = watch::channel(None);
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::spawn(async move {
            let reason = tokio::select! {
                _ = sigint.recv() => ShutdownReason::Interrupt,
                _ = sigterm.recv() => ShutdownReason::Terminate,
            };
            info!(?reason, "shutdown requested");
            let _ = sender.send(Some(reason));
        });

        Ok(Self { receiver })
    }

    /// Install the Ctrl+C handler
    #[cfg(not(unix))]
    pub fn install() -> Result<Self, std::io::Error> {
        let (sender, receiver) = watch::channel(None);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("shutdown requested");
            let _ = sender.send(Some(ShutdownReason::Interrupt));
        });
        Ok(Self { receiver })
    }

    /// Whether a shutdown signal has arrived
    pub fn is_shutdown(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    /// Resolve once a shutdown signal arrives
    pub fn wait(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut receiver = self.receiver.clone();
        async move {
            if receiver.wait_for(Option::is_some).await.is_err() {
                warn!("shutdown listener stopped");
            }
        }
    }
}
