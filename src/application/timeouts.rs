//! Time bounds for external calls

use std::future::Future;
use std::time::Duration as StdDuration;

use thiserror::Error;
use tracing::warn;

/// An external step exceeded its time bound
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Operation timeout: {step} did not finish within {}s", .limit.as_secs())]
pub struct StepTimedOut {
    pub step: &'static str,
    pub limit: StdDuration,
}

/// Bound of each kind of external call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTimeouts {
    /// Status and listing queries
    pub query: StdDuration,
    pub pair: StdDuration,
    pub trust: StdDuration,
    pub connect: StdDuration,
    pub scan_stop: StdDuration,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            query: StdDuration::from_secs(5),
            pair: StdDuration::from_secs(30),
            trust: StdDuration::from_secs(5),
            connect: StdDuration::from_secs(30),
            scan_stop: StdDuration::from_secs(2),
        }
    }
}

/// Run `fut`, failing with [`StepTimedOut`] once `limit` elapses.
///
/// The future is dropped on timeout, so child processes spawned with
/// `kill_on_drop` are reaped.
pub async fn bounded<F: Future>(
    step: &'static str,
    limit: StdDuration,
    fut: F,
) -> Result<F::Output, StepTimedOut> {
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        warn!(step, limit_secs = limit.as_secs(), "external call timed out");
        StepTimedOut { step, limit }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_bound_reports_step() {
        let err = bounded("pair", StdDuration::from_secs(30), std::future::pending::<()>())
            .await
            .unwrap_err();
        assert_eq!(err.step, "pair");
        assert!(err.to_string().starts_with("Operation timeout"));
        assert!(err.to_string().contains("30s"));
    }

    #[tokio::test]
    async fn fast_future_passes_through() {
        let value = bounded("query", StdDuration::from_secs(5), async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn default_bounds() {
        let t = StepTimeouts::default();
        assert_eq!(t.query.as_secs(), 5);
        assert_eq!(t.pair.as_secs(), 30);
        assert_eq!(t.trust.as_secs(), 5);
        assert_eq!(t.connect.as_secs(), 30);
        assert_eq!(t.scan_stop.as_secs(), 2);
    }
}
