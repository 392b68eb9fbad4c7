//! Pairing outcome value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result class of a pair or connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingStatus {
    Ok,
    /// Paired, but the connection did not come up
    Partial,
    Error,
}

impl PairingStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Partial => "partial",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PairingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attempt ended in [`PairingStatus::Error`] without the tool refusing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// A step exceeded its time bound
    Timeout,
    /// The Bluetooth tool could not be run
    Unavailable,
}

/// Status plus a human-readable message carrying any tool diagnostic verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingOutcome {
    pub status: PairingStatus,
    pub message: String,
    #[serde(skip)]
    pub cause: Option<FailureCause>,
}

impl PairingOutcome {
    fn with_status(status: PairingStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            cause: None,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::with_status(PairingStatus::Ok, message)
    }

    pub fn partial(message: impl Into<String>) -> Self {
        Self::with_status(PairingStatus::Partial, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(PairingStatus::Error, message)
    }

    /// Error outcome for a step that ran out of time
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            cause: Some(FailureCause::Timeout),
            ..Self::error(message)
        }
    }

    /// Error outcome for a tool that could not be run
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            cause: Some(FailureCause::Unavailable),
            ..Self::error(message)
        }
    }
}
