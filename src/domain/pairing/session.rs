//! Pairing session state machine

use std::fmt;
use thiserror::Error;

use super::PairingStatus;

/// Pairing session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PairingState {
    #[default]
    Idle,
    Pairing,
    Trusting,
    Connecting,
    Connected,
    PartiallyPaired,
    Failed,
}

impl PairingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pairing => "pairing",
            Self::Trusting => "trusting",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::PartiallyPaired => "partially paired",
            Self::Failed => "failed",
        }
    }

    /// Whether the session has finished
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Connected | Self::PartiallyPaired | Self::Failed)
    }

    /// Outcome status of a terminal state
    pub const fn status(&self) -> Option<PairingStatus> {
        match self {
            Self::Connected => Some(PairingStatus::Ok),
            Self::PartiallyPaired => Some(PairingStatus::Partial),
            Self::Failed => Some(PairingStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: PairingState,
    pub action: String,
}

/// One pair or connect attempt against a single device.
///
/// State machine:
///   IDLE -> PAIRING (begin_pairing)
///   PAIRING -> TRUSTING (pair_accepted)
///   IDLE | TRUSTING -> CONNECTING (begin_connecting)
///   CONNECTING -> CONNECTED (connection_established)
///   CONNECTING -> PARTIALLY_PAIRED (connection_refused, after pairing)
///   CONNECTING -> FAILED (connection_refused, connect only)
///   any non-terminal -> FAILED (fail)
#[derive(Debug, Default)]
pub struct PairingSession {
    state: PairingState,
    paired: bool,
}

impl PairingSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Whether the pair step succeeded in this session
    pub fn paired(&self) -> bool {
        self.paired
    }

    fn transition(
        &mut self,
        from: &[PairingState],
        to: PairingState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if !from.contains(&self.state) {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Transition from IDLE to PAIRING
    pub fn begin_pairing(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(&[PairingState::Idle], PairingState::Pairing, "begin pairing")
    }

    /// Transition from PAIRING to TRUSTING
    pub fn pair_accepted(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(&[PairingState::Pairing], PairingState::Trusting, "accept pairing")?;
        self.paired = true;
        Ok(())
    }

    /// Transition from IDLE or TRUSTING to CONNECTING
    pub fn begin_connecting(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[PairingState::Idle, PairingState::Trusting],
            PairingState::Connecting,
            "begin connecting",
        )
    }

    /// Transition from CONNECTING to CONNECTED
    pub fn connection_established(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[PairingState::Connecting],
            PairingState::Connected,
            "establish connection",
        )
    }

    /// Transition from CONNECTING to PARTIALLY_PAIRED when this session
    /// paired the device, otherwise to FAILED
    pub fn connection_refused(&mut self) -> Result<(), InvalidStateTransition> {
        let to = if self.paired {
            PairingState::PartiallyPaired
        } else {
            PairingState::Failed
        };
        self.transition(&[PairingState::Connecting], to, "refuse connection")
    }

    /// Abort from any non-terminal state
    pub fn fail(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state.is_terminal() {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "fail".to_string(),
            });
        }
        self.state = PairingState::Failed;
        Ok(())
    }
}
