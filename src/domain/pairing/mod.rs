//! Pairing domain module

pub mod diagnostic;
mod outcome;
mod session;

pub use diagnostic::{classify, DiagnosticClass};
pub use outcome::{FailureCause, PairingOutcome, PairingStatus};
pub use session::{InvalidStateTransition, PairingSession, PairingState};
