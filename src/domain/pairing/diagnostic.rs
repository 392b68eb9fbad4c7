//! Classification of Bluetooth tool diagnostics
//!
//! All knowledge of the tool's wording lives here.

/// Marker printed on stdout by `bluetoothctl connect` on success
pub const CONNECT_SUCCESS_MARKER: &str = "Connection successful";

const ALREADY_PAIRED_MARKERS: &[&str] = &["AlreadyExists", "Already Exists", "already paired"];

const ALREADY_CONNECTED_MARKERS: &[&str] = &["AlreadyConnected", "Already Connected", "already connected"];

/// What a tool diagnostic says about the device state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticClass {
    /// The device already holds a pairing record
    AlreadyPaired,
    /// The device is already connected
    AlreadyConnected,
    GenericFailure,
}

/// Map raw diagnostic text to a class
pub fn classify(text: &str) -> DiagnosticClass {
    if ALREADY_PAIRED_MARKERS.iter().any(|m| text.contains(m)) {
        DiagnosticClass::AlreadyPaired
    } else if ALREADY_CONNECTED_MARKERS.iter().any(|m| text.contains(m)) {
        DiagnosticClass::AlreadyConnected
    } else {
        DiagnosticClass::GenericFailure
    }
}

/// Whether connect output announces a successful connection
pub fn reports_connected(stdout: &str) -> bool {
    stdout.contains(CONNECT_SUCCESS_MARKER)
}
