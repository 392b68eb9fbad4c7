//! Device identity correlation
//!
//! Merges the sound server's sink list with the Bluetooth subsystem's paired
//! list. A paired device is considered covered when a Bluetooth-tagged sink
//! embeds its MAC in the sink name; covered devices are represented by the
//! sink alone, everything else gets a placeholder entry.

use std::collections::HashSet;

use super::device::{AudioDevice, BluetoothDevice, MacAddress, Sink};

/// Build the merged device list.
///
/// Sinks come first in the order the sound server reported them, followed by
/// placeholders for uncovered paired devices in paired-list order. `is_active`
/// is set exactly on the sink whose id equals `default_sink_id`.
pub fn correlate(
    sinks: &[Sink],
    default_sink_id: Option<&str>,
    paired: &[BluetoothDevice],
) -> Vec<AudioDevice> {
    let covered = covered_macs(sinks);

    let mut devices: Vec<AudioDevice> = sinks
        .iter()
        .map(|sink| AudioDevice::from_sink(sink, Some(sink.id.as_str()) == default_sink_id))
        .collect();

    devices.extend(
        paired
            .iter()
            .filter(|device| !covered.contains(&device.mac))
            .map(AudioDevice::placeholder),
    );

    devices
}

/// MACs embedded in Bluetooth-tagged sink names
pub fn covered_macs(sinks: &[Sink]) -> HashSet<MacAddress> {
    sinks.iter().filter_map(Sink::embedded_mac).collect()
}
