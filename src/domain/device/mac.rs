//! Bluetooth MAC address value object

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::MacParseError;

/// Six hex pairs separated by `:` or `_`, anywhere in a string
static EMBEDDED_MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[0-9a-f]{2}(?:[_:][0-9a-f]{2}){5}").expect("embedded MAC pattern is valid")
});

/// The same pattern, anchored to the whole input
static EXACT_MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{2}(?:[_:][0-9a-f]{2}){5}$").expect("exact MAC pattern is valid")
});

/// Bluetooth device address in canonical `AA:BB:CC:DD:EE:FF` form.
///
/// Construction normalizes case and separators, so two addresses compare
/// equal whenever they name the same device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(String);

impl MacAddress {
    /// Find the first MAC address embedded in `text` (e.g. a sink name like
    /// `bluez_output.AA_BB_CC_DD_EE_FF.1`).
    pub fn find_in(text: &str) -> Option<Self> {
        EMBEDDED_MAC
            .find(text)
            .map(|m| Self(Self::normalize_unchecked(m.as_str())))
    }

    /// Canonical colon-separated form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Underscore-separated form used in sink names and placeholder ids
    pub fn to_underscored(&self) -> String {
        self.0.replace(':', "_")
    }

    fn normalize_unchecked(raw: &str) -> String {
        raw.replace('_', ":").to_uppercase()
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !EXACT_MAC.is_match(trimmed) {
            return Err(MacParseError {
                input: s.to_string(),
            });
        }
        Ok(Self(Self::normalize_unchecked(trimmed)))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
