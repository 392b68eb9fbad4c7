//! Volume value object

use std::fmt;

use crate::domain::error::VolumeError;

/// Highest volume accepted, as a fraction of nominal (150%).
pub const MAX_VOLUME_FRACTION: f64 = 1.5;

/// Sink volume held as a fraction of nominal level (1.0 = 100%).
///
/// Values above 1.0 are boosted volumes. Conversion to whole percent happens
/// only at the presentation edge through [`Volume::percent`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Volume(f64);

impl Volume {
    /// Silence
    pub const MUTE: Self = Self(0.0);

    /// Create a volume from a fraction of nominal level
    pub fn from_fraction(fraction: f64) -> Result<Self, VolumeError> {
        if !fraction.is_finite() || !(0.0..=MAX_VOLUME_FRACTION).contains(&fraction) {
            return Err(VolumeError {
                value: fraction,
                max: MAX_VOLUME_FRACTION,
            });
        }
        Ok(Self(fraction))
    }

    /// Volume as reported by the sound server.
    ///
    /// Boosted sinks may sit above the settable limit, so only negative and
    /// non-finite values are rejected.
    pub fn reported(fraction: f64) -> Result<Self, VolumeError> {
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(VolumeError {
                value: fraction,
                max: f64::INFINITY,
            });
        }
        Ok(Self(fraction))
    }

    /// Create a volume from a percentage (100 = nominal level)
    pub fn from_percent(percent: f64) -> Result<Self, VolumeError> {
        Self::from_fraction(percent / 100.0).map_err(|_| VolumeError {
            value: percent,
            max: MAX_VOLUME_FRACTION * 100.0,
        })
    }

    /// Fraction of nominal level
    pub const fn fraction(&self) -> f64 {
        self.0
    }

    /// Whole percent, rounding half to even
    pub fn percent(&self) -> u32 {
        (self.0 * 100.0).round_ties_even() as u32
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_to_even() {
        assert_eq!(Volume::from_fraction(0.125).unwrap().percent(), 12);
        assert_eq!(Volume::from_fraction(0.375).unwrap().percent(), 38);
        assert_eq!(Volume::from_fraction(0.5).unwrap().percent(), 50);
    }

    #[test]
    fn whole_percent_round_trips() {
        for p in 0..=150u32 {
            let v = Volume::from_percent(p as f64).unwrap();
            assert_eq!(v.percent(), p);
        }
    }

    #[test]
    fn boosted_volume_allowed() {
        let v = Volume::from_percent(120.0).unwrap();
        assert_eq!(v.percent(), 120);
        assert!(v.fraction() > 1.0);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(Volume::from_fraction(-0.1).is_err());
        assert!(Volume::from_fraction(f64::NAN).is_err());
        assert!(Volume::from_percent(151.0).is_err());
        let err = Volume::from_percent(200.0).unwrap_err();
        assert_eq!(err.value, 200.0);
    }

    #[test]
    fn reported_volume_has_no_upper_bound() {
        let v = Volume::reported(2.0).unwrap();
        assert_eq!(v.percent(), 200);
        assert!(Volume::reported(-0.5).is_err());
        assert!(Volume::reported(f64::INFINITY).is_err());
    }

    #[test]
    fn display_as_percent() {
        assert_eq!(Volume::from_fraction(0.65).unwrap().to_string(), "65%");
        assert_eq!(Volume::MUTE.to_string(), "0%");
    }
}
