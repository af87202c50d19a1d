//! Configuration parameters for the swar pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SwarError};
use crate::level::DEFAULT_BAR_COUNT;
use crate::pitch::{
    DEFAULT_MAX_FREQUENCY, DEFAULT_MIN_FREQUENCY, DEFAULT_SILENCE_THRESHOLD,
    DEFAULT_YIN_THRESHOLD,
};
use crate::stabilizer::{DEFAULT_MIN_HOLD, DEFAULT_RESET_WINDOW};
use crate::swar::{ScaleRoot, SwarMode};

/// Tuner configuration.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    // Pitch estimation
    /// RMS below which a frame is silence (default: 0.01)
    pub silence_threshold: f32,

    /// Absolute threshold on the normalized difference (default: 0.1)
    pub yin_threshold: f32,

    /// Lowest reported frequency in Hz (default: 200.0)
    pub min_frequency: f32,

    /// Highest reported frequency in Hz (default: 2200.0)
    pub max_frequency: f32,

    // Level meter
    /// Number of level bars (default: 32)
    pub bar_count: usize,

    // Stabilizer
    /// Minimum hold after a note change, in milliseconds (default: 100)
    pub min_hold_ms: u64,

    /// Time after which any note is accepted outright, in milliseconds (default: 300)
    pub reset_window_ms: u64,

    // Scale
    /// Tonic as a chromatic index, C = 0 (default: 0)
    pub scale_root: ScaleRoot,

    /// Degree mapping (default: chromatic)
    pub swar_mode: SwarMode,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            yin_threshold: DEFAULT_YIN_THRESHOLD,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            bar_count: DEFAULT_BAR_COUNT,
            min_hold_ms: DEFAULT_MIN_HOLD.as_millis() as u64,
            reset_window_ms: DEFAULT_RESET_WINDOW.as_millis() as u64,
            scale_root: ScaleRoot::default(),
            swar_mode: SwarMode::default(),
        }
    }
}

impl TunerConfig {
    pub fn min_hold(&self) -> Duration {
        Duration::from_millis(self.min_hold_ms)
    }

    pub fn reset_window(&self) -> Duration {
        Duration::from_millis(self.reset_window_ms)
    }

    /// Checks that the parameters are usable together.
    pub fn validate(&self) -> Result<()> {
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if !positive(self.silence_threshold) {
            return Err(invalid(format!(
                "silence_threshold must be positive, got {}",
                self.silence_threshold
            )));
        }
        if !positive(self.yin_threshold) || self.yin_threshold >= 1.0 {
            return Err(invalid(format!(
                "yin_threshold must be in (0, 1), got {}",
                self.yin_threshold
            )));
        }
        if !positive(self.min_frequency) || !positive(self.max_frequency) {
            return Err(invalid("frequency range must be positive".to_string()));
        }
        if self.min_frequency >= self.max_frequency {
            return Err(invalid(format!(
                "min_frequency {} must be below max_frequency {}",
                self.min_frequency, self.max_frequency
            )));
        }
        if self.bar_count == 0 {
            return Err(invalid("bar_count must be at least 1".to_string()));
        }
        if self.min_hold_ms >= self.reset_window_ms {
            return Err(invalid(format!(
                "min_hold_ms {} must be shorter than reset_window_ms {}",
                self.min_hold_ms, self.reset_window_ms
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> SwarError {
    SwarError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TunerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bar_count, 32);
        assert_eq!(config.min_hold(), Duration::from_millis(100));
        assert_eq!(config.reset_window(), Duration::from_millis(300));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let config = TunerConfig {
            min_frequency: 2200.0,
            max_frequency: 200.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SwarError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_hold_longer_than_reset() {
        let config = TunerConfig {
            min_hold_ms: 400,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        for config in [
            TunerConfig { silence_threshold: 0.0, ..Default::default() },
            TunerConfig { yin_threshold: 1.5, ..Default::default() },
            TunerConfig { min_frequency: f32::NAN, ..Default::default() },
            TunerConfig { bar_count: 0, ..Default::default() },
        ] {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TunerConfig =
            serde_json::from_str(r#"{ "scale_root": 7, "swar_mode": "natural" }"#).unwrap();
        assert_eq!(config.scale_root.index(), 7);
        assert_eq!(config.swar_mode, SwarMode::Natural);
        assert_eq!(config.max_frequency, DEFAULT_MAX_FREQUENCY);
    }

    #[test]
    fn test_out_of_range_root_fails_to_parse() {
        let result: std::result::Result<TunerConfig, _> =
            serde_json::from_str(r#"{ "scale_root": 12 }"#);
        assert!(result.is_err());
    }
}
