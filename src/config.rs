//! Tracker configuration — every detection tunable plus the display and
//! window-reset policy flags, with named built-in profiles and JSON
//! load/save for user overrides.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Detection threshold before a note is locked (dBFS)
    pub strict_threshold_db: f64,
    /// Threshold once locked — a few dB more permissive so softer playing
    /// keeps the note tracked
    pub relaxed_threshold_db: f64,
    /// Lowest accepted frequency (exclusive), Hz
    pub min_frequency_hz: f64,
    /// Highest accepted frequency (exclusive), Hz
    pub max_frequency_hz: f64,
    /// Frequency stability window capacity (1–4 in practice)
    pub frequency_window: usize,
    /// Absolute Hz band around the window mean
    pub frequency_tolerance_hz: f64,
    /// Amplitude stability window capacity
    pub amplitude_window: usize,
    /// Worst allowed relative deviation from the window mean
    pub max_amplitude_variance: f64,
    /// Continuous stability required before a detection goes active (ms)
    pub min_sustain_ms: u64,
    /// Smoothing factor for the displayed frequency (0=frozen, 1=instant)
    pub frequency_alpha: f64,
    /// Smoothing factor for the displayed cents
    pub cents_alpha: f64,
    /// Half-width of the in-tune band, cents
    pub in_tune_cents: f64,
    /// Keep the last note/frequency on screen (inactive) after signal loss
    /// instead of clearing to "--"
    pub hold_last_reading: bool,
    /// Clear the frequency window when amplitude goes unstable. Off by
    /// default: the preserved window lets frequency stability catch up
    /// independently of an amplitude wobble.
    pub reset_frequency_window_on_amplitude_instability: bool,
}

impl Default for TrackerConfig {
    /// The balanced profile: strict −38 dB noise floor, 6 dB of lock
    /// hysteresis, two-sample windows, 30 ms sustain.
    fn default() -> Self {
        Self {
            strict_threshold_db: -38.0,
            relaxed_threshold_db: -44.0,
            min_frequency_hz: 65.0,
            max_frequency_hz: 2000.0,
            frequency_window: 2,
            frequency_tolerance_hz: 8.0,
            amplitude_window: 2,
            max_amplitude_variance: 0.35,
            min_sustain_ms: 30,
            frequency_alpha: 0.35,
            cents_alpha: 0.5,
            in_tune_cents: 3.0,
            hold_last_reading: false,
            reset_frequency_window_on_amplitude_instability: false,
        }
    }
}

impl TrackerConfig {
    /// Single-sample windows, short sustain, snappy smoothing. Minimal
    /// latency at the cost of occasional flicker on noisy input.
    pub fn responsive() -> Self {
        Self {
            frequency_window: 1,
            frequency_tolerance_hz: 10.0,
            amplitude_window: 1,
            min_sustain_ms: 15,
            frequency_alpha: 0.7,
            cents_alpha: 0.75,
            ..Self::default()
        }
    }

    /// Four-sample windows, tight tolerance, slow smoothing. Rock-steady
    /// display that takes noticeably longer to react.
    pub fn steady() -> Self {
        Self {
            frequency_window: 4,
            frequency_tolerance_hz: 5.0,
            amplitude_window: 4,
            max_amplitude_variance: 0.3,
            frequency_alpha: 0.15,
            cents_alpha: 0.2,
            ..Self::default()
        }
    }

    /// The early, coarse frequency range (20–5000 Hz) kept for signals
    /// outside the usual instrumental compass.
    pub fn legacy_wide_range() -> Self {
        Self {
            min_frequency_hz: 20.0,
            max_frequency_hz: 5000.0,
            ..Self::default()
        }
    }

    /// Look up a built-in profile by name.
    pub fn profile(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::default()),
            "responsive" => Some(Self::responsive()),
            "steady" => Some(Self::steady()),
            "wide" => Some(Self::legacy_wide_range()),
            _ => None,
        }
    }

    /// Load from a JSON file. Returns None if the file is absent or
    /// malformed.
    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(c) => {
                info!("Loaded tracker config from {:?}", path);
                Some(c)
            }
            Err(e) => {
                warn!("Failed to parse config file {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, json)?;
        info!("Tracker config saved to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_values() {
        let c = TrackerConfig::default();
        assert_eq!(c.strict_threshold_db, -38.0);
        // Relaxed is 6 dB more permissive
        assert_eq!(c.relaxed_threshold_db, c.strict_threshold_db - 6.0);
        assert_eq!(c.frequency_window, 2);
        assert_eq!(c.min_sustain_ms, 30);
        assert!(!c.hold_last_reading);
    }

    #[test]
    fn test_profiles_by_name() {
        assert_eq!(TrackerConfig::profile("responsive").unwrap().frequency_window, 1);
        assert_eq!(TrackerConfig::profile("steady").unwrap().frequency_window, 4);
        assert_eq!(
            TrackerConfig::profile("wide").unwrap().max_frequency_hz,
            5000.0
        );
        assert!(TrackerConfig::profile("nonsense").is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let c = TrackerConfig::steady();
        let json = serde_json::to_string_pretty(&c).unwrap();
        let back: TrackerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frequency_window, 4);
        assert!((back.frequency_alpha - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let back: TrackerConfig =
            serde_json::from_str(r#"{"min_sustain_ms": 15}"#).unwrap();
        assert_eq!(back.min_sustain_ms, 15);
        assert_eq!(back.strict_threshold_db, -38.0);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        assert!(TrackerConfig::load(Path::new("/nonexistent/config.json")).is_none());
    }
}
