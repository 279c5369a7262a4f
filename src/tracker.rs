use crate::config::TrackerConfig;
use crate::gate;
use crate::intune::InTuneAccumulator;
use crate::note;
use crate::smoothing::Smoother;
use crate::stability::StabilityTracker;
use crate::sustain::SustainGate;
use crate::types::{DisplayState, PitchSample};
use log::trace;

/// Real-time pitch tracker: turns raw (frequency, level) samples into a
/// stable note/cents/frequency display.
///
/// # How it works
///
/// Every sample runs the same gauntlet, short-circuiting on the first
/// failure:
///
/// 1. **Signal gate** — level must clear the current detection threshold
///    and the frequency must sit inside the instrumental range. The
///    threshold adapts: strict until a note locks, then 6 dB more
///    permissive so established notes survive softer playing.
/// 2. **Amplitude stability** — the recent amplitude window must be full
///    and its relative variance bounded.
/// 3. **Frequency stability** — the recent frequency window must be full
///    and clustered within an absolute Hz tolerance.
/// 4. **Sustain** — the stable signal must hold for a minimum duration
///    before anything is displayed.
///
/// Only then is the detection active: the window-mean frequency is
/// exponentially smoothed for display, mapped to the nearest
/// equal-tempered note, the cents deviation smoothed separately, and the
/// in-tune timer advanced.
///
/// Any rejection transitions back to Idle (strict threshold, no lock) and
/// publishes an inactive state. What survives a rejection is policy:
/// a gate failure clears everything, while instability keeps the rolling
/// windows (optionally clearing the frequency window on amplitude
/// instability) so a recovering signal re-locks quickly.
///
/// All work is O(window size) with no allocation beyond the fixed windows
/// and the published note label — safe to call from an audio-adjacent
/// thread at buffer cadence.
pub struct PitchTracker {
    config: TrackerConfig,
    stability: StabilityTracker,
    sustain: SustainGate,
    frequency_smoother: Smoother,
    cents_smoother: Smoother,
    in_tune: InTuneAccumulator,
    display: DisplayState,
}

impl PitchTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let stability = StabilityTracker::new(
            config.frequency_window,
            config.frequency_tolerance_hz,
            config.amplitude_window,
            config.max_amplitude_variance,
        );
        let sustain = SustainGate::new(
            config.strict_threshold_db,
            config.relaxed_threshold_db,
            config.min_sustain_ms,
        );
        let frequency_smoother = Smoother::new(config.frequency_alpha);
        let cents_smoother = Smoother::new(config.cents_alpha);
        let in_tune = InTuneAccumulator::new(config.in_tune_cents);
        Self {
            config,
            stability,
            sustain,
            frequency_smoother,
            cents_smoother,
            in_tune,
            display: DisplayState::cleared(0),
        }
    }

    /// Process one backend sample and return the published display state.
    pub fn process(&mut self, sample: &PitchSample) -> DisplayState {
        let now_us = sample.timestamp_us;
        let level_db = sample.level.db();

        if !gate::passes(
            level_db,
            sample.frequency_hz,
            self.sustain.threshold_db(),
            self.config.min_frequency_hz,
            self.config.max_frequency_hz,
        ) {
            trace!(
                "gate reject: {:.1} dB / {:.1} Hz (threshold {:.1} dB)",
                level_db,
                sample.frequency_hz,
                self.sustain.threshold_db()
            );
            return self.signal_lost(now_us);
        }

        self.stability.push_amplitude(sample.level.linear());
        if !self.stability.amplitude_window_full() {
            return self.publish_inactive(now_us);
        }
        if !self.stability.amplitude_stable() {
            trace!("amplitude unstable at t={}µs", now_us);
            let clear_freq = self.config.reset_frequency_window_on_amplitude_instability;
            return self.unstable(now_us, clear_freq);
        }

        self.stability.push_frequency(sample.frequency_hz);
        if !self.stability.frequency_window_full() {
            return self.publish_inactive(now_us);
        }
        if !self.stability.frequency_stable() {
            trace!("frequency unstable at t={}µs", now_us);
            return self.unstable(now_us, false);
        }

        if !self.sustain.observe_stable(now_us) {
            // Stable but not yet held long enough — keep buffering.
            return self.publish_inactive(now_us);
        }

        // Locked: the window mean, not the instantaneous sample, feeds both
        // smoothing and note mapping.
        let window_hz = self.stability.mean_frequency();
        let display_hz = self.frequency_smoother.smooth(window_hz);
        let mapped = note::nearest_note(window_hz);
        let raw_cents = sample.cents.unwrap_or(mapped.cents);
        let display_cents = self.cents_smoother.smooth(raw_cents);
        let in_tune_secs = self.in_tune.update(display_cents, now_us);

        self.display = DisplayState {
            timestamp_us: now_us,
            frequency_hz: display_hz,
            note_name: mapped.label(),
            cents_offset: display_cents,
            amplitude: self.stability.mean_amplitude().clamp(0.0, 1.0) as f32,
            signal_active: true,
            in_tune_secs,
        };
        self.display.clone()
    }

    /// Last published state.
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Restore every piece of detection state to its initial value.
    /// Called on engine stop so a later start never observes a stale lock
    /// or relaxed threshold.
    pub fn reset(&mut self) {
        self.sustain.drop_out();
        self.stability.reset();
        self.frequency_smoother.reset();
        self.cents_smoother.reset();
        self.in_tune.reset();
        self.display = DisplayState::cleared(0);
    }

    /// Gate rejection: the signal is gone. Everything resets.
    fn signal_lost(&mut self, now_us: u64) -> DisplayState {
        self.sustain.drop_out();
        self.stability.reset();
        self.frequency_smoother.reset();
        self.cents_smoother.reset();
        self.in_tune.reset();
        self.publish_inactive(now_us)
    }

    /// Stability rejection: the signal is present but untrustworthy.
    /// The rolling windows survive (frequency window per policy) so a
    /// recovering signal can re-lock without rebuilding history.
    fn unstable(&mut self, now_us: u64, clear_frequency_window: bool) -> DisplayState {
        self.sustain.drop_out();
        if clear_frequency_window {
            self.stability.clear_frequencies();
        }
        self.frequency_smoother.reset();
        self.cents_smoother.reset();
        self.in_tune.reset();
        self.publish_inactive(now_us)
    }

    fn publish_inactive(&mut self, now_us: u64) -> DisplayState {
        if self.config.hold_last_reading {
            self.display.timestamp_us = now_us;
            self.display.signal_active = false;
            self.display.in_tune_secs = 0.0;
        } else {
            self.display = DisplayState::cleared(now_us);
        }
        self.display.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sustain::Phase;
    use crate::types::{SignalLevel, NO_NOTE};

    const TICK_US: u64 = 10_000; // 10 ms sample cadence

    fn sample(tick: u64, hz: f64, db: f64) -> PitchSample {
        PitchSample {
            timestamp_us: tick * TICK_US,
            frequency_hz: hz,
            level: SignalLevel::Decibels(db),
            cents: None,
        }
    }

    /// Feed `n` ticks of a steady tone starting at `start_tick`.
    fn feed_tone(t: &mut PitchTracker, start_tick: u64, n: u64, hz: f64, db: f64) -> DisplayState {
        let mut last = t.display().clone();
        for i in 0..n {
            last = t.process(&sample(start_tick + i, hz, db));
        }
        last
    }

    #[test]
    fn test_locks_on_stable_tone() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        // 6 samples over 50 ms: windows fill, then 30 ms sustain elapses
        let d = feed_tone(&mut t, 0, 6, 440.0, -20.0);
        assert!(d.signal_active);
        assert_eq!(d.note_name, "A4");
        assert!((d.frequency_hz - 440.0).abs() < 0.5);
        assert!(d.cents_offset.abs() < 1.0);
    }

    #[test]
    fn test_buffering_stays_inactive() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        // First three ticks: windows filling, sustain starting
        for i in 0..3 {
            let d = t.process(&sample(i, 440.0, -20.0));
            assert!(!d.signal_active, "tick {} should still buffer", i);
            assert_eq!(d.note_name, NO_NOTE);
        }
    }

    #[test]
    fn test_silence_drops_within_one_sample() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        assert!(feed_tone(&mut t, 0, 6, 440.0, -20.0).signal_active);

        let d = t.process(&sample(6, 440.0, -50.0));
        assert!(!d.signal_active);
        assert_eq!(d.note_name, NO_NOTE);
        assert_eq!(d.in_tune_secs, 0.0);
        assert_eq!(t.sustain.phase(), Phase::Idle);
        assert_eq!(t.sustain.threshold_db(), -38.0);
    }

    #[test]
    fn test_out_of_range_frequency_rejected() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        let d = feed_tone(&mut t, 0, 10, 30.0, -20.0);
        assert!(!d.signal_active);
        // Non-positive frequency is silence regardless of level
        let d = t.process(&sample(10, 0.0, -5.0));
        assert!(!d.signal_active);
    }

    #[test]
    fn test_transient_blip_never_activates() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        // 20 ms of tone (3 ticks) is shorter than the 30 ms sustain
        for i in 0..3 {
            assert!(!t.process(&sample(i, 440.0, -20.0)).signal_active);
        }
        assert!(!t.process(&sample(3, 0.0, -90.0)).signal_active);
    }

    #[test]
    fn test_relaxed_threshold_holds_decaying_note() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        assert!(feed_tone(&mut t, 0, 6, 440.0, -20.0).signal_active);

        // Decay smoothly from −20 dB toward −41 dB: below strict, above
        // relaxed. Each 10% step keeps amplitude variance small.
        let mut amp = 0.1f64;
        let mut tick = 6;
        while crate::gate::linear_to_db(amp) > -41.0 {
            amp *= 0.9;
            let d = t.process(&PitchSample {
                timestamp_us: tick * TICK_US,
                frequency_hz: 440.0,
                level: SignalLevel::Linear(amp),
                cents: None,
            });
            assert!(
                d.signal_active,
                "lost lock at {:.1} dB",
                crate::gate::linear_to_db(amp)
            );
            tick += 1;
        }

        // Control: the same quiet level cold never clears the strict gate
        let mut cold = PitchTracker::new(TrackerConfig::default());
        let d = feed_tone(&mut cold, 0, 20, 440.0, -41.0);
        assert!(!d.signal_active);
    }

    #[test]
    fn test_amplitude_jump_drops_lock() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        assert!(feed_tone(&mut t, 0, 6, 440.0, -20.0).signal_active);

        // A sudden 10 dB jump trips the relative-variance check
        let d = t.process(&sample(6, 440.0, -10.0));
        assert!(!d.signal_active);
        assert_eq!(t.sustain.phase(), Phase::Idle);
    }

    #[test]
    fn test_frequency_window_survives_amplitude_instability() {
        // Default policy: the frequency window is preserved, so re-lock
        // after an amplitude blip is one sample faster than with the
        // clearing policy.
        let relock_ticks = |clear: bool| {
            let config = TrackerConfig {
                reset_frequency_window_on_amplitude_instability: clear,
                ..TrackerConfig::default()
            };
            let mut t = PitchTracker::new(config);
            assert!(feed_tone(&mut t, 0, 6, 440.0, -20.0).signal_active);
            assert!(!t.process(&sample(6, 440.0, -10.0)).signal_active);

            let mut ticks = 0;
            for i in 7.. {
                ticks += 1;
                if t.process(&sample(i, 440.0, -10.0)).signal_active {
                    break;
                }
                assert!(ticks < 20, "never re-locked");
            }
            ticks
        };

        let preserved = relock_ticks(false);
        let cleared = relock_ticks(true);
        assert_eq!(cleared, preserved + 1);
    }

    #[test]
    fn test_unstable_frequency_never_locks() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        // Alternate between two pitches 30 Hz apart — outside the 8 Hz band
        for i in 0..20 {
            let hz = if i % 2 == 0 { 440.0 } else { 470.0 };
            let d = t.process(&sample(i, hz, -20.0));
            assert!(!d.signal_active, "tick {}", i);
        }
    }

    #[test]
    fn test_backend_cents_trusted_over_mapper() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        for i in 0..6 {
            t.process(&PitchSample {
                timestamp_us: i * TICK_US,
                frequency_hz: 440.0,
                level: SignalLevel::Decibels(-20.0),
                cents: Some(12.0),
            });
        }
        // Mapper would say 0¢ for 440 Hz; the backend's 12¢ wins
        let d = t.display();
        assert!(d.signal_active);
        assert!((d.cents_offset - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_in_tune_seconds_grow_while_locked() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        let d = feed_tone(&mut t, 0, 26, 440.0, -20.0);
        assert!(d.signal_active);
        // Locked from tick 5 (50 ms) through tick 25 (250 ms): 200 ms in tune
        assert!(
            (d.in_tune_secs - 0.2).abs() < 0.021,
            "in_tune={}",
            d.in_tune_secs
        );
    }

    #[test]
    fn test_hold_policy_keeps_last_reading() {
        let config = TrackerConfig {
            hold_last_reading: true,
            ..TrackerConfig::default()
        };
        let mut t = PitchTracker::new(config);
        assert!(feed_tone(&mut t, 0, 6, 440.0, -20.0).signal_active);

        let d = t.process(&sample(6, 0.0, -90.0));
        assert!(!d.signal_active);
        assert_eq!(d.note_name, "A4");
        assert!(d.frequency_hz > 0.0);
        assert_eq!(d.in_tune_secs, 0.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut t = PitchTracker::new(TrackerConfig::default());
        assert!(feed_tone(&mut t, 0, 6, 440.0, -20.0).signal_active);
        t.reset();
        assert_eq!(t.display().note_name, NO_NOTE);
        assert_eq!(t.sustain.phase(), Phase::Idle);
        assert_eq!(t.sustain.threshold_db(), -38.0);
        // Re-lock requires the full gauntlet again
        for i in 0..4 {
            assert!(!t.process(&sample(100 + i, 440.0, -20.0)).signal_active);
        }
    }

    #[test]
    fn test_smoothed_frequency_follows_window_mean() {
        let config = TrackerConfig {
            frequency_alpha: 1.0,
            ..TrackerConfig::default()
        };
        let mut t = PitchTracker::new(config);
        // Tone drifts slightly inside the tolerance band
        feed_tone(&mut t, 0, 6, 440.0, -20.0);
        let d = t.process(&sample(6, 444.0, -20.0));
        assert!(d.signal_active);
        // Window holds [440, 444]; display follows the mean with alpha 1
        assert!((d.frequency_hz - 442.0).abs() < 1e-9);
    }
}
