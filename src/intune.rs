//! In-tune duration accumulator.
//!
//! Tracks how long the displayed cents deviation has stayed continuously
//! inside the in-tune band. Purely decorative feedback for the consumer
//! (a growing glow, a held checkmark) — detection state feeds it, never
//! the reverse.

#[derive(Debug, Clone)]
pub struct InTuneAccumulator {
    threshold_cents: f64,
    accumulated_secs: f64,
    last_check_us: Option<u64>,
}

impl InTuneAccumulator {
    pub fn new(threshold_cents: f64) -> Self {
        Self {
            threshold_cents,
            accumulated_secs: 0.0,
            last_check_us: None,
        }
    }

    /// Fold in one reading. Accumulates the wall-clock delta while the
    /// deviation stays inside the band, zeroes on any excursion, and always
    /// advances the check timestamp. The first call after a reset
    /// contributes a zero delta, so idle gaps never count as in-tune time.
    pub fn update(&mut self, cents_offset: f64, now_us: u64) -> f64 {
        let delta_secs = match self.last_check_us {
            Some(last) => now_us.saturating_sub(last) as f64 / 1_000_000.0,
            None => 0.0,
        };
        self.last_check_us = Some(now_us);

        if cents_offset.abs() < self.threshold_cents {
            self.accumulated_secs += delta_secs;
        } else {
            self.accumulated_secs = 0.0;
        }
        self.accumulated_secs
    }

    pub fn seconds(&self) -> f64 {
        self.accumulated_secs
    }

    /// Signal lost: zero the tally and forget the timestamp.
    pub fn reset(&mut self) {
        self.accumulated_secs = 0.0;
        self.last_check_us = None;
    }
}
