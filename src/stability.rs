//! Rolling stability windows over recent frequency and amplitude readings.
//!
//! # How it works
//!
//! Before a reading is trusted, a short history of same-signal readings must
//! agree with each other. Two independent bounded FIFO windows hold the most
//! recent frequencies and amplitudes (capacities 1–4 in practice):
//!
//!   - **Frequency** is stable when every window member sits within an
//!     absolute Hz tolerance of the window mean. Pitch measurement noise is
//!     roughly constant in Hz, so an absolute band is the right shape.
//!   - **Amplitude** is stable when the worst relative deviation from the
//!     mean stays under a variance bound. Raw amplitude scale varies with
//!     instrument and distance, so the band is relative, with an epsilon
//!     guard against a near-zero mean.
//!
//! Small windows trade stability confidence for latency. At capacity 1 both
//! checks degenerate to "trust every sample instantly".
//!
//! Instability verdicts never clear the windows here — whether a window
//! survives a rejection is the tracker's policy decision, and at least one
//! tuning profile deliberately keeps the frequency window rolling across an
//! amplitude rejection so pitch stability can catch up independently.

/// Guards the relative-variance division when the mean amplitude is ~0.
const AMPLITUDE_EPSILON: f64 = 1e-6;

/// Bounded FIFO of recent readings. Pushing at capacity evicts the oldest.
#[derive(Debug, Clone)]
pub struct Window {
    values: Vec<f64>,
    capacity: usize,
}

impl Window {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.remove(0);
        }
        self.values.push(value);
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Judges whether the recent signal history is steady enough to trust.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    frequencies: Window,
    amplitudes: Window,
    frequency_tolerance_hz: f64,
    max_amplitude_variance: f64,
}

impl StabilityTracker {
    pub fn new(
        frequency_window: usize,
        frequency_tolerance_hz: f64,
        amplitude_window: usize,
        max_amplitude_variance: f64,
    ) -> Self {
        Self {
            frequencies: Window::new(frequency_window),
            amplitudes: Window::new(amplitude_window),
            frequency_tolerance_hz,
            max_amplitude_variance,
        }
    }

    pub fn push_frequency(&mut self, hz: f64) {
        self.frequencies.push(hz);
    }

    pub fn push_amplitude(&mut self, amplitude: f64) {
        self.amplitudes.push(amplitude);
    }

    pub fn frequency_window_full(&self) -> bool {
        self.frequencies.is_full()
    }

    pub fn amplitude_window_full(&self) -> bool {
        self.amplitudes.is_full()
    }

    /// Mean of the frequency window — the value fed to smoothing and note
    /// mapping once the signal is trusted.
    pub fn mean_frequency(&self) -> f64 {
        self.frequencies.mean()
    }

    pub fn mean_amplitude(&self) -> f64 {
        self.amplitudes.mean()
    }

    /// Stable iff the window is full and every member sits within the
    /// absolute Hz tolerance of the mean.
    pub fn frequency_stable(&self) -> bool {
        if !self.frequencies.is_full() {
            return false;
        }
        let mean = self.frequencies.mean();
        self.frequencies
            .values()
            .iter()
            .all(|&f| (f - mean).abs() < self.frequency_tolerance_hz)
    }

    /// Stable iff the window is full and the worst relative deviation from
    /// the mean stays under the variance bound.
    pub fn amplitude_stable(&self) -> bool {
        if !self.amplitudes.is_full() {
            return false;
        }
        let mean = self.amplitudes.mean();
        let max_variance = self
            .amplitudes
            .values()
            .iter()
            .map(|&a| (a - mean).abs() / mean.max(AMPLITUDE_EPSILON))
            .fold(0.0, f64::max);
        max_variance < self.max_amplitude_variance
    }

    pub fn clear_frequencies(&mut self) {
        self.frequencies.clear();
    }

    pub fn clear_amplitudes(&mut self) {
        self.amplitudes.clear();
    }

    pub fn reset(&mut self) {
        self.frequencies.clear();
        self.amplitudes.clear();
    }
}
