use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

// ─── Samples from the pitch-estimation backend ──────────────────────────────

/// Signal level as reported by the backend. Some estimators deliver a
/// linear amplitude in 0.0–1.0, others deliver dBFS directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum SignalLevel {
    /// Linear amplitude, 0.0 (silence) to 1.0 (full scale)
    Linear(f64),
    /// Level in dBFS (0.0 = full scale, negative below)
    Decibels(f64),
}

impl SignalLevel {
    /// Level in dBFS. Linear amplitudes are floored at 1e-5 (−100 dB)
    /// so silence never produces −inf.
    pub fn db(&self) -> f64 {
        match *self {
            SignalLevel::Linear(a) => crate::gate::linear_to_db(a),
            SignalLevel::Decibels(db) => db,
        }
    }

    /// Linear amplitude, clamped to 0.0–1.0.
    pub fn linear(&self) -> f64 {
        match *self {
            SignalLevel::Linear(a) => a.clamp(0.0, 1.0),
            SignalLevel::Decibels(db) => crate::gate::db_to_linear(db).clamp(0.0, 1.0),
        }
    }
}

/// One raw measurement from the pitch-estimation backend, delivered at
/// audio-buffer cadence (tens of milliseconds).
///
/// `frequency_hz` may be 0 or negative during silence — such samples
/// automatically fail the signal gate. `cents` is filled in by richer
/// backends that compute the deviation themselves; when absent the tracker
/// derives it from the nearest equal-tempered note.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PitchSample {
    /// Microseconds since session start
    pub timestamp_us: u64,
    /// Estimated fundamental frequency in Hz
    pub frequency_hz: f64,
    /// Signal level (linear or dBFS, whichever the backend produces)
    pub level: SignalLevel,
    /// Backend-supplied cents deviation, if the estimator provides one
    pub cents: Option<f64>,
}

impl PitchSample {
    pub fn silence(timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            frequency_hz: 0.0,
            level: SignalLevel::Decibels(-90.0),
            cents: None,
        }
    }
}

// ─── Published display state ────────────────────────────────────────────────

/// Sentinel note name shown when no reliable reading exists.
pub const NO_NOTE: &str = "--";

/// Immutable snapshot published by the tracker after every sample.
/// Consumers must tolerate rapid repeated updates and treat
/// `note_name == "--"` / `signal_active == false` as "no reliable reading".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayState {
    pub timestamp_us: u64,
    /// Smoothed display frequency in Hz (0.0 when cleared)
    pub frequency_hz: f64,
    /// Nearest note with octave, e.g. "A4"; "--" when cleared
    pub note_name: String,
    /// Smoothed signed cents deviation from the nearest note
    pub cents_offset: f64,
    /// Normalized signal level, 0.0–1.0
    pub amplitude: f32,
    /// True only while a note is locked in
    pub signal_active: bool,
    /// Continuous time the reading has stayed inside the in-tune band
    pub in_tune_secs: f64,
}

impl DisplayState {
    pub fn cleared(timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            frequency_hz: 0.0,
            note_name: NO_NOTE.to_string(),
            cents_offset: 0.0,
            amplitude: 0.0,
            signal_active: false,
            in_tune_secs: 0.0,
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>10}µs  {:<4} {:>7.2} Hz  {:+6.1}¢  amp={:.2}  {}  in-tune={:.2}s",
            self.timestamp_us,
            self.note_name,
            self.frequency_hz,
            self.cents_offset,
            self.amplitude,
            if self.signal_active { "ACTIVE" } else { "  --  " },
            self.in_tune_secs,
        )
    }
}

// ─── Compact serialization ──────────────────────────────────────────────────

/// Short-key representation for efficient JSONL session logging.
/// Field mapping: t=timestamp_us, hz=frequency_hz, n=note_name,
/// c=cents_offset, a=amplitude, on=signal_active, it=in_tune_secs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactReading {
    pub t: u64,
    pub hz: f64,
    pub n: String,
    pub c: f64,
    pub a: f32,
    pub on: bool,
    pub it: f64,
}

impl From<&DisplayState> for CompactReading {
    fn from(d: &DisplayState) -> Self {
        Self {
            t: d.timestamp_us,
            hz: d.frequency_hz,
            n: d.note_name.clone(),
            c: d.cents_offset,
            a: d.amplitude,
            on: d.signal_active,
            it: d.in_tune_secs,
        }
    }
}

impl From<CompactReading> for DisplayState {
    fn from(c: CompactReading) -> Self {
        Self {
            timestamp_us: c.t,
            frequency_hz: c.hz,
            note_name: c.n,
            cents_offset: c.c,
            amplitude: c.a,
            signal_active: c.on,
            in_tune_secs: c.it,
        }
    }
}

// ─── Session clock ──────────────────────────────────────────────────────────

/// Monotonic clock for a tracking session.
#[derive(Clone)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
