//! Sustain gate: minimum-duration promotion and the adaptive detection
//! threshold.
//!
//! # How it works
//!
//! A stable signal is not shown immediately — it must hold for a minimum
//! sustain duration (15–30 ms depending on profile) before the detection is
//! promoted to active. Once promoted, the detection threshold relaxes by a
//! few dB so that a player who has established a note can keep it tracked
//! through softer bow or finger pressure.
//!
//! The phase machine makes the threshold/lock pairing structural:
//!
//!   Idle ──stable──▶ Sustaining ──duration met──▶ Locked
//!    ▲                   │                           │
//!    └──────── rejection or stability loss ──────────┘
//!
//! The threshold is derived from the phase (strict unless Locked), never
//! stored alongside it, so the two can never disagree. Dropping out is the
//! only path back to strict: losing a lock is expensive (the noise floor
//! must be re-cleared) while holding one is cheap. The hysteresis prevents
//! threshold flutter around the noise floor while still rejecting brief
//! transients before anything is displayed.

/// Detection phase. The current threshold is a function of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No trusted signal; strict threshold applies.
    Idle,
    /// Stable signal observed, minimum duration not yet met; still strict.
    Sustaining { since_us: u64 },
    /// Duration met; detection is active and the relaxed threshold applies.
    Locked,
}

#[derive(Debug, Clone)]
pub struct SustainGate {
    strict_db: f64,
    relaxed_db: f64,
    min_sustain_us: u64,
    phase: Phase,
}

impl SustainGate {
    pub fn new(strict_db: f64, relaxed_db: f64, min_sustain_ms: u64) -> Self {
        Self {
            strict_db,
            relaxed_db,
            min_sustain_us: min_sustain_ms * 1000,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    /// The detection threshold in effect right now: relaxed while locked,
    /// strict otherwise.
    pub fn threshold_db(&self) -> f64 {
        match self.phase {
            Phase::Locked => self.relaxed_db,
            _ => self.strict_db,
        }
    }

    /// Advance the phase on a sample that passed the gate and both
    /// stability checks. Returns true when the detection is active.
    pub fn observe_stable(&mut self, now_us: u64) -> bool {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Sustaining { since_us: now_us };
                false
            }
            Phase::Sustaining { since_us } => {
                if now_us.saturating_sub(since_us) >= self.min_sustain_us {
                    self.phase = Phase::Locked;
                    true
                } else {
                    false
                }
            }
            Phase::Locked => true,
        }
    }

    /// Signal lost or unstable: back to Idle and the strict threshold.
    pub fn drop_out(&mut self) {
        self.phase = Phase::Idle;
    }
}
