use crate::types::{PitchSample, SessionClock, SignalLevel};
use crossbeam_channel::Sender;
use log::info;
use std::thread;
use std::time::Duration;

/// Generates scripted (frequency, level) measurements that exercise the
/// full tracking pipeline without any audio hardware — a stand-in for the
/// pitch-estimation backend.
///
/// Every emitted sample carries small deterministic measurement jitter
/// (a fraction of a Hz, a fraction of a dB) so stability windows see
/// realistic estimator noise rather than bit-identical readings.
pub struct Simulator {
    clock: SessionClock,
    tx: Sender<PitchSample>,
    /// Sample cadence in Hz — one sample per audio buffer period
    rate_hz: u32,
    /// LCG state for deterministic jitter; no RNG crate needed
    rng: u64,
}

/// One scripted playing gesture.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// No signal at all
    Silence { ms: u32 },
    /// A held note at constant level
    Note { hz: f64, level_db: f64, ms: u32 },
    /// A held note with periodic pitch modulation
    Vibrato {
        hz: f64,
        level_db: f64,
        ms: u32,
        rate_hz: f64,
        depth_cents: f64,
    },
    /// Continuous pitch glide between two frequencies
    Slide {
        from_hz: f64,
        to_hz: f64,
        level_db: f64,
        ms: u32,
    },
    /// A held pitch with the level ramping between two values
    Swell {
        hz: f64,
        from_db: f64,
        to_db: f64,
        ms: u32,
    },
    /// Broadband handling noise: random frequency jumps at moderate level
    Noise { level_db: f64, ms: u32 },
}

impl Simulator {
    pub fn new(clock: SessionClock, tx: Sender<PitchSample>, rate_hz: u32) -> Self {
        Self {
            clock,
            tx,
            rate_hz: rate_hz.max(1),
            rng: 0x5eed_cafe_f00d_u64,
        }
    }

    /// Play a named demo sequence, then return (closing the channel shuts
    /// the pipeline down). Blocks the calling thread.
    pub fn run(&mut self, demo: &str) {
        let gestures = match demo {
            "etude" => etude_sequence(),
            "noisy" => noisy_sequence(),
            _ => basic_sequence(),
        };
        info!("Simulator playing '{}' ({} gestures)", demo, gestures.len());

        for gesture in &gestures {
            self.execute(gesture);
        }
        info!("Simulator sequence complete");
    }

    fn execute(&mut self, gesture: &Gesture) {
        let tick_ms = 1000.0 / self.rate_hz as f64;
        match *gesture {
            Gesture::Silence { ms } => {
                info!("  silence {}ms", ms);
                for _ in 0..ticks(ms, self.rate_hz) {
                    self.emit(0.0, -90.0);
                }
            }

            Gesture::Note { hz, level_db, ms } => {
                info!("  note {:.1} Hz @ {:.0} dB for {}ms", hz, level_db, ms);
                for _ in 0..ticks(ms, self.rate_hz) {
                    self.emit(hz, level_db);
                }
            }

            Gesture::Vibrato {
                hz,
                level_db,
                ms,
                rate_hz,
                depth_cents,
            } => {
                info!(
                    "  vibrato {:.1} Hz ±{:.0}¢ @ {:.1} Hz rate for {}ms",
                    hz, depth_cents, rate_hz, ms
                );
                for i in 0..ticks(ms, self.rate_hz) {
                    let t = i as f64 * tick_ms / 1000.0;
                    let cents = depth_cents * (2.0 * std::f64::consts::PI * rate_hz * t).sin();
                    self.emit(hz * 2.0_f64.powf(cents / 1200.0), level_db);
                }
            }

            Gesture::Slide {
                from_hz,
                to_hz,
                level_db,
                ms,
            } => {
                info!("  slide {:.1} → {:.1} Hz over {}ms", from_hz, to_hz, ms);
                let n = ticks(ms, self.rate_hz);
                for i in 0..n {
                    let t = i as f64 / n.max(1) as f64;
                    // Glide in log-frequency so the slide is musically even
                    let hz = from_hz * (to_hz / from_hz).powf(smoothstep(t));
                    self.emit(hz, level_db);
                }
            }

            Gesture::Swell {
                hz,
                from_db,
                to_db,
                ms,
            } => {
                info!("  swell {:.0} → {:.0} dB at {:.1} Hz over {}ms", from_db, to_db, hz, ms);
                let n = ticks(ms, self.rate_hz);
                for i in 0..n {
                    let t = i as f64 / n.max(1) as f64;
                    self.emit(hz, lerp(from_db, to_db, smoothstep(t)));
                }
            }

            Gesture::Noise { level_db, ms } => {
                info!("  noise @ {:.0} dB for {}ms", level_db, ms);
                for _ in 0..ticks(ms, self.rate_hz) {
                    // Estimators report wild, uncorrelated frequencies on
                    // broadband input
                    let hz = 80.0 + 900.0 * (self.jitter() * 0.5 + 0.5);
                    self.emit(hz, level_db);
                }
            }
        }
    }

    /// Send one sample stamped with the session clock, then sleep one
    /// buffer period.
    fn emit(&mut self, hz: f64, level_db: f64) {
        let freq_jitter = self.jitter() * 0.3;
        let level_jitter = self.jitter() * 0.4;
        let sample = PitchSample {
            timestamp_us: self.clock.now_us(),
            frequency_hz: if hz > 0.0 { hz + freq_jitter } else { hz },
            level: SignalLevel::Decibels(level_db + level_jitter),
            cents: None,
        };
        let _ = self.tx.send(sample);
        thread::sleep(Duration::from_micros(1_000_000 / self.rate_hz as u64));
    }

    /// Deterministic uniform value in [-1, 1).
    fn jitter(&mut self) -> f64 {
        self.rng = self
            .rng
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.rng >> 33) as f64 / (1u64 << 30) as f64 - 1.0
    }
}

fn ticks(ms: u32, rate_hz: u32) -> u64 {
    (ms as u64 * rate_hz as u64) / 1000
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Tune-up, hold, vibrato, a slide, and a fade-out.
fn basic_sequence() -> Vec<Gesture> {
    vec![
        Gesture::Silence { ms: 400 },
        Gesture::Note { hz: 440.0, level_db: -20.0, ms: 2000 },
        Gesture::Silence { ms: 300 },
        Gesture::Note { hz: 329.63, level_db: -22.0, ms: 1500 },
        Gesture::Vibrato {
            hz: 329.63,
            level_db: -22.0,
            ms: 1500,
            rate_hz: 5.5,
            depth_cents: 12.0,
        },
        Gesture::Slide {
            from_hz: 440.0,
            to_hz: 493.88,
            level_db: -20.0,
            ms: 800,
        },
        Gesture::Note { hz: 493.88, level_db: -20.0, ms: 1200 },
        Gesture::Swell {
            hz: 440.0,
            from_db: -20.0,
            to_db: -42.0,
            ms: 2000,
        },
        Gesture::Silence { ms: 500 },
    ]
}

/// A guitar tuning pass: each open string held, some slightly off pitch.
fn etude_sequence() -> Vec<Gesture> {
    let strings = [
        (82.41, 6.0),   // E2, a touch sharp
        (110.0, -4.0),  // A2, a touch flat
        (146.83, 0.0),  // D3, spot on
        (196.0, 9.0),   // G3, clearly sharp
        (246.94, -1.5), // B3, nearly there
        (329.63, 0.5),  // E4
    ];
    let mut seq = vec![Gesture::Silence { ms: 400 }];
    for (hz, cents) in strings {
        seq.push(Gesture::Note {
            hz: hz * 2.0_f64.powf(cents / 1200.0),
            level_db: -22.0,
            ms: 1800,
        });
        seq.push(Gesture::Silence { ms: 350 });
    }
    seq
}

/// Notes interleaved with transients and handling noise — exercises every
/// rejection path.
fn noisy_sequence() -> Vec<Gesture> {
    vec![
        Gesture::Silence { ms: 300 },
        Gesture::Noise { level_db: -30.0, ms: 400 },
        Gesture::Note { hz: 440.0, level_db: -20.0, ms: 1500 },
        // Too short to survive the sustain gate
        Gesture::Note { hz: 660.0, level_db: -18.0, ms: 15 },
        Gesture::Silence { ms: 200 },
        Gesture::Noise { level_db: -25.0, ms: 300 },
        Gesture::Note { hz: 196.0, level_db: -24.0, ms: 1500 },
        Gesture::Swell {
            hz: 196.0,
            from_db: -24.0,
            to_db: -60.0,
            ms: 1000,
        },
        Gesture::Silence { ms: 400 },
    ]
}
