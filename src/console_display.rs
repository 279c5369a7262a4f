use crate::types::{DisplayState, NO_NOTE};
use crossbeam_channel::Receiver;
use std::io::{self, Write};

/// Renders a live ASCII tuner readout from display snapshots.
pub struct ConsoleDisplay {
    rx: Receiver<DisplayState>,
    update_hz: u32,
    /// Sample cadence of the producer, used to convert the refresh rate
    /// into a frame-skip count
    sample_rate_hz: u32,
}

impl ConsoleDisplay {
    pub fn new(rx: Receiver<DisplayState>, update_hz: u32, sample_rate_hz: u32) -> Self {
        Self {
            rx,
            update_hz,
            sample_rate_hz,
        }
    }

    pub fn run(&self) {
        let skip = if self.update_hz == 0 {
            4
        } else {
            (self.sample_rate_hz / self.update_hz).max(1) as u64
        };
        let mut count: u64 = 0;
        let mut stdout = io::stdout();

        for state in self.rx.iter() {
            count += 1;
            if count % skip != 0 {
                continue;
            }

            // Clear screen and move cursor home
            print!("\x1b[2J\x1b[H");

            println!("╔══════════════════════════════════════════════════════╗");
            println!("║  PITCHLOCK — Live Tuner                              ║");
            println!("╠══════════════════════════════════════════════════════╣");

            let secs = state.timestamp_us as f64 / 1_000_000.0;
            println!("║  Time: {:>8.2}s                                     ║", secs);
            println!("║                                                      ║");

            if state.signal_active {
                println!(
                    "║  Note: {:<4}          {:>8.2} Hz                    ║",
                    state.note_name, state.frequency_hz
                );
                println!("║  {} ║", make_needle(state.cents_offset, 50.0));
                println!(
                    "║  Cents: {:+6.1}                                      ║",
                    state.cents_offset
                );
            } else if state.note_name != NO_NOTE {
                // Held reading from before the signal dropped
                println!(
                    "║  Note: {:<4} (held)   {:>8.2} Hz                    ║",
                    state.note_name, state.frequency_hz
                );
                println!("║  {:52} ║", "");
                println!("║  Cents:    ---                                       ║");
            } else {
                println!("║  Note: --            listening...                    ║");
                println!("║  {:52} ║", "");
                println!("║  Cents:    ---                                       ║");
            }

            println!("║                                                      ║");
            let level = make_bar(state.amplitude, 30);
            println!("║  Level: {} {:.0}%            ║", level, state.amplitude * 100.0);

            let in_tune = if state.in_tune_secs > 0.0 {
                let glow = make_bar((state.in_tune_secs / 3.0).min(1.0) as f32, 20);
                format!("{} {:.1}s", glow, state.in_tune_secs)
            } else {
                format!("[{}]", "░".repeat(20))
            };
            println!("║  In tune: {:<40} ║", in_tune);

            println!("╚══════════════════════════════════════════════════════╝");
            let _ = stdout.flush();
        }
    }
}

fn make_bar(val: f32, width: usize) -> String {
    let filled = (val.clamp(0.0, 1.0) * width as f32).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Cents needle: a symmetric scale from −range to +range with the center
/// marked and the needle at the current deviation.
fn make_needle(cents: f64, range: f64) -> String {
    let width = 51usize; // odd so the center column is exact
    let center = width / 2;
    let pos = ((cents / range) * center as f64).round() as i64 + center as i64;
    let pos = pos.clamp(0, width as i64 - 1) as usize;

    let mut needle = String::with_capacity(width + 2);
    needle.push('♭');
    for i in 0..width {
        if i == pos {
            needle.push('▼');
        } else if i == center {
            needle.push('┼');
        } else {
            needle.push('─');
        }
    }
    needle.push('♯');
    needle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needle_centered_when_in_tune() {
        let n = make_needle(0.0, 50.0);
        let chars: Vec<char> = n.chars().collect();
        // Marker lands on the center column
        assert_eq!(chars[1 + 25], '▼');
    }

    #[test]
    fn test_needle_clamps_at_extremes() {
        let sharp = make_needle(200.0, 50.0);
        let chars: Vec<char> = sharp.chars().collect();
        assert_eq!(chars[chars.len() - 2], '▼');

        let flat = make_needle(-200.0, 50.0);
        let chars: Vec<char> = flat.chars().collect();
        assert_eq!(chars[1], '▼');
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(make_bar(0.5, 30).chars().count(), 32);
        assert_eq!(make_bar(1.5, 10).chars().count(), 12);
    }
}
