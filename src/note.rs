//! Equal-tempered note mapping: frequency ↔ MIDI number, nearest note,
//! and signed cents deviation. A4 = 440 Hz = MIDI 69.

pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert a (possibly fractional) MIDI note number to frequency in Hz.
pub fn midi_to_hz(midi: f64) -> f64 {
    440.0 * 2.0_f64.powf((midi - 69.0) / 12.0)
}

/// Convert a frequency to a fractional MIDI note number.
/// Frequency must be positive.
pub fn hz_to_midi(frequency_hz: f64) -> f64 {
    69.0 + 12.0 * (frequency_hz / 440.0).log2()
}

/// The nearest equal-tempered note to a measured frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Pitch class, e.g. "A#"
    pub name: &'static str,
    /// Scientific octave number (A4 = octave 4)
    pub octave: i32,
    /// Signed deviation from the note center, ±50 cents by construction
    pub cents: f64,
    /// Rounded MIDI note number
    pub midi: i32,
}

impl Note {
    /// Display label with octave, e.g. "A4".
    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.octave)
    }
}

/// Map a frequency to its nearest equal-tempered note.
///
/// Callers guarantee `frequency_hz > 0` — the signal gate rejects
/// non-positive frequencies before they reach this function.
pub fn nearest_note(frequency_hz: f64) -> Note {
    let midi = hz_to_midi(frequency_hz);
    let nearest = midi.round() as i32;
    let target_hz = midi_to_hz(nearest as f64);
    let cents = 1200.0 * (frequency_hz / target_hz).log2();

    Note {
        name: NOTE_NAMES[nearest.rem_euclid(12) as usize],
        octave: nearest.div_euclid(12) - 1,
        cents,
        midi: nearest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a440_is_a4_exact() {
        let n = nearest_note(440.0);
        assert_eq!(n.name, "A");
        assert_eq!(n.octave, 4);
        assert_eq!(n.midi, 69);
        assert!(n.cents.abs() < 1e-9, "cents={}", n.cents);
    }

    #[test]
    fn test_a_sharp_4() {
        // 466.16 Hz is A#4 to within a fraction of a cent
        let n = nearest_note(466.16);
        assert_eq!(n.label(), "A#4");
        assert!(n.cents.abs() < 0.5, "cents={}", n.cents);
    }

    #[test]
    fn test_octave_below() {
        let n = nearest_note(220.0);
        assert_eq!(n.label(), "A3");
        assert!(n.cents.abs() < 1e-9);
    }

    #[test]
    fn test_known_notes() {
        for (hz, label) in [
            (261.63, "C4"),
            (329.63, "E4"),
            (392.0, "G4"),
            (523.25, "C5"),
            (82.41, "E2"),
            (1975.53, "B6"),
        ] {
            let n = nearest_note(hz);
            assert_eq!(n.label(), label, "{} Hz", hz);
            assert!(n.cents.abs() < 2.0, "{} Hz: {}¢", hz, n.cents);
        }
    }

    #[test]
    fn test_cents_bounded_by_half_semitone() {
        // Sweep three octaves; nearest-note rounding bounds |cents| at 50
        let mut hz = 65.0;
        while hz < 2000.0 {
            let n = nearest_note(hz);
            assert!(
                n.cents.abs() <= 50.0 + 1e-6,
                "{} Hz: {}¢ out of bounds",
                hz,
                n.cents
            );
            hz *= 1.01;
        }
    }

    #[test]
    fn test_sharp_and_flat_sides() {
        // 10 cents sharp of A4
        let sharp = nearest_note(440.0 * 2.0_f64.powf(10.0 / 1200.0));
        assert_eq!(sharp.label(), "A4");
        assert!((sharp.cents - 10.0).abs() < 1e-6);

        let flat = nearest_note(440.0 * 2.0_f64.powf(-10.0 / 1200.0));
        assert_eq!(flat.label(), "A4");
        assert!((flat.cents + 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_midi_hz_inverse() {
        for midi in [21.0, 40.0, 57.5, 69.0, 96.0] {
            let back = hz_to_midi(midi_to_hz(midi));
            assert!((back - midi).abs() < 1e-9, "midi {}: got {}", midi, back);
        }
    }
}
