//! Signal gate: level and frequency acceptance, plus linear↔dB conversion.

/// Linear amplitude (0.0–1.0) to dBFS. Floored at 1e-5 so silence maps to
/// −100 dB instead of −inf.
pub fn linear_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.max(1e-5).log10()
}

/// dBFS back to linear amplitude.
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Accept or reject a raw reading before any state is touched.
///
/// Rejects when the level fails to clear the threshold or the frequency
/// falls outside the open interval (min_hz, max_hz). Non-positive
/// frequencies (silence markers from the backend) always fail the range
/// check.
pub fn passes(
    level_db: f64,
    frequency_hz: f64,
    threshold_db: f64,
    min_hz: f64,
    max_hz: f64,
) -> bool {
    level_db > threshold_db && frequency_hz > min_hz && frequency_hz < max_hz
}
