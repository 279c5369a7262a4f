//! Exponential smoothing for the displayed frequency and cents values.

/// One-pole exponential smoother. Lower alpha is smoother and slower;
/// higher alpha is snappier. The first value after construction or reset
/// passes through unchanged and seeds the prior — the prior is an explicit
/// `Option` rather than a 0.0 sentinel, so a genuine 0.0 reading smooths
/// correctly.
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f64,
    previous: Option<f64>,
}

impl Smoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            previous: None,
        }
    }

    /// Blend the incoming value against the prior and store the result.
    pub fn smooth(&mut self, incoming: f64) -> f64 {
        let output = match self.previous {
            Some(prev) => prev * (1.0 - self.alpha) + incoming * self.alpha,
            None => incoming,
        };
        self.previous = Some(output);
        output
    }

    /// Last emitted value, if any.
    pub fn value(&self) -> Option<f64> {
        self.previous
    }

    /// Forget the prior; the next value passes through unchanged.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
