use crate::{Response, SharedResponse};

/// Channel response built as the superposition of several effect curves.
///
/// Value, derivative and curvature are the sums over the contained curves; an empty composite
/// has zero response everywhere.
#[derive(Default, Clone)]
pub struct CompositeCurve {
    /// Ordered list of effect curves.
    pub curves: Vec<SharedResponse>,
}

impl CompositeCurve {
    /// Creates the composite from its effect curves.
    pub fn new(curves: Vec<SharedResponse>) -> Self {
        Self { curves }
    }

    /// Adds an effect curve.
    pub fn push(&mut self, curve: SharedResponse) {
        self.curves.push(curve)
    }

    /// Number of effect curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the composite has no effect curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl Response for CompositeCurve {
    fn evaluate(&self, x: f64) -> f64 {
        self.curves.iter().map(|c| c.evaluate(x)).sum()
    }

    fn derivative(&self, x: f64) -> f64 {
        self.curves.iter().map(|c| c.derivative(x)).sum()
    }

    fn curvature(&self, x: f64) -> f64 {
        self.curves.iter().map(|c| c.curvature(x)).sum()
    }
}
