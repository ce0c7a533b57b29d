use crate::{Error, Result};
use nalgebra::DVector;

/// Evenly spaced spend samples between a lower and an upper spend.
#[derive(Debug, PartialEq)]
pub struct SpendGrid {
    /// Lower spend.
    pub lower: f64,
    /// Upper spend.
    pub upper: f64,
    /// Number of samples.
    pub samples: usize,
    /// Sampled spends, including both ends.
    pub points: DVector<f64>,
}

impl SpendGrid {
    /// Creates the grid of `samples` points from `lower` to `upper`.
    pub fn new(lower: f64, upper: f64, samples: usize) -> Result<Self> {
        if samples < 2 {
            return Err(Error::MinValue {
                name: "samples",
                value: samples,
                ge_value: 2,
            });
        }
        let distance = upper - lower;
        if distance.is_nan() || distance <= 0.0 {
            return Err(Error::MinDistance {
                lower: "lower",
                upper: "upper",
                distance,
                gt_distance: 0.0,
            });
        }

        let delta = distance / (samples as f64 - 1.);
        let points = DVector::from_fn(samples, |i, _| match i {
            i if i + 1 == samples => upper,
            i => lower + i as f64 * delta,
        });
        Ok(Self {
            lower,
            upper,
            samples,
            points,
        })
    }
}
