use num_dual::DualNum;

#[cfg_attr(doc, katexit::katexit)]
/// Closed family of monotone saturating response shapes.
///
/// All variants are functions of the price adjusted spend $z$ and are normalized to
/// $P(0) = 0$. Price and multiplier are applied by [crate::Curve].
///
/// - `Saturating`: $P(z) = \frac{cap}{1 + (z / (cap \cdot ec50))^{-steep}}$ with $P(0) := 0$. If
///   $steep < 1$ the curve is concave on $(0, \infty)$, otherwise it is convex before and
///   concave after its bend point.
/// - `LogisticDecay`: $P(z) = \frac{cap}{1 + e^{-steep \cdot z / cap - ec50}} - \frac{cap}{1 +
///   e^{-ec50}}$
/// - `BoundedLogistic`: $P(z) = \frac{100}{1 + e^{a e^{-a z / b}}} - \frac{100}{1 + e^a}$
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurvePrimitive {
    /// S-shaped curve similar to a sigmoid.
    Saturating {
        /// Maximal response level.
        cap: f64,
        /// Half-efficiency point, relative to cap.
        ec50: f64,
        /// Slope coefficient.
        steep: f64,
    },
    /// Logistic curve shifted such that it starts at zero.
    LogisticDecay {
        /// Maximal response level.
        cap: f64,
        /// Horizontal shift of the logistic.
        ec50: f64,
        /// Slope coefficient.
        steep: f64,
    },
    /// Gompertz like logistic on a 0-100 scale.
    BoundedLogistic {
        /// Shape coefficient.
        a: f64,
        /// Scale of the spend axis.
        b: f64,
    },
}

impl CurvePrimitive {
    /// Returns the response at price adjusted spend z.
    ///
    /// Generic over dual numbers such that higher derivatives are available by automatic
    /// differentiation.
    pub fn value<D: DualNum<f64>>(&self, z: D) -> D {
        match *self {
            Self::Saturating { cap, ec50, steep } => {
                // zero spend yields zero response although the closed form is singular there
                if z.re() == 0. {
                    return D::zero();
                }
                ((z * (1. / (cap * ec50))).powf(-steep) + 1.).recip() * cap
            }
            Self::LogisticDecay { cap, ec50, steep } => {
                let origin = cap / (1. + (-ec50).exp());
                ((z * (-steep / cap) - ec50).exp() + 1.).recip() * cap - origin
            }
            Self::BoundedLogistic { a, b } => {
                let origin = 100. / (1. + a.exp());
                (((z * (-a / b)).exp() * a).exp() + 1.).recip() * 100. - origin
            }
        }
    }

    /// Returns the closed form first derivative at price adjusted spend z.
    ///
    /// No special case at zero: `Saturating` evaluates to NaN there for positive `steep`.
    pub fn derivative(&self, z: f64) -> f64 {
        match *self {
            Self::Saturating { cap, ec50, steep } => {
                let r = (z / (cap * ec50)).powf(steep);
                cap * steep * r / (z * (1. + r).powi(2))
            }
            Self::LogisticDecay { cap, ec50, steep } => {
                let u = steep * z / cap + ec50;
                steep * logistic_slope(u)
            }
            Self::BoundedLogistic { a, b } => {
                let v = a * (-a * z / b).exp();
                100. * a / b * v * logistic_slope(v)
            }
        }
    }

    /// Returns the second derivative at price adjusted spend z.
    pub fn second_derivative(&self, z: f64) -> f64 {
        num_dual::second_derivative(|v| self.value(v), z).2
    }
}

/// e^u / (1 + e^u)^2 evaluated without overflow.
fn logistic_slope(u: f64) -> f64 {
    let w = (-u.abs()).exp();
    w / (1. + w).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    const EQ_EPS: f64 = 1e-9;

    fn primitives() -> Vec<CurvePrimitive> {
        vec![
            CurvePrimitive::Saturating {
                cap: 100.,
                ec50: 0.5,
                steep: 1.,
            },
            CurvePrimitive::Saturating {
                cap: 2961.2209,
                ec50: 100.,
                steep: 0.5,
            },
            CurvePrimitive::Saturating {
                cap: 10.,
                ec50: 2.,
                steep: 2.5,
            },
            CurvePrimitive::LogisticDecay {
                cap: 100.,
                ec50: 0.5,
                steep: 1.,
            },
            CurvePrimitive::LogisticDecay {
                cap: 3.,
                ec50: -2.,
                steep: 4.,
            },
            CurvePrimitive::BoundedLogistic { a: 2., b: 50. },
            CurvePrimitive::BoundedLogistic { a: 0.5, b: 3. },
        ]
    }

    #[test]
    fn primitive_zero_at_origin() -> Result<()> {
        for p in primitives() {
            assert!(p.value(0.).abs() < EQ_EPS, "{p:?}");
        }
        Ok(())
    }

    #[test]
    fn primitive_saturating_value() -> Result<()> {
        let p = CurvePrimitive::Saturating {
            cap: 100.,
            ec50: 0.5,
            steep: 1.,
        };
        // 100 / (1 + 50 / z)
        assert!((p.value(50.) - 50.).abs() < EQ_EPS);
        assert!((p.value(1000.) - 100. / 1.05).abs() < EQ_EPS);
        Ok(())
    }

    #[test]
    fn primitive_derivative_matches_dual() -> Result<()> {
        for p in primitives() {
            for z in [0.3, 1., 7.5, 42., 250.] {
                let (_, dual) = num_dual::first_derivative(|v| p.value(v), z);
                let closed = p.derivative(z);
                assert!(
                    (dual - closed).abs() <= 1e-8 * dual.abs().max(1.),
                    "{p:?} at {z}: {dual} != {closed}"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn primitive_second_derivative_matches_difference_quotient() -> Result<()> {
        let h = 1e-5;
        for p in primitives() {
            let z = 3.;
            let fd = (p.derivative(z + h) - p.derivative(z - h)) / (2. * h);
            let second = p.second_derivative(z);
            assert!((fd - second).abs() <= 1e-5 * second.abs().max(1.), "{p:?}");
        }
        Ok(())
    }

    #[test]
    fn primitive_saturating_derivative_at_zero_is_nan() -> Result<()> {
        let p = CurvePrimitive::Saturating {
            cap: 100.,
            ec50: 0.5,
            steep: 1.,
        };
        assert!(p.derivative(0.).is_nan());
        Ok(())
    }

    #[test]
    fn primitive_logistic_slope_is_symmetric() -> Result<()> {
        for u in [0., 0.5, 3., 800.] {
            assert_eq!(logistic_slope(u), logistic_slope(-u));
        }
        assert_eq!(logistic_slope(0.), 0.25);
        assert_eq!(logistic_slope(800.), 0.);
        Ok(())
    }
}
