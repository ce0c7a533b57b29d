use crate::{CurvePrimitive, Response};

#[cfg_attr(doc, katexit::katexit)]
/// Response curve binding a [CurvePrimitive] to a price and a model multiplier.
///
/// $$ r(x) = multiplier \cdot P(x / price) $$
///
/// ```
/// use mixalloc::{Curve, Response};
///
/// let tv = Curve::new(100., 0.5, 1.).with_price(2.);
/// assert_eq!(tv.evaluate(0.), 0.);
/// assert!(tv.evaluate(200.) > tv.evaluate(100.));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    primitive: CurvePrimitive,
    price: f64,
    multiplier: f64,
}

impl Curve {
    /// Creates the default saturating curve with unit price and multiplier.
    pub fn new(cap: f64, ec50: f64, steep: f64) -> Self {
        Self::saturating(cap, ec50, steep)
    }

    /// Creates a curve from any primitive with unit price and multiplier.
    pub fn from_primitive(primitive: CurvePrimitive) -> Self {
        Self {
            primitive,
            price: 1.,
            multiplier: 1.,
        }
    }

    /// Creates a [CurvePrimitive::Saturating] curve.
    pub fn saturating(cap: f64, ec50: f64, steep: f64) -> Self {
        Self::from_primitive(CurvePrimitive::Saturating { cap, ec50, steep })
    }

    /// Creates a [CurvePrimitive::LogisticDecay] curve.
    pub fn logistic_decay(cap: f64, ec50: f64, steep: f64) -> Self {
        Self::from_primitive(CurvePrimitive::LogisticDecay { cap, ec50, steep })
    }

    /// Creates a [CurvePrimitive::BoundedLogistic] curve.
    pub fn bounded_logistic(a: f64, b: f64) -> Self {
        Self::from_primitive(CurvePrimitive::BoundedLogistic { a, b })
    }

    /// Returns curve with given price per spend unit.
    pub fn with_price(mut self, val: f64) -> Self {
        self.price = val;
        self
    }

    /// Returns curve with given model multiplier.
    pub fn with_multiplier(mut self, val: f64) -> Self {
        self.multiplier = val;
        self
    }

    /// Returns the underlying primitive.
    pub fn primitive(&self) -> &CurvePrimitive {
        &self.primitive
    }

    /// Returns the price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Returns the multiplier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Response for Curve {
    fn evaluate(&self, x: f64) -> f64 {
        self.primitive.value(x / self.price) * self.multiplier
    }

    fn derivative(&self, x: f64) -> f64 {
        self.primitive.derivative(x / self.price) * self.multiplier / self.price
    }

    fn curvature(&self, x: f64) -> f64 {
        self.primitive.second_derivative(x / self.price) * self.multiplier / self.price.powi(2)
    }
}
