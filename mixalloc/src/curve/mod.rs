mod composite;
mod parametric;
mod primitive;
pub use composite::CompositeCurve;
use nalgebra::DVector;
use num_dual::DualNum;
pub use parametric::Curve;
pub use primitive::CurvePrimitive;
use std::sync::Arc;

/// Shared response curve, as stored by channels and composites.
pub type SharedResponse = Arc<dyn Response + Send + Sync>;

/// Required value function for [Response] derive.
pub trait ResponseFunction {
    /// Defines the response to spend x.
    fn f<D: DualNum<f64>>(&self, x: D) -> D;
}

/// Defines the response, marginal response and curvature of a spend to response curve.
pub trait Response {
    /// Response at spend x.
    fn evaluate(&self, x: f64) -> f64;
    /// Marginal response at spend x.
    fn derivative(&self, x: f64) -> f64;
    /// Second derivative of the response at spend x.
    fn curvature(&self, x: f64) -> f64;

    /// Elementwise response for a vector of spends.
    fn evaluate_many(&self, x: &DVector<f64>) -> DVector<f64> {
        x.map(|v| self.evaluate(v))
    }

    /// Elementwise marginal response for a vector of spends.
    fn derivative_many(&self, x: &DVector<f64>) -> DVector<f64> {
        x.map(|v| self.derivative(v))
    }
}
