use mixalloc::{AllocationProblem, Curve, Response, ResponseFunction, Result};
use mixalloc_examples::init_tracing;
use num_dual::DualNum;
use std::sync::Arc;

// with help of the Response derive and the required implementation
// of the ResponseFunction the derivatives are automatically
// generated
#[derive(Response)]
struct Exponential {
    cap: f64,
    rate: f64,
}

// r(x) = cap * (1 - exp(-rate * x))
impl ResponseFunction for Exponential {
    fn f<D: DualNum<f64>>(&self, x: D) -> D {
        -(x * -self.rate).exp() * self.cap + self.cap
    }
}

// hand written response with explicit derivatives
struct Linear {
    slope: f64,
}

// r(x) = slope * x
impl Response for Linear {
    fn evaluate(&self, x: f64) -> f64 {
        self.slope * x
    }

    fn derivative(&self, _x: f64) -> f64 {
        self.slope
    }

    fn curvature(&self, _x: f64) -> f64 {
        0.
    }
}

fn main() -> Result<()> {
    init_tracing();

    let mut problem = AllocationProblem::new(1000.)?;
    problem.add_channel(
        Arc::new(Exponential {
            cap: 50.,
            rate: 0.01,
        }),
        None,
        None,
    )?;
    problem.add_channel(Arc::new(Linear { slope: 0.05 }), None, Some(400.))?;
    problem.add_channel(Arc::new(Curve::new(100., 0.5, 0.9)), None, None)?;

    problem.solve(true, 100)?;

    // display allocation
    println!("{problem}");

    Ok(())
}
