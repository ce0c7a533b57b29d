use mixalloc::{AllocationProblem, Response, ResponseFunction, Result};
use num_dual::DualNum;
use std::sync::Arc;

// r(x) = c * ln(1 + x / s)
#[derive(Response)]
struct LogResponse {
    c: f64,
    s: f64,
}

impl ResponseFunction for LogResponse {
    fn f<D: DualNum<f64>>(&self, x: D) -> D {
        (x / self.s + 1.).ln() * self.c
    }
}

#[test]
fn test_derived_response() -> Result<()> {
    let r = LogResponse { c: 2., s: 10. };
    let x = 30.;
    assert!((r.evaluate(x) - 2. * 4_f64.ln()).abs() < 1e-12);
    assert!((r.derivative(x) - 2. / 40.).abs() < 1e-12);
    assert!((r.curvature(x) + 2. / 1600.).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_derived_response_allocation() -> Result<()> {
    // equal marginal response: c1 / (s1 + x1) = c2 / (s2 + x2)
    let mut problem = AllocationProblem::new(100.)?;
    problem.add_channel(Arc::new(LogResponse { c: 1., s: 10. }), None, None)?;
    problem.add_channel(Arc::new(LogResponse { c: 3., s: 10. }), None, None)?;
    let mix = problem.solve(false, 100)?;

    assert!((mix[0] - 20.).abs() < 1e-3);
    assert!((mix[1] - 80.).abs() < 1e-3);
    Ok(())
}
