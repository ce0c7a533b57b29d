use mixalloc::{AllocationProblem, BudgetRule, CompositeCurve, Curve, Result, SharedResponse};
use mixalloc_examples::init_tracing;
use std::sync::Arc;

// one channel whose response is the sum of a short and a long term effect
fn main() -> Result<()> {
    init_tracing();

    // define effects of the tv channel
    let short_term: SharedResponse = Arc::new(Curve::new(120., 0.4, 1.6).with_price(2.));
    let long_term: SharedResponse = Arc::new(Curve::logistic_decay(60., 0.5, 3.).with_price(2.));
    let tv = CompositeCurve::new(vec![short_term, long_term]);

    // radio and the artificial search curve complete the plan
    let radio = Curve::new(80., 0.3, 0.8);
    let search = Curve::bounded_logistic(2., 150.).with_multiplier(0.6);

    // spend at most the budget, every channel is capped separately
    let mut problem = AllocationProblem::new(600.)?.with_budget_rule(BudgetRule::Cap);
    problem.add_channel(Arc::new(tv), Some(50.), None)?;
    problem.add_channel(Arc::new(radio), None, Some(250.))?;
    problem.add_channel(Arc::new(search), None, Some(200.))?;

    problem.solve(true, 100)?;

    // display allocation
    println!("{problem}");

    Ok(())
}
