use mixalloc::{AllocationProblem, Curve, Result};
use mixalloc_examples::init_tracing;
use std::sync::Arc;
use tracing::info;

// seven media channels with the minimal spend already booked per channel
fn main() -> Result<()> {
    init_tracing();

    // total money for all media and maximal spend per media
    let mut problem = AllocationProblem::new(70874156.)?;
    let max_spend = 70e6;

    // media response curves: cap, ec50, steep and model multiplier
    let media = [
        (
            Curve::new(397650., 0.5085217, 0.92).with_multiplier(9.168728e-06 / 87.98509),
            10600000.,
        ),
        (
            Curve::new(1336580., 0.941772, 0.9964167).with_multiplier(7.202334e-07),
            5700000.,
        ),
        (
            Curve::new(5.509022, 5000., 0.99).with_multiplier(0.0002982394 / 219.),
            1923077.,
        ),
        (
            Curve::new(3191.663, 10000., 0.75).with_multiplier(0.001353697 / 65.),
            8307692.,
        ),
        (
            Curve::new(237349.3, 0.9954354, 0.7).with_multiplier(9.501362e-06 / 12.47645),
            3246154.,
        ),
        (
            Curve::new(2961.2209, 100., 0.5).with_multiplier(0.003669801 / 87.98509),
            9791667.,
        ),
        (
            Curve::new(664196.7, 0.662257, 0.92).with_multiplier(1.275716e-06 / 87.98509),
            15786389.,
        ),
    ];
    for (curve, lower) in media {
        problem.add_channel(Arc::new(curve), Some(lower), Some(max_spend))?;
    }

    // spend per media, in the order the media were added
    // get spends by: let mix = problem.solve(true, 100)?;
    // or after solving: let mix = problem.mix();
    problem.solve(true, 100)?;

    // display allocation
    println!("{problem}");

    // compare with a hand made media plan
    let manual = [
        10900000., 5700000., 1923077., 8307692., 14100000., 14100000., 15843387.,
    ];
    info!(
        optimal = problem.response(),
        manual = problem.evaluate_allocation(&manual)?,
        "total response"
    );

    // response curves for plotting
    let table = problem.response_table(None, 1000)?;
    for (i, r) in table.responses.iter().enumerate() {
        info!(channel = i, max_response = r.max(), "sampled response curve");
    }

    Ok(())
}
