use crate::{
    Constraint, Error, NLPBound, NLPFunctionTarget, NLPSolver, NLPSolverConstraints, Response,
    Result, SharedResponse, Solution, SolveOptions, Solver, SpendGrid,
};
use faer::Mat;
use nalgebra::DVector;
use rayon::prelude::*;
use std::{fmt::Display, sync::Arc};
use tracing::debug;

#[cfg_attr(doc, katexit::katexit)]
/// How the total budget constrains the sum of channel spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetRule {
    /// The whole budget is spent: $\sum_i x_i = B$.
    #[default]
    Exhaust,
    /// At most the budget is spent: $B - \sum_i x_i \geq 0$.
    Cap,
}

#[cfg_attr(doc, katexit::katexit)]
/// Minimization target of an allocation: the negated total response
/// $f(x) = -\sum_i r_i(x_i)$.
///
/// The objective is separable, hence its hessian is diagonal.
#[derive(Clone)]
pub struct AllocationObjective {
    channels: Vec<SharedResponse>,
}

impl AllocationObjective {
    /// Creates the objective over the given channels.
    pub fn new(channels: Vec<SharedResponse>) -> Self {
        Self { channels }
    }
}

impl NLPFunctionTarget for AllocationObjective {
    fn val(&self, x: &Mat<f64>) -> f64 {
        -self
            .channels
            .iter()
            .enumerate()
            .map(|(i, c)| c.evaluate(x[(i, 0)]))
            .sum::<f64>()
    }

    fn val_grad(&self, x: &Mat<f64>) -> (f64, Mat<f64>) {
        let mut grad = Mat::<f64>::zeros(x.nrows(), 1);
        self.channels
            .iter()
            .enumerate()
            .for_each(|(i, c)| grad[(i, 0)] = -c.derivative(x[(i, 0)]));
        (self.val(x), grad)
    }

    fn val_grad_hes(&self, x: &Mat<f64>) -> (f64, Mat<f64>, Mat<f64>) {
        let (val, grad) = self.val_grad(x);
        let mut hes = Mat::<f64>::zeros(x.nrows(), x.nrows());
        self.channels
            .iter()
            .enumerate()
            .for_each(|(i, c)| hes[(i, i)] = -c.curvature(x[(i, 0)]));
        (val, grad, hes)
    }
}

#[cfg_attr(doc, katexit::katexit)]
/// Total spend constraint with the all ones vector as jacobian row.
///
/// - [BudgetRule::Exhaust]: $c(x) = \sum_i x_i - B = 0$
/// - [BudgetRule::Cap]: $c(x) = B - \sum_i x_i \geq 0$
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetConstraint {
    total_budget: f64,
    rule: BudgetRule,
}

impl BudgetConstraint {
    /// Creates the constraint for the given budget and rule.
    pub fn new(total_budget: f64, rule: BudgetRule) -> Self {
        Self { total_budget, rule }
    }

    fn sign(&self) -> f64 {
        match self.rule {
            BudgetRule::Exhaust => 1.,
            BudgetRule::Cap => -1.,
        }
    }

    /// Wraps the constraint into the solver constraint matching its rule.
    pub fn into_constraint(self) -> Constraint {
        match self.rule {
            BudgetRule::Exhaust => Constraint::Equality(Arc::new(self)),
            BudgetRule::Cap => Constraint::Inequality(Arc::new(self)),
        }
    }
}

impl NLPFunctionTarget for BudgetConstraint {
    fn val(&self, x: &Mat<f64>) -> f64 {
        let spend: f64 = (0..x.nrows()).map(|i| x[(i, 0)]).sum();
        self.sign() * (spend - self.total_budget)
    }

    fn val_grad(&self, x: &Mat<f64>) -> (f64, Mat<f64>) {
        (self.val(x), self.sign() * Mat::<f64>::ones(x.nrows(), 1))
    }

    fn val_grad_hes(&self, x: &Mat<f64>) -> (f64, Mat<f64>, Mat<f64>) {
        let (val, grad) = self.val_grad(x);
        (val, grad, Mat::zeros(x.nrows(), x.nrows()))
    }
}

/// Stored outcome of [AllocationProblem::solve].
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Spend per channel, in channel order.
    pub spend: DVector<f64>,
    /// Total response of `spend`, with positive sign.
    pub response: f64,
    /// Raw solver result; check `solution.success` before trusting `spend`.
    pub solution: Solution,
}

/// Response of every channel sampled on a common spend grid.
#[derive(Debug, PartialEq)]
pub struct ResponseTable {
    /// Sampled spends.
    pub grid: SpendGrid,
    /// One response vector per channel, in channel order.
    pub responses: Vec<DVector<f64>>,
}

/// Budget allocation problem over an ordered list of channels.
///
/// ```
/// use mixalloc::{AllocationProblem, Curve, Result};
/// use std::sync::Arc;
///
/// # fn main() -> Result<()> {
/// let mut problem = AllocationProblem::new(1000.)?;
/// problem.add_channel(Arc::new(Curve::new(100., 0.5, 1.)), None, None)?;
/// problem.add_channel(Arc::new(Curve::new(100., 0.5, 1.)), None, None)?;
///
/// let mix = problem.solve(false, 100)?;
/// assert!((mix.sum() - 1000.).abs() < 1e-4);
/// assert!((mix[0] - 500.).abs() < 1e-2);
/// # Ok(())
/// # }
/// ```
pub struct AllocationProblem {
    total_budget: f64,
    channels: Vec<SharedResponse>,
    bounds: Vec<(f64, f64)>,
    rule: BudgetRule,
    solution: Option<Allocation>,
}

impl Display for AllocationProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = 40;
        let mix = self.mix();
        let rows: String = self
            .channels
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{i}\t{:>16.4}\t{:.6}", mix[i], c.evaluate(mix[i])))
            .collect::<Vec<String>>()
            .join("\n");
        let header = "Channel\t           Spend\tResponse".to_string();
        let status = match &self.solution {
            Some(allocation) => allocation.solution.message.clone(),
            None => "Not solved".to_string(),
        };
        let iterations = self
            .solution
            .as_ref()
            .map_or(0, |allocation| allocation.solution.iterations);
        write!(
            f,
            "{:-^width$}\n{header}\n{rows}\n{:-^width$}\nStatus: {status}\nTotal response: {:.6}\nTotal spend: {:.4}\nTotal budget: {:.4}\nIterations: {iterations}\n{:-^width$}",
            " Allocation ",
            " Statistics ",
            self.response(),
            mix.sum(),
            self.total_budget,
            "",
        )
    }
}

impl AllocationProblem {
    /// Creates an empty problem for the given total budget.
    pub fn new(total_budget: f64) -> Result<Self> {
        if !total_budget.is_finite() || total_budget <= 0. {
            return Err(Error::NonPositiveBudget {
                budget: total_budget,
            });
        }
        Ok(Self {
            total_budget,
            channels: vec![],
            bounds: vec![],
            rule: BudgetRule::default(),
            solution: None,
        })
    }

    /// Returns the problem with the given budget rule.
    pub fn with_budget_rule(mut self, rule: BudgetRule) -> Self {
        self.rule = rule;
        self
    }

    /// Adds a channel with its spend bounds.
    ///
    /// A missing or zero `lower` defaults to 1, a missing or zero `upper` defaults to the total
    /// budget. An explicit zero lower bound therefore also becomes 1.
    pub fn add_channel(
        &mut self,
        curve: SharedResponse,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<()> {
        let lower = match lower {
            Some(l) if l != 0. => l,
            _ => 1.,
        };
        let upper = match upper {
            Some(u) if u != 0. => u,
            _ => self.total_budget,
        };
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(Error::InvalidBound {
                channel: self.channels.len(),
                lower,
                upper,
            });
        }
        self.channels.push(curve);
        self.bounds.push((lower, upper));
        Ok(())
    }

    /// Returns the total budget.
    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    /// Returns the budget rule.
    pub fn budget_rule(&self) -> BudgetRule {
        self.rule
    }

    /// Returns the channels in solution vector order.
    pub fn channels(&self) -> &[SharedResponse] {
        &self.channels
    }

    /// Returns the `(lower, upper)` spend bounds in channel order.
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Returns the last stored solve outcome.
    pub fn solution(&self) -> Option<&Allocation> {
        self.solution.as_ref()
    }

    /// Whether `solve` was called, regardless of the solver success.
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    #[cfg_attr(doc, katexit::katexit)]
    /// Returns the total response $\sum_i r_i(x_i)$ of the given spends in channel order.
    pub fn evaluate_allocation(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.channels.len() {
            return Err(Error::ShapeMismatch {
                seq1: "allocation",
                seq2: "channels",
                len1: x.len(),
                len2: self.channels.len(),
            });
        }
        Ok(self
            .channels
            .iter()
            .zip(x)
            .map(|(c, &v)| c.evaluate(v))
            .sum())
    }

    /// Returns the minimization target of the current channels.
    pub fn objective(&self) -> AllocationObjective {
        AllocationObjective::new(self.channels.clone())
    }

    /// Returns the total spend constraint of the current budget and rule.
    pub fn budget_constraint(&self) -> BudgetConstraint {
        BudgetConstraint::new(self.total_budget, self.rule)
    }

    /// Solves the problem with the built-in [NLPSolver] and returns the spend per channel.
    pub fn solve(&mut self, display: bool, max_iterations: usize) -> Result<DVector<f64>> {
        self.solve_with(&NLPSolver::default(), display, max_iterations)
    }

    /// Solves the problem with the given solver and returns the spend per channel.
    ///
    /// The start point is the vector of lower bounds. Solver failures are not errors: the
    /// outcome is stored in any case and its `solution.success` flag tells whether it converged.
    pub fn solve_with<S: Solver + ?Sized>(
        &mut self,
        solver: &S,
        display: bool,
        max_iterations: usize,
    ) -> Result<DVector<f64>> {
        if self.channels.is_empty() {
            return Err(Error::EmptyProblem);
        }
        if self.channels.len() != self.bounds.len() {
            return Err(Error::ShapeMismatch {
                seq1: "channels",
                seq2: "bounds",
                len1: self.channels.len(),
                len2: self.bounds.len(),
            });
        }
        debug!(
            channels = self.channels.len(),
            total_budget = self.total_budget,
            rule = ?self.rule,
            "solving allocation problem"
        );

        let objective = self.objective();
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&self.bounds)),
            constraints: vec![self.budget_constraint().into_constraint()],
        };
        let x0 = DVector::from_iterator(self.bounds.len(), self.bounds.iter().map(|b| b.0));
        let options = SolveOptions {
            max_iterations,
            show_progress: display,
        };
        let solution = solver.minimize(&objective, x0, &constraints, &options);

        let spend = solution.x.clone();
        self.solution = Some(Allocation {
            response: -solution.fun,
            spend: spend.clone(),
            solution,
        });
        Ok(spend)
    }

    /// Returns the solved spend per channel, or zeros before the first solve.
    ///
    /// Channels added after the last solve have zero spend until the next solve.
    pub fn mix(&self) -> DVector<f64> {
        let spend = self.solution.as_ref().map(|allocation| &allocation.spend);
        DVector::from_fn(self.channels.len(), |i, _| {
            spend.and_then(|s| s.get(i).copied()).unwrap_or(0.)
        })
    }

    /// Returns the total response of [AllocationProblem::mix].
    pub fn response(&self) -> f64 {
        let mix = self.mix();
        self.channels
            .iter()
            .zip(mix.iter())
            .map(|(c, &v)| c.evaluate(v))
            .sum()
    }

    /// Samples every channel from zero spend to `upper` on `samples` points. `upper` defaults to
    /// the total budget plus one percent.
    pub fn response_table(&self, upper: Option<f64>, samples: usize) -> Result<ResponseTable> {
        let upper = upper.unwrap_or(self.total_budget + (self.total_budget / 100.).trunc());
        let grid = SpendGrid::new(0., upper, samples)?;
        let responses = self
            .channels
            .par_iter()
            .map(|c| c.evaluate_many(&grid.points))
            .collect();
        Ok(ResponseTable { grid, responses })
    }
}
