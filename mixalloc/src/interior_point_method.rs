use faer::{Mat, linalg::solvers::Solve};
use faer_ext::{IntoFaer, IntoNalgebra};
use nalgebra::DVector;
use std::{fmt::Display, sync::Arc};
use tracing::{debug, info};

/// Interface for functions of which values are minimized by proving value, gradient and hessian
/// methods.
pub trait NLPFunctionTarget {
    /// Returns the value of its function at x.
    fn val(&self, x: &Mat<f64>) -> f64;
    /// Returns the value and gradient of its function at x.
    fn val_grad(&self, x: &Mat<f64>) -> (f64, Mat<f64>);
    /// Returns the value, gradient and hessian of its function at x.
    fn val_grad_hes(&self, x: &Mat<f64>) -> (f64, Mat<f64>, Mat<f64>);
}

/// Ensures the consistency of of [NLPFunctionTarget] value, gradient and hessian methods.
#[macro_export]
macro_rules! assert_nlp_target_consistency {
    ($target:ident, $x:expr) => {
        let val = $target.val($x);
        let val_grad = $target.val_grad($x);
        let val_grad_hes = $target.val_grad_hes($x);
        assert_eq!(val, val_grad.0);
        assert_eq!(val, val_grad_hes.0);
        assert_eq!(val_grad.1, val_grad_hes.1);
    };
}

/// Configuration of [NLPSolver].
#[derive(Debug, Clone, PartialEq)]
pub struct NLPSolverOptions {
    barrier_prec: f64,
    newton_prec: f64,
    feasibility_prec: f64,
    newton_max_iter: usize,
    backline_max_iter: usize,
    regularization_max_iter: usize,
    barrier_mu: f64,
    barrier_t0: f64,
    backline_c: f64,
    backline_b: f64,
    boundary_fraction: f64,
    interior_margin: f64,
}

impl Default for NLPSolverOptions {
    fn default() -> Self {
        Self {
            barrier_prec: 1e-8,
            newton_prec: 1e-9,
            feasibility_prec: 1e-9,
            newton_max_iter: 500,
            backline_max_iter: 60,
            regularization_max_iter: 12,
            barrier_mu: 5.,
            barrier_t0: 100.,
            backline_c: 1e-4,
            backline_b: 0.5,
            boundary_fraction: 0.995,
            interior_margin: 1e-2,
        }
    }
}

impl NLPSolverOptions {
    /// Creates a new nlp solver Configuration with its default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns options with the given duality gap at which the barrier method stops.
    pub fn with_barrier_prec(mut self, val: f64) -> Self {
        self.barrier_prec = val;
        self
    }

    /// Returns options with the given newton decrement at which a centering step stops.
    pub fn with_newton_prec(mut self, val: f64) -> Self {
        self.newton_prec = val;
        self
    }

    /// Returns options with the given relative tolerance on equality constraint residuals.
    pub fn with_feasibility_prec(mut self, val: f64) -> Self {
        self.feasibility_prec = val;
        self
    }

    /// Returns options with the given maximal number of newton steps per centering.
    pub fn with_newton_max_iter(mut self, val: usize) -> Self {
        self.newton_max_iter = val;
        self
    }

    /// Returns options with the given factor the barrier parameter grows by.
    pub fn with_barrier_mu(mut self, val: f64) -> Self {
        self.barrier_mu = val;
        self
    }
}

/// Cubic constraint for x. Infinite entries leave that side unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct NLPBound {
    /// Lower bound per variable.
    pub lower: Mat<f64>,
    /// Upper bound per variable.
    pub upper: Mat<f64>,
}

impl NLPBound {
    /// Creates the bound from its lower and upper vectors.
    pub fn new(lower: DVector<f64>, upper: DVector<f64>) -> Self {
        let lower = lower.view_range(.., ..).into_faer().to_owned();
        let upper = upper.view_range(.., ..).into_faer().to_owned();
        Self { lower, upper }
    }

    /// Creates the bound from `(lower, upper)` pairs, one per variable.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        let lower = DVector::from_iterator(pairs.len(), pairs.iter().map(|p| p.0));
        let upper = DVector::from_iterator(pairs.len(), pairs.iter().map(|p| p.1));
        Self::new(lower, upper)
    }
}

#[cfg_attr(doc, katexit::katexit)]
/// Constraint of [NLPSolver] defined by a twice differentiable function $c$, where the jacobian
/// row is the gradient of $c$.
#[derive(Clone)]
pub enum Constraint {
    /// $c(x) = 0$
    Equality(Arc<dyn NLPFunctionTarget + Send + Sync>),
    /// $c(x) \geq 0$
    Inequality(Arc<dyn NLPFunctionTarget + Send + Sync>),
}

/// All constraint types for [NLPSolver].
#[derive(Clone, Default)]
pub struct NLPSolverConstraints {
    /// Cubic constraint for x.
    pub bound: Option<NLPBound>,
    /// Equality and inequality constraints.
    pub constraints: Vec<Constraint>,
}

/// Per call settings of a [Solver].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOptions {
    /// Maximal number of major iterations.
    pub max_iterations: usize,
    /// Report the convergence message at info level.
    pub show_progress: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            show_progress: true,
        }
    }
}

/// Termination reason of a [Solver].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Duality gap and constraint residuals are below their tolerances.
    Converged,
    /// Maximal number of major iterations reached.
    IterationLimit,
    /// No strictly feasible starting point with respect to bounds and inequalities exists.
    InfeasibleStart,
    /// A newton system could not be solved or produced non finite values.
    NumericalFailure,
}

impl Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::Converged => "Optimization terminated successfully",
            Self::IterationLimit => "Iteration limit reached",
            Self::InfeasibleStart => "Bounds or inequality constraints admit no interior point",
            Self::NumericalFailure => "Newton system is singular or not finite",
        };
        write!(f, "{msg}")
    }
}

/// Result of a [Solver] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Final point.
    pub x: DVector<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    /// Whether the solver converged.
    pub success: bool,
    /// Termination reason.
    pub status: SolverStatus,
    /// Human readable termination message.
    pub message: String,
    /// Number of major iterations.
    pub iterations: usize,
    /// Number of newton steps over all major iterations.
    pub newton_iterations: usize,
}

/// Bounded, equality and inequality constrained local minimizer.
pub trait Solver {
    /// Returns a locally minimal point of `func` starting at `x0`.
    fn minimize(
        &self,
        func: &dyn NLPFunctionTarget,
        x0: DVector<f64>,
        constraints: &NLPSolverConstraints,
        options: &SolveOptions,
    ) -> Solution;
}

#[cfg_attr(doc, katexit::katexit)]
/// Non linear programming solver that minimizes [NLPFunctionTarget] within given
/// [NLPSolverConstraints].
///
/// Primal log barrier method: for growing $t$ the centering problem
/// $\min_x t f(x) - \sum \ln(x - l) - \sum \ln(u - x) - \sum \ln c_{in}(x)$ subject to
/// $c_{eq}(x) = 0$ is solved by infeasible start newton steps, such that starting points
/// violating the equality constraints are allowed.
#[derive(Debug, Clone, Default)]
pub struct NLPSolver {
    options: NLPSolverOptions,
}

impl NLPSolver {
    /// Initialize the NLP solver.
    pub fn new(options: NLPSolverOptions) -> Self {
        Self { options }
    }
}

impl Solver for NLPSolver {
    fn minimize(
        &self,
        func: &dyn NLPFunctionTarget,
        x0: DVector<f64>,
        constraints: &NLPSolverConstraints,
        options: &SolveOptions,
    ) -> Solution {
        let problem = BarrierProblem::new(func, x0.len(), constraints, &self.options);
        let mut x = x0.view_range(.., ..).into_faer().to_owned();

        let mut iterations = 0;
        let mut newton_iterations = 0;
        let status = if problem.interior_start(&mut x) {
            problem.barrier_method(
                &mut x,
                options.max_iterations,
                &mut iterations,
                &mut newton_iterations,
            )
        } else {
            SolverStatus::InfeasibleStart
        };

        let fun = func.val(&x);
        let success = status == SolverStatus::Converged;
        let message = status.to_string();
        if options.show_progress {
            info!(
                fun,
                iterations, newton_iterations, "{message} (current function value: {fun})"
            );
        } else {
            debug!(fun, iterations, newton_iterations, "{message}");
        }
        Solution {
            x: x.as_ref().into_nalgebra().column(0).into(),
            fun,
            success,
            status,
            message,
            iterations,
            newton_iterations,
        }
    }
}

struct NewtonSystem {
    val: f64,
    grad: Mat<f64>,
    hes: Mat<f64>,
    jac: Mat<f64>,
    res: Vec<f64>,
}

struct BarrierProblem<'a> {
    func: &'a dyn NLPFunctionTarget,
    lower: Vec<f64>,
    upper: Vec<f64>,
    fixed: Vec<bool>,
    equal: Vec<&'a Arc<dyn NLPFunctionTarget + Send + Sync>>,
    inequal: Vec<&'a Arc<dyn NLPFunctionTarget + Send + Sync>>,
    options: &'a NLPSolverOptions,
}

impl<'a> BarrierProblem<'a> {
    fn new(
        func: &'a dyn NLPFunctionTarget,
        size: usize,
        constraints: &'a NLPSolverConstraints,
        options: &'a NLPSolverOptions,
    ) -> Self {
        let (lower, upper) = match &constraints.bound {
            Some(bound) => (
                (0..size).map(|i| bound.lower[(i, 0)]).collect::<Vec<_>>(),
                (0..size).map(|i| bound.upper[(i, 0)]).collect::<Vec<_>>(),
            ),
            None => (vec![f64::NEG_INFINITY; size], vec![f64::INFINITY; size]),
        };
        let fixed = lower.iter().zip(&upper).map(|(l, u)| l == u).collect();
        let mut equal = vec![];
        let mut inequal = vec![];
        for c in &constraints.constraints {
            match c {
                Constraint::Equality(f) => equal.push(f),
                Constraint::Inequality(f) => inequal.push(f),
            }
        }
        Self {
            func,
            lower,
            upper,
            fixed,
            equal,
            inequal,
            options,
        }
    }

    /// Number of logarithmic barrier terms, which bounds the duality gap by m / t.
    fn barrier_size(&self) -> usize {
        let bound_terms: usize = (0..self.lower.len())
            .filter(|&i| !self.fixed[i])
            .map(|i| self.lower[i].is_finite() as usize + self.upper[i].is_finite() as usize)
            .sum();
        bound_terms + self.inequal.len()
    }

    /// Moves x strictly into the bounds and checks the inequality constraints there.
    fn interior_start(&self, x: &mut Mat<f64>) -> bool {
        let margin = self.options.interior_margin;
        for i in 0..x.nrows() {
            let (l, u) = (self.lower[i], self.upper[i]);
            if l > u || l.is_nan() || u.is_nan() {
                return false;
            }
            let v = x[(i, 0)];
            x[(i, 0)] = if self.fixed[i] {
                l
            } else if l.is_finite() && u.is_finite() {
                let width = u - l;
                v.clamp(l + margin * width, u - margin * width)
            } else if l.is_finite() {
                v.max(l + margin * l.abs().max(1.))
            } else if u.is_finite() {
                v.min(u - margin * u.abs().max(1.))
            } else {
                v
            };
        }
        self.inequal.iter().all(|c| c.val(x) > 0.)
    }

    fn barrier_method(
        &self,
        x: &mut Mat<f64>,
        max_iter: usize,
        iterations: &mut usize,
        newton_iterations: &mut usize,
    ) -> SolverStatus {
        let x_size = x.nrows() as f64;
        let m = self.barrier_size() as f64;
        let t0 = 200_f64.max((self.options.barrier_t0 * x_size.sqrt()).min(5e3));
        let mut t = t0;
        let mut rho = 0.;
        while *iterations < max_iter {
            *iterations += 1;
            let centered = match self.centering(x, t, &mut rho, newton_iterations) {
                Ok(centered) => centered,
                Err(status) => return status,
            };
            debug!(
                iteration = *iterations,
                t,
                gap = m / t,
                fun = self.func.val(x),
                infeasibility = self.infeasibility(x),
                centered,
                "barrier iteration"
            );
            if centered && m / t < self.options.barrier_prec {
                return SolverStatus::Converged;
            }
            t *= self.options.barrier_mu;
        }
        SolverStatus::IterationLimit
    }

    fn feasibility_tol(&self, x: &Mat<f64>) -> f64 {
        let x_max = (0..x.nrows()).fold(0_f64, |acc, i| acc.max(x[(i, 0)].abs()));
        self.options.feasibility_prec * (1. + x_max)
    }

    /// Equality residuals, followed by one row per fixed variable.
    fn residual(&self, x: &Mat<f64>) -> Vec<f64> {
        let mut res: Vec<f64> = self.equal.iter().map(|c| c.val(x)).collect();
        (0..x.nrows())
            .filter(|&i| self.fixed[i])
            .for_each(|i| res.push(x[(i, 0)] - self.lower[i]));
        res
    }

    fn infeasibility(&self, x: &Mat<f64>) -> f64 {
        self.residual(x).iter().map(|r| r.abs()).sum()
    }

    /// Returns the barrier augmented objective at x, or infinity outside of the domain.
    fn phi(&self, x: &Mat<f64>, t: f64) -> f64 {
        let mut val = t * self.func.val(x);
        for i in 0..x.nrows() {
            if self.fixed[i] {
                continue;
            }
            let v = x[(i, 0)];
            if self.lower[i].is_finite() {
                if v <= self.lower[i] {
                    return f64::INFINITY;
                }
                val -= (v - self.lower[i]).ln();
            }
            if self.upper[i].is_finite() {
                if v >= self.upper[i] {
                    return f64::INFINITY;
                }
                val -= (self.upper[i] - v).ln();
            }
        }
        for c in &self.inequal {
            let c_val = c.val(x);
            if c_val <= 0. {
                return f64::INFINITY;
            }
            val -= c_val.ln();
        }
        val
    }

    fn newton_system(&self, x: &Mat<f64>, t: f64) -> NewtonSystem {
        let x_size = x.nrows();
        let (val, mut grad, mut hes) = self.func.val_grad_hes(x);
        grad *= t;
        hes *= t;

        for i in 0..x_size {
            if self.fixed[i] {
                continue;
            }
            let v = x[(i, 0)];
            if self.lower[i].is_finite() {
                let d = v - self.lower[i];
                grad[(i, 0)] -= 1. / d;
                hes[(i, i)] += 1. / d.powi(2);
            }
            if self.upper[i].is_finite() {
                let d = self.upper[i] - v;
                grad[(i, 0)] += 1. / d;
                hes[(i, i)] += 1. / d.powi(2);
            }
        }

        for c in &self.inequal {
            let (c_val, c_grad, c_hes) = c.val_grad_hes(x);
            grad -= (1. / c_val) * &c_grad;
            hes += (1. / c_val.powi(2)) * &c_grad * c_grad.transpose();
            hes -= (1. / c_val) * &c_hes;
        }

        let fixed_ids: Vec<usize> = (0..x_size).filter(|&i| self.fixed[i]).collect();
        let rows = self.equal.len() + fixed_ids.len();
        let mut jac = Mat::<f64>::zeros(rows, x_size);
        let mut res = Vec::with_capacity(rows);
        for (row, c) in self.equal.iter().enumerate() {
            let (c_val, c_grad) = c.val_grad(x);
            for j in 0..x_size {
                jac[(row, j)] = c_grad[(j, 0)];
            }
            res.push(c_val);
        }
        for (k, &i) in fixed_ids.iter().enumerate() {
            jac[(self.equal.len() + k, i)] = 1.;
            res.push(x[(i, 0)] - self.lower[i]);
        }

        NewtonSystem {
            val,
            grad,
            hes,
            jac,
            res,
        }
    }

    /// Solves the KKT system, shifting the hessian until the step has positive curvature.
    /// Returns the step, the multipliers and the curvature along the step.
    fn newton_step(&self, sys: &NewtonSystem) -> Option<(Mat<f64>, Mat<f64>, f64)> {
        let x_size = sys.grad.nrows();
        let rows = sys.res.len();
        let dim = x_size + rows;

        let mut b = Mat::<f64>::zeros(dim, 1);
        for i in 0..x_size {
            b[(i, 0)] = -sys.grad[(i, 0)];
        }
        for (k, r) in sys.res.iter().enumerate() {
            b[(x_size + k, 0)] = -r;
        }

        let hes_scale = (0..x_size).fold(0_f64, |acc, i| acc.max(sys.hes[(i, i)].abs()));
        let mut shift = 0.;
        let mut step = None;
        for _ in 0..self.options.regularization_max_iter {
            let mut a = Mat::<f64>::zeros(dim, dim);
            a.as_mut()
                .submatrix_mut(0, 0, x_size, x_size)
                .copy_from(sys.hes.as_ref());
            for i in 0..x_size {
                a[(i, i)] += shift;
            }
            for k in 0..rows {
                for j in 0..x_size {
                    a[(x_size + k, j)] = sys.jac[(k, j)];
                    a[(j, x_size + k)] = sys.jac[(k, j)];
                }
            }
            let sol = a.partial_piv_lu().solve(&b);
            let dx = sol.submatrix(0, 0, x_size, 1).to_owned();
            let w = sol.submatrix(x_size, 0, rows, 1).to_owned();
            let curv = (0..x_size)
                .map(|i| {
                    let hdx: f64 = (0..x_size).map(|j| sys.hes[(i, j)] * dx[(j, 0)]).sum();
                    dx[(i, 0)] * (hdx + shift * dx[(i, 0)])
                })
                .sum::<f64>();
            let finite = curv.is_finite() && (0..rows).all(|k| w[(k, 0)].is_finite());
            if finite {
                let positive = curv > 0. || dx.norm_l2() == 0.;
                step = Some((dx, w, curv));
                if positive {
                    break;
                }
            }
            shift = if shift > 0. {
                shift * 100.
            } else if hes_scale > 0. {
                1e-8 * hes_scale
            } else {
                1e-8
            };
        }
        step
    }

    /// Largest step in (0, 1] along dx which keeps x strictly within the bounds.
    fn max_step(&self, x: &Mat<f64>, dx: &Mat<f64>) -> f64 {
        let tau = self.options.boundary_fraction;
        let mut alpha: f64 = 1.;
        for i in 0..x.nrows() {
            let (v, d) = (x[(i, 0)], dx[(i, 0)]);
            if self.fixed[i] || d == 0. {
                continue;
            }
            if d < 0. && self.lower[i].is_finite() {
                alpha = alpha.min(tau * (v - self.lower[i]) / -d);
            }
            if d > 0. && self.upper[i].is_finite() {
                alpha = alpha.min(tau * (self.upper[i] - v) / d);
            }
        }
        alpha
    }

    /// Infeasible start newton method on the centering problem for fixed t. Returns whether the
    /// central point was reached.
    fn centering(
        &self,
        x: &mut Mat<f64>,
        t: f64,
        rho: &mut f64,
        newton_iterations: &mut usize,
    ) -> Result<bool, SolverStatus> {
        for _ in 0..self.options.newton_max_iter {
            *newton_iterations += 1;
            let sys = self.newton_system(x, t);
            if !sys.val.is_finite() {
                return Err(SolverStatus::NumericalFailure);
            }
            let (dx, w, curv) = self.newton_step(&sys).ok_or(SolverStatus::NumericalFailure)?;

            let feas: f64 = sys.res.iter().map(|r| r.abs()).sum();
            let feas_tol = self.feasibility_tol(x);
            if feas <= feas_tol && curv / 2. <= self.options.newton_prec {
                return Ok(true);
            }
            let x_norm = x.norm_l2();
            if dx.norm_l2() <= 1e-14 * (1. + x_norm) {
                return Ok(feas <= feas_tol);
            }

            let grad_dx: f64 = (0..x.nrows()).map(|i| sys.grad[(i, 0)] * dx[(i, 0)]).sum();
            let w_max = (0..w.nrows()).fold(0_f64, |acc, k| acc.max(w[(k, 0)].abs()));
            *rho = rho.max(1.1 * w_max);
            if feas > 0. {
                *rho = rho.max((grad_dx + 0.5 * curv.max(0.)) / (0.7 * feas));
            }
            let slope = grad_dx - *rho * feas;
            if slope >= 0. {
                return Ok(feas <= feas_tol);
            }

            let merit0 = self.phi(x, t) + *rho * feas;
            let mut alpha = self.max_step(x, &dx);
            let mut accepted = false;
            for _ in 0..self.options.backline_max_iter {
                let x_tmp = &*x + alpha * &dx;
                let merit = self.phi(&x_tmp, t) + *rho * self.infeasibility(&x_tmp);
                if merit.is_finite() && merit <= merit0 + self.options.backline_c * alpha * slope {
                    *x = x_tmp;
                    (0..x.nrows())
                        .filter(|&i| self.fixed[i])
                        .for_each(|i| x[(i, 0)] = self.lower[i]);
                    accepted = true;
                    break;
                }
                alpha *= self.options.backline_b;
            }
            if !accepted {
                return Ok(feas <= feas_tol);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use faer::mat;

    struct NLPTargetTest {}

    impl NLPFunctionTarget for NLPTargetTest {
        fn val(&self, x: &Mat<f64>) -> f64 {
            x[(0, 0)].powi(2)
        }

        fn val_grad(&self, x: &Mat<f64>) -> (f64, Mat<f64>) {
            (self.val(x), 2. * x)
        }
        fn val_grad_hes(&self, x: &Mat<f64>) -> (f64, Mat<f64>, Mat<f64>) {
            let vg = self.val_grad(x);
            (vg.0, vg.1, mat![[2.]])
        }
    }

    // f(x) = sum_i (x_i - 1)^2
    struct ShiftedSquares {}

    impl NLPFunctionTarget for ShiftedSquares {
        fn val(&self, x: &Mat<f64>) -> f64 {
            (0..x.nrows()).map(|i| (x[(i, 0)] - 1.).powi(2)).sum()
        }

        fn val_grad(&self, x: &Mat<f64>) -> (f64, Mat<f64>) {
            let mut grad = Mat::<f64>::zeros(x.nrows(), 1);
            for i in 0..x.nrows() {
                grad[(i, 0)] = 2. * (x[(i, 0)] - 1.);
            }
            (self.val(x), grad)
        }

        fn val_grad_hes(&self, x: &Mat<f64>) -> (f64, Mat<f64>, Mat<f64>) {
            let (val, grad) = self.val_grad(x);
            let mut hes = Mat::<f64>::zeros(x.nrows(), x.nrows());
            for i in 0..x.nrows() {
                hes[(i, i)] = 2.;
            }
            (val, grad, hes)
        }
    }

    // c(x) = sum_i x_i - total
    struct SumMinus {
        total: f64,
        sign: f64,
    }

    impl NLPFunctionTarget for SumMinus {
        fn val(&self, x: &Mat<f64>) -> f64 {
            self.sign * ((0..x.nrows()).map(|i| x[(i, 0)]).sum::<f64>() - self.total)
        }

        fn val_grad(&self, x: &Mat<f64>) -> (f64, Mat<f64>) {
            (self.val(x), self.sign * Mat::<f64>::ones(x.nrows(), 1))
        }

        fn val_grad_hes(&self, x: &Mat<f64>) -> (f64, Mat<f64>, Mat<f64>) {
            let (val, grad) = self.val_grad(x);
            (val, grad, Mat::zeros(x.nrows(), x.nrows()))
        }
    }

    fn quiet() -> SolveOptions {
        SolveOptions {
            max_iterations: 100,
            show_progress: false,
        }
    }

    #[test]
    fn test_nlp_solver() -> Result<()> {
        let size = 1;
        for i in 0..10 {
            let lower = (i as f64) / 20.;
            let bound = Some(NLPBound::new(
                DVector::from_element(size, lower),
                DVector::from_element(size, 1.),
            ));
            let constraints = NLPSolverConstraints {
                bound,
                constraints: vec![],
            };
            let solver = NLPSolver::new(NLPSolverOptions::new());
            let x0 = DVector::from_vec(vec![0.9]);
            let solution = solver.minimize(&NLPTargetTest {}, x0, &constraints, &quiet());
            assert!(solution.success);
            assert!(
                solution
                    .x
                    .relative_eq(&DVector::from_vec(vec![lower]), 1e-4, 1e-4)
            );
        }
        Ok(())
    }

    #[test]
    fn test_nlp_solver_start_outside() -> Result<()> {
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(0.5, 1.)])),
            constraints: vec![],
        };
        let solver = NLPSolver::default();
        let x0 = DVector::from_vec(vec![2.9]);
        let solution = solver.minimize(&NLPTargetTest {}, x0, &constraints, &quiet());
        assert_eq!(solution.status, SolverStatus::Converged);
        assert!((solution.x[0] - 0.5).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_nlp_solver_unconstrained() -> Result<()> {
        let solver = NLPSolver::default();
        let x0 = DVector::from_vec(vec![-3., 4., 10.]);
        let solution = solver.minimize(
            &ShiftedSquares {},
            x0,
            &NLPSolverConstraints::default(),
            &quiet(),
        );
        assert!(solution.success);
        assert!(
            solution
                .x
                .relative_eq(&DVector::from_element(3, 1.), 1e-8, 1e-8)
        );
        assert!(solution.fun.abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_nlp_solver_equality_from_infeasible_start() -> Result<()> {
        // min sum (x_i - 1)^2 s.t. x_0 + x_1 + x_2 = 6, 0 <= x <= 10 -> x = (2, 2, 2)
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(0., 10.); 3])),
            constraints: vec![Constraint::Equality(Arc::new(SumMinus {
                total: 6.,
                sign: 1.,
            }))],
        };
        let solver = NLPSolver::default();
        let x0 = DVector::from_vec(vec![0., 0., 0.]);
        let solution = solver.minimize(&ShiftedSquares {}, x0, &constraints, &quiet());
        assert!(solution.success);
        assert!((solution.x.sum() - 6.).abs() < 1e-6);
        assert!(
            solution
                .x
                .relative_eq(&DVector::from_element(3, 2.), 1e-4, 1e-4)
        );
        Ok(())
    }

    #[test]
    fn test_nlp_solver_equality_pins_upper_bound() -> Result<()> {
        // the only feasible point lies on the upper bound
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(1., 1000.)])),
            constraints: vec![Constraint::Equality(Arc::new(SumMinus {
                total: 1000.,
                sign: 1.,
            }))],
        };
        let solver = NLPSolver::default();
        let x0 = DVector::from_vec(vec![1.]);
        let solution = solver.minimize(&NLPTargetTest {}, x0, &constraints, &quiet());
        assert!(solution.success);
        assert!((solution.x[0] - 1000.).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_nlp_solver_inequality_constraint() -> Result<()> {
        // min sum (x_i - 1)^2 s.t. 1 - x_0 - x_1 >= 0 -> x = (0.5, 0.5)
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(0., 10.); 2])),
            constraints: vec![Constraint::Inequality(Arc::new(SumMinus {
                total: 1.,
                sign: -1.,
            }))],
        };
        let solver = NLPSolver::default();
        let x0 = DVector::from_vec(vec![0.1, 0.1]);
        let solution = solver.minimize(&ShiftedSquares {}, x0, &constraints, &quiet());
        assert!(solution.success);
        assert!(
            solution
                .x
                .relative_eq(&DVector::from_element(2, 0.5), 1e-4, 1e-4)
        );
        Ok(())
    }

    #[test]
    fn test_nlp_solver_infeasible_inequality_start() -> Result<()> {
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(0., 10.); 2])),
            constraints: vec![Constraint::Inequality(Arc::new(SumMinus {
                total: 1.,
                sign: -1.,
            }))],
        };
        let solver = NLPSolver::default();
        let x0 = DVector::from_vec(vec![5., 5.]);
        let solution = solver.minimize(&ShiftedSquares {}, x0, &constraints, &quiet());
        assert!(!solution.success);
        assert_eq!(solution.status, SolverStatus::InfeasibleStart);
        assert_eq!(solution.iterations, 0);
        Ok(())
    }

    #[test]
    fn test_nlp_solver_fixed_variable() -> Result<()> {
        // x_0 is fixed at 3, the rest of the budget goes to x_1
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(3., 3.), (0., 10.)])),
            constraints: vec![Constraint::Equality(Arc::new(SumMinus {
                total: 5.,
                sign: 1.,
            }))],
        };
        let solver = NLPSolver::default();
        let x0 = DVector::from_vec(vec![0., 0.]);
        let solution = solver.minimize(&ShiftedSquares {}, x0, &constraints, &quiet());
        assert!(solution.success);
        assert_eq!(solution.x[0], 3.);
        assert!((solution.x[1] - 2.).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_nlp_solver_empty_bound() -> Result<()> {
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(2., 1.)])),
            constraints: vec![],
        };
        let solution = NLPSolver::default().minimize(
            &NLPTargetTest {},
            DVector::from_vec(vec![1.5]),
            &constraints,
            &quiet(),
        );
        assert_eq!(solution.status, SolverStatus::InfeasibleStart);
        Ok(())
    }

    #[test]
    fn test_nlp_solver_iteration_limit() -> Result<()> {
        let constraints = NLPSolverConstraints {
            bound: Some(NLPBound::from_pairs(&[(0., 1.)])),
            constraints: vec![],
        };
        let options = SolveOptions {
            max_iterations: 1,
            show_progress: false,
        };
        let solution = NLPSolver::default().minimize(
            &NLPTargetTest {},
            DVector::from_vec(vec![0.5]),
            &constraints,
            &options,
        );
        assert!(!solution.success);
        assert_eq!(solution.status, SolverStatus::IterationLimit);
        assert_eq!(solution.iterations, 1);
        assert_eq!(solution.message, "Iteration limit reached");
        Ok(())
    }

    #[test]
    fn test_sum_minus_consistency() -> Result<()> {
        let c = SumMinus {
            total: 2.,
            sign: -1.,
        };
        let x = mat![[0.5], [1.5]];
        assert_nlp_target_consistency!(c, &x);
        assert_eq!(c.val(&x), 0.);
        Ok(())
    }
}
