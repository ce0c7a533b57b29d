#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../../README.md")]
mod allocation;
mod curve;
mod error;
mod grid;
mod interior_point_method;

pub use allocation::{
    Allocation, AllocationObjective, AllocationProblem, BudgetConstraint, BudgetRule,
    ResponseTable,
};
pub use curve::{
    CompositeCurve, Curve, CurvePrimitive, Response, ResponseFunction, SharedResponse,
};
pub use error::{Error, Result};
pub use grid::SpendGrid;
pub use interior_point_method::{
    Constraint, NLPBound, NLPFunctionTarget, NLPSolver, NLPSolverConstraints, NLPSolverOptions,
    Solution, SolveOptions, Solver, SolverStatus,
};
pub use mixalloc_derive::Response;
