/// Main error type
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// The total budget of an allocation problem is not a positive finite number.
    #[error("total budget must be positive and finite but is {budget}")]
    NonPositiveBudget {
        /// Rejected budget.
        budget: f64,
    },
    /// A channel was registered with a bound pair that spans no valid interval.
    #[error("bound of channel {channel} is invalid: lower {lower} must be finite and <= upper {upper}")]
    InvalidBound {
        /// Index the channel would have had.
        channel: usize,
        /// Lower spend bound after defaulting.
        lower: f64,
        /// Upper spend bound after defaulting.
        upper: f64,
    },
    /// Two sequences that are indexed in parallel do not have the same length.
    #[error("{seq1} has length {len1} but {seq2} has length {len2}")]
    ShapeMismatch {
        /// Name of sequence 1.
        seq1: &'static str,
        /// Name of sequence 2.
        seq2: &'static str,
        /// Length of sequence 1.
        len1: usize,
        /// Length of sequence 2.
        len2: usize,
    },
    /// An allocation problem without channels cannot be solved.
    #[error("allocation problem has no channels")]
    EmptyProblem,
    /// A value is lower than required.
    #[error("minimal value for {name} is {ge_value} but found {value}")]
    MinValue {
        /// Value name
        name: &'static str,
        /// Found value
        value: usize,
        /// Required minimum value
        ge_value: usize,
    },
    /// Minimal distance requirement between two scalars is violated.
    #[error("distance between {lower} and {upper} is {distance} but should be > {gt_distance}")]
    MinDistance {
        /// Name of the lower value.
        lower: &'static str,
        /// Name of the upper value.
        upper: &'static str,
        /// Found distance.
        distance: f64,
        /// Minimal required distance.
        gt_distance: f64,
    },
}

/// Main result type
pub type Result<T> = std::result::Result<T, Error>;
