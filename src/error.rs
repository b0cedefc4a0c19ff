//! Error taxonomy shared by the samplers in this crate.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while configuring or stepping a sampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A numeric parameter was rejected before any stochastic work ran.
    #[error("invalid value {value} for `{name}`: must be {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// A caller-supplied log-density returned NaN. Negative infinity is the
    /// valid "zero probability" signal and never reported through this variant.
    #[error("log-density returned NaN while evaluating the {context}")]
    NonFiniteDensity { context: &'static str },

    /// A bounded search loop ran out of its configured iteration budget.
    #[error("{stage} exceeded the configured maximum of {max} iterations")]
    IterationLimit { stage: &'static str, max: usize },
}
