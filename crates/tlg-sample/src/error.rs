use thiserror::Error;

/// Errors from sampling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// Weights must be finite and strictly positive.
    #[error("candidate {index} has invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },
}

/// Result alias for sampling.
pub type SampleResult<T> = Result<T, SampleError>;
