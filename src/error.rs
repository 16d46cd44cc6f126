use thiserror::Error;

/// Errors surfaced by fit / transform.
/// Any error aborts the whole operation, partial results are dropped.
#[derive(Error, Debug)]
pub enum VectorizerError {
    /// Pruning or sizing parameters that cannot produce a usable feature space
    #[error("configuration error: {0}")]
    Configuration(String),

    /// transform called on a stateful vectorizer before fit
    #[error("{0} is not fitted yet, call fit before transform")]
    NotFitted(&'static str),

    /// Broadcast state and a local block disagree on the feature dimension
    #[error("inconsistent state: expected {expected} features, got {actual}")]
    InconsistentState { expected: usize, actual: usize },

    /// Broadcast snapshot could not be encoded or decoded
    #[error("broadcast encoding error: {0}")]
    Encoding(#[from] serde_cbor::Error),
}

impl VectorizerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, VectorizerError>;
