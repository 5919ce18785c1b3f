use thiserror::Error;

#[derive(Debug, Error)]
pub enum HvacSizingError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during sizing calculation: {0}")]
    FailureInCalculation(#[from] SizingCoreError),
    #[error("Error while writing results: {0}")]
    ErrorInPostprocessing(PostprocessingError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct SizingCoreError {
    error: anyhow::Error,
}

impl SizingCoreError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct PostprocessingError {
    error: anyhow::Error,
}

impl PostprocessingError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// Raised when a sized capacity is moved through its stages out of order.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Capacity for {system} cannot move from stage {from} to stage {to}")]
pub struct StageTransitionError {
    pub system: String,
    pub from: String,
    pub to: String,
}
