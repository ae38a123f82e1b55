use thiserror::Error;

#[derive(Debug, Error)]
pub enum CamError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid compensation geometry: {0}")]
    CompensationFailed(String),

    #[error(transparent)]
    Core(#[from] gcam_core::Error),
}
