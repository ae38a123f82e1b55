use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("project validation failed: {0}")]
    ProjectValidation(String),

    #[error("cut parameters unavailable: {0}")]
    CutParameters(String),

    #[error(transparent)]
    Core(#[from] gcam_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
