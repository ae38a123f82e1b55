pub mod error;
pub mod generate;

pub use error::PipelineError;
pub use generate::{
    generate_pipeline, GenerateConfig, GenerateResult, NullReporter, ProgressEvent,
    ProgressReporter,
};
