pub mod emitter;
pub mod error;
pub mod format;
pub mod machine;
pub mod validate;

pub use emitter::{
    build_subroutine_path, generate_footer_lines, generate_header_lines, next_subroutine_number,
    Emitter, GenerationResult, SubroutineKind,
};
pub use error::PostError;
pub use machine::MachineProfile;
pub use validate::{validate_project, ValidationError, ValidationResult, ValidationWarning};
