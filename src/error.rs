use std::{io, path::PathBuf};

use gl::types::GLint;

use crate::driver::ShaderStage;

pub type Result<T> = std::result::Result<T, GlcError>;

/// Everything that can go wrong while building a program or setting a uniform.
///
/// Every variant is also reported through `tracing::error!` at the point it is
/// raised, so callers that only look at logs see the same information.
#[derive(Debug, thiserror::Error)]
pub enum GlcError {
    #[error("error opening {stage} shader: {path}")]
    FileOpen {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading {stage} shader: {path}")]
    FileRead {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error allocating {bytes} bytes of shader source")]
    Allocation {
        bytes: u64,
        #[source]
        source: std::collections::TryReserveError,
    },

    #[error("error creating {stage} shader object")]
    ShaderCreate { stage: ShaderStage },

    #[error("{stage} shader compilation error!\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("error creating shader program object")]
    ProgramCreate,

    #[error("shader program linking error!\n{log}")]
    Link { log: String },

    #[error("dimension invalid, must be {min}-{max}, got {dimension}")]
    InvalidDimension { dimension: GLint, min: GLint, max: GLint },

    #[error("amount invalid, must be at least {min}, got {count}")]
    InvalidCount { count: GLint, min: GLint },

    #[error("uniform name contains an interior nul byte: {name:?}")]
    InvalidUniformName { name: String },

    #[error("uniform name invalid: {name}")]
    UnknownUniform { name: String },

    #[error("expected {expected} uniform values, got {got}")]
    MissingValues { expected: usize, got: usize },

    #[error("uniform buffer cannot be viewed as {element}: {reason:?}")]
    BufferLayout {
        element: &'static str,
        reason: bytemuck::PodCastError,
    },

    #[error("uniform buffer holds {got} elements, {needed} needed")]
    BufferTooShort { needed: usize, got: usize },
}
