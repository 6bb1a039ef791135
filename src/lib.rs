#![warn(clippy::all)]

//! Shader program and uniform helpers for raw OpenGL.
//!
//! ```no_run
//! use glc::{GlDriver, UniformType};
//!
//! # fn run() -> glc::Result<()> {
//! // A context must be current and the GL functions loaded.
//! let driver = unsafe { GlDriver::current() };
//! let program = glc::build_program(&driver, "shaders/basic.vert", "shaders/basic.frag")?;
//! glc::set_uniform!(&driver, program, "u_offset", UniformType::Float; 0.25, -0.5)?;
//! # Ok(())
//! # }
//! ```

// Re-export dependencies.
pub use gl;
#[cfg(feature = "sdl2")]
pub use sdl2;

mod driver;
mod error;
mod gl_utils;
mod program;
mod uniform;

pub use driver::{Driver, ShaderStage, INFO_LOG_CAPACITY};
pub use error::{GlcError, Result};
pub use gl_utils::GlDriver;
pub use program::{build_program, build_program_from_source};
pub use uniform::{
    get_uniform_f32, get_uniform_i32, get_uniform_u32, set_uniform, set_uniform_array,
    set_uniform_matrix_array, UniformArg, UniformType,
};
