//! The OpenGL entry points the helpers are built on.
//!
//! [`Driver`] lists every driver call this crate makes, one method per GL
//! function, so the choice of entry point stays in the caller's hands and can
//! be observed in tests. [`GlDriver`](crate::GlDriver) forwards to the `gl`
//! crate.

use std::{ffi::CStr, fmt};

use gl::types::{GLenum, GLint, GLsizei, GLuint};

/// Size of the buffer handed to `glGet{Shader,Program}InfoLog`: 511 characters
/// of log text plus the terminating nul.
pub const INFO_LOG_CAPACITY: usize = 512;

/// Programmable pipeline stage a shader object is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// The graphics driver, as seen from one thread with a current context.
///
/// Methods map one-to-one onto GL functions and keep GL's conventions: object
/// names are `0` when creation fails, uniform locations are `None` where GL
/// returns `-1`.
///
/// Upload methods receive the element count GL expects. An implementation
/// must never read past `values`: a slice shorter than `count` tuples, or a
/// negative `count`, uploads nothing. Read-back methods write at most
/// `out.len()` components.
pub trait Driver {
    fn create_shader(&self, stage: ShaderStage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn get_shader_compile_status(&self, shader: GLuint) -> bool;
    /// At most `INFO_LOG_CAPACITY - 1` characters of the compile log.
    fn get_shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn get_program_link_status(&self, program: GLuint) -> bool;
    /// At most `INFO_LOG_CAPACITY - 1` characters of the link log.
    fn get_program_info_log(&self, program: GLuint) -> String;
    fn delete_program(&self, program: GLuint);

    /// Makes `program` current. This is context-global state: every uniform
    /// setter calls it again and nothing assumes it survives between calls.
    fn use_program(&self, program: GLuint);
    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> Option<GLint>;

    fn uniform_1_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]);
    fn uniform_2_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]);
    fn uniform_3_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]);
    fn uniform_4_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]);

    fn uniform_1_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]);
    fn uniform_2_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]);
    fn uniform_3_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]);
    fn uniform_4_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]);

    fn uniform_1_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]);
    fn uniform_2_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]);
    fn uniform_3_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]);
    fn uniform_4_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]);

    fn uniform_matrix_2_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    );
    fn uniform_matrix_3_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    );
    fn uniform_matrix_4_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    );

    fn get_uniform_f32(&self, program: GLuint, location: GLint, out: &mut [f32]);
    fn get_uniform_i32(&self, program: GLuint, location: GLint, out: &mut [i32]);
    fn get_uniform_u32(&self, program: GLuint, location: GLint, out: &mut [u32]);
}
