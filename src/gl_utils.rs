#![allow(unsafe_code)]

use std::{convert::TryFrom, ffi::CStr, marker::PhantomData, os::raw::c_void, ptr};

use gl::types::{GLchar, GLint, GLsizei, GLuint};

use crate::driver::{Driver, ShaderStage, INFO_LOG_CAPACITY};

/// [`Driver`] backed by the global function pointers of the `gl` crate.
///
/// A GL context belongs to the thread it is current on, so this type is
/// neither `Send` nor `Sync`.
#[derive(Debug)]
pub struct GlDriver {
    _not_send: PhantomData<*const ()>,
}

impl GlDriver {
    /// Use the GL functions that are already loaded.
    ///
    /// # Safety
    /// `gl::load_with` must have been called and a context must be current on
    /// the calling thread for as long as this value is used.
    pub unsafe fn current() -> Self {
        GlDriver {
            _not_send: PhantomData,
        }
    }

    /// Load GL function pointers through `loader`, then wrap them.
    ///
    /// # Safety
    /// See [`GlDriver::current`]. `loader` must return the addresses of the
    /// functions of the context that is current on this thread.
    pub unsafe fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        Self::current()
    }

    /// Load GL function pointers from an SDL2 video subsystem.
    ///
    /// # Safety
    /// The window's GL context must have been created and made current on
    /// this thread.
    #[cfg(feature = "sdl2")]
    pub unsafe fn from_sdl2(video_subsystem: &sdl2::VideoSubsystem) -> Self {
        Self::load_with(|name| video_subsystem.gl_get_proc_address(name) as *const _)
    }
}

/// Components of the largest uniform a single location can hold (`mat4`).
const MAX_UNIFORM_COMPONENTS: usize = 16;

fn info_log_from_buffer(buffer: &[u8], length: GLsizei) -> String {
    let length = (length.max(0) as usize).min(buffer.len());
    String::from_utf8_lossy(&buffer[..length]).into_owned()
}

/// Whether `len` elements hold `count` tuples of `components` each. Logs and
/// returns `false` otherwise, in which case the upload must be skipped.
fn holds_tuples(entry: &str, len: usize, count: GLsizei, components: usize) -> bool {
    let fits = usize::try_from(count)
        .map(|count| count.saturating_mul(components) <= len)
        .unwrap_or(false);
    if !fits {
        tracing::error!(
            "{} skipped: {} values cannot hold {} elements of {} components.",
            entry,
            len,
            count,
            components
        );
    }
    fits
}

/// Copy what the driver wrote into `scratch` to the front of `out`.
fn copy_components<T: Copy>(scratch: &[T; MAX_UNIFORM_COMPONENTS], out: &mut [T]) {
    let len = out.len().min(MAX_UNIFORM_COMPONENTS);
    out[..len].copy_from_slice(&scratch[..len]);
}

// SAFETY (every `unsafe` block below): a `GlDriver` only exists after the
// caller asserted that the functions are loaded and a context is current.
// Uploads only reach GL once `holds_tuples` confirmed the slice covers
// `count` tuples of the entry point's shape. Read-back goes through a scratch
// buffer sized for the largest uniform.
impl Driver for GlDriver {
    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe { gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null()) }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn get_shader_compile_status(&self, shader: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let mut buffer = vec![0u8; INFO_LOG_CAPACITY];
        let mut length = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                INFO_LOG_CAPACITY as GLsizei,
                &mut length,
                buffer.as_mut_ptr() as *mut GLchar,
            );
        }
        info_log_from_buffer(&buffer, length)
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn get_program_link_status(&self, program: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let mut buffer = vec![0u8; INFO_LOG_CAPACITY];
        let mut length = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                INFO_LOG_CAPACITY as GLsizei,
                &mut length,
                buffer.as_mut_ptr() as *mut GLchar,
            );
        }
        info_log_from_buffer(&buffer, length)
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> Option<GLint> {
        let location = unsafe { gl::GetUniformLocation(program, name.as_ptr()) };
        if location < 0 {
            None
        } else {
            Some(location)
        }
    }

    fn uniform_1_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        if holds_tuples("glUniform1fv", values.len(), count, 1) {
            unsafe { gl::Uniform1fv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_2_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        if holds_tuples("glUniform2fv", values.len(), count, 2) {
            unsafe { gl::Uniform2fv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_3_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        if holds_tuples("glUniform3fv", values.len(), count, 3) {
            unsafe { gl::Uniform3fv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_4_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        if holds_tuples("glUniform4fv", values.len(), count, 4) {
            unsafe { gl::Uniform4fv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_1_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        if holds_tuples("glUniform1iv", values.len(), count, 1) {
            unsafe { gl::Uniform1iv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_2_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        if holds_tuples("glUniform2iv", values.len(), count, 2) {
            unsafe { gl::Uniform2iv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_3_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        if holds_tuples("glUniform3iv", values.len(), count, 3) {
            unsafe { gl::Uniform3iv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_4_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        if holds_tuples("glUniform4iv", values.len(), count, 4) {
            unsafe { gl::Uniform4iv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_1_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        if holds_tuples("glUniform1uiv", values.len(), count, 1) {
            unsafe { gl::Uniform1uiv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_2_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        if holds_tuples("glUniform2uiv", values.len(), count, 2) {
            unsafe { gl::Uniform2uiv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_3_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        if holds_tuples("glUniform3uiv", values.len(), count, 3) {
            unsafe { gl::Uniform3uiv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_4_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        if holds_tuples("glUniform4uiv", values.len(), count, 4) {
            unsafe { gl::Uniform4uiv(location, count, values.as_ptr()) }
        }
    }

    fn uniform_matrix_2_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    ) {
        if holds_tuples("glUniformMatrix2fv", values.len(), count, 4) {
            unsafe { gl::UniformMatrix2fv(location, count, transpose as u8, values.as_ptr()) }
        }
    }

    fn uniform_matrix_3_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    ) {
        if holds_tuples("glUniformMatrix3fv", values.len(), count, 9) {
            unsafe { gl::UniformMatrix3fv(location, count, transpose as u8, values.as_ptr()) }
        }
    }

    fn uniform_matrix_4_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    ) {
        if holds_tuples("glUniformMatrix4fv", values.len(), count, 16) {
            unsafe { gl::UniformMatrix4fv(location, count, transpose as u8, values.as_ptr()) }
        }
    }

    // glGetUniform*v writes as many components as the uniform has, whatever
    // `out` can take.
    fn get_uniform_f32(&self, program: GLuint, location: GLint, out: &mut [f32]) {
        let mut scratch = [0f32; MAX_UNIFORM_COMPONENTS];
        unsafe { gl::GetUniformfv(program, location, scratch.as_mut_ptr()) };
        copy_components(&scratch, out);
    }

    fn get_uniform_i32(&self, program: GLuint, location: GLint, out: &mut [i32]) {
        let mut scratch = [0i32; MAX_UNIFORM_COMPONENTS];
        unsafe { gl::GetUniformiv(program, location, scratch.as_mut_ptr()) };
        copy_components(&scratch, out);
    }

    fn get_uniform_u32(&self, program: GLuint, location: GLint, out: &mut [u32]) {
        let mut scratch = [0u32; MAX_UNIFORM_COMPONENTS];
        unsafe { gl::GetUniformuiv(program, location, scratch.as_mut_ptr()) };
        copy_components(&scratch, out);
    }
}
