//! Set uniforms by name, picking the upload entry point from a runtime
//! (type, dimension) pair.
//!
//! Every setter resolves the location, validates its arguments, makes the
//! program current and issues exactly one upload. Nothing is cached between
//! calls, including the current program.

use std::ffi::CString;

use bytemuck::Pod;
use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::{
    driver::Driver,
    error::{GlcError, Result},
};

/// Element type of a vector uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Int,
    UnsignedInt,
}

impl UniformType {
    /// Map a GL type enum to a uniform type.
    ///
    /// `GL_FLOAT` and `GL_INT` are recognized. Anything else, including
    /// `GL_UNSIGNED_INT`, is treated as unsigned.
    pub fn from_gl_enum(ty: GLenum) -> Self {
        match ty {
            gl::FLOAT => UniformType::Float,
            gl::INT => UniformType::Int,
            _ => UniformType::UnsignedInt,
        }
    }

    fn element_name(self) -> &'static str {
        match self {
            UniformType::Float => "f32",
            UniformType::Int => "i32",
            UniformType::UnsignedInt => "u32",
        }
    }
}

/// One value handed to [`set_uniform`], converted to the selected
/// [`UniformType`] with a numeric cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformArg {
    Float(f64),
    Int(i32),
    Uint(u32),
}

impl UniformArg {
    fn as_f32(self) -> f32 {
        match self {
            UniformArg::Float(v) => v as f32,
            UniformArg::Int(v) => v as f32,
            UniformArg::Uint(v) => v as f32,
        }
    }

    fn as_i32(self) -> i32 {
        match self {
            UniformArg::Float(v) => v as i32,
            UniformArg::Int(v) => v,
            UniformArg::Uint(v) => v as i32,
        }
    }

    fn as_u32(self) -> u32 {
        match self {
            UniformArg::Float(v) => v as u32,
            UniformArg::Int(v) => v as u32,
            UniformArg::Uint(v) => v,
        }
    }
}

impl From<f32> for UniformArg {
    fn from(v: f32) -> Self {
        UniformArg::Float(v.into())
    }
}

impl From<f64> for UniformArg {
    fn from(v: f64) -> Self {
        UniformArg::Float(v)
    }
}

impl From<i32> for UniformArg {
    fn from(v: i32) -> Self {
        UniformArg::Int(v)
    }
}

impl From<u32> for UniformArg {
    fn from(v: u32) -> Self {
        UniformArg::Uint(v)
    }
}

/// Set a single scalar or vector uniform, counting the values for you.
///
/// ```no_run
/// # use glc::{GlDriver, UniformType};
/// # let driver = unsafe { GlDriver::current() };
/// # let program = 0;
/// glc::set_uniform!(&driver, program, "u_color", UniformType::Float; 1.0, 0.5, 0.25)?;
/// # Ok::<(), glc::GlcError>(())
/// ```
#[macro_export]
macro_rules! set_uniform {
    ($driver:expr, $program:expr, $name:expr, $ty:expr; $($value:expr),+ $(,)?) => {{
        let values = [$($crate::UniformArg::from($value)),+];
        $crate::set_uniform(
            $driver,
            $program,
            $name,
            $ty,
            values.len() as $crate::gl::types::GLint,
            &values,
        )
    }};
}

/// Set a scalar or vector uniform of `dimension` components (1-4).
///
/// The first `dimension` entries of `values` are converted to `ty` and
/// uploaded; extra entries are ignored. `program` is left current.
///
/// # Errors
/// [`GlcError::InvalidDimension`], [`GlcError::InvalidUniformName`],
/// [`GlcError::UnknownUniform`] or [`GlcError::MissingValues`]. None of them
/// touch the current program or upload anything.
pub fn set_uniform<D: Driver>(
    driver: &D,
    program: GLuint,
    name: &str,
    ty: UniformType,
    dimension: GLint,
    values: &[UniformArg],
) -> Result<()> {
    check_dimension(dimension, 1, 4)?;
    let location = resolve_location(driver, program, name)?;

    let components = dimension as usize;
    if values.len() < components {
        tracing::error!(
            "Not enough values for uniform {}. Need {}, got {}.",
            name,
            components,
            values.len()
        );
        return Err(GlcError::MissingValues {
            expected: components,
            got: values.len(),
        });
    }
    let values = &values[..components];

    driver.use_program(program);
    match ty {
        UniformType::Float => {
            let mut data = [0f32; 4];
            for (slot, value) in data.iter_mut().zip(values) {
                *slot = value.as_f32();
            }
            upload_f32(driver, location, dimension, 1, &data[..components]);
        }
        UniformType::Int => {
            let mut data = [0i32; 4];
            for (slot, value) in data.iter_mut().zip(values) {
                *slot = value.as_i32();
            }
            upload_i32(driver, location, dimension, 1, &data[..components]);
        }
        UniformType::UnsignedInt => {
            let mut data = [0u32; 4];
            for (slot, value) in data.iter_mut().zip(values) {
                *slot = value.as_u32();
            }
            upload_u32(driver, location, dimension, 1, &data[..components]);
        }
    }
    tracing::trace!(program, location, ?ty, dimension, "set uniform {}", name);
    Ok(())
}

/// Set `count` elements of a scalar or vector uniform array.
///
/// `buffer` is read as tightly packed elements of `ty`, whatever `T` is; it
/// must hold at least `count * dimension` of them.
///
/// # Errors
/// [`GlcError::InvalidDimension`], [`GlcError::InvalidCount`],
/// [`GlcError::InvalidUniformName`], [`GlcError::UnknownUniform`],
/// [`GlcError::BufferTooShort`] or [`GlcError::BufferLayout`].
pub fn set_uniform_array<D: Driver, T: Pod>(
    driver: &D,
    program: GLuint,
    name: &str,
    ty: UniformType,
    dimension: GLint,
    count: GLsizei,
    buffer: &[T],
) -> Result<()> {
    check_dimension(dimension, 1, 4)?;
    check_count(count, 1)?;
    let location = resolve_location(driver, program, name)?;

    let needed = (count as usize).saturating_mul(dimension as usize);
    let bytes: &[u8] = bytemuck::cast_slice(buffer);
    match ty {
        UniformType::Float => {
            let data = view_elements::<f32>(bytes, needed, ty.element_name())?;
            driver.use_program(program);
            upload_f32(driver, location, dimension, count, data);
        }
        UniformType::Int => {
            let data = view_elements::<i32>(bytes, needed, ty.element_name())?;
            driver.use_program(program);
            upload_i32(driver, location, dimension, count, data);
        }
        UniformType::UnsignedInt => {
            let data = view_elements::<u32>(bytes, needed, ty.element_name())?;
            driver.use_program(program);
            upload_u32(driver, location, dimension, count, data);
        }
    }
    tracing::trace!(
        program,
        location,
        ?ty,
        dimension,
        count,
        "set uniform array {}",
        name
    );
    Ok(())
}

/// Set `count` square float matrices of `dimension` (2-4) rows.
///
/// `transpose` is passed through: `true` when `buffer` is row-major, `false`
/// when it is already column-major. `buffer` must hold at least
/// `count * dimension * dimension` floats. A `count` of zero makes `program`
/// current and uploads nothing.
///
/// # Errors
/// [`GlcError::InvalidDimension`], [`GlcError::InvalidCount`] for a negative
/// `count`, [`GlcError::InvalidUniformName`], [`GlcError::UnknownUniform`],
/// [`GlcError::BufferTooShort`] or [`GlcError::BufferLayout`].
pub fn set_uniform_matrix_array<D: Driver, T: Pod>(
    driver: &D,
    program: GLuint,
    name: &str,
    dimension: GLint,
    count: GLsizei,
    transpose: bool,
    buffer: &[T],
) -> Result<()> {
    check_dimension(dimension, 2, 4)?;
    check_count(count, 0)?;
    let location = resolve_location(driver, program, name)?;

    let dimension_sq = (dimension * dimension) as usize;
    let needed = (count as usize).saturating_mul(dimension_sq);
    let data = view_elements::<f32>(bytemuck::cast_slice(buffer), needed, "f32")?;

    driver.use_program(program);
    if count == 0 {
        return Ok(());
    }
    match dimension {
        2 => driver.uniform_matrix_2_f32_slice(location, count, transpose, data),
        3 => driver.uniform_matrix_3_f32_slice(location, count, transpose, data),
        _ => driver.uniform_matrix_4_f32_slice(location, count, transpose, data),
    }
    tracing::trace!(
        program,
        location,
        dimension,
        count,
        transpose,
        "set uniform matrix array {}",
        name
    );
    Ok(())
}

/// Read back a float uniform.
///
/// `out` is filled with the uniform's leading components. A short `out` keeps
/// only as many as it can hold; the driver never writes past it.
pub fn get_uniform_f32<D: Driver>(
    driver: &D,
    program: GLuint,
    name: &str,
    out: &mut [f32],
) -> Result<()> {
    let location = resolve_location(driver, program, name)?;
    driver.get_uniform_f32(program, location, out);
    Ok(())
}

/// Read back a signed integer uniform.
pub fn get_uniform_i32<D: Driver>(
    driver: &D,
    program: GLuint,
    name: &str,
    out: &mut [i32],
) -> Result<()> {
    let location = resolve_location(driver, program, name)?;
    driver.get_uniform_i32(program, location, out);
    Ok(())
}

/// Read back an unsigned integer uniform.
pub fn get_uniform_u32<D: Driver>(
    driver: &D,
    program: GLuint,
    name: &str,
    out: &mut [u32],
) -> Result<()> {
    let location = resolve_location(driver, program, name)?;
    driver.get_uniform_u32(program, location, out);
    Ok(())
}

fn check_dimension(dimension: GLint, min: GLint, max: GLint) -> Result<()> {
    if dimension < min || dimension > max {
        tracing::error!("Dimension invalid. Must be {}-{}. Got {}.", min, max, dimension);
        return Err(GlcError::InvalidDimension { dimension, min, max });
    }
    Ok(())
}

fn check_count(count: GLsizei, min: GLsizei) -> Result<()> {
    if count < min {
        tracing::error!("Amount invalid. Must be at least {}. Got {}.", min, count);
        return Err(GlcError::InvalidCount { count, min });
    }
    Ok(())
}

fn resolve_location<D: Driver>(driver: &D, program: GLuint, name: &str) -> Result<GLint> {
    let c_name = CString::new(name).map_err(|_| {
        tracing::error!("Uniform name invalid: {:?}", name);
        GlcError::InvalidUniformName {
            name: name.to_owned(),
        }
    })?;
    driver.get_uniform_location(program, &c_name).ok_or_else(|| {
        tracing::error!("Uniform name invalid: {}", name);
        GlcError::UnknownUniform {
            name: name.to_owned(),
        }
    })
}

/// View the first `needed` elements of `bytes` as `E`.
fn view_elements<'a, E: Pod>(
    bytes: &'a [u8],
    needed: usize,
    element: &'static str,
) -> Result<&'a [E]> {
    let element_size = std::mem::size_of::<E>();
    let needed_bytes = needed.saturating_mul(element_size);
    if bytes.len() < needed_bytes {
        let got = bytes.len() / element_size;
        tracing::error!(
            "Uniform buffer too short. Need {} {} values, got {}.",
            needed,
            element,
            got
        );
        return Err(GlcError::BufferTooShort { needed, got });
    }
    bytemuck::try_cast_slice(&bytes[..needed_bytes]).map_err(|reason| {
        tracing::error!("Uniform buffer cannot be read as {}: {:?}", element, reason);
        GlcError::BufferLayout { element, reason }
    })
}

fn upload_f32<D: Driver>(
    driver: &D,
    location: GLint,
    dimension: GLint,
    count: GLsizei,
    data: &[f32],
) {
    match dimension {
        1 => driver.uniform_1_f32_slice(location, count, data),
        2 => driver.uniform_2_f32_slice(location, count, data),
        3 => driver.uniform_3_f32_slice(location, count, data),
        _ => driver.uniform_4_f32_slice(location, count, data),
    }
}

fn upload_i32<D: Driver>(
    driver: &D,
    location: GLint,
    dimension: GLint,
    count: GLsizei,
    data: &[i32],
) {
    match dimension {
        1 => driver.uniform_1_i32_slice(location, count, data),
        2 => driver.uniform_2_i32_slice(location, count, data),
        3 => driver.uniform_3_i32_slice(location, count, data),
        _ => driver.uniform_4_i32_slice(location, count, data),
    }
}

fn upload_u32<D: Driver>(
    driver: &D,
    location: GLint,
    dimension: GLint,
    count: GLsizei,
    data: &[u32],
) {
    match dimension {
        1 => driver.uniform_1_u32_slice(location, count, data),
        2 => driver.uniform_2_u32_slice(location, count, data),
        3 => driver.uniform_3_u32_slice(location, count, data),
        _ => driver.uniform_4_u32_slice(location, count, data),
    }
}
