//! Compile a vertex/fragment pair and link it into a program object.

use std::{
    convert::TryFrom,
    ffi::{CStr, CString},
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use gl::types::GLuint;

use crate::{
    driver::{Driver, ShaderStage, INFO_LOG_CAPACITY},
    error::{GlcError, Result},
};

/// A compiled shader object, deleted when dropped.
///
/// Never leaves this module: units live for one build call only.
struct ShaderUnit<'d, D: Driver> {
    driver: &'d D,
    id: GLuint,
}

impl<D: Driver> Drop for ShaderUnit<'_, D> {
    fn drop(&mut self) {
        self.driver.delete_shader(self.id);
    }
}

/// Read two GLSL files, compile them and link them into a program.
///
/// Both files are opened before anything is compiled. The vertex stage is
/// read and compiled before the fragment file is read. Every intermediate
/// shader object is deleted before returning, whether the build succeeded or
/// not; on success the caller owns the returned program.
///
/// # Errors
/// The first failing step is returned, see [`GlcError`].
pub fn build_program<D: Driver>(
    driver: &D,
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
) -> Result<GLuint> {
    let vertex_path = vertex_path.as_ref();
    let fragment_path = fragment_path.as_ref();

    let mut vertex_file = open_source(ShaderStage::Vertex, vertex_path)?;
    let mut fragment_file = open_source(ShaderStage::Fragment, fragment_path)?;

    let vertex = {
        let source = read_source(ShaderStage::Vertex, vertex_path, &mut vertex_file)?;
        compile_shader(driver, ShaderStage::Vertex, &source)?
    };
    let fragment = {
        let source = read_source(ShaderStage::Fragment, fragment_path, &mut fragment_file)?;
        compile_shader(driver, ShaderStage::Fragment, &source)?
    };
    drop(vertex_file);
    drop(fragment_file);

    let program = link_program(driver, &[&vertex, &fragment])?;
    tracing::debug!(
        program,
        vertex = %vertex_path.display(),
        fragment = %fragment_path.display(),
        "linked shader program"
    );
    Ok(program)
}

/// Same as [`build_program`] for sources that are already in memory.
///
/// Sources are cut at the first nul byte, as the driver reads C strings.
pub fn build_program_from_source<D: Driver>(
    driver: &D,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<GLuint> {
    let vertex_source = source_to_cstring(vertex_source.as_bytes().to_vec());
    let fragment_source = source_to_cstring(fragment_source.as_bytes().to_vec());

    let vertex = compile_shader(driver, ShaderStage::Vertex, &vertex_source)?;
    let fragment = compile_shader(driver, ShaderStage::Fragment, &fragment_source)?;
    let program = link_program(driver, &[&vertex, &fragment])?;
    tracing::debug!(program, "linked shader program from memory");
    Ok(program)
}

fn open_source(stage: ShaderStage, path: &Path) -> Result<File> {
    File::open(path).map_err(|source| {
        tracing::error!("Error opening {} shader: {}", stage, path.display());
        GlcError::FileOpen {
            stage,
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Read a whole shader file into a nul-terminated buffer.
///
/// The length comes from seeking to the end and rewinding, not from file
/// metadata.
fn read_source(stage: ShaderStage, path: &Path, file: &mut File) -> Result<CString> {
    let read_error = |source: io::Error| {
        tracing::error!("Error reading {} shader: {}: {}", stage, path.display(), source);
        GlcError::FileRead {
            stage,
            path: path.to_path_buf(),
            source,
        }
    };

    let length = file.seek(SeekFrom::End(0)).map_err(read_error)?;
    file.seek(SeekFrom::Start(0)).map_err(read_error)?;

    let bytes = source_capacity(length).map_err(read_error)?;
    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(bytes).map_err(|source| {
        tracing::error!("Error allocating memory for {} shader source.", stage);
        GlcError::Allocation {
            bytes: bytes as u64,
            source,
        }
    })?;
    file.read_to_end(&mut buffer).map_err(read_error)?;

    Ok(source_to_cstring(buffer))
}

/// Bytes needed for a source of `length` bytes plus its nul terminator.
fn source_capacity(length: u64) -> io::Result<usize> {
    usize::try_from(length)
        .ok()
        .and_then(|length| length.checked_add(1))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} bytes do not fit in memory", length),
            )
        })
}

fn source_to_cstring(mut bytes: Vec<u8>) -> CString {
    if let Some(nul) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(nul);
    }
    // Cannot fail: the buffer was cut at its first nul.
    CString::new(bytes).unwrap_or_default()
}

fn compile_shader<'d, D: Driver>(
    driver: &'d D,
    stage: ShaderStage,
    source: &CStr,
) -> Result<ShaderUnit<'d, D>> {
    let id = driver.create_shader(stage);
    if id == 0 {
        tracing::error!("Error creating {} shader object.", stage);
        return Err(GlcError::ShaderCreate { stage });
    }
    let shader = ShaderUnit { driver, id };

    driver.shader_source(id, source);
    driver.compile_shader(id);

    if driver.get_shader_compile_status(id) {
        Ok(shader)
    } else {
        let log = cap_info_log(driver.get_shader_info_log(id));
        tracing::error!("{} shader compilation error!\n{}", stage, log);
        Err(GlcError::Compile { stage, log })
    }
}

fn link_program<D: Driver>(driver: &D, shaders: &[&ShaderUnit<'_, D>]) -> Result<GLuint> {
    let program = driver.create_program();
    if program == 0 {
        tracing::error!("Error creating shader program object.");
        return Err(GlcError::ProgramCreate);
    }

    for shader in shaders {
        driver.attach_shader(program, shader.id);
    }
    driver.link_program(program);

    if !driver.get_program_link_status(program) {
        let log = cap_info_log(driver.get_program_info_log(program));
        driver.delete_program(program);
        tracing::error!("Shader program linking error!\n{}", log);
        return Err(GlcError::Link { log });
    }

    // Detached units are freed as soon as their guards drop.
    for shader in shaders {
        driver.detach_shader(program, shader.id);
    }
    Ok(program)
}

/// Keep at most `INFO_LOG_CAPACITY - 1` characters of a driver log.
fn cap_info_log(mut log: String) -> String {
    let max = INFO_LOG_CAPACITY - 1;
    if let Some((cut, _)) = log.char_indices().nth(max) {
        log.truncate(cut);
    }
    log
}
