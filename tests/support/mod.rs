//! A `Driver` that records every call instead of talking to a GPU.
#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    ffi::CStr,
    path::PathBuf,
};

use glc::{
    gl::types::{GLint, GLsizei, GLuint},
    Driver, ShaderStage,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    F32(Vec<f32>),
    I32(Vec<i32>),
    U32(Vec<u32>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::F32(v) => v.len(),
            Values::I32(v) => v.len(),
            Values::U32(v) => v.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    ShaderSource(GLuint, String),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram,
    AttachShader(GLuint, GLuint),
    DetachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    DeleteProgram(GLuint),
    UseProgram(GLuint),
    Upload {
        entry: &'static str,
        location: GLint,
        count: GLsizei,
        values: Values,
    },
    UploadMatrix {
        entry: &'static str,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: Vec<f32>,
    },
}

/// Shaders whose source contains `#error` fail to compile, as they would on
/// a real driver.
#[derive(Default)]
pub struct RecordingDriver {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<GLuint>,
    live_shaders: RefCell<HashSet<GLuint>>,
    failed_sources: RefCell<HashMap<GLuint, String>>,
    stored: RefCell<HashMap<GLint, Values>>,
    uniforms: HashMap<String, GLint>,
    fail_create_shader: bool,
    fail_create_program: bool,
    fail_link: bool,
    info_log: Option<String>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose programs all expose `names`, at locations 0, 1, ...
    pub fn with_uniforms(names: &[&str]) -> Self {
        RecordingDriver {
            uniforms: names
                .iter()
                .enumerate()
                .map(|(location, name)| (name.to_string(), location as GLint))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_shader_create(mut self) -> Self {
        self.fail_create_shader = true;
        self
    }

    pub fn failing_program_create(mut self) -> Self {
        self.fail_create_program = true;
        self
    }

    pub fn failing_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    /// Every info log query returns `log`.
    pub fn with_info_log(mut self, log: String) -> Self {
        self.info_log = Some(log);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn live_shaders(&self) -> usize {
        self.live_shaders.borrow().len()
    }

    pub fn uploads(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Upload { .. } | Call::UploadMatrix { .. }))
            .collect()
    }

    pub fn used_program(&self) -> bool {
        self.calls().iter().any(|call| matches!(call, Call::UseProgram(_)))
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn mint(&self) -> GLuint {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn upload(
        &self,
        entry: &'static str,
        components: usize,
        location: GLint,
        count: GLsizei,
        values: Values,
    ) {
        assert_covers(entry, values.len(), count, components);
        self.stored.borrow_mut().insert(location, values.clone());
        self.record(Call::Upload {
            entry,
            location,
            count,
            values,
        });
    }

    fn upload_matrix(
        &self,
        entry: &'static str,
        components: usize,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    ) {
        assert_covers(entry, values.len(), count, components);
        self.stored
            .borrow_mut()
            .insert(location, Values::F32(values.to_vec()));
        self.record(Call::UploadMatrix {
            entry,
            location,
            count,
            transpose,
            values: values.to_vec(),
        });
    }
}

/// A real driver would read `count * components` values from the slice.
fn assert_covers(entry: &str, len: usize, count: GLsizei, components: usize) {
    assert!(count >= 0, "{} called with negative count {}", entry, count);
    assert!(
        len >= count as usize * components,
        "{} would read {} values from a slice of {}",
        entry,
        count as usize * components,
        len
    );
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("shaders")
        .join(name)
}

impl Driver for RecordingDriver {
    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        self.record(Call::CreateShader(stage));
        if self.fail_create_shader {
            return 0;
        }
        let id = self.mint();
        self.live_shaders.borrow_mut().insert(id);
        id
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        let source = source.to_string_lossy().into_owned();
        if source.contains("#error") {
            self.failed_sources.borrow_mut().insert(shader, source.clone());
        }
        self.record(Call::ShaderSource(shader, source));
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record(Call::CompileShader(shader));
    }

    fn get_shader_compile_status(&self, shader: GLuint) -> bool {
        !self.failed_sources.borrow().contains_key(&shader)
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        if let Some(log) = &self.info_log {
            return log.clone();
        }
        match self.failed_sources.borrow().get(&shader) {
            Some(source) => {
                let line = source.lines().find(|line| line.contains("#error")).unwrap_or("");
                format!("0:1(1): error: {}", line.trim())
            }
            None => String::new(),
        }
    }

    fn delete_shader(&self, shader: GLuint) {
        self.live_shaders.borrow_mut().remove(&shader);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> GLuint {
        self.record(Call::CreateProgram);
        if self.fail_create_program {
            0
        } else {
            self.mint()
        }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: GLuint) {
        self.record(Call::LinkProgram(program));
    }

    fn get_program_link_status(&self, _program: GLuint) -> bool {
        !self.fail_link
    }

    fn get_program_info_log(&self, _program: GLuint) -> String {
        self.info_log.clone().unwrap_or_else(|| {
            "error: vertex shader output `v_color' not read by fragment shader".to_owned()
        })
    }

    fn delete_program(&self, program: GLuint) {
        self.record(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: GLuint) {
        self.record(Call::UseProgram(program));
    }

    fn get_uniform_location(&self, _program: GLuint, name: &CStr) -> Option<GLint> {
        self.uniforms.get(name.to_str().ok()?).copied()
    }

    fn uniform_1_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        self.upload("uniform_1_f32_slice", 1, location, count, Values::F32(values.to_vec()))
    }
    fn uniform_2_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        self.upload("uniform_2_f32_slice", 2, location, count, Values::F32(values.to_vec()))
    }
    fn uniform_3_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        self.upload("uniform_3_f32_slice", 3, location, count, Values::F32(values.to_vec()))
    }
    fn uniform_4_f32_slice(&self, location: GLint, count: GLsizei, values: &[f32]) {
        self.upload("uniform_4_f32_slice", 4, location, count, Values::F32(values.to_vec()))
    }
    fn uniform_1_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        self.upload("uniform_1_i32_slice", 1, location, count, Values::I32(values.to_vec()))
    }
    fn uniform_2_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        self.upload("uniform_2_i32_slice", 2, location, count, Values::I32(values.to_vec()))
    }
    fn uniform_3_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        self.upload("uniform_3_i32_slice", 3, location, count, Values::I32(values.to_vec()))
    }
    fn uniform_4_i32_slice(&self, location: GLint, count: GLsizei, values: &[i32]) {
        self.upload("uniform_4_i32_slice", 4, location, count, Values::I32(values.to_vec()))
    }
    fn uniform_1_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        self.upload("uniform_1_u32_slice", 1, location, count, Values::U32(values.to_vec()))
    }
    fn uniform_2_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        self.upload("uniform_2_u32_slice", 2, location, count, Values::U32(values.to_vec()))
    }
    fn uniform_3_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        self.upload("uniform_3_u32_slice", 3, location, count, Values::U32(values.to_vec()))
    }
    fn uniform_4_u32_slice(&self, location: GLint, count: GLsizei, values: &[u32]) {
        self.upload("uniform_4_u32_slice", 4, location, count, Values::U32(values.to_vec()))
    }

    fn uniform_matrix_2_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    ) {
        self.upload_matrix("uniform_matrix_2_f32_slice", 4, location, count, transpose, values)
    }
    fn uniform_matrix_3_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    ) {
        self.upload_matrix("uniform_matrix_3_f32_slice", 9, location, count, transpose, values)
    }
    fn uniform_matrix_4_f32_slice(
        &self,
        location: GLint,
        count: GLsizei,
        transpose: bool,
        values: &[f32],
    ) {
        self.upload_matrix("uniform_matrix_4_f32_slice", 16, location, count, transpose, values)
    }

    fn get_uniform_f32(&self, _program: GLuint, location: GLint, out: &mut [f32]) {
        if let Some(Values::F32(stored)) = self.stored.borrow().get(&location) {
            for (slot, value) in out.iter_mut().zip(stored) {
                *slot = *value;
            }
        }
    }

    fn get_uniform_i32(&self, _program: GLuint, location: GLint, out: &mut [i32]) {
        if let Some(Values::I32(stored)) = self.stored.borrow().get(&location) {
            for (slot, value) in out.iter_mut().zip(stored) {
                *slot = *value;
            }
        }
    }

    fn get_uniform_u32(&self, _program: GLuint, location: GLint, out: &mut [u32]) {
        if let Some(Values::U32(stored)) = self.stored.borrow().get(&location) {
            for (slot, value) in out.iter_mut().zip(stored) {
                *slot = *value;
            }
        }
    }
}
