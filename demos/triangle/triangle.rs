// Draws a tinted, spinning triangle whose program and uniforms go through glc.
// based on the example from:
// https://github.com/brendanzab/gl-rs/blob/master/gl/examples/triangle.rs

use glc::gl;
use glc::gl::types::*;
use glc::{Driver, UniformType};
use std::ffi::CString;
use std::mem;
use std::path::Path;
use std::ptr;

static VERTEX_DATA: [GLfloat; 6] = [0.0, 0.5, 0.5, -0.5, -0.5, -0.5];

pub struct Triangle {
    pub program: GLuint,
    pub vao: GLuint,
    pub vbo: GLuint,
}

impl Triangle {
    pub fn new<D: Driver>(driver: &D) -> glc::Result<Self> {
        let shaders = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/triangle/shaders");
        let program = glc::build_program(
            driver,
            shaders.join("triangle.vert"),
            shaders.join("triangle.frag"),
        )?;

        let mut vao = 0;
        let mut vbo = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (VERTEX_DATA.len() * mem::size_of::<GLfloat>()) as GLsizeiptr,
                VERTEX_DATA.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            let c_out_color = CString::new("out_color").unwrap();
            gl::BindFragDataLocation(program, 0, c_out_color.as_ptr());

            // Specify the layout of the vertex data
            let c_position = CString::new("position").unwrap();
            let pos_attr = gl::GetAttribLocation(program, c_position.as_ptr());
            gl::EnableVertexAttribArray(pos_attr as GLuint);
            gl::VertexAttribPointer(
                pos_attr as GLuint,
                2,
                gl::FLOAT,
                gl::FALSE as GLboolean,
                0,
                ptr::null(),
            );
            gl::BindVertexArray(0);
        }

        Ok(Triangle { program, vao, vbo })
    }

    pub fn draw<D: Driver>(&self, driver: &D, time: f32) -> glc::Result<()> {
        let (sin, cos) = time.sin_cos();
        // Row-major, so the driver is asked to transpose.
        let rotation: [[f32; 4]; 4] = [
            [cos, -sin, 0.0, 0.0],
            [sin, cos, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let weights = [0.25f32, 0.5, 0.75, 1.0];
        let band = (time as i32).rem_euclid(4);

        let program = self.program;
        glc::set_uniform!(driver, program, "u_offset", UniformType::Float; 0.1 * cos, 0.1 * sin)?;
        glc::set_uniform!(driver, program, "u_tint", UniformType::Float; 1.0, 0.8, 0.2)?;
        glc::set_uniform!(driver, program, "u_band", UniformType::Int; band)?;
        glc::set_uniform_array(driver, program, "u_weights", UniformType::Float, 1, 4, &weights)?;
        glc::set_uniform_matrix_array(driver, program, "u_transform", 4, 1, true, &rotation)?;

        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawArrays(gl::TRIANGLES, 0, 3);
            gl::BindVertexArray(0);
        }
        Ok(())
    }
}

impl Drop for Triangle {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.program);
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}
