use std::ffi::c_void;
use std::ptr;

use perfcomp::GpuFault;

use crate::renderer::gl;

#[derive(Clone, Copy, Debug)]
pub enum Vertices {
    /// Consecutive vertices of the bound array buffer.
    Arrays { first: gl::types::GLint },
    /// Vertices picked by the element buffer recorded in the VAO.
    Elements {
        index_type: gl::types::GLenum,
        index_byte_offset: usize,
    },
}

/// One draw command: everything needed besides the shader program.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall {
    pub mode: gl::types::GLenum,
    pub vao: gl::types::GLuint,
    pub vertices: Vertices,
    /// Vertices for `Arrays`, indices for `Elements`.
    pub count: gl::types::GLsizei,
}

impl DrawCall {
    pub fn issue(&self) -> Result<(), GpuFault> {
        if self.count == 0 {
            return Ok(());
        }
        gl::clear_errors();
        unsafe {
            gl::BindVertexArray(self.vao);
            match self.vertices {
                Vertices::Arrays { first } => gl::DrawArrays(self.mode, first, self.count),
                Vertices::Elements {
                    index_type,
                    index_byte_offset,
                } => gl::DrawElements(
                    self.mode,
                    self.count,
                    index_type,
                    ptr::null::<c_void>().wrapping_add(index_byte_offset),
                ),
            }
        }
        gl::check(match self.vertices {
            Vertices::Arrays { .. } => "glDrawArrays",
            Vertices::Elements { .. } => "glDrawElements",
        })
    }
}
