use std::ffi::c_void;
use std::ptr;

use perfcomp::GpuFault;

use crate::renderer::gl;

/// A vertex buffer with a fixed size, allocated once and rewritten from the
/// start for every chunk that is streamed through it.
pub struct StreamBuffer {
    buffer: gl::types::GLuint,
    size: usize,
    /// Bytes written by the last upload.
    filled: usize,
}

impl StreamBuffer {
    pub fn new(size: usize) -> StreamBuffer {
        let mut buffer = 0;
        gl::call!(gl::GenBuffers(1, &mut buffer));
        gl::call!(gl::BindBuffer(gl::ARRAY_BUFFER, buffer));
        gl::call!(gl::BufferData(
            gl::ARRAY_BUFFER,
            size as isize,
            ptr::null(),
            gl::DYNAMIC_DRAW
        ));
        StreamBuffer {
            buffer,
            size,
            filled: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Replaces the buffer's contents, starting at offset 0, with `bytes`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), GpuFault> {
        if bytes.len() > self.size {
            return Err(GpuFault::new(
                "glBufferSubData",
                format!("{} bytes do not fit in {}", bytes.len(), self.size),
            ));
        }
        gl::clear_errors();
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, self.buffer);
            gl::BufferSubData(
                gl::ARRAY_BUFFER,
                0,
                bytes.len() as isize,
                bytes.as_ptr() as *const c_void,
            );
        }
        gl::check("glBufferSubData")?;
        self.filled = bytes.len();
        Ok(())
    }
}

impl Drop for StreamBuffer {
    fn drop(&mut self) {
        gl::call!(gl::DeleteBuffers(1, &self.buffer));
    }
}
