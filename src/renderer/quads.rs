use std::mem::{offset_of, size_of};

use perfcomp::entity::{QuadVertex, QUAD_BYTES, VERTICES_PER_QUAD};
use perfcomp::stream::{self, QuadTarget};
use perfcomp::GpuFault;

use crate::renderer::draw_calls::{DrawCall, Vertices};
use crate::renderer::gl;
use crate::renderer::stream_buffer::StreamBuffer;

/// The vertex attribute location of `pos`.
pub const ATTR_LOC_POS: gl::types::GLuint = 0;
/// The vertex attribute location of `rgb`.
pub const ATTR_LOC_RGB: gl::types::GLuint = 1;

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec2 pos;
layout(location = 1) in vec3 rgb;
out vec4 frag_color;
void main() {
    gl_Position = vec4(pos, 0.0, 1.0);
    frag_color = vec4(rgb, 1.0);
}
"#;
const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec4 frag_color;
out vec4 out_color;
void main() {
    out_color = frag_color;
}
"#;

/// Streams entity quads through one fixed-size vertex buffer. The quad list
/// is drawn as indexed triangles, using an index buffer sized for a full
/// chunk.
pub struct QuadRenderer {
    // Field order is drop order: the VAO goes before the buffers it refers to.
    vao: gl::VertexArray,
    vertices: StreamBuffer,
    _indices: gl::StaticBuffer,
    program: gl::Program,
    chunk_capacity: usize,
}

impl QuadRenderer {
    pub fn new(chunk_capacity: usize) -> Result<QuadRenderer, gl::SetupError> {
        let program = gl::Program::new(VERTEX_SHADER, FRAGMENT_SHADER)?;
        let vao = gl::VertexArray::new();
        vao.bind();
        let vertices = StreamBuffer::new(chunk_capacity * QUAD_BYTES);
        let stride = size_of::<QuadVertex>();
        gl::float_attribute(ATTR_LOC_POS, 2, stride, offset_of!(QuadVertex, position));
        gl::float_attribute(ATTR_LOC_RGB, 3, stride, offset_of!(QuadVertex, color));
        let index_data = stream::quad_indices(chunk_capacity);
        let indices = gl::StaticBuffer::new(
            gl::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&index_data),
        );
        gl::call!(gl::BindVertexArray(0));
        Ok(QuadRenderer {
            vao,
            vertices,
            _indices: indices,
            program,
            chunk_capacity,
        })
    }

    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    pub fn buffer_bytes(&self) -> usize {
        self.vertices.size()
    }

    /// Binds the program; call once per frame before streaming.
    pub fn begin(&self) {
        self.program.use_program();
    }
}

impl QuadTarget for QuadRenderer {
    fn upload(&mut self, vertices: &[QuadVertex]) -> Result<(), GpuFault> {
        self.vertices.write(bytemuck::cast_slice(vertices))
    }

    fn draw_quads(&mut self, vertex_count: usize) -> Result<(), GpuFault> {
        if vertex_count % VERTICES_PER_QUAD != 0
            || vertex_count * size_of::<QuadVertex>() > self.vertices.filled()
        {
            return Err(GpuFault::new(
                "glDrawElements",
                format!(
                    "{vertex_count} vertices requested, {} bytes uploaded",
                    self.vertices.filled()
                ),
            ));
        }
        DrawCall {
            mode: gl::TRIANGLES,
            vao: self.vao.id(),
            vertices: Vertices::Elements {
                index_type: gl::UNSIGNED_INT,
                index_byte_offset: 0,
            },
            count: stream::index_count(vertex_count) as gl::types::GLsizei,
        }
        .issue()
    }
}
