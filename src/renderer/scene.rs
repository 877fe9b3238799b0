use std::ffi::c_void;
use std::mem::{offset_of, size_of};
use std::path::Path;

use anyhow::Context;
use perfcomp::scene::{Primitive, Scene, SceneVertex};
use perfcomp::stream;
use perfcomp::GpuFault;

use crate::renderer::draw_calls::{DrawCall, Vertices};
use crate::renderer::gl;
use crate::renderer::stream_buffer::StreamBuffer;

pub const ATTR_LOC_POS: gl::types::GLuint = 0;
pub const ATTR_LOC_RGB: gl::types::GLuint = 1;
pub const ATTR_LOC_UV: gl::types::GLuint = 2;

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 pos;
layout(location = 1) in vec3 rgb;
layout(location = 2) in vec2 uv;
out vec4 frag_color;
out vec2 frag_uv;
void main() {
    gl_Position = vec4(pos, 1.0);
    frag_color = vec4(rgb, 1.0);
    frag_uv = uv;
}
"#;
const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec4 frag_color;
in vec2 frag_uv;
out vec4 out_color;
uniform sampler2D texture_data;
void main() {
    out_color = frag_color * texture(texture_data, frag_uv);
}
"#;

/// A 2D texture, deleted on drop.
struct Texture(gl::types::GLuint);

impl Texture {
    fn from_rgba(width: u32, height: u32, pixels: &[u8]) -> Texture {
        let mut texture = 0;
        gl::call!(gl::GenTextures(1, &mut texture));
        gl::call!(gl::ActiveTexture(gl::TEXTURE0));
        gl::call!(gl::BindTexture(gl::TEXTURE_2D, texture));
        for (parameter, value) in [
            (gl::TEXTURE_WRAP_S, gl::REPEAT),
            (gl::TEXTURE_WRAP_T, gl::REPEAT),
            (gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR),
            (gl::TEXTURE_MAG_FILTER, gl::LINEAR),
        ] {
            gl::call!(gl::TexParameteri(
                gl::TEXTURE_2D,
                parameter,
                value as gl::types::GLint
            ));
        }
        gl::call!(gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            gl::RGBA as gl::types::GLint,
            width as gl::types::GLsizei,
            height as gl::types::GLsizei,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            pixels.as_ptr() as *const c_void,
        ));
        gl::call!(gl::GenerateMipmap(gl::TEXTURE_2D));
        Texture(texture)
    }

    /// Decodes an image file, flipped so that uv (0, 0) is its bottom left.
    fn load(path: &Path) -> anyhow::Result<Texture> {
        let image = image::open(path)
            .with_context(|| format!("loading texture {}", path.display()))?
            .flipv()
            .into_rgba8();
        log::info!(
            "loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Texture::from_rgba(image.width(), image.height(), &image))
    }

    /// Multiplying by this leaves vertex colors as they are.
    fn white() -> Texture {
        Texture::from_rgba(1, 1, &[0xFF; 4])
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        gl::call!(gl::DeleteTextures(1, &self.0));
    }
}

/// Draws any [`Scene`]: uploads its vertices whenever they move and issues
/// the draw its primitive calls for.
pub struct SceneRenderer {
    vao: gl::VertexArray,
    vertices: StreamBuffer,
    _indices: Option<gl::StaticBuffer>,
    texture: Texture,
    program: gl::Program,
    draw_call: DrawCall,
    depth_test: bool,
}

impl SceneRenderer {
    pub fn new(scene: &Scene) -> anyhow::Result<SceneRenderer> {
        let program = gl::Program::new(VERTEX_SHADER, FRAGMENT_SHADER)?;
        let texture = match &scene.texture {
            Some(path) => Texture::load(path)?,
            None => Texture::white(),
        };
        program.use_program();
        if let Some(location) = program.uniform_location("texture_data") {
            gl::call!(gl::Uniform1i(location, 0));
        }

        let vao = gl::VertexArray::new();
        vao.bind();
        let bytes: &[u8] = bytemuck::cast_slice(&scene.vertices);
        let mut vertices = StreamBuffer::new(bytes.len());
        vertices.write(bytes)?;
        let stride = size_of::<SceneVertex>();
        gl::float_attribute(ATTR_LOC_POS, 3, stride, offset_of!(SceneVertex, position));
        gl::float_attribute(ATTR_LOC_RGB, 3, stride, offset_of!(SceneVertex, color));
        gl::float_attribute(ATTR_LOC_UV, 2, stride, offset_of!(SceneVertex, uv));

        let vertex_count = scene.vertices.len();
        let (indices, draw_call) = match scene.primitive {
            Primitive::Triangles | Primitive::TriangleStrip => {
                let mode = if scene.primitive == Primitive::Triangles {
                    gl::TRIANGLES
                } else {
                    gl::TRIANGLE_STRIP
                };
                let draw_call = DrawCall {
                    mode,
                    vao: vao.id(),
                    vertices: Vertices::Arrays { first: 0 },
                    count: vertex_count as gl::types::GLsizei,
                };
                (None, draw_call)
            }
            Primitive::Quads => {
                let index_data = stream::quad_indices(vertex_count / 4);
                let indices = gl::StaticBuffer::new(
                    gl::ELEMENT_ARRAY_BUFFER,
                    bytemuck::cast_slice(&index_data),
                );
                let draw_call = DrawCall {
                    mode: gl::TRIANGLES,
                    vao: vao.id(),
                    vertices: Vertices::Elements {
                        index_type: gl::UNSIGNED_INT,
                        index_byte_offset: 0,
                    },
                    count: index_data.len() as gl::types::GLsizei,
                };
                (Some(indices), draw_call)
            }
        };
        gl::call!(gl::BindVertexArray(0));

        let renderer = SceneRenderer {
            vao,
            vertices,
            _indices: indices,
            texture,
            program,
            draw_call,
            depth_test: scene.depth_test,
        };
        renderer.apply_depth_test();
        Ok(renderer)
    }

    pub fn toggle_depth_test(&mut self) -> bool {
        self.depth_test = !self.depth_test;
        self.apply_depth_test();
        self.depth_test
    }

    fn apply_depth_test(&self) {
        if self.depth_test {
            gl::call!(gl::Enable(gl::DEPTH_TEST));
        } else {
            gl::call!(gl::Disable(gl::DEPTH_TEST));
        }
    }

    pub fn render(&mut self, scene: &Scene) -> Result<(), GpuFault> {
        if scene.is_animated() {
            self.vertices.write(bytemuck::cast_slice(&scene.vertices))?;
        }
        gl::call!(gl::ClearColor(0.0, 0.0, 0.0, 1.0));
        gl::call!(gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT));
        self.program.use_program();
        gl::call!(gl::ActiveTexture(gl::TEXTURE0));
        gl::call!(gl::BindTexture(gl::TEXTURE_2D, self.texture.0));
        debug_assert_eq!(self.draw_call.vao, self.vao.id());
        self.draw_call.issue()
    }
}
