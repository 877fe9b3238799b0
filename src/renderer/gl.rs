#![allow(clippy::all, unused)]

use std::ffi::CString;

use perfcomp::GpuFault;

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

/// Runs a GL call, and in debug builds panics with the call site if it
/// raised an error.
macro_rules! call {
    ($expr:expr) => {{
        let result = unsafe { $expr };
        if cfg!(debug_assertions) {
            if let Err(error) = $crate::renderer::gl::check(stringify!($expr)) {
                panic!("{error} at {}:{}:{}", file!(), line!(), column!());
            }
        }
        result
    }};
}
pub(crate) use call;

pub fn error_name(error: types::GLenum) -> String {
    match error {
        INVALID_ENUM => "INVALID_ENUM".to_string(),
        INVALID_VALUE => "INVALID_VALUE".to_string(),
        INVALID_OPERATION => "INVALID_OPERATION".to_string(),
        OUT_OF_MEMORY => "OUT_OF_MEMORY".to_string(),
        INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION".to_string(),
        _ => format!("{error:#x}"),
    }
}

/// Returns the pending GL error, if any, attributed to `call`.
pub fn check(call: &'static str) -> Result<(), GpuFault> {
    let error = unsafe { GetError() };
    if error == NO_ERROR {
        Ok(())
    } else {
        Err(GpuFault::new(call, error_name(error)))
    }
}

/// More queued errors than this means GL keeps raising them, as it does
/// once the context is lost.
const MAX_QUEUED_ERRORS: usize = 16;

/// Takes the errors GL has queued so far, oldest first.
fn drain_errors(mut next_error: impl FnMut() -> types::GLenum) -> Vec<types::GLenum> {
    let mut errors = Vec::new();
    while errors.len() < MAX_QUEUED_ERRORS {
        match next_error() {
            NO_ERROR => break,
            error => errors.push(error),
        }
    }
    errors
}

/// Discards errors left behind by earlier unchecked calls, so that the next
/// [`check`] only reports the call it follows.
pub fn clear_errors() {
    for error in drain_errors(|| unsafe { GetError() }) {
        log::warn!("discarding earlier GL error {}", error_name(error));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("compiling {stage} shader failed: {log}")]
    Compile { stage: &'static str, log: String },
    #[error("linking shader program failed: {0}")]
    Link(String),
    #[error("creating {0} failed")]
    Create(&'static str),
}

/// A compiled shader object, deleted on drop.
pub struct Shader(types::GLuint);

impl Shader {
    pub fn new(type_: types::GLenum, source: &str) -> Result<Shader, SetupError> {
        let stage = if type_ == VERTEX_SHADER {
            "vertex"
        } else {
            "fragment"
        };
        let shader = call!(CreateShader(type_));
        if shader == 0 {
            return Err(SetupError::Create("shader"));
        }
        let shader = Shader(shader);
        let sources = [source.as_ptr() as *const types::GLchar];
        let source_lens = [source.len() as types::GLint];
        call!(ShaderSource(
            shader.0,
            1,
            sources.as_ptr(),
            source_lens.as_ptr()
        ));
        call!(CompileShader(shader.0));
        let mut compile_status = 0;
        call!(GetShaderiv(shader.0, COMPILE_STATUS, &mut compile_status));
        if compile_status == FALSE as types::GLint {
            let mut info_log = [0u8; 4096];
            let mut length = 0;
            call!(GetShaderInfoLog(
                shader.0,
                info_log.len() as types::GLsizei,
                &mut length,
                info_log.as_mut_ptr() as *mut types::GLchar,
            ));
            let log = String::from_utf8_lossy(&info_log[..length as usize]).into_owned();
            return Err(SetupError::Compile { stage, log });
        }
        Ok(shader)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        call!(DeleteShader(self.0));
    }
}

/// A linked shader program, deleted on drop.
pub struct Program(types::GLuint);

impl Program {
    pub fn new(vertex_source: &str, fragment_source: &str) -> Result<Program, SetupError> {
        let vertex_shader = Shader::new(VERTEX_SHADER, vertex_source)?;
        let fragment_shader = Shader::new(FRAGMENT_SHADER, fragment_source)?;
        let program = call!(CreateProgram());
        if program == 0 {
            return Err(SetupError::Create("program"));
        }
        let program = Program(program);
        call!(AttachShader(program.0, vertex_shader.0));
        call!(AttachShader(program.0, fragment_shader.0));
        call!(LinkProgram(program.0));
        let mut link_status = 0;
        call!(GetProgramiv(program.0, LINK_STATUS, &mut link_status));
        if link_status == FALSE as types::GLint {
            let mut info_log = [0u8; 4096];
            let mut length = 0;
            call!(GetProgramInfoLog(
                program.0,
                info_log.len() as types::GLsizei,
                &mut length,
                info_log.as_mut_ptr() as *mut types::GLchar,
            ));
            let log = String::from_utf8_lossy(&info_log[..length as usize]).into_owned();
            return Err(SetupError::Link(log));
        }
        call!(DetachShader(program.0, vertex_shader.0));
        call!(DetachShader(program.0, fragment_shader.0));
        Ok(program)
    }

    pub fn use_program(&self) {
        call!(UseProgram(self.0));
    }

    pub fn uniform_location(&self, name: &str) -> Option<types::GLint> {
        let name = CString::new(name).ok()?;
        let location = call!(GetUniformLocation(self.0, name.as_ptr()));
        (location != -1).then_some(location)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        call!(DeleteProgram(self.0));
    }
}

/// A vertex array object, deleted on drop.
pub struct VertexArray(types::GLuint);

impl VertexArray {
    pub fn new() -> VertexArray {
        let mut vao = 0;
        call!(GenVertexArrays(1, &mut vao));
        VertexArray(vao)
    }

    pub fn id(&self) -> types::GLuint {
        self.0
    }

    pub fn bind(&self) {
        call!(BindVertexArray(self.0));
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        call!(DeleteVertexArrays(1, &self.0));
    }
}

/// A buffer object with immutable contents, deleted on drop.
pub struct StaticBuffer(types::GLuint);

impl StaticBuffer {
    pub fn new(target: types::GLenum, bytes: &[u8]) -> StaticBuffer {
        let mut buffer = 0;
        call!(GenBuffers(1, &mut buffer));
        call!(BindBuffer(target, buffer));
        call!(BufferData(
            target,
            bytes.len() as types::GLsizeiptr,
            bytes.as_ptr() as *const std::ffi::c_void,
            STATIC_DRAW,
        ));
        StaticBuffer(buffer)
    }
}

impl Drop for StaticBuffer {
    fn drop(&mut self) {
        call!(DeleteBuffers(1, &self.0));
    }
}

/// Enables `location` and points it at `size` floats, `offset` bytes into
/// each `stride`-byte vertex of the bound array buffer.
pub fn float_attribute(
    location: types::GLuint,
    size: types::GLint,
    stride: usize,
    offset: usize,
) {
    call!(EnableVertexAttribArray(location));
    call!(VertexAttribPointer(
        location,
        size,
        FLOAT,
        FALSE,
        stride as types::GLsizei,
        std::ptr::null::<std::ffi::c_void>().wrapping_add(offset),
    ));
}
