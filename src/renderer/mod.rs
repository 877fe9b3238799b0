use std::ffi::CStr;

use log::{info, warn};
use sdl2::video::{SwapInterval, Window};
use sdl2::VideoSubsystem;

mod draw_calls;
pub mod gl;
mod quads;
mod scene;
mod stream_buffer;

pub use quads::QuadRenderer;
pub use scene::SceneRenderer;

use crate::SdlErr;

/// Loads the GL entry points for the current context and sets up the
/// viewport. Must be called once, after the context has been created.
pub fn init(video: &VideoSubsystem, window: &Window, vsync: bool) -> Result<(), SdlErr> {
    gl::load_with(|s| video.gl_get_proc_address(s) as *const core::ffi::c_void);
    let interval = if vsync {
        SwapInterval::VSync
    } else {
        SwapInterval::Immediate
    };
    if let Err(err) = video.gl_set_swap_interval(interval) {
        warn!("could not set swap interval (vsync: {vsync}): {err}");
    }
    if !gl::Viewport::is_loaded() || !gl::BufferSubData::is_loaded() {
        return Err(SdlErr("GL entry points could not be loaded".to_string()));
    }
    let (w, h) = window.drawable_size();
    resize(w as i32, h as i32);
    info!("OpenGL {} on {}", gl_string(gl::VERSION), gl_string(gl::RENDERER));
    Ok(())
}

pub fn resize(width: i32, height: i32) {
    gl::call!(gl::Viewport(0, 0, width, height));
}

pub fn clear() {
    gl::call!(gl::ClearColor(0.0, 0.0, 0.0, 1.0));
    gl::call!(gl::Clear(gl::COLOR_BUFFER_BIT));
}

fn gl_string(name: gl::types::GLenum) -> String {
    let string = gl::call!(gl::GetString(name));
    if string.is_null() {
        return String::from("(unknown)");
    }
    unsafe { CStr::from_ptr(string as *const _) }
        .to_string_lossy()
        .into_owned()
}
