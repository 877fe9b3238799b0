use std::path::Path;
use std::thread;

use anyhow::{anyhow, Context};
use log::{debug, info, warn};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::video::{GLProfile, Window};
use sdl2::EventPump;
use thiserror::Error;

use perfcomp::scene::{Scene, SCENE_NAMES};
use perfcomp::timing::FrameClock;
use perfcomp::{simulation, stream, Config, EntityStore, Spawner};

mod renderer;

use renderer::{QuadRenderer, SceneRenderer};

const USAGE: &str = "usage: gl-perfcomp [quads|triangle|rotate|cube|texture|cube_texture] [config.json]";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let demo = args.next().unwrap_or_else(|| String::from("quads"));
    if demo == "-h" || demo == "--help" {
        println!("{USAGE}");
        return Ok(());
    }
    let config = match args.next() {
        Some(path) => Config::load(Path::new(&path))?,
        None => Config::default(),
    };
    let scene = match demo.as_str() {
        "quads" => None,
        name => Some(Scene::by_name(name, &config.texture).ok_or_else(|| {
            anyhow!("unknown demo \"{name}\", expected quads or one of {SCENE_NAMES:?}\n{USAGE}")
        })?),
    };

    let sdl_context = sdl2::init().map_err(SdlErr)?;
    let video_subsystem = sdl_context.video().map_err(SdlErr)?;
    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(GLProfile::GLES);
    gl_attr.set_context_version(3, 0);
    gl_attr.set_double_buffer(true);
    gl_attr.set_depth_size(24);
    let mut window_builder = video_subsystem.window(
        &format!("{} - {demo}", env!("CARGO_PKG_NAME")),
        config.window.width,
        config.window.height,
    );
    if config.window.resizable {
        window_builder.resizable();
    }
    let window = window_builder.position_centered().opengl().build()?;
    let _gl_context = window.gl_create_context().map_err(SdlErr)?;
    renderer::init(&video_subsystem, &window, config.window.vsync)?;
    let mut event_pump = sdl_context.event_pump().map_err(SdlErr)?;

    match scene {
        None => run_quads(&config, &window, &mut event_pump),
        Some(scene) => run_scene(scene, &config, &window, &mut event_pump),
    }
}

/// Drains pending events. Returns false once the window has been asked to
/// close.
fn handle_events(event_pump: &mut EventPump, mut on_key: impl FnMut(Keycode)) -> bool {
    for event in event_pump.poll_iter() {
        match event {
            Event::Quit { .. } => return false,
            Event::Window {
                win_event: WindowEvent::Resized(w, h),
                ..
            } => renderer::resize(w, h),
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => on_key(keycode),
            _ => {}
        }
    }
    true
}

/// The streaming benchmark: simulate, stream in chunks, present, then let
/// the population controller react to the frame time.
fn run_quads(config: &Config, window: &Window, event_pump: &mut EventPump) -> anyhow::Result<()> {
    let chunk_capacity = stream::chunk_capacity(config.stream.gpu_buffer_bytes);
    let mut quads = QuadRenderer::new(chunk_capacity)?;
    let mut store = EntityStore::try_new(config.stream.max_entities)?;
    let mut spawner = match config.seed {
        Some(seed) => Spawner::seeded(config.spawn.clone(), seed)?,
        None => Spawner::from_entropy(config.spawn.clone())?,
    };
    let controller = config.population_controller();
    let mut clock = FrameClock::new(config.frame_budget(), config.population.frame_cap);
    info!(
        "streaming up to {} entities through a {} byte buffer ({} quads per chunk), {:?} frame budget, {:?}",
        store.capacity(),
        quads.buffer_bytes(),
        quads.chunk_capacity(),
        controller.target,
        controller.policy,
    );

    let mut was_full = false;
    while handle_events(event_pump, |_| {}) {
        clock.begin();
        simulation::step(&mut store);
        renderer::clear();
        quads.begin();
        let stats = stream::stream_quads(&mut quads, store.vertices(), chunk_capacity)
            .with_context(|| format!("streaming {} entities", store.count()))?;
        window.gl_swap_window();
        let frame_time = clock.end();

        let change = controller.apply(frame_time, &mut store, &mut spawner);
        debug!(
            "entities: {} ({} chunks), frame time: {frame_time:?}, +{} -{}",
            store.count(),
            stats.chunks,
            change.spawned,
            change.removed,
        );
        if store.is_full() && !was_full {
            warn!("entity store is full at {} entities", store.capacity());
        }
        was_full = store.is_full();
        if clock.fps_updated() {
            info!("{} fps, {} entities", clock.fps(), store.count());
        }
        if let Some(delay) = clock.cap_delay(frame_time) {
            thread::sleep(delay);
        }
    }

    info!("quitting with {} entities", store.count());
    Ok(())
}

/// One of the fixed-geometry demos. D toggles the depth test.
fn run_scene(
    mut scene: Scene,
    config: &Config,
    window: &Window,
    event_pump: &mut EventPump,
) -> anyhow::Result<()> {
    let mut renderer = SceneRenderer::new(&scene)?;
    let mut clock = FrameClock::new(config.frame_budget(), config.population.frame_cap);
    info!(
        "scene {}: {} vertices, {:?}. D: toggle depth test",
        scene.name,
        scene.vertices.len(),
        scene.primitive,
    );

    while handle_events(event_pump, |keycode| {
        if keycode == Keycode::D {
            let enabled = renderer.toggle_depth_test();
            info!("depth test: {enabled}");
        }
    }) {
        clock.begin();
        scene.advance();
        renderer
            .render(&scene)
            .with_context(|| format!("drawing scene {}", scene.name))?;
        window.gl_swap_window();
        let frame_time = clock.end();
        if clock.fps_updated() {
            debug!("{} fps, last frame {frame_time:?}", clock.fps());
        }
        if let Some(delay) = clock.cap_delay(frame_time) {
            thread::sleep(delay);
        }
    }
    Ok(())
}

#[derive(Debug, Error)]
#[error("sdl error: {0}")]
pub struct SdlErr(String);
