use std::path::Path;
use std::time::Duration;

use perfcomp::entity::VERTICES_PER_QUAD;
use perfcomp::simulation::{self, WORLD_MAX};
use perfcomp::stream::{self, QuadTarget};
use perfcomp::{
    Config, EntityStore, Error, GpuFault, PopulationController, PopulationPolicy, QuadVertex,
    SpawnRanges, Spawner,
};

/// Stands in for the GPU: a buffer of fixed byte size that records draws.
struct FakeGpu {
    buffer_bytes: usize,
    uploaded: Vec<QuadVertex>,
    drawn: Vec<QuadVertex>,
    draw_calls: usize,
}

impl FakeGpu {
    fn new(buffer_bytes: usize) -> FakeGpu {
        FakeGpu {
            buffer_bytes,
            uploaded: Vec::new(),
            drawn: Vec::new(),
            draw_calls: 0,
        }
    }

    fn new_frame(&mut self) {
        self.drawn.clear();
        self.draw_calls = 0;
    }
}

impl QuadTarget for FakeGpu {
    fn upload(&mut self, vertices: &[QuadVertex]) -> Result<(), GpuFault> {
        let bytes = std::mem::size_of_val(vertices);
        if bytes > self.buffer_bytes {
            return Err(GpuFault::new("glBufferSubData", "INVALID_VALUE"));
        }
        self.uploaded.clear();
        self.uploaded.extend_from_slice(vertices);
        Ok(())
    }

    fn draw_quads(&mut self, vertex_count: usize) -> Result<(), GpuFault> {
        if vertex_count > self.uploaded.len() {
            return Err(GpuFault::new("glDrawElements", "INVALID_OPERATION"));
        }
        self.drawn.extend_from_slice(&self.uploaded[..vertex_count]);
        self.draw_calls += 1;
        Ok(())
    }
}

fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

#[test]
fn frames_draw_every_quad_once_in_order() {
    let config = Config::from_json(
        r#"{ "stream": { "max_entities": 1000, "gpu_buffer_bytes": 24000 }, "seed": 8 }"#,
    )
    .unwrap();
    let capacity = stream::chunk_capacity(config.stream.gpu_buffer_bytes);
    assert_eq!(capacity, 300);

    let mut store = EntityStore::new(config.stream.max_entities);
    let mut spawner = Spawner::seeded(config.spawn.clone(), config.seed.unwrap()).unwrap();
    let controller = config.population_controller();
    let mut gpu = FakeGpu::new(config.stream.gpu_buffer_bytes);

    for _ in 0..30 {
        gpu.new_frame();
        simulation::step(&mut store);
        let stats = stream::stream_quads(&mut gpu, store.vertices(), capacity).unwrap();
        assert_eq!(gpu.drawn.as_slice(), store.vertices());
        assert_eq!(stats.vertices, store.count() * VERTICES_PER_QUAD);
        assert_eq!(gpu.draw_calls, store.count().div_ceil(capacity));
        controller.apply(Duration::from_millis(5), &mut store, &mut spawner);
        assert!(store.count() <= store.capacity());
    }
    assert_eq!(store.count(), 1000);
}

#[test]
fn oversized_buffer_request_aborts_the_frame() {
    let mut store = EntityStore::new(10);
    let mut spawner = Spawner::seeded(SpawnRanges::default(), 2).unwrap();
    spawner.spawn_batch(&mut store, 10);
    // The GPU buffer only holds 2 quads but the stream is told 5 fit.
    let mut gpu = FakeGpu::new(2 * perfcomp::entity::QUAD_BYTES);
    let result = stream::stream_quads(&mut gpu, store.vertices(), 5);
    assert!(matches!(result, Err(Error::GpuUpload { chunk: 0, .. })));
    assert!(gpu.drawn.is_empty());
}

#[test]
fn long_run_stays_near_the_world() {
    let mut store = EntityStore::new(5000);
    let ranges = SpawnRanges {
        velocity_x: perfcomp::SpawnRange::new(-0.03, 0.03),
        velocity_y: perfcomp::SpawnRange::new(-0.03, 0.03),
        ..SpawnRanges::default()
    };
    let mut spawner = Spawner::seeded(ranges, 77).unwrap();
    let controller = PopulationController {
        target: Duration::from_millis(16),
        batch_size: 100,
        shrink_count: 10,
        policy: PopulationPolicy::GrowAndShrink,
    };
    for frame in 0..400u64 {
        simulation::step(&mut store);
        for i in 0..store.count() {
            let position = store.position(i);
            let velocity = store.velocity(i).abs();
            assert!(position.x.abs() <= WORLD_MAX + velocity.x + 1e-5);
            assert!(position.y.abs() <= WORLD_MAX + velocity.y + 1e-5);
            let quad = store.quad(i);
            let size = store.size(i);
            assert!(approx_eq(quad[0].position[0], position.x - size, 1e-6));
            assert!(approx_eq(quad[2].position[1], position.y + size, 1e-6));
        }
        let frame_time = Duration::from_millis(if frame % 4 == 0 { 20 } else { 8 });
        controller.apply(frame_time, &mut store, &mut spawner);
    }
    assert!(store.count() > 0);
}

#[test]
fn shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/grow_and_shrink.json");
    let config = Config::load(&path).unwrap();
    assert_eq!(config.population.policy, PopulationPolicy::GrowAndShrink);
    assert_eq!(stream::chunk_capacity(config.stream.gpu_buffer_bytes), 6000);
    assert_eq!(config.seed, Some(20240501));
}
