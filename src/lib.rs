//! GPU-independent core of the quad streaming benchmark and the small scene
//! demos: entity storage, spawning, simulation, chunked streaming, the
//! population controller and frame timing. The SDL2/OpenGL side lives in the
//! binary and talks to this crate through [`stream::QuadTarget`].

pub mod config;
pub mod entity;
pub mod error;
pub mod population;
pub mod scene;
pub mod simulation;
pub mod spawner;
pub mod stream;
pub mod timing;

pub use config::Config;
pub use entity::{Entity, EntityStore, QuadVertex};
pub use error::{Error, GpuFault};
pub use population::{Adjustment, PopulationChange, PopulationController, PopulationPolicy};
pub use spawner::{SpawnRange, SpawnRanges, Spawner};
pub use stream::{QuadTarget, StreamStats};
