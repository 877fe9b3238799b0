//! Runtime configuration, read from an optional JSON file. Every key is
//! optional and falls back to the benchmark's defaults.
//!
//! ```json
//! {
//!     "window": { "width": 1280, "height": 720, "vsync": false, "resizable": true },
//!     "stream": { "max_entities": 500000, "gpu_buffer_bytes": 480000 },
//!     "population": {
//!         "target_frame_ms": 16, "batch_size": 50,
//!         "policy": "grow_only", "shrink_count": 1, "frame_cap": false
//!     },
//!     "spawn": { "velocity_x": [-0.0015, 0.0015], "color": [0.1, 1.0] },
//!     "seed": 1234,
//!     "texture": "tex.png"
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tinyjson::JsonValue;

use crate::entity::QUAD_BYTES;
use crate::error::{Error, Result};
use crate::population::{PopulationController, PopulationPolicy};
use crate::spawner::{SpawnRange, SpawnRanges};

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub resizable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// The most entities that will ever exist at once.
    pub max_entities: usize,
    /// Size of the GPU vertex buffer every chunk is streamed through.
    pub gpu_buffer_bytes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationConfig {
    pub target_frame_ms: f64,
    pub batch_size: usize,
    pub shrink_count: usize,
    pub policy: PopulationPolicy,
    pub frame_cap: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub window: WindowConfig,
    pub stream: StreamConfig,
    pub population: PopulationConfig,
    pub spawn: SpawnRanges,
    pub seed: Option<u64>,
    pub texture: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            window: WindowConfig {
                width: 1280,
                height: 720,
                vsync: false,
                resizable: true,
            },
            stream: StreamConfig {
                max_entities: 500_000,
                gpu_buffer_bytes: 6000 * QUAD_BYTES,
            },
            population: PopulationConfig {
                target_frame_ms: 16.0,
                batch_size: 50,
                shrink_count: 1,
                policy: PopulationPolicy::GrowOnly,
                frame_cap: false,
            },
            spawn: SpawnRanges::default(),
            seed: None,
            texture: PathBuf::from("tex.png"),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let source = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("reading {}: {err}", path.display())))?;
        Config::from_json(&source)
    }

    pub fn from_json(source: &str) -> Result<Config> {
        let json: JsonValue = source
            .parse()
            .map_err(|err| Error::Config(format!("{err}")))?;
        let root = object(&json, "the document")?;
        let mut config = Config::default();

        if let Some(window) = root.get("window") {
            let window = object(window, "window")?;
            read_u32(window, "width", &mut config.window.width)?;
            read_u32(window, "height", &mut config.window.height)?;
            read_bool(window, "vsync", &mut config.window.vsync)?;
            read_bool(window, "resizable", &mut config.window.resizable)?;
        }

        if let Some(stream) = root.get("stream") {
            let stream = object(stream, "stream")?;
            read_usize(stream, "max_entities", &mut config.stream.max_entities)?;
            read_usize(stream, "gpu_buffer_bytes", &mut config.stream.gpu_buffer_bytes)?;
        }

        if let Some(population) = root.get("population") {
            let population = object(population, "population")?;
            let target = &mut config.population;
            read_f64(population, "target_frame_ms", &mut target.target_frame_ms)?;
            read_usize(population, "batch_size", &mut target.batch_size)?;
            read_usize(population, "shrink_count", &mut target.shrink_count)?;
            read_bool(population, "frame_cap", &mut target.frame_cap)?;
            if let Some(policy) = population.get("policy") {
                target.policy = match policy {
                    JsonValue::String(name) if name == "grow_only" => PopulationPolicy::GrowOnly,
                    JsonValue::String(name) if name == "grow_and_shrink" => {
                        PopulationPolicy::GrowAndShrink
                    }
                    other => {
                        return Err(Error::Config(format!(
                            "policy must be \"grow_only\" or \"grow_and_shrink\", got {other:?}"
                        )))
                    }
                };
            }
        }

        if let Some(spawn) = root.get("spawn") {
            let spawn = object(spawn, "spawn")?;
            let ranges = &mut config.spawn;
            read_range(spawn, "position_x", &mut ranges.position_x)?;
            read_range(spawn, "position_y", &mut ranges.position_y)?;
            read_range(spawn, "velocity_x", &mut ranges.velocity_x)?;
            read_range(spawn, "velocity_y", &mut ranges.velocity_y)?;
            read_range(spawn, "size", &mut ranges.size)?;
            read_range(spawn, "color", &mut ranges.color)?;
        }

        match root.get("seed") {
            None | Some(JsonValue::Null) => {}
            Some(seed) => config.seed = Some(integer(seed, "seed")?),
        }

        if let Some(texture) = root.get("texture") {
            match texture {
                JsonValue::String(path) => config.texture = PathBuf::from(path),
                other => {
                    return Err(Error::Config(format!(
                        "texture must be a path string, got {other:?}"
                    )))
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stream.max_entities == 0 {
            return Err(Error::Config("max_entities must be positive".into()));
        }
        if self.stream.max_entities.checked_mul(QUAD_BYTES).is_none() {
            return Err(Error::Config(format!(
                "max_entities {} does not fit in memory",
                self.stream.max_entities
            )));
        }
        if self.stream.gpu_buffer_bytes < QUAD_BYTES {
            return Err(Error::Config(format!(
                "gpu_buffer_bytes must hold at least one quad ({QUAD_BYTES} bytes), got {}",
                self.stream.gpu_buffer_bytes
            )));
        }
        let target = self.population.target_frame_ms;
        if !(target.is_finite() && target > 0.0) {
            return Err(Error::Config(format!(
                "target_frame_ms must be positive, got {target}"
            )));
        }
        if self.population.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        self.spawn.validate()?;
        Ok(())
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_nanos((self.population.target_frame_ms * 1_000_000.0).round() as u64)
    }

    pub fn population_controller(&self) -> PopulationController {
        PopulationController {
            target: self.frame_budget(),
            batch_size: self.population.batch_size,
            shrink_count: self.population.shrink_count,
            policy: self.population.policy,
        }
    }
}

fn object<'a>(value: &'a JsonValue, name: &str) -> Result<&'a HashMap<String, JsonValue>> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(Error::Config(format!(
            "{name} must be an object, got {other:?}"
        ))),
    }
}

fn number(value: &JsonValue, name: &str) -> Result<f64> {
    match value {
        JsonValue::Number(number) => Ok(*number),
        other => Err(Error::Config(format!(
            "{name} must be a number, got {other:?}"
        ))),
    }
}

fn integer(value: &JsonValue, name: &str) -> Result<u64> {
    let number = number(value, name)?;
    if number < 0.0 || number.fract() != 0.0 || number > u64::MAX as f64 {
        return Err(Error::Config(format!(
            "{name} must be a non-negative integer, got {number}"
        )));
    }
    Ok(number as u64)
}

fn read_f64(map: &HashMap<String, JsonValue>, key: &str, target: &mut f64) -> Result<()> {
    if let Some(value) = map.get(key) {
        *target = number(value, key)?;
    }
    Ok(())
}

fn read_usize(map: &HashMap<String, JsonValue>, key: &str, target: &mut usize) -> Result<()> {
    if let Some(value) = map.get(key) {
        *target = usize::try_from(integer(value, key)?)
            .map_err(|_| Error::Config(format!("{key} is out of range")))?;
    }
    Ok(())
}

fn read_u32(map: &HashMap<String, JsonValue>, key: &str, target: &mut u32) -> Result<()> {
    if let Some(value) = map.get(key) {
        *target = u32::try_from(integer(value, key)?)
            .map_err(|_| Error::Config(format!("{key} is out of range")))?;
    }
    Ok(())
}

fn read_bool(map: &HashMap<String, JsonValue>, key: &str, target: &mut bool) -> Result<()> {
    match map.get(key) {
        None => Ok(()),
        Some(JsonValue::Boolean(value)) => {
            *target = *value;
            Ok(())
        }
        Some(other) => Err(Error::Config(format!(
            "{key} must be true or false, got {other:?}"
        ))),
    }
}

/// Ranges are written as two-element arrays, `[min, max]`.
fn read_range(map: &HashMap<String, JsonValue>, key: &str, target: &mut SpawnRange) -> Result<()> {
    match map.get(key) {
        None => Ok(()),
        Some(JsonValue::Array(bounds)) if bounds.len() == 2 => {
            let min = number(&bounds[0], key)? as f32;
            let max = number(&bounds[1], key)? as f32;
            *target = SpawnRange::new(min, max);
            Ok(())
        }
        Some(other) => Err(Error::Config(format!(
            "{key} must be a [min, max] array, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stream.gpu_buffer_bytes, 480_000);
        assert!(config.window.resizable);
        assert_eq!(config.frame_budget(), Duration::from_millis(16));
    }

    #[test]
    fn reads_every_section() {
        let config = Config::from_json(
            r#"{
                "window": { "width": 800, "height": 600, "vsync": true, "resizable": false },
                "stream": { "max_entities": 1000, "gpu_buffer_bytes": 24000 },
                "population": {
                    "target_frame_ms": 8, "batch_size": 100,
                    "policy": "grow_and_shrink", "shrink_count": 5, "frame_cap": true
                },
                "spawn": { "size": [0.01, 0.02], "position_x": [-0.5, 0.5] },
                "seed": 1234,
                "texture": "assets/crate.png"
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.window,
            WindowConfig {
                width: 800,
                height: 600,
                vsync: true,
                resizable: false,
            }
        );
        assert_eq!(config.stream.max_entities, 1000);
        assert_eq!(config.stream.gpu_buffer_bytes, 24_000);
        let controller = config.population_controller();
        assert_eq!(controller.target, Duration::from_millis(8));
        assert_eq!(controller.batch_size, 100);
        assert_eq!(controller.shrink_count, 5);
        assert_eq!(controller.policy, PopulationPolicy::GrowAndShrink);
        assert!(config.population.frame_cap);
        assert_eq!(config.spawn.size, SpawnRange::new(0.01, 0.02));
        assert_eq!(config.spawn.position_x, SpawnRange::new(-0.5, 0.5));
        assert_eq!(config.spawn.color, SpawnRanges::default().color);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.texture, PathBuf::from("assets/crate.png"));
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            r#"[]"#,
            r#"{ "stream": { "max_entities": 0 } }"#,
            r#"{ "stream": { "gpu_buffer_bytes": 40 } }"#,
            r#"{ "stream": { "max_entities": -3 } }"#,
            r#"{ "stream": { "max_entities": 4611686018427387904 } }"#,
            r#"{ "population": { "target_frame_ms": 0 } }"#,
            r#"{ "population": { "batch_size": 0 } }"#,
            r#"{ "population": { "policy": "shrink_only" } }"#,
            r#"{ "spawn": { "size": [0.5, 0.1] } }"#,
            r#"{ "spawn": { "size": [0.5] } }"#,
            r#"{ "spawn": { "position_y": [-2, 0] } }"#,
            r#"{ "window": { "vsync": 1 } }"#,
            r#"{ "window": { "resizable": "yes" } }"#,
            r#"{ "seed": 1.5 }"#,
            r#"{ "window": "#,
        ];
        for source in bad {
            assert!(
                matches!(Config::from_json(source), Err(Error::Config(_))),
                "{source} should be rejected"
            );
        }
    }
}
