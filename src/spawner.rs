use glam::Vec2;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::entity::{Entity, EntityStore};
use crate::error::{Error, Result};
use crate::simulation::{WORLD_MAX, WORLD_MIN};

/// A closed interval `[min, max]` that attributes are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRange {
    pub min: f32,
    pub max: f32,
}

impl SpawnRange {
    pub const fn new(min: f32, max: f32) -> SpawnRange {
        SpawnRange { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        self.min <= value && value <= self.max
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.min == self.max {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }
}

/// Where new entities come from. The defaults are the uniform distributions
/// of the object-oriented benchmark: a tight cluster around the origin that
/// bursts outwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRanges {
    pub position_x: SpawnRange,
    pub position_y: SpawnRange,
    pub velocity_x: SpawnRange,
    pub velocity_y: SpawnRange,
    pub size: SpawnRange,
    /// Shared by the red, green and blue channels, each drawn independently.
    pub color: SpawnRange,
}

impl Default for SpawnRanges {
    fn default() -> SpawnRanges {
        SpawnRanges {
            position_x: SpawnRange::new(-0.000_05, 0.000_05),
            position_y: SpawnRange::new(-0.000_05, 0.000_05),
            velocity_x: SpawnRange::new(-0.0015, 0.0015),
            velocity_y: SpawnRange::new(-0.0015, 0.0015),
            size: SpawnRange::new(0.0009, 0.0022),
            color: SpawnRange::new(0.1, 1.0),
        }
    }
}

impl SpawnRanges {
    /// Checks that every range is finite and non-empty, and that spawn
    /// positions lie inside the world.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("position_x", self.position_x),
            ("position_y", self.position_y),
            ("velocity_x", self.velocity_x),
            ("velocity_y", self.velocity_y),
            ("size", self.size),
            ("color", self.color),
        ];
        for (name, range) in ranges {
            if !(range.min.is_finite() && range.max.is_finite() && range.min <= range.max) {
                return Err(Error::Config(format!(
                    "spawn range {name} [{}, {}] is empty or not finite",
                    range.min, range.max
                )));
            }
        }
        for (name, range) in [("position_x", self.position_x), ("position_y", self.position_y)] {
            if range.min < WORLD_MIN || range.max > WORLD_MAX {
                return Err(Error::Config(format!(
                    "spawn range {name} must lie within [{WORLD_MIN}, {WORLD_MAX}]"
                )));
            }
        }
        Ok(())
    }
}

pub struct Spawner {
    ranges: SpawnRanges,
    rng: Xoshiro256StarStar,
}

impl Spawner {
    /// A spawner producing the same entities on every run for a given seed.
    /// Fails with [`Error::Config`] if `ranges` do not pass
    /// [`SpawnRanges::validate`].
    pub fn seeded(ranges: SpawnRanges, seed: u64) -> Result<Spawner> {
        ranges.validate()?;
        Ok(Spawner {
            ranges,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        })
    }

    pub fn from_entropy(ranges: SpawnRanges) -> Result<Spawner> {
        ranges.validate()?;
        Ok(Spawner {
            ranges,
            rng: Xoshiro256StarStar::from_rng(&mut rand::rng()),
        })
    }

    pub fn ranges(&self) -> &SpawnRanges {
        &self.ranges
    }

    /// Draws every attribute independently from its range.
    pub fn roll(&mut self) -> Entity {
        let ranges = &self.ranges;
        let rng = &mut self.rng;
        let position = Vec2::new(ranges.position_x.sample(rng), ranges.position_y.sample(rng));
        let velocity = Vec2::new(ranges.velocity_x.sample(rng), ranges.velocity_y.sample(rng));
        let color = [
            ranges.color.sample(rng),
            ranges.color.sample(rng),
            ranges.color.sample(rng),
        ];
        let size = ranges.size.sample(rng);
        Entity {
            position,
            velocity,
            size,
            color,
        }
    }

    /// Appends one random entity. A full store is left as it is and the
    /// [`Error::CapacityExceeded`] is handed back for the caller to report.
    pub fn spawn_one(&mut self, store: &mut EntityStore) -> Result<usize> {
        if store.is_full() {
            return Err(Error::CapacityExceeded {
                capacity: store.capacity(),
            });
        }
        let entity = self.roll();
        store.push(entity)
    }

    /// Spawns up to `count` entities, stopping early at capacity. Returns how
    /// many were actually added.
    pub fn spawn_batch(&mut self, store: &mut EntityStore, count: usize) -> usize {
        let mut spawned = 0;
        while spawned < count {
            match self.spawn_one(store) {
                Ok(_) => spawned += 1,
                Err(err) => {
                    debug!("spawn batch cut short after {spawned}: {err}");
                    break;
                }
            }
        }
        spawned
    }
}
