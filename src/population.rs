use std::time::Duration;

use crate::entity::EntityStore;
use crate::spawner::Spawner;

/// What to do with the population when a frame misses its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopulationPolicy {
    /// Keep what exists; the load only ever increases.
    #[default]
    GrowOnly,
    /// Remove entities from the tail while frames are too slow.
    GrowAndShrink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Grow(usize),
    Shrink(usize),
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopulationChange {
    pub spawned: usize,
    pub removed: usize,
}

/// Bang-bang control of the entity count against a frame time budget.
#[derive(Debug, Clone)]
pub struct PopulationController {
    pub target: Duration,
    pub batch_size: usize,
    pub shrink_count: usize,
    pub policy: PopulationPolicy,
}

impl PopulationController {
    pub fn decide(&self, frame_time: Duration) -> Adjustment {
        if frame_time < self.target {
            Adjustment::Grow(self.batch_size)
        } else {
            match self.policy {
                PopulationPolicy::GrowOnly => Adjustment::Hold,
                PopulationPolicy::GrowAndShrink if self.shrink_count > 0 => {
                    Adjustment::Shrink(self.shrink_count)
                }
                PopulationPolicy::GrowAndShrink => Adjustment::Hold,
            }
        }
    }

    /// Applies the decision for `frame_time`. Growth stops at the store's
    /// capacity and shrinking stops at zero.
    pub fn apply(
        &self,
        frame_time: Duration,
        store: &mut EntityStore,
        spawner: &mut Spawner,
    ) -> PopulationChange {
        match self.decide(frame_time) {
            Adjustment::Grow(count) => PopulationChange {
                spawned: spawner.spawn_batch(store, count),
                removed: 0,
            },
            Adjustment::Shrink(count) => {
                let removed = count.min(store.count());
                store.truncate(store.count() - removed);
                PopulationChange { spawned: 0, removed }
            }
            Adjustment::Hold => PopulationChange::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawner::SpawnRanges;

    fn controller(policy: PopulationPolicy) -> PopulationController {
        PopulationController {
            target: Duration::from_millis(16),
            batch_size: 50,
            shrink_count: 1,
            policy,
        }
    }

    #[test]
    fn grows_only_under_budget() {
        let controller = controller(PopulationPolicy::GrowOnly);
        let mut store = EntityStore::new(1000);
        let mut spawner = Spawner::seeded(SpawnRanges::default(), 5).unwrap();
        let spawned: Vec<usize> = [10, 20, 5]
            .into_iter()
            .map(|ms| {
                controller
                    .apply(Duration::from_millis(ms), &mut store, &mut spawner)
                    .spawned
            })
            .collect();
        assert_eq!(spawned, vec![50, 0, 50]);
        assert_eq!(store.count(), 100);
    }

    #[test]
    fn budget_boundary_counts_as_missed() {
        let controller = controller(PopulationPolicy::GrowOnly);
        assert_eq!(controller.decide(Duration::from_millis(16)), Adjustment::Hold);
        assert_eq!(
            controller.decide(Duration::from_micros(15_999)),
            Adjustment::Grow(50)
        );
    }

    #[test]
    fn shrink_policy_removes_from_the_tail() {
        let controller = PopulationController {
            shrink_count: 30,
            ..controller(PopulationPolicy::GrowAndShrink)
        };
        let mut store = EntityStore::new(1000);
        let mut spawner = Spawner::seeded(SpawnRanges::default(), 5).unwrap();
        controller.apply(Duration::from_millis(1), &mut store, &mut spawner);
        let first = store.position(0);

        let change = controller.apply(Duration::from_millis(40), &mut store, &mut spawner);
        assert_eq!(change, PopulationChange { spawned: 0, removed: 30 });
        assert_eq!(store.count(), 20);
        assert_eq!(store.position(0), first);

        let change = controller.apply(Duration::from_millis(40), &mut store, &mut spawner);
        assert_eq!(change.removed, 20);
        let change = controller.apply(Duration::from_millis(40), &mut store, &mut spawner);
        assert_eq!(change.removed, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn population_stays_within_capacity() {
        let controller = controller(PopulationPolicy::GrowAndShrink);
        let mut store = EntityStore::new(120);
        let mut spawner = Spawner::seeded(SpawnRanges::default(), 11).unwrap();
        for frame in 0..200u64 {
            let ms = if frame % 3 == 0 { 30 } else { 4 };
            controller.apply(Duration::from_millis(ms), &mut store, &mut spawner);
            assert!(store.count() <= store.capacity());
        }
        assert_eq!(store.count(), 120);
    }
}
