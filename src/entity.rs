use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::error::{Error, Result};

/// Vertices per entity; every entity is drawn as one axis-aligned quad.
pub const VERTICES_PER_QUAD: usize = 4;
/// Bytes one entity occupies in the vertex buffer.
pub const QUAD_BYTES: usize = VERTICES_PER_QUAD * std::mem::size_of::<QuadVertex>();

/// The vertex layout streamed to the GPU: `pos` (2 floats) followed by `rgb`
/// (3 floats), tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

/// A freshly spawned entity, before it is split into the store's lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Half-extent of the quad.
    pub size: f32,
    pub color: [f32; 3],
}

/// Per-entity state kept in parallel vectors sharing one index, plus the
/// four derived vertices of every entity, ready for upload.
///
/// All lanes are reserved up front for `capacity` entities, so pushing never
/// reallocates.
pub struct EntityStore {
    capacity: usize,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    sizes: Vec<f32>,
    vertices: Vec<QuadVertex>,
}

/// Mutable views into every lane at once, for the simulation step.
pub(crate) struct Lanes<'a> {
    pub positions: &'a mut [Vec2],
    pub velocities: &'a mut [Vec2],
    pub sizes: &'a [f32],
    pub vertices: &'a mut [QuadVertex],
}

impl EntityStore {
    /// # Panics
    ///
    /// If the lanes for `capacity` entities cannot be allocated. Use
    /// [`EntityStore::try_new`] when `capacity` comes from user input.
    pub fn new(capacity: usize) -> EntityStore {
        EntityStore {
            capacity,
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            sizes: Vec::with_capacity(capacity),
            vertices: Vec::with_capacity(capacity * VERTICES_PER_QUAD),
        }
    }

    /// Like [`EntityStore::new`], but reports [`Error::Reserve`] instead of
    /// aborting when the lanes do not fit in memory.
    pub fn try_new(capacity: usize) -> Result<EntityStore> {
        let reserve_error = |_| Error::Reserve { capacity };
        let vertex_count = capacity
            .checked_mul(VERTICES_PER_QUAD)
            .ok_or(Error::Reserve { capacity })?;
        let mut store = EntityStore {
            capacity,
            positions: Vec::new(),
            velocities: Vec::new(),
            sizes: Vec::new(),
            vertices: Vec::new(),
        };
        store.positions.try_reserve_exact(capacity).map_err(reserve_error)?;
        store.velocities.try_reserve_exact(capacity).map_err(reserve_error)?;
        store.sizes.try_reserve_exact(capacity).map_err(reserve_error)?;
        store.vertices.try_reserve_exact(vertex_count).map_err(reserve_error)?;
        Ok(store)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.count() >= self.capacity
    }

    /// Appends an entity and writes its four vertices. Returns the index of
    /// the new entity, or [`Error::CapacityExceeded`] without touching the
    /// store if it is full.
    pub fn push(&mut self, entity: Entity) -> Result<usize> {
        if self.is_full() {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let index = self.count();
        self.positions.push(entity.position);
        self.velocities.push(entity.velocity);
        self.sizes.push(entity.size);
        let vertex = QuadVertex {
            position: [0.0; 2],
            color: entity.color,
        };
        self.vertices.extend_from_slice(&[vertex; VERTICES_PER_QUAD]);
        let start = index * VERTICES_PER_QUAD;
        write_corners(
            &mut self.vertices[start..start + VERTICES_PER_QUAD],
            entity.position,
            entity.size,
        );
        Ok(index)
    }

    /// Removes the most recently spawned entity.
    pub fn pop(&mut self) -> Option<Entity> {
        let position = self.positions.pop()?;
        let velocity = self.velocities.pop()?;
        let size = self.sizes.pop()?;
        let color = self.vertices.last()?.color;
        self.vertices.truncate(self.positions.len() * VERTICES_PER_QUAD);
        Some(Entity {
            position,
            velocity,
            size,
            color,
        })
    }

    /// Keeps only the first `count` entities.
    pub fn truncate(&mut self, count: usize) {
        self.positions.truncate(count);
        self.velocities.truncate(count);
        self.sizes.truncate(count);
        self.vertices.truncate(self.positions.len() * VERTICES_PER_QUAD);
    }

    pub fn position(&self, index: usize) -> Vec2 {
        self.positions[index]
    }

    pub fn set_position(&mut self, index: usize, position: Vec2) {
        self.positions[index] = position;
        let start = index * VERTICES_PER_QUAD;
        write_corners(
            &mut self.vertices[start..start + VERTICES_PER_QUAD],
            position,
            self.sizes[index],
        );
    }

    pub fn velocity(&self, index: usize) -> Vec2 {
        self.velocities[index]
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Vec2) {
        self.velocities[index] = velocity;
    }

    pub fn size(&self, index: usize) -> f32 {
        self.sizes[index]
    }

    pub fn color(&self, index: usize) -> [f32; 3] {
        self.vertices[index * VERTICES_PER_QUAD].color
    }

    /// The vertices of entity `index`.
    pub fn quad(&self, index: usize) -> &[QuadVertex] {
        let start = index * VERTICES_PER_QUAD;
        &self.vertices[start..start + VERTICES_PER_QUAD]
    }

    /// All `4 * count()` vertices, in entity order.
    pub fn vertices(&self) -> &[QuadVertex] {
        &self.vertices
    }

    pub(crate) fn lanes_mut(&mut self) -> Lanes<'_> {
        Lanes {
            positions: &mut self.positions,
            velocities: &mut self.velocities,
            sizes: &self.sizes,
            vertices: &mut self.vertices,
        }
    }
}

/// Writes the corners of the quad centered at `center` in counter-clockwise
/// order starting from the bottom left.
pub(crate) fn write_corners(quad: &mut [QuadVertex], center: Vec2, size: f32) {
    quad[0].position = [center.x - size, center.y - size];
    quad[1].position = [center.x + size, center.y - size];
    quad[2].position = [center.x + size, center.y + size];
    quad[3].position = [center.x - size, center.y + size];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(x: f32, y: f32, size: f32) -> Entity {
        Entity {
            position: Vec2::new(x, y),
            velocity: Vec2::new(0.01, -0.02),
            size,
            color: [0.25, 0.5, 0.75],
        }
    }

    #[test]
    fn vertex_layout_is_packed() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 20);
        assert_eq!(QUAD_BYTES, 80);
    }

    #[test]
    fn push_writes_corners_and_color() {
        let mut store = EntityStore::new(4);
        let index = store.push(entity(0.5, -0.5, 0.1)).unwrap();
        assert_eq!(index, 0);
        assert_eq!(store.count(), 1);
        assert_eq!(store.vertices().len(), 4);
        let expected = [[0.4, -0.6], [0.6, -0.6], [0.6, -0.4], [0.4, -0.4]];
        for (vertex, corner) in store.quad(0).iter().zip(expected) {
            assert!((vertex.position[0] - corner[0]).abs() < 1e-6);
            assert!((vertex.position[1] - corner[1]).abs() < 1e-6);
        }
        assert!(store.quad(0).iter().all(|v| v.color == [0.25, 0.5, 0.75]));
    }

    #[test]
    fn push_at_capacity_leaves_store_untouched() {
        let mut store = EntityStore::new(2);
        store.push(entity(0.0, 0.0, 0.1)).unwrap();
        store.push(entity(0.1, 0.0, 0.1)).unwrap();
        assert!(store.is_full());
        let before = store.vertices().to_vec();
        match store.push(entity(0.2, 0.0, 0.1)) {
            Err(Error::CapacityExceeded { capacity }) => assert_eq!(capacity, 2),
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
        assert_eq!(store.count(), 2);
        assert_eq!(store.vertices(), &before[..]);
    }

    #[test]
    fn pop_and_truncate_keep_lanes_in_step() {
        let mut store = EntityStore::new(8);
        for i in 0..5 {
            store.push(entity(i as f32 * 0.1, 0.0, 0.05)).unwrap();
        }
        let popped = store.pop().unwrap();
        assert_eq!(popped.position, Vec2::new(0.4, 0.0));
        assert_eq!(popped.color, [0.25, 0.5, 0.75]);
        assert_eq!(store.count(), 4);
        assert_eq!(store.vertices().len(), 16);

        store.truncate(1);
        assert_eq!(store.count(), 1);
        assert_eq!(store.vertices().len(), 4);
        store.truncate(10);
        assert_eq!(store.count(), 1);

        store.pop();
        assert!(store.pop().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn try_new_reports_impossible_capacity() {
        for capacity in [usize::MAX, usize::MAX / 8] {
            match EntityStore::try_new(capacity) {
                Err(Error::Reserve { capacity: reported }) => assert_eq!(reported, capacity),
                Err(other) => panic!("expected Reserve, got {other:?}"),
                Ok(_) => panic!("{capacity} entities should not fit"),
            }
        }
        let store = EntityStore::try_new(16).unwrap();
        assert_eq!(store.capacity(), 16);
        assert!(store.is_empty());
    }

    #[test]
    fn set_velocity_only_changes_the_velocity() {
        let mut store = EntityStore::new(2);
        store.push(entity(0.0, 0.0, 0.1)).unwrap();
        store.push(entity(0.5, 0.5, 0.1)).unwrap();
        let before = store.vertices().to_vec();
        store.set_velocity(1, Vec2::new(-0.03, 0.04));
        assert_eq!(store.velocity(1), Vec2::new(-0.03, 0.04));
        assert_eq!(store.velocity(0), Vec2::new(0.01, -0.02));
        assert_eq!(store.position(1), Vec2::new(0.5, 0.5));
        assert_eq!(store.vertices(), &before[..]);
    }

    #[test]
    fn set_position_moves_the_quad() {
        let mut store = EntityStore::new(1);
        store.push(entity(0.0, 0.0, 0.5)).unwrap();
        store.set_position(0, Vec2::new(0.5, 0.5));
        assert_eq!(store.quad(0)[0].position, [0.0, 0.0]);
        assert_eq!(store.quad(0)[2].position, [1.0, 1.0]);
        assert_eq!(store.color(0), [0.25, 0.5, 0.75]);
    }
}
