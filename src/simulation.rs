use crate::entity::{write_corners, EntityStore, VERTICES_PER_QUAD};

pub const WORLD_MIN: f32 = -1.0;
pub const WORLD_MAX: f32 = 1.0;

/// Advances every entity by one frame.
///
/// An entity found outside the world bounds has the offending velocity
/// component negated before it moves, so it can overshoot the bounds by at
/// most one step. The quad corners are then rewritten from the new position;
/// colors are never touched.
pub fn step(store: &mut EntityStore) {
    let lanes = store.lanes_mut();
    let quads = lanes.vertices.chunks_exact_mut(VERTICES_PER_QUAD);
    let entities = lanes
        .positions
        .iter_mut()
        .zip(lanes.velocities.iter_mut())
        .zip(lanes.sizes);
    for (((position, velocity), &size), quad) in entities.zip(quads) {
        if !(WORLD_MIN..=WORLD_MAX).contains(&position.x) {
            velocity.x = -velocity.x;
        }
        if !(WORLD_MIN..=WORLD_MAX).contains(&position.y) {
            velocity.y = -velocity.y;
        }
        *position += *velocity;
        write_corners(quad, *position, size);
    }
}
