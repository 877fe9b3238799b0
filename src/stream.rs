//! Streaming the vertex set to a GPU buffer that is smaller than the worst
//! case, one chunk at a time.

use crate::entity::{QuadVertex, QUAD_BYTES, VERTICES_PER_QUAD};
use crate::error::{Error, GpuFault, Result};

/// The GPU side of streaming. Every upload overwrites the buffer from offset
/// 0, and the following draw consumes exactly what was uploaded.
pub trait QuadTarget {
    fn upload(&mut self, vertices: &[QuadVertex]) -> Result<(), GpuFault>;
    /// Draws `vertex_count` vertices of the last upload as a quad list.
    fn draw_quads(&mut self, vertex_count: usize) -> Result<(), GpuFault>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStats {
    pub chunks: usize,
    pub vertices: usize,
}

/// How many whole quads fit in a buffer of `buffer_bytes`.
pub fn chunk_capacity(buffer_bytes: usize) -> usize {
    buffer_bytes / QUAD_BYTES
}

/// Vertex counts of the draws needed for `quads` quads with at most
/// `capacity` quads per chunk: full chunks first, then the remainder.
///
/// # Panics
///
/// If `capacity` is 0.
pub fn chunk_plan(quads: usize, capacity: usize) -> impl Iterator<Item = usize> {
    assert!(capacity > 0, "a chunk must hold at least one quad");
    let full = quads / capacity;
    let remainder = quads % capacity;
    std::iter::repeat(capacity * VERTICES_PER_QUAD)
        .take(full)
        .chain((remainder > 0).then_some(remainder * VERTICES_PER_QUAD))
}

/// Uploads and draws `vertices` in chunks of at most `capacity` quads,
/// sequentially through the same buffer. The first failure ends the frame's
/// streaming and is returned with the index of the failing chunk.
///
/// # Panics
///
/// If `capacity` is 0. [`chunk_capacity`] of a buffer that passed config
/// validation is at least 1.
pub fn stream_quads<T: QuadTarget + ?Sized>(
    target: &mut T,
    vertices: &[QuadVertex],
    capacity: usize,
) -> Result<StreamStats> {
    assert!(capacity > 0, "a chunk must hold at least one quad");
    debug_assert_eq!(vertices.len() % VERTICES_PER_QUAD, 0);
    let mut stats = StreamStats::default();
    for (chunk, slice) in vertices.chunks(capacity * VERTICES_PER_QUAD).enumerate() {
        target
            .upload(slice)
            .map_err(|source| Error::GpuUpload { chunk, source })?;
        target
            .draw_quads(slice.len())
            .map_err(|source| Error::GpuDraw { chunk, source })?;
        stats.chunks += 1;
        stats.vertices += slice.len();
    }
    Ok(stats)
}

/// Triangle indices covering `quads` quads whose corners are stored in
/// counter-clockwise order, two triangles per quad.
pub fn quad_indices(quads: usize) -> Vec<u32> {
    (0..quads as u32)
        .flat_map(|quad| {
            let base = quad * VERTICES_PER_QUAD as u32;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect()
}

/// Number of indices [`quad_indices`] emits for `vertex_count` quad vertices.
pub fn index_count(vertex_count: usize) -> usize {
    vertex_count / VERTICES_PER_QUAD * 6
}
