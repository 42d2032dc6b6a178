use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::Color;

/// Pixels per parallel work unit. Fixed so that partitioning, and therefore
/// the order of floating-point reductions, does not depend on thread count.
pub(crate) const PARTITION_LEN: usize = 16 * 1024;

/// One cluster index per pixel, row-major, same layout as the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentMap {
    indices: Vec<u32>,
}

impl AssignmentMap {
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Pixels assigned to each cluster.
    pub fn counts(&self, k: usize) -> Vec<u64> {
        let mut counts = vec![0u64; k];
        for &i in &self.indices {
            counts[i as usize] += 1;
        }
        counts
    }

    /// Number of pixels whose cluster differs from `other`.
    pub fn changed_from(&self, other: &AssignmentMap) -> usize {
        self.indices
            .iter()
            .zip(&other.indices)
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Index of the nearest cluster color.
///
/// Clusters are scanned in index order and the best is replaced only on a
/// strictly smaller distance, so equidistant clusters resolve to the lowest
/// index.
#[inline]
pub fn nearest_cluster(color: Color, clusters: &[Color]) -> u32 {
    let mut best_idx = 0;
    let mut best_dist = f32::INFINITY;

    for (i, &c) in clusters.iter().enumerate() {
        let d = color.mean_sq_diff(c);
        if d < best_dist {
            best_dist = d;
            best_idx = i;
        }
    }

    best_idx as u32
}

/// Assign every pixel to its nearest cluster. `clusters` must be non-empty.
pub fn assign(buffer: &PixelBuffer, clusters: &[Color]) -> AssignmentMap {
    debug_assert!(!clusters.is_empty());
    let pixels = buffer.pixels();
    let mut indices = vec![0u32; pixels.len()];

    indices
        .par_chunks_mut(PARTITION_LEN)
        .zip(pixels.par_chunks(PARTITION_LEN))
        .for_each(|(out, chunk)| {
            for (slot, &p) in out.iter_mut().zip(chunk) {
                *slot = nearest_cluster(p, clusters);
            }
        });

    AssignmentMap { indices }
}
