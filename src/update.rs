use rayon::prelude::*;

use crate::assign::{AssignmentMap, PARTITION_LEN};
use crate::buffer::PixelBuffer;
use crate::color::Color;

/// Per-cluster channel sums and pixel counts for one partition.
#[derive(Debug, Clone)]
struct Accumulator {
    sums: Vec<[f64; 3]>,
    counts: Vec<u64>,
}

impl Accumulator {
    fn new(k: usize) -> Self {
        Self {
            sums: vec![[0.0; 3]; k],
            counts: vec![0; k],
        }
    }

    fn add(&mut self, cluster: usize, color: Color) {
        let s = &mut self.sums[cluster];
        s[0] += color.channels[0] as f64;
        s[1] += color.channels[1] as f64;
        s[2] += color.channels[2] as f64;
        self.counts[cluster] += 1;
    }

    fn merge(&mut self, other: &Accumulator) {
        for (s, o) in self.sums.iter_mut().zip(&other.sums) {
            s[0] += o[0];
            s[1] += o[1];
            s[2] += o[2];
        }
        for (c, o) in self.counts.iter_mut().zip(&other.counts) {
            *c += o;
        }
    }
}

/// Result of one mean update.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanUpdate {
    /// New cluster colors, same order as the input clusters.
    pub colors: Vec<Color>,
    /// Pixels assigned to each cluster.
    pub counts: Vec<u64>,
}

/// Recompute each cluster color as the channel-wise mean of its pixels.
///
/// A cluster with no pixels keeps its previous color. Partition subtotals are
/// combined in partition order, so the result is identical across runs and
/// thread counts.
pub fn update_means(buffer: &PixelBuffer, map: &AssignmentMap, previous: &[Color]) -> MeanUpdate {
    let k = previous.len();

    let partials: Vec<Accumulator> = buffer
        .pixels()
        .par_chunks(PARTITION_LEN)
        .zip(map.indices().par_chunks(PARTITION_LEN))
        .map(|(pixels, indices)| {
            let mut acc = Accumulator::new(k);
            for (&p, &i) in pixels.iter().zip(indices) {
                acc.add(i as usize, p);
            }
            acc
        })
        .collect();

    let mut total = Accumulator::new(k);
    for partial in &partials {
        total.merge(partial);
    }

    let colors = previous
        .iter()
        .zip(total.sums.iter().zip(&total.counts))
        .map(|(&prev, (sum, &count))| {
            if count == 0 {
                return prev;
            }
            let n = count as f64;
            Color::new(
                (sum[0] / n) as f32,
                (sum[1] / n) as f32,
                (sum[2] / n) as f32,
            )
        })
        .collect();

    MeanUpdate {
        colors,
        counts: total.counts,
    }
}
