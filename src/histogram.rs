use std::collections::{BTreeMap, BTreeSet};

use crate::color::Color;

/// A histogram entry: accumulated color and count for a quantized bucket.
#[derive(Debug, Clone)]
pub struct HistEntry {
    /// Sums of each channel over the bucket's pixels
    pub sums: [f64; 3],
    /// Number of pixels in this bucket
    pub count: u32,
}

impl HistEntry {
    /// Mean color of this bucket.
    pub fn centroid(&self) -> Color {
        if self.count == 0 {
            return Color::new(0.0, 0.0, 0.0);
        }
        let n = self.count as f64;
        Color::new(
            (self.sums[0] / n) as f32,
            (self.sums[1] / n) as f32,
            (self.sums[2] / n) as f32,
        )
    }
}

/// Quantize a normalized color to a bucket key at the given bit depth per channel.
fn quantize_key(color: Color, bits: u32) -> u32 {
    let max_val = (1u32 << bits) - 1;
    let scale = max_val as f32;
    let bin = |c: f32| ((c.clamp(0.0, 1.0) * scale).round() as u32).min(max_val);
    let [c1, c2, c3] = color.channels;
    (bin(c1) << (bits * 2)) | (bin(c2) << bits) | bin(c3)
}

/// Build a color histogram over working-colorspace pixels.
///
/// Uses adaptive bit depth: 6-bit for small images (more color precision), 5-bit
/// for large images (avoids dominant-color fragmentation on screenshots).
/// Centroids are accumulated in f64. Output is in bucket-key order, so it is
/// deterministic for a given image.
pub fn build_histogram(pixels: &[Color]) -> Vec<(Color, f32)> {
    let bits = if pixels.len() <= 500_000 { 6 } else { 5 };
    build_hist_at_depth(pixels, bits)
}

fn build_hist_at_depth(pixels: &[Color], bits: u32) -> Vec<(Color, f32)> {
    let mut buckets: BTreeMap<u32, HistEntry> = BTreeMap::new();

    for &color in pixels {
        let key = quantize_key(color, bits);
        let [c1, c2, c3] = color.channels.map(f64::from);

        buckets
            .entry(key)
            .and_modify(|e| {
                e.sums[0] += c1;
                e.sums[1] += c2;
                e.sums[2] += c3;
                e.count += 1;
            })
            .or_insert_with(|| HistEntry {
                sums: [c1, c2, c3],
                count: 1,
            });
    }

    buckets
        .into_values()
        .map(|e| (e.centroid(), e.count as f32))
        .collect()
}

/// Detect if an image uses at most `max_colors` exact colors.
/// Returns them in first-seen order if so, `None` if more colors exist.
/// Uses early exit: scans until `max_colors + 1` unique colors are found.
pub(crate) fn detect_exact_palette(pixels: &[Color], max_colors: usize) -> Option<Vec<Color>> {
    let mut seen = BTreeSet::new();
    let mut colors = Vec::new();
    for &p in pixels {
        if seen.insert(p.channels.map(f32::to_bits)) {
            if colors.len() == max_colors {
                return None;
            }
            colors.push(p);
        }
    }
    Some(colors)
}
