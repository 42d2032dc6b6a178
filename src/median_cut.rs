use crate::color::Color;

/// A box of color entries for median cut subdivision.
#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<(Color, f32)>, // (centroid, accumulated_weight)
}

impl ColorBox {
    fn new(entries: Vec<(Color, f32)>) -> Self {
        Self { entries }
    }

    fn total_weight(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Range (max - min) along each channel.
    fn ranges(&self) -> [f32; 3] {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];

        for (color, _) in &self.entries {
            for ch in 0..3 {
                min[ch] = min[ch].min(color.channels[ch]);
                max[ch] = max[ch].max(color.channels[ch]);
            }
        }

        [max[0] - min[0], max[1] - min[1], max[2] - min[2]]
    }

    /// Max range, used as a volume proxy for split priority.
    fn volume(&self) -> f32 {
        let [r0, r1, r2] = self.ranges();
        r0.max(r1).max(r2)
    }

    /// Split priority: larger weighted boxes with more color variation split first.
    fn priority(&self) -> f32 {
        self.total_weight() * self.volume()
    }

    /// Weighted centroid of all entries.
    fn centroid(&self) -> Color {
        let mut sums = [0.0f64; 3];
        let mut w_sum = 0.0f64;

        for (color, w) in &self.entries {
            let w = *w as f64;
            for ch in 0..3 {
                sums[ch] += color.channels[ch] as f64 * w;
            }
            w_sum += w;
        }

        if w_sum < 1e-10 {
            return Color::new(0.0, 0.0, 0.0);
        }

        Color::new(
            (sums[0] / w_sum) as f32,
            (sums[1] / w_sum) as f32,
            (sums[2] / w_sum) as f32,
        )
    }

    /// Split this box along the channel with the largest range at the weighted median.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let [r0, r1, r2] = self.ranges();

        let axis = if r0 >= r1 && r0 >= r2 {
            0
        } else if r1 >= r2 {
            1
        } else {
            2
        };

        // Stable sort keeps the histogram's key order among equal values
        self.entries.sort_by(|a, b| {
            a.0.channels[axis]
                .partial_cmp(&b.0.channels[axis])
                .unwrap_or(core::cmp::Ordering::Equal)
        });

        let half_weight = self.total_weight() / 2.0;
        let mut accumulated = 0.0f32;
        let mut split_idx = 1;

        for (i, (_, w)) in self.entries.iter().enumerate() {
            accumulated += w;
            if accumulated >= half_weight && i + 1 < self.entries.len() {
                split_idx = i + 1;
                break;
            }
        }

        // At least one entry per side
        split_idx = split_idx.max(1).min(self.entries.len() - 1);

        let right = self.entries.split_off(split_idx);
        (ColorBox::new(self.entries), ColorBox::new(right))
    }
}

/// Perform weighted median cut quantization.
///
/// Takes histogram entries (color, weight) and produces up to `max_colors`
/// box centroids. Ties in split priority go to the earliest box, so the
/// result depends only on the histogram.
pub fn median_cut(histogram: Vec<(Color, f32)>, max_colors: usize) -> Vec<Color> {
    if histogram.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    if histogram.len() <= max_colors {
        return histogram.into_iter().map(|(c, _)| c).collect();
    }

    let mut boxes = Vec::with_capacity(max_colors);
    boxes.push(ColorBox::new(histogram));

    while boxes.len() < max_colors {
        let mut best: Option<(usize, f32)> = None;
        for (i, b) in boxes.iter().enumerate() {
            if b.entries.len() < 2 {
                continue;
            }
            let p = b.priority();
            if best.is_none_or(|(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }

        let Some((idx, _)) = best else {
            break; // No more splittable boxes
        };

        let (left, right) = boxes.remove(idx).split();
        boxes.insert(idx, right);
        boxes.insert(idx, left);
    }

    boxes.iter().map(ColorBox::centroid).collect()
}
