//! Initial cluster colors.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::color::{Color, parse_color_spec};
use crate::colorspace::Colorspace;
use crate::error::KMeansError;
use crate::histogram::{build_histogram, detect_exact_palette};
use crate::median_cut::median_cut;

/// Where the initial cluster colors come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedingStrategy {
    /// User-supplied sRGB color specs, in cluster order. K is the list length.
    ExplicitList(Vec<String>),
    /// Median-cut palette of the image with at most K entries.
    AutoQuantize(usize),
}

impl SeedingStrategy {
    /// Produce the ordered seed colors in `colorspace`.
    ///
    /// Explicit lists fail on the first unparseable entry. `AutoQuantize` may
    /// return fewer than K colors for low-color images, but never fewer than 2.
    pub fn seeds(
        &self,
        buffer: &PixelBuffer,
        colorspace: Colorspace,
    ) -> Result<Vec<Color>, KMeansError> {
        match self {
            Self::ExplicitList(specs) => explicit_seeds(specs, colorspace),
            Self::AutoQuantize(k) => {
                if *k < 2 {
                    return Err(KMeansError::invalid_option(
                        "numcolors",
                        format!("must be greater than 1, got {k}"),
                    ));
                }
                Ok(auto_seeds(buffer.pixels(), *k))
            }
        }
    }
}

fn explicit_seeds(specs: &[String], colorspace: Colorspace) -> Result<Vec<Color>, KMeansError> {
    if specs.len() < 2 {
        return Err(KMeansError::invalid_option(
            "seedcolors",
            format!("need at least 2 colors, got {}", specs.len()),
        ));
    }
    specs
        .iter()
        .map(|spec| parse_color_spec(spec).map(|rgb| colorspace.from_srgb(rgb)))
        .collect()
}

fn auto_seeds(pixels: &[Color], k: usize) -> Vec<Color> {
    let mut seeds = match detect_exact_palette(pixels, k) {
        Some(exact) => {
            debug!("image has {} exact colors, using them as seeds", exact.len());
            exact
        }
        None => median_cut(build_histogram(pixels), k),
    };

    let mut seen = BTreeSet::new();
    seeds.retain(|c| seen.insert(c.channels.map(f32::to_bits)));

    if seeds.len() < k {
        warn!(
            "image yields only {} representative colors, reducing numcolors from {k}",
            seeds.len()
        );
    }

    if seeds.len() < 2 {
        let first = seeds.first().copied().unwrap_or(Color::new(0.0, 0.0, 0.0));
        seeds.push(farthest_corner(first));
    }

    seeds
}

/// Corner of the unit cube farthest from `c`.
fn farthest_corner(c: Color) -> Color {
    Color {
        channels: c.channels.map(|v| if v < 0.5 { 1.0 } else { 0.0 }),
    }
}
