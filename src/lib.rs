#![forbid(unsafe_code)]

//! K-means color clustering for opaque raster images.
//!
//! Pixels are converted into a working [`Colorspace`], seeded either from an
//! explicit color list or a median-cut palette, iterated through
//! assignment → mean update → convergence check, and rendered back with each
//! pixel replaced by its cluster's mean color.

pub mod assign;
pub mod buffer;
pub mod codec;
pub mod color;
pub mod colorspace;
pub mod convergence;
pub mod error;
pub mod histogram;
pub mod kmeans;
pub mod median_cut;
pub mod render;
pub mod seed;
pub mod update;
pub mod view;

pub use buffer::PixelBuffer;
pub use color::Color;
pub use colorspace::Colorspace;
pub use error::KMeansError;
pub use kmeans::{Observer, Termination};
pub use seed::SeedingStrategy;
pub use view::{ViewMode, ViewReporter};

use std::sync::atomic::AtomicBool;

use crate::buffer::validate_dimensions;
use crate::color::parse_color_spec;
use crate::kmeans::LoopParams;

/// Configuration for a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    /// Cluster count K (> 1). Ignored when `seed_colors` is set.
    pub numcolors: usize,
    /// Explicit seed color specs, in cluster order.
    pub seed_colors: Option<Vec<String>>,
    /// Iteration cap (> 0).
    pub max_iters: u32,
    /// Stop when cluster drift (RMSE × 100) falls strictly below this.
    pub convergence: f64,
    /// Colorspace in which distances and means are computed.
    pub colorspace: Colorspace,
    /// Diagnostic output. The library does not print; callers build a
    /// [`ViewReporter`] from this.
    pub view: Option<ViewMode>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            numcolors: 5,
            seed_colors: None,
            max_iters: 40,
            convergence: 0.05,
            colorspace: Colorspace::Srgb,
            view: None,
        }
    }
}

impl KMeansConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn numcolors(mut self, k: usize) -> Self {
        self.numcolors = k;
        self
    }

    /// Whitespace-separated seed colors, e.g. `"red #00ff00 rgb(0,0,255)"`.
    pub fn seed_colors(mut self, list: &str) -> Self {
        self.seed_colors = Some(list.split_whitespace().map(str::to_string).collect());
        self
    }

    pub fn seed_color_list(mut self, colors: Vec<String>) -> Self {
        self.seed_colors = Some(colors);
        self
    }

    pub fn max_iters(mut self, n: u32) -> Self {
        self.max_iters = n;
        self
    }

    pub fn convergence(mut self, threshold: f64) -> Self {
        self.convergence = threshold;
        self
    }

    pub fn colorspace(mut self, colorspace: Colorspace) -> Self {
        self.colorspace = colorspace;
        self
    }

    pub fn view(mut self, mode: ViewMode) -> Self {
        self.view = Some(mode);
        self
    }

    /// Seeding strategy implied by this configuration.
    pub fn seeding(&self) -> SeedingStrategy {
        match &self.seed_colors {
            Some(list) => SeedingStrategy::ExplicitList(list.clone()),
            None => SeedingStrategy::AutoQuantize(self.numcolors),
        }
    }

    /// Check every option, including that each seed color parses.
    pub fn validate(&self) -> Result<(), KMeansError> {
        if self.numcolors < 2 {
            return Err(KMeansError::invalid_option(
                "numcolors",
                format!("must be greater than 1, got {}", self.numcolors),
            ));
        }
        if self.max_iters == 0 {
            return Err(KMeansError::invalid_option(
                "maxiters",
                "must be greater than 0",
            ));
        }
        if !self.convergence.is_finite() || self.convergence < 0.0 {
            return Err(KMeansError::invalid_option(
                "convergence",
                format!("must be a non-negative number, got {}", self.convergence),
            ));
        }
        if let Some(list) = &self.seed_colors {
            if list.len() < 2 {
                return Err(KMeansError::invalid_option(
                    "seedcolors",
                    format!("need at least 2 colors, got {}", list.len()),
                ));
            }
            for spec in list {
                parse_color_spec(spec)?;
            }
        }
        Ok(())
    }

    fn loop_params(&self) -> LoopParams {
        LoopParams {
            max_iters: self.max_iters,
            convergence: self.convergence,
        }
    }
}

/// Segmentation result.
#[derive(Debug, Clone)]
pub struct SegmentResult {
    pixels: Vec<rgb::RGB<u8>>,
    width: usize,
    height: usize,
    colorspace: Colorspace,
    clusters: Vec<Color>,
    counts: Vec<u64>,
    iterations: u32,
    rmse: f64,
    termination: Termination,
}

impl SegmentResult {
    /// Rendered image in sRGB, row-major.
    pub fn pixels(&self) -> &[rgb::RGB<u8>] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Final cluster colors in the working colorspace.
    pub fn clusters(&self) -> &[Color] {
        &self.clusters
    }

    /// Final cluster colors converted to sRGB.
    pub fn clusters_srgb(&self) -> Vec<rgb::RGB<u8>> {
        self.clusters
            .iter()
            .map(|&c| self.colorspace.to_rgb8(c))
            .collect()
    }

    /// Pixels in each cluster after the last iteration.
    pub fn cluster_counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of clusters, K after any seeding reduction.
    pub fn k(&self) -> usize {
        self.clusters.len()
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Cluster drift of the last iteration, RMSE × 100.
    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }
}

/// Cluster an opaque sRGB image.
pub fn segment(
    pixels: &[rgb::RGB<u8>],
    width: usize,
    height: usize,
    config: &KMeansConfig,
) -> Result<SegmentResult, KMeansError> {
    segment_with(pixels, width, height, config, &mut (), None)
}

/// Cluster an opaque sRGB image, reporting to `observer`.
///
/// Raising `cancel` stops the loop at the next check and renders the last
/// completed assignment.
pub fn segment_with(
    pixels: &[rgb::RGB<u8>],
    width: usize,
    height: usize,
    config: &KMeansConfig,
    observer: &mut dyn Observer,
    cancel: Option<&AtomicBool>,
) -> Result<SegmentResult, KMeansError> {
    validate_dimensions(pixels.len(), width, height)?;
    config.validate()?;

    let colorspace = config.colorspace;
    let buffer = PixelBuffer::from_rgb8(pixels, width, height, colorspace)?;
    let seeds = config.seeding().seeds(&buffer, colorspace)?;

    let clustering = kmeans::run(&buffer, seeds, config.loop_params(), observer, cancel);
    let rendered = clustering.render(&buffer);

    Ok(SegmentResult {
        pixels: rendered.to_rgb8(colorspace),
        width,
        height,
        colorspace,
        clusters: clustering.clusters,
        counts: clustering.counts,
        iterations: clustering.iterations,
        rmse: clustering.rmse,
        termination: clustering.termination,
    })
}
