use std::collections::BTreeSet;

use crate::color::Color;
use crate::colorspace::Colorspace;
use crate::error::KMeansError;

/// Dense row-major image of working-colorspace colors.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Wrap an existing color vector. Fails on zero or mismatched dimensions.
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self, KMeansError> {
        validate_dimensions(pixels.len(), width, height)?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Caller guarantees `pixels.len() == width * height`.
    pub(crate) fn from_parts(width: usize, height: usize, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert 8-bit sRGB pixels into the working colorspace.
    pub fn from_rgb8(
        pixels: &[rgb::RGB<u8>],
        width: usize,
        height: usize,
        colorspace: Colorspace,
    ) -> Result<Self, KMeansError> {
        validate_dimensions(pixels.len(), width, height)?;
        let pixels = pixels.iter().map(|&p| colorspace.from_rgb8(p)).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert back to 8-bit sRGB.
    pub fn to_rgb8(&self, colorspace: Colorspace) -> Vec<rgb::RGB<u8>> {
        self.pixels.iter().map(|&c| colorspace.to_rgb8(c)).collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false for a constructed buffer; zero dimensions are rejected.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Distinct colors in first-seen order, compared bitwise.
    pub fn unique_colors(&self) -> Vec<Color> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for &c in &self.pixels {
            if seen.insert(c.channels.map(f32::to_bits)) {
                out.push(c);
            }
        }
        out
    }
}

pub(crate) fn validate_dimensions(
    pixel_count: usize,
    width: usize,
    height: usize,
) -> Result<(), KMeansError> {
    if width == 0 || height == 0 {
        return Err(KMeansError::ZeroDimension);
    }
    if width.checked_mul(height) != Some(pixel_count) {
        return Err(KMeansError::DimensionMismatch {
            len: pixel_count,
            width,
            height,
        });
    }
    Ok(())
}
