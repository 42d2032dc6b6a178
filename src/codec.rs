//! File boundary: decode with `image`, cluster, encode.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::KMeansError;
use crate::kmeans::Observer;
use crate::{KMeansConfig, SegmentResult, segment_with};

/// Decoded opaque RGB image.
#[derive(Debug, Clone)]
pub struct RgbImage {
    pub pixels: Vec<rgb::RGB<u8>>,
    pub width: usize,
    pub height: usize,
}

/// Decode an image file into opaque RGB; any alpha channel is discarded.
pub fn load_rgb(path: &Path) -> Result<RgbImage, KMeansError> {
    let unreadable = |reason: String| KMeansError::UnreadableInput {
        path: path.to_path_buf(),
        reason,
    };

    let meta = fs::metadata(path).map_err(|e| unreadable(e.to_string()))?;
    if !meta.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }
    if meta.len() == 0 {
        return Err(unreadable("file is empty".to_string()));
    }

    let decoded = image::open(path).map_err(|source| KMeansError::CodecFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = decoded.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    let pixels = rgb
        .into_raw()
        .chunks_exact(3)
        .map(|c| rgb::RGB {
            r: c[0],
            g: c[1],
            b: c[2],
        })
        .collect();

    Ok(RgbImage {
        pixels,
        width,
        height,
    })
}

/// Encode RGB pixels; the format follows the file extension.
pub fn save_rgb(
    path: &Path,
    pixels: &[rgb::RGB<u8>],
    width: usize,
    height: usize,
) -> Result<(), KMeansError> {
    let raw: Vec<u8> = pixels.iter().flat_map(|p| [p.r, p.g, p.b]).collect();
    let codec_err = |source| KMeansError::CodecFailure {
        path: path.to_path_buf(),
        source,
    };
    let (w, h) = (dimension(width)?, dimension(height)?);
    let buf = image::RgbImage::from_raw(w, h, raw).ok_or(KMeansError::DimensionMismatch {
        len: pixels.len(),
        width,
        height,
    })?;
    buf.save(path).map_err(codec_err)
}

fn dimension(v: usize) -> Result<u32, KMeansError> {
    match u32::try_from(v) {
        Ok(0) | Err(_) => Err(KMeansError::ZeroDimension),
        Ok(v) => Ok(v),
    }
}

/// Cluster `input` and write the segmented image to `output`.
///
/// Paths are optional so that callers holding unvalidated arguments get
/// `MissingInputFile` / `MissingOutputFile`. Configuration is validated
/// before the input is read.
pub fn segment_file(
    input: Option<&Path>,
    output: Option<&Path>,
    config: &KMeansConfig,
    observer: &mut dyn Observer,
) -> Result<SegmentResult, KMeansError> {
    let input = input.ok_or(KMeansError::MissingInputFile)?;
    let output = output.ok_or(KMeansError::MissingOutputFile)?;
    config.validate()?;

    let image = load_rgb(input)?;
    info!(
        "loaded {} ({}x{})",
        input.display(),
        image.width,
        image.height
    );

    let result = segment_with(&image.pixels, image.width, image.height, config, observer, None)?;
    save_rgb(output, &result.pixels, result.width, result.height)?;
    info!("wrote {}", output.display());

    Ok(result)
}
