use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KMeansError {
    #[error("invalid {option}: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("invalid seed color {0:?}")]
    InvalidSeedColor(String),

    #[error("no input file specified")]
    MissingInputFile,

    #[error("no output file specified")]
    MissingOutputFile,

    #[error("input file {path} is unreadable: {reason}")]
    UnreadableInput { path: PathBuf, reason: String },

    #[error("codec failure on {path}: {source}")]
    CodecFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported colorspace {0:?}")]
    ColorspaceUnsupported(String),

    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },
}

impl KMeansError {
    pub(crate) fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }
}
