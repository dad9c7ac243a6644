//! Error types for conversion and batch operations.

use std::path::PathBuf;
use thiserror::Error;

/// Conversion error.
///
/// Per-file failures (`Decode`, `Format`, `Encode`) are subject to the
/// batch [`ErrorPolicy`](crate::ErrorPolicy). `ColorTransform` always
/// halts a batch. `NoInput` and `NoOutputFolder` are raised before any
/// file is touched.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The EXR could not be opened or decoded.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Input file.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: exrjpg_io::IoError,
    },

    /// The decoded image cannot be converted, e.g. fewer than 3 channels.
    #[error("unsupported image layout in {}: {reason}", path.display())]
    Format {
        /// Input file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The OCIO configuration could not be loaded or resolved.
    #[error("color transform unavailable: {0}")]
    ColorTransform(#[source] exrjpg_ocio::OcioError),

    /// The JPEG could not be written.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// Output file.
        path: PathBuf,
        /// Underlying encoder error.
        #[source]
        source: exrjpg_io::IoError,
    },

    /// The input folder has no `.exr` files.
    #[error("no EXR files found in {}", .0.display())]
    NoInput(PathBuf),

    /// No output folder was selected.
    #[error("no output folder selected")]
    NoOutputFolder,

    /// Listing or creating a directory failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// True for errors confined to a single file.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::Format { .. } | Self::Encode { .. }
        )
    }

    /// Short name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Format { .. } => "format",
            Self::ColorTransform(_) => "color-transform",
            Self::Encode { .. } => "encode",
            Self::NoInput(_) => "no-input",
            Self::NoOutputFolder => "no-output-folder",
            Self::Io { .. } => "io",
        }
    }
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
