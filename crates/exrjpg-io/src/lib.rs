//! # exrjpg-io
//!
//! Image file I/O for the exrjpg converter.
//!
//! - [`exr`] - decode linear EXR images into [`LinearImage`](exrjpg_core::LinearImage)
//! - [`jpeg`] - encode [`Rgb8Image`](exrjpg_core::Rgb8Image) as baseline JPEG
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use exrjpg_io::{exr, jpeg};
//!
//! let linear = exr::read("shot01.exr")?;
//! // ... transform and quantize ...
//! jpeg::write("shot01.jpg", &display)?;
//! ```

#![warn(missing_docs)]

mod error;
pub mod exr;
pub mod jpeg;

pub use error::{IoError, IoResult};
pub use jpeg::{JpegWriter, JpegWriterOptions, DEFAULT_QUALITY};

/// Returns true if the file name ends in `.exr` (case-insensitive).
///
/// A file named just `.exr` counts.
pub fn is_exr(path: &std::path::Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(".exr"))
}
