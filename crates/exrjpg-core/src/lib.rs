//! # exrjpg-core
//!
//! Core types shared by the exrjpg crates:
//!
//! - [`LinearImage`] - decoded floating point pixels, `(height, width, channels)`
//! - [`Rgb8Image`] - quantized display-referred pixels ready for encoding
//! - [`InputSpace`], [`OutputSpace`] - the closed set of selectable color spaces
//! - [`output_filename`] - deterministic naming of converted files
//!
//! ## Crate Structure
//!
//! ```text
//! exrjpg-core (this crate)
//!    ^
//!    |
//!    +-- exrjpg-io (EXR decode, JPEG encode)
//!    +-- exrjpg-pipeline (conversion and batch driver)
//!    +-- exrjpg-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod colorspace;
pub mod error;
pub mod image;

pub use colorspace::{output_filename, InputSpace, OutputSpace};
pub use error::{Error, Result};
pub use image::{quantize_sample, LinearImage, Rgb8Image};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::colorspace::{output_filename, InputSpace, OutputSpace};
    pub use crate::error::{Error, Result};
    pub use crate::image::{LinearImage, Rgb8Image};
}
