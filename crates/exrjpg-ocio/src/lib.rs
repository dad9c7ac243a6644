//! OpenColorIO-compatible color management for exrjpg.
//!
//! This crate implements the part of OCIO needed to run ACES 1.x style
//! configs without linking the C++ library:
//! - load and parse `.ocio` configuration files
//! - look up color spaces by name, alias or role
//! - compile transform chains into a [`Processor`]
//! - apply processors to RGB pixels in parallel
//!
//! # Quick Start
//!
//! ```ignore
//! use exrjpg_ocio::Config;
//!
//! let config = Config::from_file("aces_1.2/config.ocio")?;
//! let processor = config.processor("ACES - ACEScg", "Output - sRGB")?;
//!
//! let mut pixels = [[0.18_f32, 0.18, 0.18]];
//! processor.apply_rgb(&mut pixels);
//! ```
//!
//! # Supported transforms
//!
//! `MatrixTransform`, `ExponentTransform`, `ExponentWithLinearTransform`,
//! `LogTransform`, `RangeTransform`, `AllocationTransform`,
//! `FileTransform` (`.spi1d`, `.spi3d`, `.spimtx`, `.cube`),
//! `ColorSpaceTransform` and `GroupTransform`. Anything else is reported
//! as [`OcioError::InvalidTransform`] when the config is loaded.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod colorspace;
mod config;
mod display;
mod error;
mod processor;
mod role;
mod transform;

pub use colorspace::{ColorSpace, ColorSpaceBuilder};
pub use config::{Config, ConfigVersion, OCIO_ENV};
pub use display::{Display, DisplayManager, View};
pub use error::{OcioError, OcioResult};
pub use processor::{MonCurve, Processor, ProcessorOp};
pub use role::{names as role_names, Roles};
pub use transform::{
    Allocation, AllocationTransform, ColorSpaceTransform, ExponentTransform,
    ExponentWithLinearTransform, FileTransform, GroupTransform, LogTransform, MatrixTransform,
    NegativeStyle, RangeTransform, Transform, TransformDirection,
};
