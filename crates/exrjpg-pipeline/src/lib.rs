//! # exrjpg-pipeline
//!
//! Converts linear EXR images to display-referred JPEGs.
//!
//! ```text
//! EXR -> decode -> clip [0,1] -> color transform -> quantize u8 -> JPEG
//! ```
//!
//! The color transform is either an analytic display curve (`RAW` input)
//! or an OCIO processor from `ACES - ACEScg` to `Output - sRGB` /
//! `Output - Rec.709` (`ACEScg` input).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use exrjpg_core::{InputSpace, OutputSpace};
//! use exrjpg_pipeline::{convert_batch, BatchRequest, Silent};
//!
//! let request = BatchRequest::new("renders/", InputSpace::Raw, OutputSpace::Srgb)
//!     .output_dir("previews/");
//! let report = convert_batch(&request, &mut Silent)?;
//! println!("{} converted, {} failed", report.converted_count(), report.failed_count());
//! ```
//!
//! # Dependencies
//!
//! - [`exrjpg-io`] - EXR decoding and JPEG encoding
//! - [`exrjpg-ocio`] - OCIO config loading and processors
//! - [`exrjpg-transfer`] - sRGB and Rec.709 curves

#![warn(missing_docs)]

mod batch;
mod convert;
mod error;
mod transform;

pub use batch::{
    convert_batch, list_exr_files, plan, BatchEvent, BatchReport, BatchRequest, ConvertedFile,
    ErrorPolicy, FailedFile, Notifier, PlannedFile, Silent,
};
pub use convert::{convert, convert_with, render, ConvertOptions, ConvertStats};
pub use error::{ConvertError, ConvertResult};
pub use transform::ColorTransform;
