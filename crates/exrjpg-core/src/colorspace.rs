//! Selectable color spaces.
//!
//! A conversion is described by two closed enums:
//!
//! - [`InputSpace`] - how the linear EXR pixels are interpreted
//! - [`OutputSpace`] - the display encoding written to the JPG
//!
//! Both parse case-insensitively from their labels and print back the
//! canonical label, which is also used in output filenames.
//!
//! # Example
//!
//! ```rust
//! use exrjpg_core::{InputSpace, OutputSpace, output_filename};
//! use std::path::Path;
//!
//! let input: InputSpace = "raw".parse().unwrap();
//! let output: OutputSpace = "sRGB".parse().unwrap();
//! let name = output_filename(Path::new("shot01.exr"), input, output);
//! assert_eq!(name, "RAW_to_sRGB_shot01.jpg");
//! ```

use crate::Error;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Interpretation of the decoded linear pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputSpace {
    /// ACEScg scene-linear, converted through an OCIO configuration.
    AcesCg,
    /// Unmanaged linear data, converted with an analytic gamma curve.
    Raw,
}

impl InputSpace {
    /// All input spaces in presentation order.
    pub const ALL: [InputSpace; 2] = [InputSpace::AcesCg, InputSpace::Raw];

    /// Canonical label (`ACEScg`, `RAW`).
    pub fn label(self) -> &'static str {
        match self {
            Self::AcesCg => "ACEScg",
            Self::Raw => "RAW",
        }
    }

    /// Name of the matching color space in an ACES OCIO config.
    ///
    /// `None` for [`InputSpace::Raw`], which never consults a config.
    pub fn ocio_name(self) -> Option<&'static str> {
        match self {
            Self::AcesCg => Some("ACES - ACEScg"),
            Self::Raw => None,
        }
    }

    /// True when conversion needs an OCIO configuration.
    #[inline]
    pub fn is_color_managed(self) -> bool {
        self.ocio_name().is_some()
    }
}

impl fmt::Display for InputSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InputSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acescg" | "aces-cg" | "aces_cg" => Ok(Self::AcesCg),
            "raw" | "linear" => Ok(Self::Raw),
            _ => Err(Error::UnknownColorSpace {
                kind: "input",
                value: s.to_string(),
                expected: "ACEScg, RAW",
            }),
        }
    }
}

/// Target display encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OutputSpace {
    /// sRGB display (IEC 61966-2-1).
    Srgb,
    /// Rec.709 video (ITU-R BT.709).
    Rec709,
}

impl OutputSpace {
    /// All output spaces in presentation order.
    pub const ALL: [OutputSpace; 2] = [OutputSpace::Srgb, OutputSpace::Rec709];

    /// Canonical label (`sRGB`, `Rec709`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::Rec709 => "Rec709",
        }
    }

    /// Name of the matching output color space in an ACES OCIO config.
    pub fn ocio_name(self) -> &'static str {
        match self {
            Self::Srgb => "Output - sRGB",
            Self::Rec709 => "Output - Rec.709",
        }
    }
}

impl fmt::Display for OutputSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srgb" => Ok(Self::Srgb),
            "rec709" | "rec.709" | "rec-709" | "bt709" | "bt.709" => Ok(Self::Rec709),
            _ => Err(Error::UnknownColorSpace {
                kind: "output",
                value: s.to_string(),
                expected: "sRGB, Rec709",
            }),
        }
    }
}

/// Builds the output file name for a converted image.
///
/// The pattern is `{input}_to_{output}_{stem}.jpg`, where `stem` is the
/// input file name without its final extension.
pub fn output_filename(input: &Path, input_space: InputSpace, output_space: OutputSpace) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{}_to_{}_{}.jpg", input_space, output_space, stem)
}
