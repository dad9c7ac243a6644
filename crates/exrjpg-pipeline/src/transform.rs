//! Color transform selection.
//!
//! `RAW` input maps to an analytic display curve. `ACEScg` input resolves
//! a processor from an OCIO configuration, taken from an explicit path or
//! the `OCIO` environment variable.

use crate::{ConvertError, ConvertResult};
use exrjpg_core::{InputSpace, OutputSpace};
use exrjpg_ocio::{Config, Processor};
use exrjpg_transfer::DisplayCurve;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A resolved scene-to-display transform.
#[derive(Debug, Clone)]
pub enum ColorTransform {
    /// Analytic gamma curve, applied per channel.
    Curve(DisplayCurve),
    /// Compiled OCIO processor.
    Ocio(Processor),
}

impl ColorTransform {
    /// Display curve used for `RAW` input.
    pub fn curve_for(output: OutputSpace) -> DisplayCurve {
        match output {
            OutputSpace::Srgb => DisplayCurve::Srgb,
            OutputSpace::Rec709 => DisplayCurve::Rec709,
        }
    }

    /// Resolves the transform for a pair of color spaces.
    ///
    /// The configuration is only consulted for color-managed input. With no
    /// explicit `config` path the `OCIO` environment variable is used.
    ///
    /// # Errors
    ///
    /// [`ConvertError::ColorTransform`] if the configuration cannot be
    /// loaded or does not define the required color spaces.
    pub fn resolve(
        input: InputSpace,
        output: OutputSpace,
        config: Option<&Path>,
    ) -> ConvertResult<Self> {
        let Some(src) = input.ocio_name() else {
            return Ok(Self::Curve(Self::curve_for(output)));
        };

        let config = match config {
            Some(path) => Config::from_file(path),
            None => Config::from_env(),
        }
        .map_err(ConvertError::ColorTransform)?;

        Self::from_config(&config, src, output.ocio_name())
    }

    /// Resolves a processor between two named spaces of a loaded config.
    pub fn from_config(config: &Config, src: &str, dst: &str) -> ConvertResult<Self> {
        let processor = config
            .processor(src, dst)
            .map_err(ConvertError::ColorTransform)?;
        debug!(src, dst, ops = processor.num_ops(), "resolved OCIO processor");
        Ok(Self::Ocio(processor))
    }

    /// Applies the transform in place.
    pub fn apply(&self, pixels: &mut [[f32; 3]]) {
        match self {
            Self::Curve(curve) => curve.apply_rgb(pixels),
            Self::Ocio(processor) => processor.apply_rgb(pixels),
        }
    }
}

impl fmt::Display for ColorTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Curve(curve) => write!(f, "{} curve", curve.name()),
            Self::Ocio(p) => write!(f, "OCIO processor ({} ops)", p.num_ops()),
        }
    }
}
