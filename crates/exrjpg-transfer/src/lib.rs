//! # exrjpg-transfer
//!
//! Analytic transfer curves used when pixels are converted without a color
//! management configuration.
//!
//! | Curve | Module | Linear segment | Power segment |
//! |-------|--------|----------------|---------------|
//! | sRGB | [`srgb`] | `12.92 * L` for `L <= 0.0031308` | `1.055 * L^(1/2.4) - 0.055` |
//! | Rec.709 | [`rec709`] | `4.5 * L` for `L < 0.018` | `1.099 * L^0.45 - 0.099` |
//!
//! Both curves map `[0, 1]` onto `[0, 1]` and are monotonically increasing.
//!
//! # Usage
//!
//! ```rust
//! use exrjpg_transfer::{srgb, DisplayCurve};
//!
//! let encoded = srgb::oetf(0.18);
//! assert!((encoded - 0.4614).abs() < 1e-3);
//!
//! let mut pixels = [[0.0, 0.18, 1.0]];
//! DisplayCurve::Rec709.apply_rgb(&mut pixels);
//! assert_eq!(pixels[0][0], 0.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod rec709;
pub mod srgb;

pub use rec709::{eotf as rec709_eotf, oetf as rec709_oetf};
pub use srgb::{eotf as srgb_eotf, oetf as srgb_oetf};

/// Display encoding curve applied identically to every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayCurve {
    /// sRGB OETF.
    Srgb,
    /// Rec.709 OETF.
    Rec709,
}

impl DisplayCurve {
    /// Encodes one linear sample.
    #[inline]
    pub fn encode(self, v: f32) -> f32 {
        match self {
            Self::Srgb => srgb::oetf(v),
            Self::Rec709 => rec709::oetf(v),
        }
    }

    /// Decodes one encoded sample back to linear.
    #[inline]
    pub fn decode(self, v: f32) -> f32 {
        match self {
            Self::Srgb => srgb::eotf(v),
            Self::Rec709 => rec709::eotf(v),
        }
    }

    /// Encodes RGB pixels in place, no per-channel weighting.
    pub fn apply_rgb(self, pixels: &mut [[f32; 3]]) {
        for px in pixels.iter_mut() {
            *px = (*px).map(|c| self.encode(c));
        }
    }

    /// Curve name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::Rec709 => "Rec.709",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_on_unit_range() {
        for curve in [DisplayCurve::Srgb, DisplayCurve::Rec709] {
            let mut prev = curve.encode(0.0);
            for i in 1..=4096 {
                let v = curve.encode(i as f32 / 4096.0);
                assert!(v >= prev, "{} not monotonic at {}", curve.name(), i);
                prev = v;
            }
        }
    }

    #[test]
    fn test_apply_rgb_same_for_all_channels() {
        let mut px = [[0.25_f32, 0.25, 0.25]];
        DisplayCurve::Srgb.apply_rgb(&mut px);
        assert_eq!(px[0][0], px[0][1]);
        assert_eq!(px[0][1], px[0][2]);
        assert_eq!(px[0][0], srgb::oetf(0.25));
    }
}
