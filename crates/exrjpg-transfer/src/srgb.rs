//! sRGB transfer function.
//!
//! Piecewise curve: a linear toe near black joined to a 1/2.4 power segment.
//!
//! # Reference
//!
//! IEC 61966-2-1:1999

/// Linear-side break point of the encoding curve.
pub const LINEAR_BREAK: f32 = 0.0031308;

/// Encoded-side break point of the decoding curve.
pub const ENCODED_BREAK: f32 = 0.04045;

/// sRGB OETF: linear `[0, 1]` to encoded `[0, 1]`.
///
/// ```text
/// if L <= 0.0031308:
///     V = 12.92 * L
/// else:
///     V = 1.055 * L^(1/2.4) - 0.055
/// ```
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l <= LINEAR_BREAK {
        12.92 * l
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// sRGB EOTF: encoded `[0, 1]` back to linear `[0, 1]`.
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v <= ENCODED_BREAK {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_boundaries() {
        assert_eq!(oetf(0.0), 0.0);
        assert_abs_diff_eq!(oetf(1.0), 1.0, epsilon = 1e-6);
        assert_eq!(eotf(0.0), 0.0);
        assert_abs_diff_eq!(eotf(1.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_segment() {
        assert_abs_diff_eq!(oetf(0.001), 0.01292, epsilon = 1e-7);
        assert_abs_diff_eq!(oetf(LINEAR_BREAK), 0.040449936, epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        for i in 0..=100 {
            let l = i as f32 / 100.0;
            assert_abs_diff_eq!(eotf(oetf(l)), l, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_mid_grey() {
        assert_abs_diff_eq!(oetf(0.18), 0.46135, epsilon = 1e-4);
    }
}
