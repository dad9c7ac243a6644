//! Rec.709 (BT.709) camera transfer function.
//!
//! The OETF is what video cameras apply; display-side BT.1886 is a pure
//! 2.4 gamma and is not the inverse of this curve.
//!
//! # Reference
//!
//! ITU-R BT.709-6

/// Linear-side break point of the encoding curve.
pub const LINEAR_BREAK: f32 = 0.018;

/// Rec.709 OETF: linear `[0, 1]` to encoded `[0, 1]`.
///
/// ```text
/// if L < 0.018:
///     V = 4.5 * L
/// else:
///     V = 1.099 * L^0.45 - 0.099
/// ```
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l < LINEAR_BREAK {
        4.5 * l
    } else {
        1.099 * l.powf(0.45) - 0.099
    }
}

/// Inverse of [`oetf`].
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v < 4.5 * LINEAR_BREAK {
        v / 4.5
    } else {
        ((v + 0.099) / 1.099).powf(1.0 / 0.45)
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
    }

    #[test]
    fn test_segments_meet() {
        let below = 4.5 * LINEAR_BREAK;
        let above = 1.099 * LINEAR_BREAK.powf(0.45) - 0.099;
        assert_abs_diff_eq!(below, above, epsilon = 1e-3);
    }

    #[test]
    fn test_roundtrip() {
        for i in 0..=100 {
            let l = i as f32 / 100.0;
            assert_abs_diff_eq!(eotf(oetf(l)), l, epsilon = 1e-4);
        }
    }
}
