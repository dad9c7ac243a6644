//! 1-dimensional lookup table.
//!
//! A 1D LUT applies an independent curve to each color channel. In ACES
//! configs they carry shaper curves (log2 encodings) and camera log curves.

use crate::{LutError, LutResult};

/// A 1-dimensional lookup table.
///
/// - `size` entries per channel, 1 or 3 channels (mono or RGB)
/// - per-channel input domain, inputs outside it are clamped
/// - linear interpolation between entries
///
/// # Example
///
/// ```rust
/// use exrjpg_lut::Lut1D;
///
/// let lut = Lut1D::from_data(vec![0.0, 0.25, 1.0], 0.0, 1.0).unwrap();
/// assert_eq!(lut.apply(0.5), 0.25);
/// assert_eq!(lut.apply_inverse(0.25), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Lut1D {
    /// Entries for red (or all channels if mono).
    pub r: Vec<f32>,
    /// Entries for green (None if mono).
    pub g: Option<Vec<f32>>,
    /// Entries for blue (None if mono).
    pub b: Option<Vec<f32>>,
    /// Input domain minimum per channel.
    pub domain_min: [f32; 3],
    /// Input domain maximum per channel.
    pub domain_max: [f32; 3],
}

impl Lut1D {
    /// Creates an identity LUT over `[0, 1]`.
    pub fn identity(size: usize) -> Self {
        let n = size.max(2);
        Self {
            r: (0..n).map(|i| i as f32 / (n - 1) as f32).collect(),
            g: None,
            b: None,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
        }
    }

    /// Creates a mono LUT with a scalar domain.
    pub fn from_data(data: Vec<f32>, domain_min: f32, domain_max: f32) -> LutResult<Self> {
        check_len(data.len())?;
        check_domain(domain_min, domain_max)?;
        Ok(Self {
            r: data,
            g: None,
            b: None,
            domain_min: [domain_min; 3],
            domain_max: [domain_max; 3],
        })
    }

    /// Creates a 3-channel LUT from separate curves.
    pub fn from_rgb(
        r: Vec<f32>,
        g: Vec<f32>,
        b: Vec<f32>,
        domain_min: [f32; 3],
        domain_max: [f32; 3],
    ) -> LutResult<Self> {
        check_len(r.len())?;
        if r.len() != g.len() || r.len() != b.len() {
            return Err(LutError::InvalidSize("RGB channels must have same size".into()));
        }
        for i in 0..3 {
            check_domain(domain_min[i], domain_max[i])?;
        }
        Ok(Self { r, g: Some(g), b: Some(b), domain_min, domain_max })
    }

    /// Number of entries per channel.
    #[inline]
    pub fn size(&self) -> usize {
        self.r.len()
    }

    /// True if a single curve drives all channels.
    #[inline]
    pub fn is_mono(&self) -> bool {
        self.g.is_none()
    }

    #[inline]
    fn channel(&self, i: usize) -> &[f32] {
        match i {
            1 => self.g.as_deref().unwrap_or(&self.r),
            2 => self.b.as_deref().unwrap_or(&self.r),
            _ => &self.r,
        }
    }

    /// Applies the red (or mono) curve to one value.
    pub fn apply(&self, value: f32) -> f32 {
        lerp_lookup(&self.r, self.domain_min[0], self.domain_max[0], value)
    }

    /// Applies the LUT to an RGB triplet.
    pub fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        std::array::from_fn(|i| {
            lerp_lookup(self.channel(i), self.domain_min[i], self.domain_max[i], rgb[i])
        })
    }

    /// Inverse of [`apply`](Self::apply) on the red (or mono) curve.
    pub fn apply_inverse(&self, value: f32) -> f32 {
        inverse_lookup(&self.r, self.domain_min[0], self.domain_max[0], value)
    }

    /// Inverse of [`apply_rgb`](Self::apply_rgb).
    ///
    /// Exact for strictly monotonic curves; flat runs resolve to their
    /// first entry. Values beyond the curve's range clamp to the domain.
    pub fn apply_inverse_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        std::array::from_fn(|i| {
            inverse_lookup(self.channel(i), self.domain_min[i], self.domain_max[i], rgb[i])
        })
    }
}

fn check_len(len: usize) -> LutResult<()> {
    if len < 2 {
        return Err(LutError::InvalidSize(format!("1D LUT needs at least 2 entries, got {}", len)));
    }
    Ok(())
}

fn check_domain(min: f32, max: f32) -> LutResult<()> {
    if !(max > min) {
        return Err(LutError::InvalidSize(format!("empty LUT domain [{}, {}]", min, max)));
    }
    Ok(())
}

fn lerp_lookup(data: &[f32], min: f32, max: f32, value: f32) -> f32 {
    let last = data.len() - 1;
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    let pos = t * last as f32;
    let i0 = (pos.floor() as usize).min(last);
    let i1 = (i0 + 1).min(last);
    let frac = pos - i0 as f32;
    data[i0] + (data[i1] - data[i0]) * frac
}

fn inverse_lookup(data: &[f32], min: f32, max: f32, value: f32) -> f32 {
    let last = data.len() - 1;
    let increasing = data[last] >= data[0];
    // Position of the first entry at or past `value` along the curve direction.
    let idx = if increasing {
        data.partition_point(|&v| v < value)
    } else {
        data.partition_point(|&v| v > value)
    };
    let pos = if idx == 0 {
        0.0
    } else if idx > last {
        last as f32
    } else {
        let (lo, hi) = (data[idx - 1], data[idx]);
        let span = hi - lo;
        let frac = if span.abs() < f32::EPSILON { 0.0 } else { (value - lo) / span };
        (idx - 1) as f32 + frac.clamp(0.0, 1.0)
    };
    min + (max - min) * pos / last as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity() {
        let lut = Lut1D::identity(256);
        assert_abs_diff_eq!(lut.apply(0.0), 0.0);
        assert_abs_diff_eq!(lut.apply(0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(lut.apply(1.0), 1.0);
    }

    #[test]
    fn test_domain_clamps() {
        let lut = Lut1D::from_data(vec![0.0, 1.0, 4.0], -2.0, 2.0).unwrap();
        assert_eq!(lut.apply(-10.0), 0.0);
        assert_eq!(lut.apply(10.0), 4.0);
        assert_abs_diff_eq!(lut.apply(1.0), 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_inverse_recovers_input() {
        let data: Vec<f32> = (0..64).map(|i| (i as f32 / 63.0).powf(2.2)).collect();
        let lut = Lut1D::from_data(data, -6.0, 6.0).unwrap();
        for i in 0..=20 {
            let x = -6.0 + 12.0 * i as f32 / 20.0;
            assert_abs_diff_eq!(lut.apply_inverse(lut.apply(x)), x, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_inverse_decreasing_curve() {
        let lut = Lut1D::from_data(vec![1.0, 0.5, 0.0], 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(lut.apply_inverse(0.75), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(lut.apply_inverse(0.25), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_rgb_channels_independent() {
        let lut = Lut1D::from_rgb(
            vec![0.0, 1.0],
            vec![0.0, 0.5],
            vec![1.0, 0.0],
            [0.0; 3],
            [1.0; 3],
        )
        .unwrap();
        assert_eq!(lut.apply_rgb([1.0, 1.0, 1.0]), [1.0, 0.5, 0.0]);
        assert!(!lut.is_mono());
    }

    #[test]
    fn test_rejects_degenerate() {
        assert!(Lut1D::from_data(vec![0.5], 0.0, 1.0).is_err());
        assert!(Lut1D::from_data(vec![0.0, 1.0], 1.0, 1.0).is_err());
    }
}
