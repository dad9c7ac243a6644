//! 3-dimensional lookup table.
//!
//! Display transforms in ACES configs often end with a 3D cube that bakes
//! the output rendering. Lookup is trilinear or tetrahedral.

use crate::{Interpolation, LutError, LutResult};

/// A 3-dimensional lookup table.
///
/// - `size^3` RGB entries
/// - R varies fastest, then G, then B: index = `r + size * (g + size * b)`
/// - inputs outside the domain are clamped to the cube
///
/// # Example
///
/// ```rust
/// use exrjpg_lut::Lut3D;
///
/// let lut = Lut3D::identity(17);
/// let out = lut.apply([0.5, 0.25, 0.75]);
/// assert!((out[1] - 0.25).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct Lut3D {
    /// Flattened cube entries in R-fastest order.
    pub data: Vec<[f32; 3]>,
    /// Grid points per axis.
    pub size: usize,
    /// Input domain minimum per channel.
    pub domain_min: [f32; 3],
    /// Input domain maximum per channel.
    pub domain_max: [f32; 3],
    /// Lookup method.
    pub interpolation: Interpolation,
}

impl Lut3D {
    /// Creates an identity cube.
    pub fn identity(size: usize) -> Self {
        let size = size.max(2);
        let step = 1.0 / (size - 1) as f32;
        let mut data = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push([r as f32 * step, g as f32 * step, b as f32 * step]);
                }
            }
        }
        Self {
            data,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            interpolation: Interpolation::Linear,
        }
    }

    /// Creates a cube from R-fastest data with exactly `size^3` entries.
    pub fn from_data(data: Vec<[f32; 3]>, size: usize) -> LutResult<Self> {
        if size < 2 {
            return Err(LutError::InvalidSize(format!("3D LUT size must be >= 2, got {}", size)));
        }
        let expected = size * size * size;
        if data.len() != expected {
            return Err(LutError::InvalidSize(format!(
                "expected {} entries for size {}, got {}",
                expected,
                size,
                data.len()
            )));
        }
        Ok(Self {
            data,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            interpolation: Interpolation::Linear,
        })
    }

    /// Sets the input domain.
    pub fn with_domain(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self
    }

    /// Sets the interpolation method.
    pub fn with_interpolation(mut self, interp: Interpolation) -> Self {
        self.interpolation = interp;
        self
    }

    #[inline]
    fn get(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        self.data[r + self.size * (g + self.size * b)]
    }

    /// Looks up one RGB value.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self.interpolation {
            Interpolation::Nearest => self.apply_nearest(rgb),
            Interpolation::Linear => self.apply_trilinear(rgb),
            Interpolation::Tetrahedral => self.apply_tetrahedral(rgb),
        }
    }

    /// Grid position of `rgb`, as lower cell corner and fractional offsets.
    fn locate(&self, rgb: [f32; 3]) -> ([usize; 3], [f32; 3]) {
        let n = (self.size - 1) as f32;
        let mut base = [0usize; 3];
        let mut frac = [0.0f32; 3];
        for i in 0..3 {
            let t = (rgb[i] - self.domain_min[i]) / (self.domain_max[i] - self.domain_min[i]);
            let p = t.clamp(0.0, 1.0) * n;
            let cell = (p.floor() as usize).min(self.size - 2);
            base[i] = cell;
            frac[i] = p - cell as f32;
        }
        (base, frac)
    }

    fn apply_nearest(&self, rgb: [f32; 3]) -> [f32; 3] {
        let ([r, g, b], [fr, fg, fb]) = self.locate(rgb);
        let pick = |cell: usize, f: f32| if f >= 0.5 { cell + 1 } else { cell };
        self.get(pick(r, fr), pick(g, fg), pick(b, fb))
    }

    fn apply_trilinear(&self, rgb: [f32; 3]) -> [f32; 3] {
        let ([r, g, b], [fr, fg, fb]) = self.locate(rgb);
        let c000 = self.get(r, g, b);
        let c100 = self.get(r + 1, g, b);
        let c010 = self.get(r, g + 1, b);
        let c110 = self.get(r + 1, g + 1, b);
        let c001 = self.get(r, g, b + 1);
        let c101 = self.get(r + 1, g, b + 1);
        let c011 = self.get(r, g + 1, b + 1);
        let c111 = self.get(r + 1, g + 1, b + 1);

        std::array::from_fn(|i| {
            let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
            let c00 = lerp(c000[i], c100[i], fr);
            let c10 = lerp(c010[i], c110[i], fr);
            let c01 = lerp(c001[i], c101[i], fr);
            let c11 = lerp(c011[i], c111[i], fr);
            lerp(lerp(c00, c10, fg), lerp(c01, c11, fg), fb)
        })
    }

    fn apply_tetrahedral(&self, rgb: [f32; 3]) -> [f32; 3] {
        let ([r, g, b], [fr, fg, fb]) = self.locate(rgb);
        let c000 = self.get(r, g, b);
        let c111 = self.get(r + 1, g + 1, b + 1);

        // Walk from c000 to c111 along the edges ordered by fraction size.
        let (first, second, w) = if fr > fg {
            if fg > fb {
                (self.get(r + 1, g, b), self.get(r + 1, g + 1, b), [fr, fg, fb])
            } else if fr > fb {
                (self.get(r + 1, g, b), self.get(r + 1, g, b + 1), [fr, fb, fg])
            } else {
                (self.get(r, g, b + 1), self.get(r + 1, g, b + 1), [fb, fr, fg])
            }
        } else if fg > fb {
            if fr > fb {
                (self.get(r, g + 1, b), self.get(r + 1, g + 1, b), [fg, fr, fb])
            } else {
                (self.get(r, g + 1, b), self.get(r, g + 1, b + 1), [fg, fb, fr])
            }
        } else {
            (self.get(r, g, b + 1), self.get(r, g + 1, b + 1), [fb, fg, fr])
        };

        std::array::from_fn(|i| {
            c000[i]
                + w[0] * (first[i] - c000[i])
                + w[1] * (second[i] - first[i])
                + w[2] * (c111[i] - second[i])
        })
    }
}
