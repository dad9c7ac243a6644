//! Compiled color processors.
//!
//! A [`Processor`] is a flat list of [`ProcessorOp`]s produced from a chain
//! of [`Transform`]s. Compilation resolves color space references and LUT
//! files once, so applying a processor never touches the config again.
//!
//! # Example
//!
//! ```ignore
//! let proc = config.processor("ACES - ACEScg", "Output - sRGB")?;
//! proc.apply_rgb(&mut pixels);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{DMat3, DVec3, Mat3, Vec3};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{OcioError, OcioResult};
use crate::transform::*;
use exrjpg_lut::{read_lut, Interpolation, LutFile};

/// Pixels per parallel work item.
const CHUNK: usize = 4096;

/// Limit on nested `ColorSpaceTransform`s.
const MAX_DEPTH: usize = 32;

/// Per-channel parameters of a power curve with a linear toe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonCurve {
    /// Exponent.
    pub gamma: f32,
    /// Offset.
    pub offset: f32,
    /// Slope of the linear segment (linear per encoded unit).
    pub slope: f32,
    /// Break point on the encoded side.
    pub break_encoded: f32,
    /// Break point on the linear side.
    pub break_linear: f32,
}

impl MonCurve {
    fn new(gamma: f64, offset: f64) -> Self {
        let break_encoded = offset / (gamma - 1.0);
        let knee = offset * gamma / ((gamma - 1.0) * (1.0 + offset));
        let slope = (gamma - 1.0) / offset * knee.powf(gamma);
        Self {
            gamma: gamma as f32,
            offset: offset as f32,
            slope: slope as f32,
            break_encoded: break_encoded as f32,
            break_linear: (break_encoded * slope) as f32,
        }
    }

    /// Encoded to linear.
    #[inline]
    fn decode(&self, x: f32) -> f32 {
        if x < self.break_encoded {
            x * self.slope
        } else {
            ((x + self.offset) / (1.0 + self.offset)).powf(self.gamma)
        }
    }

    /// Linear to encoded.
    #[inline]
    fn encode(&self, y: f32) -> f32 {
        if y < self.break_linear {
            y / self.slope
        } else {
            (1.0 + self.offset) * y.powf(1.0 / self.gamma) - self.offset
        }
    }
}

/// A single compiled operation.
#[derive(Debug, Clone)]
pub enum ProcessorOp {
    /// `out = matrix * in + offset`.
    Matrix {
        /// 3x3 matrix.
        matrix: Mat3,
        /// Offset.
        offset: Vec3,
    },
    /// Power function.
    Exponent {
        /// Per-channel exponent.
        value: [f32; 3],
        /// Negative handling.
        negative_style: NegativeStyle,
    },
    /// Power function with a linear toe.
    ExponentWithLinear {
        /// Per-channel curve.
        curves: [MonCurve; 3],
        /// Encoded to linear when true.
        forward: bool,
        /// Mirror negatives instead of extending the toe.
        mirror: bool,
    },
    /// Logarithm or its inverse.
    Log {
        /// Base.
        base: f32,
        /// `log` when true, `pow` when false.
        forward: bool,
    },
    /// `out = in * scale + offset`, then clamped.
    Range {
        /// Scale.
        scale: f32,
        /// Offset.
        offset: f32,
        /// Lower clamp.
        clamp_min: Option<f32>,
        /// Upper clamp.
        clamp_max: Option<f32>,
    },
    /// LUT from a file.
    Lut {
        /// Loaded table, shared between processors.
        lut: Arc<LutFile>,
        /// Inverse lookup (1D tables only).
        inverse: bool,
    },
}

impl ProcessorOp {
    /// Returns true if this operation changes nothing.
    pub fn is_identity(&self) -> bool {
        match self {
            Self::Matrix { matrix, offset } => {
                matrix.abs_diff_eq(Mat3::IDENTITY, 1e-6) && offset.abs_diff_eq(Vec3::ZERO, 1e-6)
            }
            Self::Exponent { value, .. } => value.iter().all(|v| *v == 1.0),
            Self::Range { scale, offset, clamp_min, clamp_max } => {
                *scale == 1.0 && *offset == 0.0 && clamp_min.is_none() && clamp_max.is_none()
            }
            _ => false,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Matrix { .. } => "matrix",
            Self::Exponent { .. } => "exponent",
            Self::ExponentWithLinear { .. } => "exponent_with_linear",
            Self::Log { .. } => "log",
            Self::Range { .. } => "range",
            Self::Lut { lut, .. } if lut.has_cube() => "lut3d",
            Self::Lut { .. } => "lut1d",
        }
    }

    #[inline]
    fn apply(&self, px: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Matrix { matrix, offset } => (*matrix * Vec3::from_array(px) + *offset).to_array(),
            Self::Exponent { value, negative_style } => std::array::from_fn(|i| {
                let (x, g) = (px[i], value[i]);
                match negative_style {
                    NegativeStyle::Mirror => x.signum() * x.abs().powf(g),
                    NegativeStyle::PassThru if x < 0.0 => x,
                    _ => x.max(0.0).powf(g),
                }
            }),
            Self::ExponentWithLinear { curves, forward, mirror } => std::array::from_fn(|i| {
                let c = &curves[i];
                let f = |v: f32| if *forward { c.decode(v) } else { c.encode(v) };
                if *mirror && px[i] < 0.0 { -f(-px[i]) } else { f(px[i]) }
            }),
            Self::Log { base, forward } => {
                if *forward {
                    let ln_base = base.ln();
                    px.map(|x| x.max(f32::MIN_POSITIVE).ln() / ln_base)
                } else {
                    px.map(|x| base.powf(x))
                }
            }
            Self::Range { scale, offset, clamp_min, clamp_max } => px.map(|x| {
                let mut v = x * scale + offset;
                if let Some(lo) = clamp_min {
                    v = v.max(*lo);
                }
                if let Some(hi) = clamp_max {
                    v = v.min(*hi);
                }
                v
            }),
            Self::Lut { lut, inverse } => match (lut.as_ref(), *inverse) {
                (LutFile::OneD(curve), true) => curve.apply_inverse_rgb(px),
                (file, _) => file.apply(px),
            },
        }
    }
}

/// Compiled transform processor.
///
/// Cheap to share between threads; all LUT data is reference counted.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    ops: Vec<ProcessorOp>,
}

impl Processor {
    /// A processor that leaves pixels unchanged.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Builds a processor from ops, dropping identities and merging matrices.
    pub fn from_ops(ops: Vec<ProcessorOp>) -> Self {
        let mut p = Self { ops };
        p.optimize();
        p
    }

    /// Compiled operations.
    #[inline]
    pub fn ops(&self) -> &[ProcessorOp] {
        &self.ops
    }

    /// Number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// True if applying this processor changes nothing.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// Applies the processor to one pixel.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.ops.iter().fold(rgb, |px, op| op.apply(px))
    }

    /// Applies the processor to RGB pixels in place, in parallel.
    pub fn apply_rgb(&self, pixels: &mut [[f32; 3]]) {
        if self.is_identity() {
            return;
        }
        pixels.par_chunks_mut(CHUNK).for_each(|chunk| {
            for px in chunk {
                *px = self.apply(*px);
            }
        });
    }

    fn optimize(&mut self) {
        self.ops.retain(|op| !op.is_identity());

        let mut result: Vec<ProcessorOp> = Vec::with_capacity(self.ops.len());
        for op in self.ops.drain(..) {
            if let ProcessorOp::Matrix { matrix: m2, offset: o2 } = &op {
                if let Some(ProcessorOp::Matrix { matrix: m1, offset: o1 }) = result.last_mut() {
                    // m2 * (m1 * x + o1) + o2
                    *o1 = *m2 * *o1 + *o2;
                    *m1 = *m2 * *m1;
                    continue;
                }
            }
            result.push(op);
        }
        result.retain(|op| !op.is_identity());
        self.ops = result;
    }
}

/// Walks transforms and emits ops.
pub(crate) struct Compiler<'a> {
    config: &'a Config,
    ops: Vec<ProcessorOp>,
    stack: Vec<String>,
    luts: HashMap<(PathBuf, Interpolation), Arc<LutFile>>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(config: &'a Config) -> Self {
        Self {
            config,
            ops: Vec::new(),
            stack: Vec::new(),
            luts: HashMap::new(),
        }
    }

    pub(crate) fn finish(self) -> Processor {
        let processor = Processor::from_ops(self.ops);
        debug!(
            ops = ?processor.ops().iter().map(ProcessorOp::name).collect::<Vec<_>>(),
            "compiled processor"
        );
        processor
    }

    /// Emits `src -> reference -> dst`.
    pub(crate) fn colorspaces(&mut self, src: &str, dst: &str) -> OcioResult<()> {
        let src_cs = self.config.require_colorspace(src)?;
        let dst_cs = self.config.require_colorspace(dst)?;
        if src_cs.name() == dst_cs.name() || src_cs.is_data() || dst_cs.is_data() {
            trace!(src, dst, "identity conversion");
            return Ok(());
        }
        if let Some(t) = src_cs.to_reference_resolved() {
            self.transform(&t, TransformDirection::Forward)?;
        }
        if let Some(t) = dst_cs.from_reference_resolved() {
            self.transform(&t, TransformDirection::Forward)?;
        }
        Ok(())
    }

    pub(crate) fn transform(&mut self, t: &Transform, dir: TransformDirection) -> OcioResult<()> {
        let dir = t.direction().combine(dir);
        let inverse = dir == TransformDirection::Inverse;
        match t {
            Transform::Matrix(m) => {
                let r = |i: usize| DVec3::new(m.matrix[i], m.matrix[i + 1], m.matrix[i + 2]);
                let matrix = DMat3::from_cols(r(0), r(4), r(8)).transpose();
                let offset = DVec3::new(m.offset[0], m.offset[1], m.offset[2]);
                self.push_matrix(matrix, offset, inverse)
            }
            Transform::Exponent(e) => {
                let value: [f64; 3] = [e.value[0], e.value[1], e.value[2]];
                if inverse && value.contains(&0.0) {
                    return Err(OcioError::invalid("cannot invert a zero exponent"));
                }
                self.ops.push(ProcessorOp::Exponent {
                    value: value.map(|v| (if inverse { 1.0 / v } else { v }) as f32),
                    negative_style: e.negative_style,
                });
                Ok(())
            }
            Transform::ExponentWithLinear(e) => {
                self.ops.push(ProcessorOp::ExponentWithLinear {
                    curves: std::array::from_fn(|i| MonCurve::new(e.gamma[i], e.offset[i])),
                    forward: !inverse,
                    mirror: e.negative_style == NegativeStyle::Mirror,
                });
                Ok(())
            }
            Transform::Log(l) => {
                self.ops.push(ProcessorOp::Log {
                    base: l.base as f32,
                    forward: !inverse,
                });
                Ok(())
            }
            Transform::Range(r) => self.push_range(r, inverse),
            Transform::Allocation(a) => {
                self.push_allocation(a, inverse);
                Ok(())
            }
            Transform::File(f) => self.push_file(f, inverse),
            Transform::ColorSpace(cs) => {
                let (src, dst) = if inverse { (&cs.dst, &cs.src) } else { (&cs.src, &cs.dst) };
                let key = format!("{} -> {}", src, dst);
                if self.stack.contains(&key) || self.stack.len() >= MAX_DEPTH {
                    let mut chain = self.stack.clone();
                    chain.push(key);
                    return Err(OcioError::CircularReference { chain: chain.join(", ") });
                }
                self.stack.push(key);
                let result = self.colorspaces(src, dst);
                self.stack.pop();
                result
            }
            Transform::Group(g) => {
                if inverse {
                    for child in g.children.iter().rev() {
                        self.transform(child, TransformDirection::Inverse)?;
                    }
                } else {
                    for child in &g.children {
                        self.transform(child, TransformDirection::Forward)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn push_matrix(&mut self, matrix: DMat3, offset: DVec3, inverse: bool) -> OcioResult<()> {
        let (matrix, offset) = if inverse {
            if matrix.determinant().abs() < 1e-12 {
                return Err(OcioError::invalid("matrix is not invertible"));
            }
            let inv = matrix.inverse();
            (inv, -(inv * offset))
        } else {
            (matrix, offset)
        };
        self.ops.push(ProcessorOp::Matrix {
            matrix: matrix.as_mat3(),
            offset: offset.as_vec3(),
        });
        Ok(())
    }

    fn push_range(&mut self, r: &RangeTransform, inverse: bool) -> OcioResult<()> {
        let (min_in, max_in, min_out, max_out) = if inverse {
            (r.min_out, r.max_out, r.min_in, r.max_in)
        } else {
            (r.min_in, r.max_in, r.min_out, r.max_out)
        };
        let (scale, offset) = match (min_in, max_in, min_out, max_out) {
            (Some(a), Some(b), Some(c), Some(d)) => {
                if a == b {
                    return Err(OcioError::invalid("RangeTransform: cannot invert an empty output range"));
                }
                let scale = (d - c) / (b - a);
                (scale, c - a * scale)
            }
            (Some(a), _, Some(c), _) => (1.0, c - a),
            (_, Some(b), _, Some(d)) => (1.0, d - b),
            _ => return Err(OcioError::invalid("RangeTransform: no bounds given")),
        };
        let clamp = |v: Option<f64>| if r.clamp { v.map(|x| x as f32) } else { None };
        self.ops.push(ProcessorOp::Range {
            scale: scale as f32,
            offset: offset as f32,
            clamp_min: clamp(min_out),
            clamp_max: clamp(max_out),
        });
        Ok(())
    }

    fn push_allocation(&mut self, a: &AllocationTransform, inverse: bool) {
        let (min, max) = (a.vars[0], a.vars[1]);
        let lg2_offset = a.vars.get(2).copied().unwrap_or(0.0);
        let fit = |inv: bool| {
            let (scale, offset) = if inv { (max - min, min) } else { (1.0 / (max - min), -min / (max - min)) };
            ProcessorOp::Range {
                scale: scale as f32,
                offset: offset as f32,
                clamp_min: None,
                clamp_max: None,
            }
        };
        let shift = |amount: f64| ProcessorOp::Range {
            scale: 1.0,
            offset: amount as f32,
            clamp_min: None,
            clamp_max: None,
        };

        match (a.allocation, inverse) {
            (Allocation::Uniform, inv) => self.ops.push(fit(inv)),
            (Allocation::Lg2, false) => {
                self.ops.push(shift(lg2_offset));
                self.ops.push(ProcessorOp::Log { base: 2.0, forward: true });
                self.ops.push(fit(false));
            }
            (Allocation::Lg2, true) => {
                self.ops.push(fit(true));
                self.ops.push(ProcessorOp::Log { base: 2.0, forward: false });
                self.ops.push(shift(-lg2_offset));
            }
        }
    }

    fn push_file(&mut self, f: &FileTransform, inverse: bool) -> OcioResult<()> {
        let path = self.config.resolve_file(&f.src)?;
        let key = (path, f.interpolation);
        let lut = match self.luts.get(&key) {
            Some(lut) => Arc::clone(lut),
            None => {
                let lut = Arc::new(read_lut(&key.0)?.with_interpolation(f.interpolation));
                self.luts.insert(key, Arc::clone(&lut));
                lut
            }
        };

        if let LutFile::Matrix(m) = lut.as_ref() {
            let matrix = DMat3::from_cols_array_2d(&m.matrix.map(|row| row.map(f64::from))).transpose();
            let offset = DVec3::from_array(m.offset.map(f64::from));
            return self.push_matrix(matrix, offset, inverse);
        }
        if inverse && lut.has_cube() {
            return Err(OcioError::invalid(format!(
                "inverse 3D LUT is not supported: {}",
                f.src
            )));
        }
        self.ops.push(ProcessorOp::Lut { lut, inverse });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scale(s: f32) -> ProcessorOp {
        ProcessorOp::Matrix {
            matrix: Mat3::from_diagonal(Vec3::splat(s)),
            offset: Vec3::ZERO,
        }
    }

    #[test]
    fn adjacent_matrices_merge() {
        let p = Processor::from_ops(vec![scale(2.0), scale(0.25), scale(3.0)]);
        assert_eq!(p.num_ops(), 1);
        let out = p.apply([1.0, 2.0, 4.0]);
        assert_abs_diff_eq!(out[0], 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 6.0, epsilon = 1e-6);
    }

    #[test]
    fn inverse_pair_collapses_to_identity() {
        let p = Processor::from_ops(vec![scale(2.0), scale(0.5)]);
        assert!(p.is_identity());
    }

    #[test]
    fn moncurve_matches_srgb() {
        let c = MonCurve::new(2.4, 0.055);
        assert_abs_diff_eq!(1.0 / c.slope, 12.923, epsilon = 1e-3);
        assert_abs_diff_eq!(c.decode(1.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(c.encode(0.18), 0.4613, epsilon = 1e-3);
        for x in [0.001f32, 0.02, 0.3, 0.9] {
            assert_abs_diff_eq!(c.decode(c.encode(x)), x, epsilon = 1e-5);
        }
    }

    #[test]
    fn exponent_negative_styles() {
        let op = |negative_style| ProcessorOp::Exponent { value: [2.0; 3], negative_style };
        assert_eq!(op(NegativeStyle::Clamp).apply([-2.0, 0.0, 3.0]), [0.0, 0.0, 9.0]);
        assert_eq!(op(NegativeStyle::Mirror).apply([-2.0, 0.0, 3.0]), [-4.0, 0.0, 9.0]);
        assert_eq!(op(NegativeStyle::PassThru).apply([-2.0, 0.0, 3.0]), [-2.0, 0.0, 9.0]);
    }

    #[test]
    fn range_clamps() {
        let op = ProcessorOp::Range { scale: 2.0, offset: -1.0, clamp_min: Some(0.0), clamp_max: Some(1.0) };
        assert_eq!(op.apply([0.25, 0.75, 2.0]), [0.0, 0.5, 1.0]);
    }

    #[test]
    fn apply_rgb_matches_single_pixel() {
        let p = Processor::from_ops(vec![
            ProcessorOp::Log { base: 2.0, forward: true },
            scale(0.1),
        ]);
        let mut pixels: Vec<[f32; 3]> = (1..10_000).map(|i| [i as f32; 3]).collect();
        let expected: Vec<_> = pixels.iter().map(|&px| p.apply(px)).collect();
        p.apply_rgb(&mut pixels);
        assert_eq!(pixels, expected);
    }
}
