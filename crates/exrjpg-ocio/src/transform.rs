//! Transform definitions for color space conversions.
//!
//! Transforms are parsed from the tagged YAML nodes of a config
//! (`!<MatrixTransform> {...}`) and compiled into a [`Processor`].
//! Only the subset used by ACES 1.x style configs is recognised.
//!
//! [`Processor`]: crate::Processor

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{OcioError, OcioResult};
use exrjpg_lut::Interpolation;

/// Transform application direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformDirection {
    /// Forward transform.
    #[default]
    Forward,
    /// Inverse transform.
    Inverse,
}

impl TransformDirection {
    /// Returns the opposite direction.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }

    /// Combines two directions (inverse of inverse is forward).
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        if self == other { Self::Forward } else { Self::Inverse }
    }

    fn parse(s: Option<&str>) -> OcioResult<Self> {
        match s.map(str::to_ascii_lowercase).as_deref() {
            None | Some("forward") => Ok(Self::Forward),
            Some("inverse") => Ok(Self::Inverse),
            Some(other) => Err(OcioError::invalid(format!("unknown direction '{}'", other))),
        }
    }
}

/// How power functions treat negative input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeStyle {
    /// Negatives become zero.
    #[default]
    Clamp,
    /// `sign(x) * f(|x|)`.
    Mirror,
    /// Negatives pass through unchanged.
    PassThru,
    /// The linear segment continues below zero.
    Linear,
}

impl NegativeStyle {
    fn parse(s: &str) -> OcioResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "mirror" => Ok(Self::Mirror),
            "pass_thru" | "passthru" => Ok(Self::PassThru),
            "linear" => Ok(Self::Linear),
            other => Err(OcioError::invalid(format!("unknown negative_style '{}'", other))),
        }
    }
}

/// Allocation variant of an [`AllocationTransform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Allocation {
    /// Linear remap of `[min, max]` onto `[0, 1]`.
    #[default]
    Uniform,
    /// `log2(x + offset)` remapped from `[min, max]` onto `[0, 1]`.
    Lg2,
}

/// Color transform definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// 4x4 matrix plus offset.
    Matrix(MatrixTransform),
    /// Pure power function.
    Exponent(ExponentTransform),
    /// Power function with a linear toe (sRGB-style).
    ExponentWithLinear(ExponentWithLinearTransform),
    /// Logarithm in a given base.
    Log(LogTransform),
    /// Affine remap with optional clamping.
    Range(RangeTransform),
    /// Uniform or log2 allocation.
    Allocation(AllocationTransform),
    /// LUT or matrix stored in a file.
    File(FileTransform),
    /// Conversion between two named color spaces.
    ColorSpace(ColorSpaceTransform),
    /// Ordered chain of transforms.
    Group(GroupTransform),
}

/// `MatrixTransform`: `out = M * in + offset`, row-major 4x4.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixTransform {
    /// Row-major 4x4 matrix.
    pub matrix: [f64; 16],
    /// RGBA offset.
    pub offset: [f64; 4],
    /// Direction.
    pub direction: TransformDirection,
}

/// `ExponentTransform`: `out = in ^ value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentTransform {
    /// RGBA exponents.
    pub value: [f64; 4],
    /// Negative handling.
    pub negative_style: NegativeStyle,
    /// Direction.
    pub direction: TransformDirection,
}

/// `ExponentWithLinearTransform`.
///
/// Forward maps encoded values to linear, as in OCIO.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentWithLinearTransform {
    /// RGBA exponents.
    pub gamma: [f64; 4],
    /// RGBA offsets.
    pub offset: [f64; 4],
    /// Negative handling (`Linear` or `Mirror`).
    pub negative_style: NegativeStyle,
    /// Direction.
    pub direction: TransformDirection,
}

/// `LogTransform`: forward is `log_base(in)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogTransform {
    /// Logarithm base.
    pub base: f64,
    /// Direction.
    pub direction: TransformDirection,
}

/// `RangeTransform`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTransform {
    /// Input lower bound.
    pub min_in: Option<f64>,
    /// Input upper bound.
    pub max_in: Option<f64>,
    /// Output lower bound.
    pub min_out: Option<f64>,
    /// Output upper bound.
    pub max_out: Option<f64>,
    /// Clamp to the output bounds.
    pub clamp: bool,
    /// Direction.
    pub direction: TransformDirection,
}

/// `AllocationTransform`.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationTransform {
    /// Allocation type.
    pub allocation: Allocation,
    /// `[min, max]` or `[min, max, offset]`.
    pub vars: Vec<f64>,
    /// Direction.
    pub direction: TransformDirection,
}

/// `FileTransform`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTransform {
    /// File name, resolved against the config search path.
    pub src: String,
    /// Interpolation for cubes.
    pub interpolation: Interpolation,
    /// Direction.
    pub direction: TransformDirection,
}

/// `ColorSpaceTransform`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpaceTransform {
    /// Source color space.
    pub src: String,
    /// Destination color space.
    pub dst: String,
    /// Direction.
    pub direction: TransformDirection,
}

/// `GroupTransform`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTransform {
    /// Children, applied in order.
    pub children: Vec<Transform>,
    /// Direction.
    pub direction: TransformDirection,
}

impl Transform {
    /// Creates a forward matrix transform from a row-major 3x3.
    pub fn matrix3(m: [[f64; 3]; 3]) -> Self {
        let mut matrix = [0.0; 16];
        for (r, row) in m.iter().enumerate() {
            matrix[r * 4..r * 4 + 3].copy_from_slice(row);
        }
        matrix[15] = 1.0;
        Self::Matrix(MatrixTransform {
            matrix,
            offset: [0.0; 4],
            direction: TransformDirection::Forward,
        })
    }

    /// Creates a forward group.
    pub fn group(children: Vec<Transform>) -> Self {
        Self::Group(GroupTransform {
            children,
            direction: TransformDirection::Forward,
        })
    }

    /// Returns the direction field of this transform.
    pub fn direction(&self) -> TransformDirection {
        match self {
            Self::Matrix(t) => t.direction,
            Self::Exponent(t) => t.direction,
            Self::ExponentWithLinear(t) => t.direction,
            Self::Log(t) => t.direction,
            Self::Range(t) => t.direction,
            Self::Allocation(t) => t.direction,
            Self::File(t) => t.direction,
            Self::ColorSpace(t) => t.direction,
            Self::Group(t) => t.direction,
        }
    }

    /// Returns the inverse of this transform.
    pub fn inverse(mut self) -> Self {
        let dir = match &mut self {
            Self::Matrix(t) => &mut t.direction,
            Self::Exponent(t) => &mut t.direction,
            Self::ExponentWithLinear(t) => &mut t.direction,
            Self::Log(t) => &mut t.direction,
            Self::Range(t) => &mut t.direction,
            Self::Allocation(t) => &mut t.direction,
            Self::File(t) => &mut t.direction,
            Self::ColorSpace(t) => &mut t.direction,
            Self::Group(t) => &mut t.direction,
        };
        *dir = dir.inverse();
        self
    }

    /// Short type name, as written in configs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Matrix(_) => "MatrixTransform",
            Self::Exponent(_) => "ExponentTransform",
            Self::ExponentWithLinear(_) => "ExponentWithLinearTransform",
            Self::Log(_) => "LogTransform",
            Self::Range(_) => "RangeTransform",
            Self::Allocation(_) => "AllocationTransform",
            Self::File(_) => "FileTransform",
            Self::ColorSpace(_) => "ColorSpaceTransform",
            Self::Group(_) => "GroupTransform",
        }
    }
}

// ============================================================================
// YAML parsing
// ============================================================================

/// Parses a transform node. A bare sequence is an implicit group.
pub(crate) fn parse_transform(value: &Value) -> OcioResult<Transform> {
    match value {
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            parse_tagged(tag.trim_start_matches('!'), &tagged.value)
        }
        Value::Sequence(items) => Ok(Transform::group(
            items.iter().map(parse_transform).collect::<OcioResult<_>>()?,
        )),
        other => Err(OcioError::invalid(format!(
            "expected a tagged transform, got {}",
            describe(other)
        ))),
    }
}

fn parse_tagged(tag: &str, body: &Value) -> OcioResult<Transform> {
    let body = match body {
        Value::Null => Value::Mapping(Default::default()),
        other => other.clone(),
    };
    let fields = |e: serde_yaml::Error| OcioError::invalid(format!("{}: {}", tag, e));

    Ok(match tag {
        "MatrixTransform" => {
            let raw: RawMatrix = serde_yaml::from_value(body).map_err(fields)?;
            let matrix = match raw.matrix {
                Some(m) => fixed::<16>(tag, "matrix", &m)?,
                None => IDENTITY4,
            };
            let offset = match raw.offset {
                Some(o) => fixed::<4>(tag, "offset", &o)?,
                None => [0.0; 4],
            };
            Transform::Matrix(MatrixTransform {
                matrix,
                offset,
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        "ExponentTransform" => {
            let raw: RawExponent = serde_yaml::from_value(body).map_err(fields)?;
            Transform::Exponent(ExponentTransform {
                value: raw.value.rgba(tag, "value", 1.0)?,
                negative_style: match raw.style.as_deref() {
                    Some(s) => NegativeStyle::parse(s)?,
                    None => NegativeStyle::Clamp,
                },
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        "ExponentWithLinearTransform" => {
            let raw: RawExponentWithLinear = serde_yaml::from_value(body).map_err(fields)?;
            let negative_style = match raw.style.as_deref() {
                Some(s) => NegativeStyle::parse(s)?,
                None => NegativeStyle::Linear,
            };
            if !matches!(negative_style, NegativeStyle::Linear | NegativeStyle::Mirror) {
                return Err(OcioError::invalid(format!(
                    "{} supports negative_style linear or mirror",
                    tag
                )));
            }
            let gamma = raw.gamma.rgba(tag, "gamma", 1.0)?;
            let offset = raw.offset.rgba(tag, "offset", 0.0)?;
            if gamma[..3].iter().any(|&g| g <= 1.0) || offset[..3].iter().any(|&o| o <= 0.0) {
                return Err(OcioError::invalid(format!(
                    "{} needs gamma > 1 and offset > 0",
                    tag
                )));
            }
            Transform::ExponentWithLinear(ExponentWithLinearTransform {
                gamma,
                offset,
                negative_style,
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        "LogTransform" => {
            let raw: RawLog = serde_yaml::from_value(body).map_err(fields)?;
            let base = raw.base.unwrap_or(2.0);
            if base <= 0.0 || base == 1.0 {
                return Err(OcioError::invalid(format!("{}: invalid base {}", tag, base)));
            }
            Transform::Log(LogTransform {
                base,
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        "RangeTransform" => {
            let raw: RawRange = serde_yaml::from_value(body).map_err(fields)?;
            let t = RangeTransform {
                min_in: raw.min_in_value,
                max_in: raw.max_in_value,
                min_out: raw.min_out_value,
                max_out: raw.max_out_value,
                clamp: !matches!(raw.style.as_deref(), Some(s) if s.eq_ignore_ascii_case("noclamp")),
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            };
            validate_range(&t)?;
            Transform::Range(t)
        }
        "AllocationTransform" => {
            let raw: RawAllocation = serde_yaml::from_value(body).map_err(fields)?;
            let allocation = match raw.allocation.as_deref().map(str::to_ascii_lowercase).as_deref() {
                None | Some("uniform") => Allocation::Uniform,
                Some("lg2") => Allocation::Lg2,
                Some(other) => {
                    return Err(OcioError::invalid(format!("unknown allocation '{}'", other)));
                }
            };
            let vars = raw.vars.unwrap_or_else(|| match allocation {
                Allocation::Uniform => vec![0.0, 1.0],
                Allocation::Lg2 => vec![-10.0, 6.0],
            });
            if !(2..=3).contains(&vars.len()) || vars[1] <= vars[0] {
                return Err(OcioError::invalid(format!(
                    "{}: vars must be [min, max] or [min, max, offset] with max > min",
                    tag
                )));
            }
            Transform::Allocation(AllocationTransform {
                allocation,
                vars,
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        "FileTransform" => {
            let raw: RawFile = serde_yaml::from_value(body).map_err(fields)?;
            Transform::File(FileTransform {
                src: raw.src,
                interpolation: raw
                    .interpolation
                    .as_deref()
                    .map(Interpolation::parse)
                    .unwrap_or_default(),
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        "ColorSpaceTransform" => {
            let raw: RawColorSpaceTransform = serde_yaml::from_value(body).map_err(fields)?;
            Transform::ColorSpace(ColorSpaceTransform {
                src: raw.src,
                dst: raw.dst,
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        "GroupTransform" => {
            let raw: RawGroup = serde_yaml::from_value(body).map_err(fields)?;
            Transform::Group(GroupTransform {
                children: raw.children.iter().map(parse_transform).collect::<OcioResult<_>>()?,
                direction: TransformDirection::parse(raw.direction.as_deref())?,
            })
        }
        other => return Err(OcioError::invalid(format!("unsupported transform '{}'", other))),
    })
}

const IDENTITY4: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

fn fixed<const N: usize>(tag: &str, field: &str, v: &[f64]) -> OcioResult<[f64; N]> {
    <[f64; N]>::try_from(v).map_err(|_| {
        OcioError::invalid(format!("{}: {} needs {} values, got {}", tag, field, N, v.len()))
    })
}

fn validate_range(t: &RangeTransform) -> OcioResult<()> {
    let lower = (t.min_in, t.min_out);
    let upper = (t.max_in, t.max_out);
    let paired = |p: (Option<f64>, Option<f64>)| p.0.is_some() == p.1.is_some();
    if !paired(lower) || !paired(upper) {
        return Err(OcioError::invalid("RangeTransform: in/out bounds must be given in pairs"));
    }
    if t.min_in.is_none() && t.max_in.is_none() {
        return Err(OcioError::invalid("RangeTransform: no bounds given"));
    }
    if let (Some(a), Some(b)) = (t.min_in, t.max_in) {
        if a == b {
            return Err(OcioError::invalid("RangeTransform: empty input range"));
        }
    }
    Ok(())
}

fn describe(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "an untagged mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// One number or an RGBA list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalars {
    One(f64),
    Many(Vec<f64>),
}

trait ScalarsExt {
    fn rgba(self, tag: &str, field: &str, alpha: f64) -> OcioResult<[f64; 4]>;
}

impl ScalarsExt for Option<Scalars> {
    fn rgba(self, tag: &str, field: &str, alpha: f64) -> OcioResult<[f64; 4]> {
        match self {
            None => Err(OcioError::invalid(format!("{}: missing {}", tag, field))),
            Some(Scalars::One(v)) => Ok([v, v, v, alpha]),
            Some(Scalars::Many(v)) if v.len() == 3 => Ok([v[0], v[1], v[2], alpha]),
            Some(Scalars::Many(v)) => fixed::<4>(tag, field, &v),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawMatrix {
    matrix: Option<Vec<f64>>,
    offset: Option<Vec<f64>>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawExponent {
    value: Option<Scalars>,
    style: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawExponentWithLinear {
    gamma: Option<Scalars>,
    offset: Option<Scalars>,
    style: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawLog {
    base: Option<f64>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawRange {
    min_in_value: Option<f64>,
    max_in_value: Option<f64>,
    min_out_value: Option<f64>,
    max_out_value: Option<f64>,
    style: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawAllocation {
    allocation: Option<String>,
    vars: Option<Vec<f64>>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    src: String,
    interpolation: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawColorSpaceTransform {
    src: String,
    dst: String,
    direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGroup {
    children: Vec<Value>,
    direction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> OcioResult<Transform> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        parse_transform(&value)
    }

    #[test]
    fn matrix_defaults() {
        let t = parse("!MatrixTransform {offset: [0.1, 0, 0, 0]}").unwrap();
        let Transform::Matrix(m) = t else { panic!("expected matrix") };
        assert_eq!(m.matrix, IDENTITY4);
        assert_eq!(m.offset[0], 0.1);
        assert_eq!(m.direction, TransformDirection::Forward);
    }

    #[test]
    fn exponent_scalar_and_list() {
        let t = parse("!ExponentTransform {value: 2.2}").unwrap();
        let Transform::Exponent(e) = t else { panic!() };
        assert_eq!(e.value, [2.2, 2.2, 2.2, 1.0]);

        let t = parse("!ExponentTransform {value: [1.8, 2.0, 2.2, 1], direction: inverse}").unwrap();
        assert_eq!(t.direction(), TransformDirection::Inverse);
    }

    #[test]
    fn group_children_parsed() {
        let t = parse(
            "!GroupTransform\nchildren:\n  - !LogTransform {base: 10}\n  - !FileTransform {src: a.spi1d, interpolation: nearest}\n",
        )
        .unwrap();
        let Transform::Group(g) = t else { panic!() };
        assert_eq!(g.children.len(), 2);
        assert_eq!(g.children[1].kind(), "FileTransform");
    }

    #[test]
    fn bare_sequence_is_group() {
        let t = parse("[!LogTransform {}, !LogTransform {direction: inverse}]").unwrap();
        assert_eq!(t.kind(), "GroupTransform");
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = parse("!CDLTransform {slope: [1, 1, 1]}").unwrap_err();
        assert!(matches!(err, OcioError::InvalidTransform { .. }));
    }

    #[test]
    fn bad_direction_rejected() {
        assert!(parse("!LogTransform {direction: sideways}").is_err());
    }

    #[test]
    fn range_needs_pairs() {
        assert!(parse("!RangeTransform {min_in_value: 0}").is_err());
        assert!(parse("!RangeTransform {min_in_value: 0, min_out_value: 0}").is_ok());
    }

    #[test]
    fn inverse_flips_direction() {
        let t = parse("!LogTransform {}").unwrap().inverse();
        assert_eq!(t.direction(), TransformDirection::Inverse);
        assert_eq!(t.inverse().direction(), TransformDirection::Forward);
    }
}
