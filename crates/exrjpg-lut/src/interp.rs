//! Interpolation methods for LUT evaluation.

/// Interpolation method for LUT evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Nearest grid point.
    Nearest,
    /// Linear (1D) or trilinear (3D).
    #[default]
    Linear,
    /// Tetrahedral (3D only, falls back to linear for 1D).
    Tetrahedral,
}

impl Interpolation {
    /// Parses an OCIO `interpolation` value. Unknown names map to linear.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Self::Nearest,
            "tetrahedral" | "best" => Self::Tetrahedral,
            _ => Self::Linear,
        }
    }
}
