//! Adobe/Resolve `.cube` LUT format.
//!
//! ```text
//! TITLE "ACEScg to sRGB"
//! LUT_3D_SIZE 33
//! DOMAIN_MIN 0.0 0.0 0.0
//! DOMAIN_MAX 1.0 1.0 1.0
//! 0.0 0.0 0.0
//! ...
//! ```
//!
//! Both the Adobe keywords (`DOMAIN_MIN`/`DOMAIN_MAX`) and the Resolve
//! ones (`LUT_1D_INPUT_RANGE`/`LUT_3D_INPUT_RANGE`) are accepted. A file
//! declaring both sizes is a Resolve shaper + cube pair.

use crate::{LutError, LutFile, LutResult, Lut1D, Lut3D};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads a `.cube` file.
pub fn read_cube<P: AsRef<Path>>(path: P) -> LutResult<LutFile> {
    parse_cube(BufReader::new(File::open(path.as_ref())?))
}

/// Parses `.cube` text from a reader.
pub fn parse_cube<R: BufRead>(reader: R) -> LutResult<LutFile> {
    let mut size_1d: Option<usize> = None;
    let mut size_3d: Option<usize> = None;
    let mut domain_min = [0.0f32; 3];
    let mut domain_max = [1.0f32; 3];
    let mut range_1d: Option<(f32, f32)> = None;
    let mut range_3d: Option<(f32, f32)> = None;
    let mut rows: Vec<[f32; 3]> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else { continue };
        let rest: Vec<&str> = parts.collect();
        match key {
            "TITLE" => {}
            "LUT_1D_SIZE" => size_1d = Some(parse_size(&rest)?),
            "LUT_3D_SIZE" => size_3d = Some(parse_size(&rest)?),
            "DOMAIN_MIN" => domain_min = parse_triplet(&rest)?,
            "DOMAIN_MAX" => domain_max = parse_triplet(&rest)?,
            "LUT_1D_INPUT_RANGE" => range_1d = Some(parse_pair(&rest)?),
            "LUT_3D_INPUT_RANGE" => range_3d = Some(parse_pair(&rest)?),
            _ => {
                let mut values = vec![key];
                values.extend(rest);
                rows.push(parse_triplet(&values)?);
            }
        }
    }

    let expect = size_1d.unwrap_or(0) + size_3d.map(|s| s * s * s).unwrap_or(0);
    if expect == 0 {
        return Err(LutError::ParseError("missing LUT_1D_SIZE or LUT_3D_SIZE".into()));
    }
    if rows.len() != expect {
        return Err(LutError::ParseError(format!(
            "expected {} entries, found {}",
            expect,
            rows.len()
        )));
    }

    let shaper = match size_1d {
        Some(n) => {
            let (min, max) = match range_1d {
                Some((lo, hi)) => ([lo; 3], [hi; 3]),
                None => (domain_min, domain_max),
            };
            let curve = &rows[..n];
            Some(Lut1D::from_rgb(
                curve.iter().map(|p| p[0]).collect(),
                curve.iter().map(|p| p[1]).collect(),
                curve.iter().map(|p| p[2]).collect(),
                min,
                max,
            )?)
        }
        None => None,
    };

    let cube = match size_3d {
        Some(n) => {
            let (min, max) = match range_3d {
                Some((lo, hi)) => ([lo; 3], [hi; 3]),
                // With a shaper in front, the cube sees the shaper's output range.
                None if shaper.is_some() => ([0.0; 3], [1.0; 3]),
                None => (domain_min, domain_max),
            };
            let start = size_1d.unwrap_or(0);
            Some(Lut3D::from_data(rows[start..].to_vec(), n)?.with_domain(min, max))
        }
        None => None,
    };

    match (shaper, cube) {
        (Some(shaper), Some(cube)) => Ok(LutFile::Shaped { shaper, cube }),
        (Some(lut), None) => Ok(LutFile::OneD(lut)),
        (None, Some(lut)) => Ok(LutFile::ThreeD(lut)),
        (None, None) => Err(LutError::ParseError("empty cube file".into())),
    }
}

fn parse_size(parts: &[&str]) -> LutResult<usize> {
    let s = parts.first().ok_or_else(|| LutError::ParseError("missing size".into()))?;
    let n: usize = s
        .parse()
        .map_err(|_| LutError::ParseError(format!("invalid size '{}'", s)))?;
    if n < 2 {
        return Err(LutError::InvalidSize(format!("cube size must be >= 2, got {}", n)));
    }
    Ok(n)
}

fn parse_f32(s: &str) -> LutResult<f32> {
    s.parse()
        .map_err(|_| LutError::ParseError(format!("invalid number '{}'", s)))
}

fn parse_pair(parts: &[&str]) -> LutResult<(f32, f32)> {
    if parts.len() != 2 {
        return Err(LutError::ParseError(format!("expected 2 values, got {}", parts.len())));
    }
    Ok((parse_f32(parts[0])?, parse_f32(parts[1])?))
}

fn parse_triplet(parts: &[&str]) -> LutResult<[f32; 3]> {
    if parts.len() != 3 {
        return Err(LutError::ParseError(format!(
            "expected 3 values, got '{}'",
            parts.join(" ")
        )));
    }
    Ok([parse_f32(parts[0])?, parse_f32(parts[1])?, parse_f32(parts[2])?])
}
