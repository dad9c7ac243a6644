//! Color space definition.
//!
//! A color space in OCIO is a name plus transforms to and from the config's
//! reference space. The reference space itself has neither.
//!
//! # Example
//!
//! ```
//! use exrjpg_ocio::{ColorSpace, Transform};
//!
//! let cs = ColorSpace::builder("ACES - ACEScg")
//!     .family("ACES")
//!     .alias("acescg")
//!     .to_reference(Transform::matrix3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]))
//!     .build();
//!
//! assert_eq!(cs.name(), "ACES - ACEScg");
//! assert!(cs.has_alias("ACEScg"));
//! ```

use crate::transform::Transform;

/// A named color space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    name: String,
    aliases: Vec<String>,
    family: String,
    description: String,
    is_data: bool,
    to_reference: Option<Transform>,
    from_reference: Option<Transform>,
}

impl ColorSpace {
    /// Starts building a color space.
    pub fn builder(name: impl Into<String>) -> ColorSpaceBuilder {
        ColorSpaceBuilder {
            cs: ColorSpace {
                name: name.into(),
                aliases: Vec::new(),
                family: String::new(),
                description: String::new(),
                is_data: false,
                to_reference: None,
                from_reference: None,
            },
        }
    }

    /// Color space name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names.
    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// True if `name` is one of the aliases (case-insensitive).
    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Family, used for grouping in listings.
    #[inline]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Free-form description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Non-color data; conversions to or from it are identities.
    #[inline]
    pub fn is_data(&self) -> bool {
        self.is_data
    }

    /// Transform to the reference space, as written in the config.
    #[inline]
    pub fn to_reference(&self) -> Option<&Transform> {
        self.to_reference.as_ref()
    }

    /// Transform from the reference space, as written in the config.
    #[inline]
    pub fn from_reference(&self) -> Option<&Transform> {
        self.from_reference.as_ref()
    }

    /// Transform to reference, falling back to the inverse of `from_reference`.
    pub fn to_reference_resolved(&self) -> Option<Transform> {
        self.to_reference
            .clone()
            .or_else(|| self.from_reference.clone().map(Transform::inverse))
    }

    /// Transform from reference, falling back to the inverse of `to_reference`.
    pub fn from_reference_resolved(&self) -> Option<Transform> {
        self.from_reference
            .clone()
            .or_else(|| self.to_reference.clone().map(Transform::inverse))
    }
}

/// Builder for [`ColorSpace`].
#[derive(Debug, Clone)]
pub struct ColorSpaceBuilder {
    cs: ColorSpace,
}

impl ColorSpaceBuilder {
    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.cs.aliases.push(alias.into());
        self
    }

    /// Sets the family.
    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.cs.family = family.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.cs.description = desc.into();
        self
    }

    /// Marks the space as non-color data.
    pub fn is_data(mut self, is_data: bool) -> Self {
        self.cs.is_data = is_data;
        self
    }

    /// Sets the transform to the reference space.
    pub fn to_reference(mut self, t: Transform) -> Self {
        self.cs.to_reference = Some(t);
        self
    }

    /// Sets the transform from the reference space.
    pub fn from_reference(mut self, t: Transform) -> Self {
        self.cs.from_reference = Some(t);
        self
    }

    /// Finishes the color space.
    pub fn build(self) -> ColorSpace {
        self.cs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformDirection;

    #[test]
    fn reference_falls_back_to_inverse() {
        let m = Transform::matrix3([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]]);
        let cs = ColorSpace::builder("lin2x").from_reference(m.clone()).build();

        assert_eq!(cs.from_reference_resolved(), Some(m));
        let to = cs.to_reference_resolved().unwrap();
        assert_eq!(to.direction(), TransformDirection::Inverse);
    }

    #[test]
    fn reference_space_has_no_transforms() {
        let cs = ColorSpace::builder("ACES2065-1").build();
        assert!(cs.to_reference_resolved().is_none());
        assert!(cs.from_reference_resolved().is_none());
    }
}
