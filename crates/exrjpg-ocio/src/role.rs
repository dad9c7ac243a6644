//! Color space roles.
//!
//! Roles name a color space by purpose (`scene_linear`, `reference`, ...)
//! so callers can ask for "the working space" without knowing what a given
//! config calls it.

use std::collections::BTreeMap;

/// Standard OCIO role names.
pub mod names {
    /// Reference space of the config.
    pub const REFERENCE: &str = "reference";
    /// Default input color space.
    pub const DEFAULT: &str = "default";
    /// Non-color data.
    pub const DATA: &str = "data";
    /// Scene-referred linear working space.
    pub const SCENE_LINEAR: &str = "scene_linear";
    /// Rendering space.
    pub const RENDERING: &str = "rendering";
    /// Log compositing space.
    pub const COMPOSITING_LOG: &str = "compositing_log";
    /// Color grading space.
    pub const COLOR_TIMING: &str = "color_timing";
    /// ACES interchange space.
    pub const ACES_INTERCHANGE: &str = "aces_interchange";
}

/// Role to color space mapping, sorted by role name.
#[derive(Debug, Clone, Default)]
pub struct Roles {
    mapping: BTreeMap<String, String>,
}

impl Roles {
    /// Creates an empty mapping.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `role` to `colorspace`, replacing any previous mapping.
    #[inline]
    pub fn define(&mut self, role: impl Into<String>, colorspace: impl Into<String>) {
        self.mapping.insert(role.into(), colorspace.into());
    }

    /// Color space name for a role. Role names compare case-insensitively.
    pub fn get(&self, role: &str) -> Option<&str> {
        self.mapping
            .get(role)
            .or_else(|| {
                self.mapping
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(role))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// True if the role is defined.
    #[inline]
    pub fn contains(&self, role: &str) -> bool {
        self.get(role).is_some()
    }

    /// Iterates `(role, colorspace)` pairs in role order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mapping.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of defined roles.
    #[inline]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// True if no roles are defined.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let mut roles = Roles::new();
        roles.define(names::SCENE_LINEAR, "ACES - ACEScg");
        roles.define(names::REFERENCE, "ACES - ACES2065-1");

        assert_eq!(roles.get("scene_linear"), Some("ACES - ACEScg"));
        assert_eq!(roles.get("SCENE_LINEAR"), Some("ACES - ACEScg"));
        assert_eq!(roles.get("texture_paint"), None);
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn iter_sorted() {
        let mut roles = Roles::new();
        roles.define("rendering", "b");
        roles.define("data", "a");
        let keys: Vec<_> = roles.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["data", "rendering"]);
    }
}
