//! OCIO configuration file parsing and management.
//!
//! Loads `.ocio` YAML files (profile versions 1 and 2). Only the keys
//! needed to convert between color spaces are interpreted; everything else
//! in the file is ignored.
//!
//! # Example
//!
//! ```ignore
//! use exrjpg_ocio::Config;
//!
//! let config = Config::from_file("aces_1.2/config.ocio")?;
//! let proc = config.processor("ACES - ACEScg", "Output - sRGB")?;
//! proc.apply_rgb(&mut pixels);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, info, trace};

use crate::colorspace::ColorSpace;
use crate::display::{Display, DisplayManager, View};
use crate::error::{OcioError, OcioResult};
use crate::processor::{Compiler, Processor};
use crate::role::Roles;
use crate::transform::{parse_transform, Transform, TransformDirection};

/// Environment variable naming the default config.
pub const OCIO_ENV: &str = "OCIO";

/// Config format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigVersion {
    /// OCIO v1.x.
    #[default]
    V1,
    /// OCIO v2.x.
    V2,
}

/// OCIO configuration.
#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    description: String,
    version: ConfigVersion,
    working_dir: PathBuf,
    search_paths: Vec<PathBuf>,
    colorspaces: Vec<ColorSpace>,
    roles: Roles,
    displays: DisplayManager,
    active_displays: Vec<String>,
    active_views: Vec<String>,
}

impl Config {
    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> OcioResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OcioError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let working_dir = path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let config = Self::from_yaml_str(&content, working_dir)?;
        info!(
            path = %path.display(),
            colorspaces = config.colorspaces.len(),
            "loaded OCIO config"
        );
        Ok(config)
    }

    /// Loads the config named by the `OCIO` environment variable.
    pub fn from_env() -> OcioResult<Self> {
        match std::env::var_os(OCIO_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(PathBuf::from(path)),
            _ => Err(OcioError::EnvNotSet { var: OCIO_ENV }),
        }
    }

    /// Parses configuration from YAML text. Relative LUT paths resolve
    /// against `working_dir`.
    pub fn from_yaml_str(yaml: &str, working_dir: PathBuf) -> OcioResult<Self> {
        // serde_yaml drops verbatim tags (`!<Name>`); rewrite them as local tags.
        let tags = Regex::new(r"!<([A-Za-z0-9_]+)>")
            .map_err(|e| OcioError::invalid(e.to_string()))?;
        let normalized = tags.replace_all(yaml, "!$1");

        let mut doc: Value = serde_yaml::from_str(&normalized)?;
        strip_structural_tags(&mut doc);
        let raw: RawConfig = serde_yaml::from_value(doc)?;
        Self::from_raw(raw, working_dir)
    }

    fn from_raw(raw: RawConfig, working_dir: PathBuf) -> OcioResult<Self> {
        let version_str = match &raw.ocio_profile_version {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => String::from("<missing>"),
        };
        let version = match version_str.chars().next() {
            Some('1') => ConfigVersion::V1,
            Some('2') => ConfigVersion::V2,
            _ => return Err(OcioError::UnsupportedVersion { version: version_str }),
        };

        let search_paths: Vec<PathBuf> = match &raw.search_path {
            Some(Value::String(s)) => s.split(':').map(str::to_string).collect::<Vec<_>>(),
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(|p| working_dir.join(p))
        .collect();

        let mut roles = Roles::new();
        for (role, cs) in raw.roles {
            roles.define(role, cs);
        }

        let mut colorspaces = Vec::with_capacity(raw.colorspaces.len());
        for raw_cs in raw.colorspaces {
            colorspaces.push(parse_colorspace(raw_cs)?);
        }

        let mut displays = DisplayManager::new();
        for (name, views) in raw.displays.iter() {
            let Some(name) = name.as_str() else { continue };
            let mut display = Display::new(name);
            // v2 entries may be shared-view lists or views built from a
            // view transform; only views naming a colorspace are kept.
            for item in views.as_sequence().into_iter().flatten() {
                if !item.is_mapping() {
                    continue;
                }
                let view: RawView = serde_yaml::from_value(item.clone())?;
                match view.colorspace {
                    Some(cs) => display.add_view(View::new(view.name, cs)),
                    None => trace!(display = name, view = %view.name, "skipping view without colorspace"),
                }
            }
            displays.add_display(display);
        }

        let config = Self {
            name: raw.name.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            version,
            working_dir,
            search_paths,
            colorspaces,
            roles,
            displays,
            active_displays: split_list(raw.active_displays),
            active_views: split_list(raw.active_views),
        };
        debug!(
            version = ?config.version,
            roles = config.roles.len(),
            displays = config.displays.displays().len(),
            "parsed OCIO config"
        );
        Ok(config)
    }

    /// Config name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Config description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Profile version.
    pub fn version(&self) -> ConfigVersion {
        self.version
    }

    /// Directory relative paths resolve against.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// LUT search directories, already joined to the working dir.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// All color spaces in config order.
    pub fn colorspaces(&self) -> &[ColorSpace] {
        &self.colorspaces
    }

    /// Color space names in config order.
    pub fn colorspace_names(&self) -> impl Iterator<Item = &str> {
        self.colorspaces.iter().map(ColorSpace::name)
    }

    /// Role mapping.
    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    /// Displays and views.
    pub fn displays(&self) -> &DisplayManager {
        &self.displays
    }

    /// `active_displays`, if the config restricts them.
    pub fn active_displays(&self) -> &[String] {
        &self.active_displays
    }

    /// `active_views`, if the config restricts them.
    pub fn active_views(&self) -> &[String] {
        &self.active_views
    }

    /// First active display, or the first display.
    pub fn default_display(&self) -> Option<&str> {
        self.active_displays
            .iter()
            .find_map(|n| self.displays.display(n))
            .or_else(|| self.displays.displays().first())
            .map(Display::name)
    }

    /// Looks up a color space.
    ///
    /// Tries, in order: exact name, alias, role, case-insensitive name.
    pub fn colorspace(&self, name: &str) -> Option<&ColorSpace> {
        self.colorspaces
            .iter()
            .find(|cs| cs.name() == name)
            .or_else(|| self.colorspaces.iter().find(|cs| cs.has_alias(name)))
            .or_else(|| {
                let target = self.roles.get(name)?;
                self.colorspaces
                    .iter()
                    .find(|cs| cs.name() == target || cs.has_alias(target))
            })
            .or_else(|| {
                self.colorspaces
                    .iter()
                    .find(|cs| cs.name().eq_ignore_ascii_case(name))
            })
    }

    pub(crate) fn require_colorspace(&self, name: &str) -> OcioResult<&ColorSpace> {
        self.colorspace(name)
            .ok_or_else(|| OcioError::ColorSpaceNotFound { name: name.into() })
    }

    /// Creates a processor converting `src` to `dst`.
    pub fn processor(&self, src: &str, dst: &str) -> OcioResult<Processor> {
        debug!(src, dst, "building processor");
        let mut compiler = Compiler::new(self);
        compiler.colorspaces(src, dst)?;
        Ok(compiler.finish())
    }

    /// Creates a processor from `src` to the color space of a display view.
    ///
    /// `view = None` picks the display's first view.
    pub fn display_processor(
        &self,
        src: &str,
        display: &str,
        view: Option<&str>,
    ) -> OcioResult<Processor> {
        let disp = self
            .displays
            .display(display)
            .ok_or_else(|| OcioError::DisplayNotFound { name: display.into() })?;
        let v = match view {
            Some(name) => disp.view(name),
            None => disp.default_view(),
        }
        .ok_or_else(|| OcioError::ViewNotFound {
            display: display.into(),
            view: view.unwrap_or_default().into(),
        })?;
        self.processor(src, v.colorspace())
    }

    /// Compiles a standalone transform against this config.
    pub fn transform_processor(
        &self,
        transform: &Transform,
        direction: TransformDirection,
    ) -> OcioResult<Processor> {
        let mut compiler = Compiler::new(self);
        compiler.transform(transform, direction)?;
        Ok(compiler.finish())
    }

    /// Resolves a LUT file name against the search paths.
    pub fn resolve_file(&self, filename: &str) -> OcioResult<PathBuf> {
        let path = PathBuf::from(filename);
        if path.is_absolute() {
            return if path.is_file() {
                Ok(path)
            } else {
                Err(OcioError::TransformFileNotFound { path })
            };
        }
        self.search_paths
            .iter()
            .chain(std::iter::once(&self.working_dir))
            .map(|dir| dir.join(&path))
            .find(|p| p.is_file())
            .ok_or_else(|| OcioError::TransformFileNotFound {
                path: self.working_dir.join(&path),
            })
    }
}

/// Unwraps tags such as `!ColorSpace` or `!View`, keeping `*Transform`
/// tags so transforms can be told apart.
fn strip_structural_tags(value: &mut Value) {
    match value {
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!');
            strip_structural_tags(&mut tagged.value);
            if !name.ends_with("Transform") || name == "ViewTransform" {
                let inner = std::mem::replace(&mut tagged.value, Value::Null);
                *value = inner;
            }
        }
        Value::Sequence(items) => items.iter_mut().for_each(strip_structural_tags),
        Value::Mapping(map) => map.values_mut().for_each(strip_structural_tags),
        _ => {}
    }
}

fn parse_colorspace(raw: RawColorSpace) -> OcioResult<ColorSpace> {
    let mut builder = ColorSpace::builder(&raw.name)
        .family(raw.family.unwrap_or_default())
        .description(raw.description.unwrap_or_default())
        .is_data(raw.isdata);
    for alias in raw.aliases {
        builder = builder.alias(alias);
    }

    let context = |e: OcioError| match e {
        OcioError::InvalidTransform { reason } => OcioError::InvalidTransform {
            reason: format!("color space '{}': {}", raw.name, reason),
        },
        other => other,
    };
    if let Some(v) = raw.to_reference.or(raw.to_scene_reference) {
        builder = builder.to_reference(parse_transform(&v).map_err(context)?);
    }
    if let Some(v) = raw.from_reference.or(raw.from_scene_reference) {
        builder = builder.from_reference(parse_transform(&v).map_err(context)?);
    }
    Ok(builder.build())
}

/// `active_displays` may be a list or a comma-separated string.
fn split_list(v: Option<Value>) -> Vec<String> {
    match v {
        Some(Value::Sequence(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Raw YAML structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    ocio_profile_version: Option<Value>,
    name: Option<String>,
    description: Option<String>,
    search_path: Option<Value>,
    #[serde(default)]
    roles: BTreeMap<String, String>,
    #[serde(default)]
    colorspaces: Vec<RawColorSpace>,
    #[serde(default)]
    displays: serde_yaml::Mapping,
    active_displays: Option<Value>,
    active_views: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawColorSpace {
    name: String,
    description: Option<String>,
    family: Option<String>,
    #[serde(default)]
    isdata: bool,
    #[serde(default)]
    aliases: Vec<String>,
    to_reference: Option<Value>,
    from_reference: Option<Value>,
    to_scene_reference: Option<Value>,
    from_scene_reference: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawView {
    name: String,
    colorspace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_CONFIG: &str = r#"
ocio_profile_version: 2

roles:
  reference: Linear
  scene_linear: Linear

colorspaces:
  - !<ColorSpace>
    name: Linear
    family: Scene
    aliases: [lin]
    description: Linear reference

  - !<ColorSpace>
    name: Gamma22
    family: Display
    from_reference: !<ExponentTransform> {value: [2.2, 2.2, 2.2, 1], direction: inverse}

  - !<ColorSpace>
    name: Data
    isdata: true

displays:
  Monitor:
    - !<View> {name: Gamma, colorspace: Gamma22}
    - !<View> {name: Raw, colorspace: Linear}
"#;

    fn config() -> Config {
        Config::from_yaml_str(MINIMAL_CONFIG, PathBuf::from(".")).unwrap()
    }

    #[test]
    fn parse_minimal_config() {
        let config = config();
        assert_eq!(config.version(), ConfigVersion::V2);
        assert_eq!(config.colorspaces().len(), 3);
        assert_eq!(config.colorspace_names().collect::<Vec<_>>(), ["Linear", "Gamma22", "Data"]);
    }

    #[test]
    fn lookup_order() {
        let config = config();
        assert_eq!(config.colorspace("lin").map(ColorSpace::name), Some("Linear"));
        assert_eq!(config.colorspace("scene_linear").map(ColorSpace::name), Some("Linear"));
        assert_eq!(config.colorspace("gamma22").map(ColorSpace::name), Some("Gamma22"));
        assert!(config.colorspace("sRGB").is_none());
    }

    #[test]
    fn displays_parsed() {
        let config = config();
        assert_eq!(config.default_display(), Some("Monitor"));
        let display = config.displays().display("Monitor").unwrap();
        assert_eq!(display.views().len(), 2);
        assert_eq!(display.default_view().map(View::colorspace), Some("Gamma22"));
    }

    #[test]
    fn create_processor() {
        let config = config();
        let proc = config.processor("Linear", "Gamma22").unwrap();
        assert_eq!(proc.num_ops(), 1);
        let out = proc.apply([0.5, 0.5, 0.5]);
        assert!((out[0] - 0.5f32.powf(1.0 / 2.2)).abs() < 1e-6);
    }

    #[test]
    fn data_space_is_identity() {
        let config = config();
        assert!(config.processor("Gamma22", "Data").unwrap().is_identity());
    }

    #[test]
    fn colorspace_not_found() {
        let err = config().processor("Linear", "Nope").unwrap_err();
        assert!(matches!(err, OcioError::ColorSpaceNotFound { name } if name == "Nope"));
    }

    #[test]
    fn version_as_string() {
        let cfg = Config::from_yaml_str("ocio_profile_version: \"1.0\"\n", PathBuf::from(".")).unwrap();
        assert_eq!(cfg.version(), ConfigVersion::V1);

        let err = Config::from_yaml_str("ocio_profile_version: 3\n", PathBuf::from(".")).unwrap_err();
        assert!(matches!(err, OcioError::UnsupportedVersion { .. }));
    }

    #[test]
    fn v2_display_views_without_colorspace() {
        let yaml = r#"
ocio_profile_version: 2.1
colorspaces:
  - !<ColorSpace> {name: ACES - ACEScg}
  - !<ColorSpace> {name: Output - sRGB}
displays:
  sRGB - Display:
    - !<View> {name: ACES 1.0 - SDR Video, view_transform: ACES 1.0 - SDR Video, display_colorspace: <USE_DISPLAY_NAME>}
    - !<Views> [ACES 1.0 - SDR Video, Un-tone-mapped]
    - !<View> {name: Plain, colorspace: Output - sRGB}
"#;
        let cfg = Config::from_yaml_str(yaml, PathBuf::from(".")).unwrap();
        let display = cfg.displays().display("sRGB - Display").unwrap();
        assert_eq!(display.views().len(), 1);
        assert_eq!(display.views()[0].colorspace(), "Output - sRGB");
        assert!(cfg.processor("ACES - ACEScg", "Output - sRGB").is_ok());
    }

    #[test]
    fn missing_file() {
        let err = Config::from_file("/nonexistent/config.ocio").unwrap_err();
        assert!(matches!(err, OcioError::ConfigNotFound { .. }));
    }
}
