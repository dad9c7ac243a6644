//! Displays and views.
//!
//! A display is an output device; each of its views names the color space
//! an image is converted to for that device.
//!
//! ```
//! use exrjpg_ocio::{Display, View};
//!
//! let mut display = Display::new("sRGB");
//! display.add_view(View::new("ACES", "Output - sRGB"));
//! display.add_view(View::new("Raw", "Utility - Raw"));
//!
//! assert_eq!(display.view("aces").map(|v| v.colorspace()), Some("Output - sRGB"));
//! ```

/// A view within a display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    name: String,
    colorspace: String,
}

impl View {
    /// Creates a view targeting `colorspace`.
    pub fn new(name: impl Into<String>, colorspace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colorspace: colorspace.into(),
        }
    }

    /// View name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target color space.
    #[inline]
    pub fn colorspace(&self) -> &str {
        &self.colorspace
    }
}

/// A display device with its views, in config order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    name: String,
    views: Vec<View>,
}

impl Display {
    /// Creates a display with no views.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            views: Vec::new(),
        }
    }

    /// Display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a view.
    pub fn add_view(&mut self, view: View) {
        self.views.push(view);
    }

    /// All views.
    #[inline]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Finds a view by name (case-insensitive).
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// First view, used when none is requested.
    pub fn default_view(&self) -> Option<&View> {
        self.views.first()
    }
}

/// All displays of a config.
#[derive(Debug, Clone, Default)]
pub struct DisplayManager {
    displays: Vec<Display>,
}

impl DisplayManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a display.
    pub fn add_display(&mut self, display: Display) {
        self.displays.push(display);
    }

    /// All displays in config order.
    #[inline]
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// Finds a display by name (case-insensitive).
    pub fn display(&self, name: &str) -> Option<&Display> {
        self.displays.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }
}
