//! Configuration types for hfcanvas rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from TOML
//! or any other serde source. Every field is optional; missing values fall back
//! to the built-in workflow style.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining style and canvas settings.
//! - [`StyleConfig`] - Colour and label overrides for the custom shapes.
//! - [`CanvasConfig`] - Viewport size and padding used when fitting the diagram.
//!
//! # Example
//!
//! ```
//! # use hfcanvas::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.style().background_color().unwrap().is_none());
//! assert_eq!(config.canvas().viewport_width(), 1200.0);
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use hfcanvas_core::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Canvas configuration section.
    #[serde(default)]
    canvas: CanvasConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(style: StyleConfig, canvas: CanvasConfig) -> Self {
        Self { style, canvas }
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }
}

/// Visual overrides for the custom element styles.
///
/// Colour fields hold colour strings understood by the `color` crate
/// (`"#F4B400"`, `"rgb(66 133 244)"`, `"red"`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleConfig {
    /// Background colour painted behind the diagram.
    #[serde(default)]
    background_color: Option<String>,

    /// Fill of every badge.
    #[serde(default)]
    badge_fill: Option<String>,

    /// Border of every badge.
    #[serde(default)]
    badge_stroke: Option<String>,

    /// Label colour of every badge.
    #[serde(default)]
    badge_text: Option<String>,

    /// Corner radius of the badge rectangle.
    #[serde(default)]
    corner_radius: Option<f32>,

    #[serde(default)]
    triangle_color: Option<String>,

    #[serde(default)]
    circle_color: Option<String>,

    #[serde(default)]
    connection_color: Option<String>,

    /// Badge label overrides keyed by custom type name, e.g. `msgcenter = "Inbox"`.
    #[serde(default)]
    labels: IndexMap<String, String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_color("background_color", self.background_color.as_deref())
    }

    pub fn badge_fill(&self) -> Result<Option<Color>, String> {
        parse_color("badge_fill", self.badge_fill.as_deref())
    }

    pub fn badge_stroke(&self) -> Result<Option<Color>, String> {
        parse_color("badge_stroke", self.badge_stroke.as_deref())
    }

    pub fn badge_text(&self) -> Result<Option<Color>, String> {
        parse_color("badge_text", self.badge_text.as_deref())
    }

    pub fn triangle_color(&self) -> Result<Option<Color>, String> {
        parse_color("triangle_color", self.triangle_color.as_deref())
    }

    pub fn circle_color(&self) -> Result<Option<Color>, String> {
        parse_color("circle_color", self.circle_color.as_deref())
    }

    pub fn connection_color(&self) -> Result<Option<Color>, String> {
        parse_color("connection_color", self.connection_color.as_deref())
    }

    pub fn corner_radius(&self) -> Option<f32> {
        self.corner_radius
    }

    /// Returns the label override for a custom type name.
    pub fn label(&self, local_name: &str) -> Option<&str> {
        self.labels.get(local_name).map(String::as_str)
    }

    /// Returns every configured label override.
    pub fn labels(&self) -> &IndexMap<String, String> {
        &self.labels
    }
}

fn parse_color(field: &str, value: Option<&str>) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {field} in config: {err}"))
}

/// Viewport settings used by the canvas.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    /// Width of the viewport the diagram is fitted into.
    #[serde(default = "default_viewport_width")]
    viewport_width: f32,

    /// Height of the viewport the diagram is fitted into.
    #[serde(default = "default_viewport_height")]
    viewport_height: f32,

    /// Space kept around the diagram content.
    #[serde(default = "default_padding")]
    padding: f32,
}

fn default_viewport_width() -> f32 {
    1200.0
}

fn default_viewport_height() -> f32 {
    900.0
}

fn default_padding() -> f32 {
    20.0
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            padding: default_padding(),
        }
    }
}

impl CanvasConfig {
    pub fn new(viewport_width: f32, viewport_height: f32, padding: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            padding,
        }
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.canvas().viewport_height(), 900.0);
        assert_eq!(config.canvas().padding(), 20.0);
        assert!(config.style().badge_fill().unwrap().is_none());
        assert!(config.style().labels().is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r##"
            [style]
            badge_fill = "#ffffff"
            corner_radius = 4.0

            [style.labels]
            msgcenter = "Inbox"

            [canvas]
            viewport_width = 800.0
            "##,
        )
        .unwrap();

        assert!(config.style().badge_fill().unwrap().is_some());
        assert_eq!(config.style().corner_radius(), Some(4.0));
        assert_eq!(config.style().label("msgcenter"), Some("Inbox"));
        assert_eq!(config.style().label("email"), None);
        assert_eq!(config.canvas().viewport_width(), 800.0);
        assert_eq!(config.canvas().viewport_height(), 900.0);
    }

    #[test]
    fn test_invalid_color_reports_field() {
        let config: AppConfig = toml::from_str(
            r#"
            [style]
            connection_color = "not-a-color"
            "#,
        )
        .unwrap();

        let err = config.style().connection_color().unwrap_err();
        assert!(err.contains("connection_color"));
    }
}
