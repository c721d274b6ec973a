//! Text styling for element labels.
//!
//! [`TextDefinition`] holds the font and color of a label and renders it as an
//! SVG `<text>` element centered on a point.
//!
//! ```
//! # use hfcanvas_core::draw::{FontWeight, TextDefinition};
//! # use hfcanvas_core::geometry::Point;
//! let mut style = TextDefinition::new();
//! style.set_font_weight(FontWeight::Bold);
//!
//! let label = style.render_centered("Wait Until", Point::new(50.0, 30.0)).to_string();
//! assert!(label.contains("text-anchor=\"middle\""));
//! assert!(label.contains("Wait Until"));
//! ```

use svg::node::element as svg_element;

use crate::{color::Color, geometry::Point};

/// Font weight of a label.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Returns the SVG font-weight value
    pub fn to_svg_value(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

/// Visual style for label text.
///
/// # Default Values
///
/// | Property | Default |
/// |----------|---------|
/// | Font family | `"Arial"` |
/// | Font size | `12` |
/// | Font weight | `normal` |
/// | Color | `None` (SVG default, black) |
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefinition {
    font_family: String,
    font_size: u16,
    font_weight: FontWeight,
    color: Option<Color>,
}

impl TextDefinition {
    /// Creates a text definition with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.font_family = family.to_string();
    }

    pub fn set_font_size(&mut self, size: u16) {
        self.font_size = size;
    }

    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.font_weight = weight;
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    /// Renders `content` horizontally and vertically centered on `center`.
    pub fn render_centered(&self, content: &str, center: Point) -> svg_element::Text {
        let mut text = svg_element::Text::new(content)
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("font-weight", self.font_weight.to_svg_value());

        if let Some(color) = self.color {
            text = text
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
        }

        text
    }
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 12,
            font_weight: FontWeight::default(),
            color: None,
        }
    }
}
