//! Stroke definitions for element borders and connection lines.
//!
//! [`StrokeDefinition`] carries color, width, cap and join. The
//! [`apply_stroke!`](crate::apply_stroke!) macro writes them onto any SVG
//! element builder:
//!
//! ```
//! use hfcanvas_core::draw::StrokeDefinition;
//! use hfcanvas_core::color::Color;
//! use svg::node::element as svg_element;
//!
//! let stroke = StrokeDefinition::solid(Color::new("#cc0000").unwrap(), 2.0);
//! let line = svg_element::Polyline::new().set("points", "0,0 100,0");
//!
//! let line = hfcanvas_core::apply_stroke!(line, &stroke);
//! ```

use crate::color::Color;

/// How line endpoints are drawn (`stroke-linecap`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl StrokeCap {
    pub fn to_svg_value(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// How polyline corners are drawn (`stroke-linejoin`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl StrokeJoin {
    pub fn to_svg_value(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

/// A solid stroke.
///
/// ```
/// use hfcanvas_core::draw::{StrokeDefinition, StrokeCap, StrokeJoin};
/// use hfcanvas_core::color::Color;
///
/// let mut stroke = StrokeDefinition::solid(Color::new("#52B415").unwrap(), 2.0);
/// stroke.set_cap(StrokeCap::Round);
/// stroke.set_join(StrokeJoin::Round);
/// assert_eq!(stroke.width(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    cap: StrokeCap,
    join: StrokeJoin,
}

impl StrokeDefinition {
    /// Butt caps and miter joins until changed.
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            cap: StrokeCap::default(),
            join: StrokeJoin::default(),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn cap(&self) -> StrokeCap {
        self.cap
    }

    pub fn join(&self) -> StrokeJoin {
        self.join
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn set_cap(&mut self, cap: StrokeCap) {
        self.cap = cap;
    }

    pub fn set_join(&mut self, join: StrokeJoin) {
        self.join = join;
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::solid(Color::default(), 1.0)
    }
}

/// Write stroke color, opacity, width, cap and join onto an SVG element.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width())
            .set("stroke-linecap", $stroke.cap().to_svg_value())
            .set("stroke-linejoin", $stroke.join().to_svg_value())
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.color().to_string(), "black");
        assert_eq!(stroke.cap(), StrokeCap::Butt);
        assert_eq!(stroke.join(), StrokeJoin::Miter);
    }

    #[test]
    fn test_apply_stroke_sets_attributes() {
        use svg::node::element as svg_element;

        let mut stroke = StrokeDefinition::solid(Color::default(), 2.0);
        stroke.set_cap(StrokeCap::Round);
        let line = crate::apply_stroke!(svg_element::Line::new(), &stroke).to_string();

        assert!(line.contains("stroke=\"black\""));
        assert!(line.contains("stroke-width=\"2\""));
        assert!(line.contains("stroke-linecap=\"round\""));
        assert!(!line.contains("stroke-dasharray"));
    }
}
