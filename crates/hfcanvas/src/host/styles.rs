//! Shared presentation defaults.
//!
//! Renderers ask [`Styles::compute_style`] for the attributes of a visual.
//! The result starts from the host defaults, then applies the requested
//! [`StyleTrait`]s, then the renderer's own overrides.

use hfcanvas_core::{
    color::Color,
    draw::{StrokeCap, StrokeDefinition, StrokeJoin},
};

/// Named adjustments applied on top of the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTrait {
    /// Drop the fill
    NoFill,
    /// Drop the stroke
    NoBorder,
}

/// Renderer-supplied values that win over defaults and traits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverrides {
    pub stroke: Option<Color>,
    pub stroke_width: Option<f32>,
    pub fill: Option<Color>,
}

/// Resolved paint attributes of a visual.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualStyle {
    stroke: Option<StrokeDefinition>,
    fill: Option<Color>,
}

impl VisualStyle {
    pub fn stroke(&self) -> Option<&StrokeDefinition> {
        self.stroke.as_ref()
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }
}

/// The host `styles` service.
#[derive(Debug, Clone)]
pub struct Styles {
    stroke: StrokeDefinition,
    fill: Color,
}

impl Default for Styles {
    fn default() -> Self {
        let mut stroke = StrokeDefinition::solid(Color::default(), 2.0);
        stroke.set_cap(StrokeCap::Round);
        stroke.set_join(StrokeJoin::Round);

        Self {
            stroke,
            fill: Color::new("white").unwrap_or_default(),
        }
    }
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves defaults, then `traits`, then `overrides`.
    pub fn compute_style(&self, overrides: &StyleOverrides, traits: &[StyleTrait]) -> VisualStyle {
        let mut stroke = Some(self.stroke.clone());
        let mut fill = Some(self.fill);

        for style_trait in traits {
            match style_trait {
                StyleTrait::NoFill => fill = None,
                StyleTrait::NoBorder => stroke = None,
            }
        }

        if overrides.stroke.is_some() || overrides.stroke_width.is_some() {
            let mut resolved = stroke.unwrap_or_else(|| self.stroke.clone());
            if let Some(color) = overrides.stroke {
                resolved.set_color(color);
            }
            if let Some(width) = overrides.stroke_width {
                resolved.set_width(width);
            }
            stroke = Some(resolved);
        }
        if let Some(color) = overrides.fill {
            fill = Some(color);
        }

        VisualStyle { stroke, fill }
    }
}

/// Apply a [`VisualStyle`] to an SVG element.
///
/// A missing fill or stroke is written as `none`.
#[macro_export]
macro_rules! apply_style {
    ($element:expr, $style:expr) => {{
        let style: &$crate::host::styles::VisualStyle = $style;
        let elem = match style.fill() {
            Some(fill) => $element
                .set("fill", fill.to_string())
                .set("fill-opacity", fill.alpha()),
            None => $element.set("fill", "none"),
        };
        match style.stroke() {
            Some(stroke) => $crate::apply_stroke!(elem, stroke),
            None => elem.set("stroke", "none"),
        }
    }};
}
