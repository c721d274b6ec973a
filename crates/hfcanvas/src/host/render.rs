//! Renderer capabilities and the host's fallback renderer.
//!
//! A renderer implements [`CanRender`] to claim elements and [`Draw`] to
//! produce their visual and outline. Visuals are drawn in element-local
//! coordinates (the paint pass translates them to the element position);
//! outlines are absolute.

use std::rc::Rc;

use svg::node::element as svg_element;
use thiserror::Error;

use hfcanvas_core::{
    draw::{LayeredOutput, OutlinePath, RenderLayer},
    geometry::{Bounds, Point},
};

use crate::{
    apply_style,
    element_type::{ElementKind, ElementType},
    host::styles::{StyleOverrides, StyleTrait, Styles},
    model::{Connection, Element, ElementId, Shape},
};

/// Priority of the host renderer.
pub const DEFAULT_RENDER_PRIORITY: i32 = 1000;

/// Errors raised while drawing a single element.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("element `{element}` of type `{element_type}` is not a {expected}")]
    KindMismatch {
        element: ElementId,
        element_type: ElementType,
        expected: ElementKind,
    },

    #[error("renderer does not handle element `{element}` of type `{element_type}`")]
    Unsupported {
        element: ElementId,
        element_type: ElementType,
    },

    #[error("connection `{element}` has {count} waypoints, at least 2 are required")]
    TooFewWaypoints { element: ElementId, count: usize },
}

impl RenderError {
    pub(crate) fn kind_mismatch(element: &Element, expected: ElementKind) -> Self {
        Self::KindMismatch {
            element: element.id(),
            element_type: element.element_type(),
            expected,
        }
    }
}

/// Claims elements for a renderer.
pub trait CanRender {
    /// Returns true when this renderer draws `element`. Must not mutate state.
    fn can_render(&self, element: &Element) -> bool;
}

/// Draws the visual and outline of claimed elements.
pub trait Draw: CanRender {
    /// Visual of a shape in coordinates local to its top-left corner.
    fn draw_shape(&self, shape: &Shape) -> Result<LayeredOutput, RenderError>;

    /// Visual of a connection in absolute coordinates.
    fn draw_connection(&self, connection: &Connection) -> Result<LayeredOutput, RenderError>;

    /// Absolute outline of a shape used for hit-testing and selection.
    fn shape_path(&self, shape: &Shape) -> Result<OutlinePath, RenderError>;

    /// Absolute outline of a connection.
    fn connection_path(&self, connection: &Connection) -> Result<OutlinePath, RenderError>;
}

/// Axis-aligned rectangle outline `M x,y l w,0 l 0,h l -w,0 z`.
pub fn rectangle_path(bounds: Bounds) -> OutlinePath {
    OutlinePath::new()
        .move_to(bounds.min_point())
        .line_by(bounds.width(), 0.0)
        .line_by(0.0, bounds.height())
        .line_by(-bounds.width(), 0.0)
        .close()
}

/// Polyline outline through the resolved waypoints of a connection.
pub fn connection_outline(connection: &Connection) -> Result<OutlinePath, RenderError> {
    let mut anchors = connection.anchors();
    let (Some(first), Some(second)) = (anchors.next(), anchors.next()) else {
        return Err(RenderError::TooFewWaypoints {
            element: connection.id(),
            count: connection.waypoints().len(),
        });
    };

    Ok(anchors.fold(
        OutlinePath::new().move_to(first).line_to(second),
        OutlinePath::line_to,
    ))
}

/// Formats points as an SVG `points` attribute value.
pub fn points_attribute(points: impl IntoIterator<Item = Point>) -> String {
    points
        .into_iter()
        .map(|point| format!("{},{}", point.x(), point.y()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fallback renderer: rectangles for shapes and polylines for connections.
#[derive(Debug, Clone)]
pub struct DefaultRenderer {
    styles: Rc<Styles>,
}

impl DefaultRenderer {
    pub fn new(styles: Rc<Styles>) -> Self {
        Self { styles }
    }
}

impl CanRender for DefaultRenderer {
    fn can_render(&self, element: &Element) -> bool {
        !matches!(element, Element::Root(_))
    }
}

impl Draw for DefaultRenderer {
    fn draw_shape(&self, shape: &Shape) -> Result<LayeredOutput, RenderError> {
        let bounds = shape.bounds();
        let style = self
            .styles
            .compute_style(&StyleOverrides::default(), &[]);

        let rect = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", bounds.width())
            .set("height", bounds.height());
        let rect = apply_style!(rect, &style);

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Visual, Box::new(rect));
        Ok(output)
    }

    fn draw_connection(&self, connection: &Connection) -> Result<LayeredOutput, RenderError> {
        if connection.waypoints().len() < 2 {
            return Err(RenderError::TooFewWaypoints {
                element: connection.id(),
                count: connection.waypoints().len(),
            });
        }

        let style = self
            .styles
            .compute_style(&StyleOverrides::default(), &[StyleTrait::NoFill]);
        let line = svg_element::Polyline::new()
            .set("points", points_attribute(connection.anchors()));
        let line = apply_style!(line, &style);

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Visual, Box::new(line));
        Ok(output)
    }

    fn shape_path(&self, shape: &Shape) -> Result<OutlinePath, RenderError> {
        Ok(rectangle_path(shape.bounds()))
    }

    fn connection_path(&self, connection: &Connection) -> Result<OutlinePath, RenderError> {
        connection_outline(connection)
    }
}
