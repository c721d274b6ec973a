//! Drawing of the `hf` element types.

use std::rc::Rc;

use log::trace;
use svg::node::element as svg_element;

use hfcanvas_core::{
    draw::{LayeredOutput, OutlinePath, RenderLayer},
    geometry::{Bounds, Point, Size},
};

use crate::{
    apply_style,
    custom::style::StyleTable,
    element_type::{BadgeKind, CustomType, ElementKind, ElementType},
    host::{
        render::{
            CanRender, Draw, RenderError, connection_outline, points_attribute, rectangle_path,
        },
        styles::{StyleTrait, Styles},
    },
    model::{Connection, Element, ElementId, Shape},
};

/// Priority of [`CustomRenderer`]; above the host renderer.
pub const CUSTOM_RENDER_PRIORITY: i32 = 2000;

/// The `customRenderer` provider.
#[derive(Debug, Clone)]
pub struct CustomRenderer {
    styles: Rc<Styles>,
    table: Rc<StyleTable>,
}

impl CustomRenderer {
    pub fn new(styles: Rc<Styles>, table: Rc<StyleTable>) -> Self {
        Self { styles, table }
    }

    fn draw_triangle(&self, size: Size) -> LayeredOutput {
        let (w, h) = (size.width(), size.height());
        let style = self
            .styles
            .compute_style(&self.table.triangle().filled(), &[]);

        let polygon = svg_element::Polygon::new().set(
            "points",
            points_attribute([Point::new(w / 2.0, 0.0), Point::new(w, h), Point::new(0.0, h)]),
        );
        let polygon = apply_style!(polygon, &style);

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Visual, Box::new(polygon));
        output
    }

    fn draw_circle(&self, size: Size) -> LayeredOutput {
        let style = self.styles.compute_style(&self.table.circle().filled(), &[]);

        let circle = svg_element::Circle::new()
            .set("cx", size.width() / 2.0)
            .set("cy", size.height() / 2.0)
            .set("r", circle_radius(size));
        let circle = apply_style!(circle, &style);

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Visual, Box::new(circle));
        output
    }

    /// Nested `<svg>` holding the rounded badge and its centered label.
    fn draw_badge(&self, kind: BadgeKind, size: Size) -> LayeredOutput {
        let badge = self.table.badge(kind);
        let style = self.styles.compute_style(&badge.overrides(), &[]);

        let rect = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", badge.corner_radius())
            .set("ry", badge.corner_radius());
        let rect = apply_style!(rect, &style);

        let label = badge.text().render_centered(
            badge.label(),
            Point::new(size.width() / 2.0, size.height() / 2.0),
        );

        let element = svg_element::SVG::new()
            .set("class", badge.group_class())
            .set("width", size.width())
            .set("height", size.height())
            .add(
                svg_element::Group::new()
                    .set("class", badge.class_name())
                    .add(rect)
                    .add(label),
            );

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Visual, Box::new(element));
        output
    }
}

impl CanRender for CustomRenderer {
    fn can_render(&self, element: &Element) -> bool {
        element.element_type().is_custom()
    }
}

impl Draw for CustomRenderer {
    fn draw_shape(&self, shape: &Shape) -> Result<LayeredOutput, RenderError> {
        let size = shape.bounds().to_size();
        trace!(
            element:% = shape.id(),
            element_type:% = shape.element_type();
            "Drawing custom shape"
        );

        match shape.element_type() {
            ElementType::Custom(CustomType::Triangle) => Ok(self.draw_triangle(size)),
            ElementType::Custom(CustomType::Circle) => Ok(self.draw_circle(size)),
            ElementType::Custom(CustomType::Connection) => Err(RenderError::KindMismatch {
                element: shape.id(),
                element_type: shape.element_type(),
                expected: ElementKind::Shape,
            }),
            ElementType::Custom(CustomType::Email) => Ok(self.draw_badge(BadgeKind::Email, size)),
            ElementType::Custom(CustomType::Pns) => Ok(self.draw_badge(BadgeKind::Pns, size)),
            ElementType::Custom(CustomType::Sms) => Ok(self.draw_badge(BadgeKind::Sms, size)),
            ElementType::Custom(CustomType::MsgCenter) => {
                Ok(self.draw_badge(BadgeKind::MsgCenter, size))
            }
            ElementType::Custom(CustomType::Webhook) => {
                Ok(self.draw_badge(BadgeKind::Webhook, size))
            }
            ElementType::Custom(CustomType::WaitUntil) => {
                Ok(self.draw_badge(BadgeKind::WaitUntil, size))
            }
            ElementType::Custom(CustomType::TimeDelay) => {
                Ok(self.draw_badge(BadgeKind::TimeDelay, size))
            }
            ElementType::Custom(CustomType::TimeWindow) => {
                Ok(self.draw_badge(BadgeKind::TimeWindow, size))
            }
            ElementType::Custom(CustomType::TrueFalse) => {
                Ok(self.draw_badge(BadgeKind::TrueFalse, size))
            }
            ElementType::Custom(CustomType::MultiSplit) => {
                Ok(self.draw_badge(BadgeKind::MultiSplit, size))
            }
            ElementType::Custom(CustomType::Start) => Ok(self.draw_badge(BadgeKind::Start, size)),
            ElementType::Custom(CustomType::Exit) => Ok(self.draw_badge(BadgeKind::Exit, size)),
            ElementType::Native(_) => Err(unsupported(shape.id(), shape.element_type())),
        }
    }

    fn draw_connection(&self, connection: &Connection) -> Result<LayeredOutput, RenderError> {
        if connection.element_type() != ElementType::Custom(CustomType::Connection) {
            return Err(unsupported(connection.id(), connection.element_type()));
        }
        if connection.waypoints().len() < 2 {
            return Err(RenderError::TooFewWaypoints {
                element: connection.id(),
                count: connection.waypoints().len(),
            });
        }

        let style = self.styles.compute_style(
            &self.table.connection().outline(),
            &[StyleTrait::NoFill],
        );
        let line = svg_element::Polyline::new()
            .set("points", points_attribute(connection.anchors()));
        let line = apply_style!(line, &style);

        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Visual, Box::new(line));
        Ok(output)
    }

    fn shape_path(&self, shape: &Shape) -> Result<OutlinePath, RenderError> {
        let bounds = shape.bounds();
        match shape.element_type() {
            ElementType::Custom(CustomType::Triangle) => Ok(triangle_path(bounds)),
            ElementType::Custom(CustomType::Circle) => Ok(circle_path(bounds)),
            ElementType::Custom(CustomType::Connection) => Err(RenderError::KindMismatch {
                element: shape.id(),
                element_type: shape.element_type(),
                expected: ElementKind::Shape,
            }),
            ElementType::Custom(_) => Ok(rectangle_path(bounds)),
            ElementType::Native(_) => Err(unsupported(shape.id(), shape.element_type())),
        }
    }

    fn connection_path(&self, connection: &Connection) -> Result<OutlinePath, RenderError> {
        if connection.element_type() != ElementType::Custom(CustomType::Connection) {
            return Err(unsupported(connection.id(), connection.element_type()));
        }
        connection_outline(connection)
    }
}

fn unsupported(element: ElementId, element_type: ElementType) -> RenderError {
    RenderError::Unsupported {
        element,
        element_type,
    }
}

fn circle_radius(size: Size) -> f32 {
    (size.width().min(size.height()) / 2.0).round()
}

/// `M x+w/2,y l w/2,h l -w,0 z`
fn triangle_path(bounds: Bounds) -> OutlinePath {
    let (w, h) = (bounds.width(), bounds.height());
    OutlinePath::new()
        .move_to(Point::new(bounds.min_x() + w / 2.0, bounds.min_y()))
        .line_by(w / 2.0, h)
        .line_by(-w, 0.0)
        .close()
}

/// Full circle as two half arcs starting at the top.
fn circle_path(bounds: Bounds) -> OutlinePath {
    let radius = circle_radius(bounds.to_size());
    let center = bounds.center();
    OutlinePath::new()
        .move_to(Point::new(center.x(), center.y() - radius))
        .arc_by(radius, true, true, 0.0, 2.0 * radius)
        .arc_by(radius, true, true, 0.0, -2.0 * radius)
        .close()
}
