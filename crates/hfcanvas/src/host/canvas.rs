//! The canvas service: element tree, viewbox and the SVG paint pass.

use log::{debug, info, warn};
use svg::{
    Document,
    node::element::{Group, Path, Rectangle},
};

use hfcanvas_core::{
    color::Color,
    draw::{LayeredOutput, OutlinePath},
    geometry::{Bounds, Insets, Point, Size},
};

use crate::{
    config::CanvasConfig,
    host::{registry::ExtensionRegistry, render::RenderError, tree::ElementTree},
    model::{Element, Root},
};

/// Visible area of the diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewbox {
    /// Visible diagram area in diagram coordinates
    pub area: Bounds,
    /// Screen pixels per diagram unit
    pub scale: f32,
}

impl Viewbox {
    /// Size of the viewbox on screen.
    pub fn outer_size(&self) -> Size {
        Size::new(self.area.width() * self.scale, self.area.height() * self.scale)
    }
}

/// Zoom requests understood by [`Canvas::zoom`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zoom {
    /// Fit the whole diagram into the viewport, never zooming in past 1:1
    FitViewport,
    /// Fixed scale around the current center
    Scale(f32),
}

/// Element tree plus viewport state.
#[derive(Debug, Clone)]
pub struct Canvas {
    tree: ElementTree,
    viewbox: Viewbox,
    config: CanvasConfig,
}

impl Canvas {
    pub fn new(root: Root, config: CanvasConfig) -> Self {
        let viewbox = Viewbox {
            area: Bounds::new_from_top_left(
                Point::default(),
                Size::new(config.viewport_width(), config.viewport_height()),
            ),
            scale: 1.0,
        };
        Self {
            tree: ElementTree::new(root),
            viewbox,
            config,
        }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    /// Replaces the root, dropping every element of the previous diagram.
    pub fn set_root(&mut self, root: Root) {
        debug!(root:% = root.id(); "Root replaced");
        self.tree = ElementTree::new(root);
    }

    pub fn root_element(&self) -> &Element {
        self.tree.root_element()
    }

    pub fn viewbox(&self) -> Viewbox {
        self.viewbox
    }

    /// Bounds of every non-root element, or `None` for an empty diagram.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.tree
            .iter()
            .filter_map(Element::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// Updates the viewbox and returns the new scale.
    pub fn zoom(&mut self, zoom: Zoom) -> f32 {
        let viewport = Size::new(self.config.viewport_width(), self.config.viewport_height());

        self.viewbox = match zoom {
            Zoom::FitViewport => {
                let area = self
                    .content_bounds()
                    .unwrap_or_else(|| Bounds::new_from_top_left(Point::default(), viewport))
                    .add_padding(Insets::uniform(self.config.padding()));
                let scale = (viewport.width() / area.width())
                    .min(viewport.height() / area.height())
                    .min(1.0);
                Viewbox { area, scale }
            }
            Zoom::Scale(scale) => {
                let scale = if scale > 0.0 { scale } else { 1.0 };
                let center = self.viewbox.area.center();
                let size = Size::new(viewport.width() / scale, viewport.height() / scale);
                let top_left = Point::new(
                    center.x() - size.width() / 2.0,
                    center.y() - size.height() / 2.0,
                );
                Viewbox {
                    area: Bounds::new_from_top_left(top_left, size),
                    scale,
                }
            }
        };

        debug!(
            x = self.viewbox.area.min_x(),
            y = self.viewbox.area.min_y(),
            width = self.viewbox.area.width(),
            height = self.viewbox.area.height(),
            scale = self.viewbox.scale;
            "Viewbox changed"
        );
        self.viewbox.scale
    }

    /// Paints every element, depth first in z-order, into an SVG document.
    ///
    /// Each element becomes a `djs-element` group holding its visual and an
    /// invisible `djs-hit` outline. Elements no renderer can draw are logged
    /// and left out.
    pub fn paint(&self, registry: &ExtensionRegistry, background: Option<Color>) -> Document {
        let area = self.viewbox.area;
        let outer = self.viewbox.outer_size();

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    area.min_x(),
                    area.min_y(),
                    area.width(),
                    area.height()
                ),
            )
            .set("width", outer.width())
            .set("height", outer.height());

        if let Some(color) = background {
            doc = doc.add(
                Rectangle::new()
                    .set("x", area.min_x())
                    .set("y", area.min_y())
                    .set("width", area.width())
                    .set("height", area.height())
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha()),
            );
        }

        let mut layer = Group::new().set("class", "djs-layer");
        let mut painted = 0;
        for element in self.tree.iter() {
            match paint_element(element, registry) {
                Ok(Some(group)) => {
                    layer = layer.add(group);
                    painted += 1;
                }
                Ok(None) => {
                    warn!(
                        element:% = element.id(),
                        element_type:% = element.element_type();
                        "No renderer for element"
                    );
                }
                Err(err) => {
                    warn!(element:% = element.id(), err:err; "Failed to render element");
                }
            }
        }

        info!(painted, total = self.tree.len() - 1; "Canvas painted");
        doc.add(layer)
    }
}

fn paint_element(
    element: &Element,
    registry: &ExtensionRegistry,
) -> Result<Option<Group>, RenderError> {
    let Some(renderer) = registry
        .renderers()
        .iter()
        .find(|entry| entry.service().can_render(element))
    else {
        return Ok(None);
    };
    let renderer = renderer.service();

    let (class, visual, outline): (&str, LayeredOutput, OutlinePath) = match element {
        Element::Root(_) => return Ok(None),
        Element::Shape(shape) => (
            "djs-element djs-shape",
            renderer.draw_shape(shape)?,
            renderer.shape_path(shape)?,
        ),
        Element::Connection(connection) => (
            "djs-element djs-connection",
            renderer.draw_connection(connection)?,
            renderer.connection_path(connection)?,
        ),
    };

    let mut visual_group = Group::new().set("class", "djs-visual");
    if let Element::Shape(shape) = element {
        let origin = shape.bounds().min_point();
        visual_group = visual_group.set(
            "transform",
            format!("translate({}, {})", origin.x(), origin.y()),
        );
    }
    for node in visual.render() {
        visual_group = visual_group.add(node);
    }

    let hit = Path::new()
        .set("class", "djs-hit")
        .set("d", outline.to_string())
        .set("fill", "none")
        .set("stroke", "transparent")
        .set("stroke-width", 15);

    Ok(Some(
        Group::new()
            .set("class", class)
            .set("data-element-id", element.id().to_string())
            .add(visual_group)
            .add(hit),
    ))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use float_cmp::assert_approx_eq;
    use hfcanvas_core::identifier::Id;

    use super::*;
    use crate::{
        element_type::NativeType,
        host::{ordering::InsertIndex, render::DefaultRenderer, styles::Styles},
        model::Shape,
    };

    fn canvas_with_task(bounds: Bounds) -> Canvas {
        let mut canvas = Canvas::new(
            Root::new(Id::new("Process_1"), NativeType::Process.into()),
            CanvasConfig::new(1000.0, 500.0, 0.0),
        );
        let root = canvas.tree().root();
        canvas
            .tree_mut()
            .insert(
                Shape::new(Id::new("Task_1"), NativeType::Task.into(), bounds).into(),
                root,
                InsertIndex::Top,
            )
            .unwrap();
        canvas
    }

    #[test]
    fn test_fit_viewport_never_zooms_in() {
        let mut canvas = canvas_with_task(Bounds::new_from_top_left(
            Point::new(10.0, 10.0),
            Size::new(100.0, 80.0),
        ));
        let scale = canvas.zoom(Zoom::FitViewport);

        assert_approx_eq!(f32, scale, 1.0);
        assert_eq!(canvas.viewbox().area.min_point(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_fit_viewport_shrinks_large_diagram() {
        let mut canvas = canvas_with_task(Bounds::new_from_top_left(
            Point::default(),
            Size::new(2000.0, 500.0),
        ));
        let scale = canvas.zoom(Zoom::FitViewport);

        assert_approx_eq!(f32, scale, 0.5);
        assert_approx_eq!(f32, canvas.viewbox().outer_size().width(), 1000.0);
    }

    #[test]
    fn test_scale_keeps_center() {
        let mut canvas = canvas_with_task(Bounds::new_from_top_left(
            Point::default(),
            Size::new(100.0, 80.0),
        ));
        let before = canvas.viewbox().area.center();
        canvas.zoom(Zoom::Scale(2.0));

        let viewbox = canvas.viewbox();
        assert_approx_eq!(f32, viewbox.area.center().x(), before.x());
        assert_approx_eq!(f32, viewbox.area.width(), 500.0);
    }

    #[test]
    fn test_paint_wraps_elements() {
        let canvas = canvas_with_task(Bounds::new_from_top_left(
            Point::new(50.0, 40.0),
            Size::new(100.0, 80.0),
        ));
        let mut registry = ExtensionRegistry::new();
        registry.register_renderer(
            "defaultRenderer",
            1000,
            Rc::new(DefaultRenderer::new(Rc::new(Styles::new()))),
        );

        let svg = canvas.paint(&registry, None).to_string();
        assert!(svg.contains("data-element-id=\"Task_1\""));
        assert!(svg.contains("translate(50, 40)"));
        assert!(svg.contains("class=\"djs-hit\""));
    }

    #[test]
    fn test_paint_without_renderer_skips_element() {
        let canvas = canvas_with_task(Bounds::new_from_top_left(
            Point::default(),
            Size::new(100.0, 80.0),
        ));
        let svg = canvas.paint(&ExtensionRegistry::new(), None).to_string();
        assert!(!svg.contains("Task_1"));
    }
}
