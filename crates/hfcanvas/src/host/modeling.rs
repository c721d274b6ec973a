//! Structural changes to the diagram.
//!
//! Every insertion, move, paste and removal goes through [`Modeling`], which
//! asks the registered rules, resolves the placement through the ordering
//! providers, applies the change to the element tree, runs the updaters and
//! finally broadcasts the change on the event bus.

use std::collections::HashSet;

use log::{debug, info, warn};
use thiserror::Error;

use hfcanvas_core::geometry::{Bounds, Point};

use crate::{
    element_type::ElementKind,
    host::{
        canvas::Canvas,
        event_bus::{Event, EventBus},
        factory::{ConnectionAttrs, ElementFactory, FactoryError, ShapeAttrs},
        ordering::{Ordering, default_ordering},
        registry::ExtensionRegistry,
        rules::{RuleVerdict, Rules, default_can_connect, default_can_place},
        tree::TreeError,
    },
    model::{Connection, Element, ElementId, Shape, Waypoint},
};

/// Errors raised by modeling operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelingError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error("element `{0}` does not exist")]
    UnknownElement(ElementId),

    #[error("element `{element}` is a {kind}, expected a {expected}")]
    WrongKind {
        element: ElementId,
        kind: ElementKind,
        expected: ElementKind,
    },

    #[error("{action} of `{element}` into `{target}` is not allowed")]
    Denied {
        action: &'static str,
        element: ElementId,
        target: ElementId,
    },

    #[error("connecting `{from}` to `{to}` is not allowed")]
    ConnectionDenied { from: ElementId, to: ElementId },

    #[error("no element factory is registered")]
    NoFactory,

    #[error("no placement is in progress")]
    NoPlacement,
}

/// Modeling operations over a canvas and the registered providers.
pub struct Modeling<'a> {
    canvas: &'a mut Canvas,
    registry: &'a ExtensionRegistry,
    event_bus: &'a EventBus,
}

impl<'a> Modeling<'a> {
    pub fn new(
        canvas: &'a mut Canvas,
        registry: &'a ExtensionRegistry,
        event_bus: &'a EventBus,
    ) -> Self {
        Self {
            canvas,
            registry,
            event_bus,
        }
    }

    /// Inserts an already positioned shape without consulting the rules.
    ///
    /// Used when loading documents; the placement still goes through the
    /// ordering providers.
    pub fn add_shape(
        &mut self,
        shape: Shape,
        parent: ElementId,
    ) -> Result<ElementId, ModelingError> {
        self.require(parent)?;
        let id = shape.id();
        let element = Element::Shape(shape);
        let ordering = self.resolve_ordering(&element, parent);

        self.canvas
            .tree_mut()
            .insert(element, ordering.parent, ordering.index)?;
        self.run_shape_updaters(id);

        debug!(element:% = id, ordering:% = ordering; "Shape added");
        self.event_bus.fire(&Event::ShapeAdded { element: id });
        Ok(id)
    }

    /// Creates `shape` centered on `position` inside `parent`.
    pub fn create_shape(
        &mut self,
        mut shape: Shape,
        position: Point,
        parent: ElementId,
    ) -> Result<ElementId, ModelingError> {
        let target = self.require(parent)?;
        let size = shape.bounds().to_size();
        shape.set_bounds(Bounds::new_from_top_left(
            Point::new(
                position.x() - size.width() / 2.0,
                position.y() - size.height() / 2.0,
            ),
            size,
        ));

        let verdict = self
            .first_rule(|rules| rules.can_create(&shape, target))
            .unwrap_or_else(|| default_can_place(target));
        if !verdict.is_allowed() {
            return Err(ModelingError::Denied {
                action: "creation",
                element: shape.id(),
                target: parent,
            });
        }

        self.add_shape(shape, parent)
    }

    /// Inserts a connection between two existing elements.
    pub fn create_connection(
        &mut self,
        connection: Connection,
        parent: ElementId,
    ) -> Result<ElementId, ModelingError> {
        self.require(parent)?;
        for endpoint in [connection.source(), connection.target()].into_iter().flatten() {
            self.require(endpoint)?;
        }

        let id = connection.id();
        let element = Element::Connection(connection);
        let ordering = self.resolve_ordering(&element, parent);

        self.canvas
            .tree_mut()
            .insert(element, ordering.parent, ordering.index)?;
        self.run_connection_updaters(id);

        debug!(element:% = id, ordering:% = ordering; "Connection added");
        self.event_bus.fire(&Event::ConnectionAdded { element: id });
        Ok(id)
    }

    /// Connects two shapes with the connection type the rules hand out.
    pub fn connect(&mut self, from: ElementId, to: ElementId) -> Result<ElementId, ModelingError> {
        let source = self.require(from)?;
        let target = self.require(to)?;

        let verdict = self
            .first_rule(|rules| rules.can_connect(source, target))
            .unwrap_or_else(|| default_can_connect(source, target));
        let connection_type = match verdict {
            RuleVerdict::Deny => return Err(ModelingError::ConnectionDenied { from, to }),
            RuleVerdict::Connect { connection_type } => connection_type,
            RuleVerdict::Allow => match default_can_connect(source, target) {
                RuleVerdict::Connect { connection_type } => connection_type,
                _ => return Err(ModelingError::ConnectionDenied { from, to }),
            },
        };

        let start = center_of(source);
        let end = center_of(target);
        let parent = self.canvas.tree().parent(from).unwrap_or(self.canvas.tree().root());

        let connection = self.factory()?.create_connection(
            ConnectionAttrs::new(connection_type)
                .with_waypoints(vec![Waypoint::new(start), Waypoint::new(end)])
                .between(from, to),
        )?;
        info!(from:% = from, to:% = to, connection_type:% = connection_type; "Elements connected");
        self.create_connection(connection, parent)
    }

    /// Moves a shape by `delta`, optionally into `new_parent`.
    ///
    /// Descendants move along; connections attached to moved shapes have
    /// their attached end moved as well.
    pub fn move_shape(
        &mut self,
        id: ElementId,
        delta: Point,
        new_parent: Option<ElementId>,
    ) -> Result<(), ModelingError> {
        let shape = self.require_shape(id)?;
        let target_id = match new_parent {
            Some(parent) => parent,
            None => self
                .canvas
                .tree()
                .parent(id)
                .ok_or(ModelingError::UnknownElement(id))?,
        };
        let target = self.require(target_id)?;
        if self.canvas.tree().is_ancestor(id, target_id) {
            return Err(TreeError::Cycle {
                element: id,
                parent: target_id,
            }
            .into());
        }

        let verdict = self
            .first_rule(|rules| rules.can_move(&[shape], target))
            .unwrap_or_else(|| default_can_place(target));
        if !verdict.is_allowed() {
            return Err(ModelingError::Denied {
                action: "move",
                element: id,
                target: target_id,
            });
        }

        let moved: HashSet<ElementId> = std::iter::once(id)
            .chain(self.canvas.tree().descendants(id))
            .collect();
        let touched = self.translate(&moved, delta);

        let element = self.require(id)?.clone();
        let ordering = self.resolve_ordering(&element, target_id);
        self.canvas
            .tree_mut()
            .reparent(id, ordering.parent, ordering.index)?;
        self.run_shape_updaters(id);

        debug!(
            element:% = id,
            dx = delta.x(),
            dy = delta.y(),
            ordering:% = ordering;
            "Shape moved"
        );
        self.event_bus.fire(&Event::ElementChanged { element: id });
        for connection in touched {
            self.run_connection_updaters(connection);
            self.event_bus.fire(&Event::ElementChanged { element: connection });
        }
        Ok(())
    }

    /// Pastes a copy of shape `id`, offset by `offset`, into `parent` or the
    /// parent of the original.
    pub fn paste(
        &mut self,
        id: ElementId,
        offset: Point,
        parent: Option<ElementId>,
    ) -> Result<ElementId, ModelingError> {
        let original = self.require_shape(id)?;
        let parent = match parent {
            Some(parent) => parent,
            None => self
                .canvas
                .tree()
                .parent(id)
                .ok_or(ModelingError::UnknownElement(id))?,
        };

        let bounds = original.bounds();
        let mut attrs = ShapeAttrs::new(original.element_type())
            .with_size(bounds.to_size())
            .at(bounds.min_point().add_point(offset));
        if let Some(expanded) = original.business_object().di().is_expanded() {
            attrs = attrs.expanded(expanded);
        }
        if let Some(name) = original.business_object().name() {
            attrs = attrs.with_name(name);
        }

        let copy = self.factory()?.create_shape(attrs)?;
        let center = copy.bounds().center();
        debug!(original:% = id, copy:% = copy.id(); "Pasting shape");
        self.create_shape(copy, center, parent)
    }

    /// Removes an element, its descendants and every connection attached to
    /// a removed shape. Returns the removed ids.
    pub fn remove_element(&mut self, id: ElementId) -> Result<Vec<ElementId>, ModelingError> {
        self.require(id)?;
        let subtree: HashSet<ElementId> = std::iter::once(id)
            .chain(self.canvas.tree().descendants(id))
            .collect();

        let attached: Vec<ElementId> = self
            .canvas
            .tree()
            .iter()
            .filter_map(Element::as_connection)
            .filter(|connection| !subtree.contains(&connection.id()))
            .filter(|connection| {
                [connection.source(), connection.target()]
                    .into_iter()
                    .flatten()
                    .any(|endpoint| subtree.contains(&endpoint))
            })
            .map(Connection::id)
            .collect();

        let mut removed = Vec::new();
        for connection in attached.into_iter().chain(std::iter::once(id)) {
            if !self.canvas.tree().contains(connection) {
                continue;
            }
            removed.extend(
                self.canvas
                    .tree_mut()
                    .remove(connection)?
                    .iter()
                    .map(Element::id),
            );
        }

        for element in &removed {
            self.event_bus.fire(&Event::ElementRemoved { element: *element });
        }
        info!(element:% = id, removed = removed.len(); "Element removed");
        Ok(removed)
    }

    fn factory(&self) -> Result<&dyn ElementFactory, ModelingError> {
        self.registry
            .element_factory()
            .map(|factory| factory.as_ref())
            .ok_or(ModelingError::NoFactory)
    }

    fn require(&self, id: ElementId) -> Result<&Element, ModelingError> {
        self.canvas
            .tree()
            .get(id)
            .ok_or(ModelingError::UnknownElement(id))
    }

    fn require_shape(&self, id: ElementId) -> Result<&Shape, ModelingError> {
        let element = self.require(id)?;
        element.as_shape().ok_or(ModelingError::WrongKind {
            element: id,
            kind: element.kind(),
            expected: ElementKind::Shape,
        })
    }

    fn first_rule(&self, check: impl Fn(&dyn Rules) -> Option<RuleVerdict>) -> Option<RuleVerdict> {
        self.registry
            .rules()
            .iter()
            .find_map(|entry| check(entry.service().as_ref()))
    }

    /// Asks the ordering providers in priority order, then the host default.
    fn resolve_ordering(&self, element: &Element, proposed_parent: ElementId) -> Ordering {
        let tree = self.canvas.tree();
        for entry in self.registry.ordering_providers() {
            let Some(ordering) = entry.service().get_ordering(element, proposed_parent, tree) else {
                continue;
            };
            if tree.contains(ordering.parent) {
                return ordering;
            }
            warn!(
                provider = entry.name(),
                element:% = element.id(),
                parent:% = ordering.parent;
                "Ordering provider returned an unknown parent, ignoring"
            );
        }
        default_ordering(element, proposed_parent, tree)
    }

    /// Translates the shapes in `moved` and the connections related to them.
    /// Returns the connections that changed but are not part of `moved`.
    fn translate(&mut self, moved: &HashSet<ElementId>, delta: Point) -> Vec<ElementId> {
        let connections: Vec<(ElementId, bool, bool)> = self
            .canvas
            .tree()
            .iter()
            .filter_map(Element::as_connection)
            .map(|connection| {
                let inside = moved.contains(&connection.id());
                let touches = |endpoint: Option<ElementId>| {
                    endpoint.is_some_and(|id| moved.contains(&id))
                };
                let source_moved = inside || touches(connection.source());
                let target_moved = inside || touches(connection.target());
                (connection.id(), source_moved, target_moved)
            })
            .filter(|(_, source_moved, target_moved)| *source_moved || *target_moved)
            .collect();

        let tree = self.canvas.tree_mut();
        for id in moved {
            if let Some(shape) = tree.get_mut(*id).and_then(Element::as_shape_mut) {
                let bounds = shape.bounds().translate(delta);
                shape.set_bounds(bounds);
            }
        }

        let mut touched = Vec::new();
        for (id, source_moved, target_moved) in connections {
            let Some(connection) = tree.get_mut(id).and_then(Element::as_connection_mut) else {
                continue;
            };
            let last = connection.waypoints().len().saturating_sub(1);
            let waypoints = connection
                .waypoints()
                .iter()
                .enumerate()
                .map(|(index, waypoint)| {
                    let shift = (source_moved && target_moved)
                        || (source_moved && index == 0)
                        || (target_moved && index == last);
                    if shift {
                        waypoint.translate(delta)
                    } else {
                        *waypoint
                    }
                })
                .collect();
            connection.set_waypoints(waypoints);

            if !moved.contains(&id) {
                touched.push(id);
            }
        }
        touched
    }

    fn run_shape_updaters(&mut self, id: ElementId) {
        let Some(shape) = self
            .canvas
            .tree_mut()
            .get_mut(id)
            .and_then(Element::as_shape_mut)
        else {
            return;
        };
        for entry in self.registry.updaters() {
            entry.service().shape_changed(shape);
        }
    }

    fn run_connection_updaters(&mut self, id: ElementId) {
        let Some(connection) = self
            .canvas
            .tree_mut()
            .get_mut(id)
            .and_then(Element::as_connection_mut)
        else {
            return;
        };
        for entry in self.registry.updaters() {
            entry.service().connection_changed(connection);
        }
    }
}

fn center_of(element: &Element) -> Point {
    element
        .bounds()
        .map(|bounds| bounds.center())
        .unwrap_or_default()
}
