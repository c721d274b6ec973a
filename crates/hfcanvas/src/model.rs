//! Element model shared by the host and the custom extension.
//!
//! An [`Element`] is a root, a shape or a connection. Containment and z-order
//! are not stored on the element itself; they live in the host's element tree.
//! Each element carries a [`BusinessObject`], the serializable twin that is
//! written back to BPMN documents.

use hfcanvas_core::{
    geometry::{Bounds, Point},
    identifier::Id,
};

use crate::element_type::{ElementKind, ElementType};

/// Identifier of a diagram element.
pub type ElementId = Id;

/// A point along a connection.
///
/// `original` is the logical anchor when it differs from the docked visual
/// point; consumers that need the resolved waypoint use [`Waypoint::anchor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    point: Point,
    original: Option<Point>,
}

impl Waypoint {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            original: None,
        }
    }

    pub fn with_original(point: Point, original: Point) -> Self {
        Self {
            point,
            original: Some(original),
        }
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn original(&self) -> Option<Point> {
        self.original
    }

    /// Returns the logical anchor when present, otherwise the visual point.
    pub fn anchor(&self) -> Point {
        self.original.unwrap_or(self.point)
    }

    pub fn translate(&self, offset: Point) -> Self {
        Self {
            point: self.point.add_point(offset),
            original: self.original.map(|original| original.add_point(offset)),
        }
    }
}

impl From<Point> for Waypoint {
    fn from(point: Point) -> Self {
        Self::new(point)
    }
}

/// Diagram interchange properties stored on the business object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiProperties {
    is_expanded: Option<bool>,
}

impl DiProperties {
    pub fn is_expanded(&self) -> Option<bool> {
        self.is_expanded
    }

    pub fn set_is_expanded(&mut self, is_expanded: Option<bool>) {
        self.is_expanded = is_expanded;
    }
}

/// Serializable semantic twin of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessObject {
    id: ElementId,
    element_type: ElementType,
    name: Option<String>,
    source_ref: Option<ElementId>,
    target_ref: Option<ElementId>,
    process_ref: Option<ElementId>,
    di: DiProperties,
}

impl BusinessObject {
    pub fn new(id: ElementId, element_type: ElementType) -> Self {
        Self {
            id,
            element_type,
            name: None,
            source_ref: None,
            target_ref: None,
            process_ref: None,
            di: DiProperties::default(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn source_ref(&self) -> Option<ElementId> {
        self.source_ref
    }

    pub fn target_ref(&self) -> Option<ElementId> {
        self.target_ref
    }

    pub fn set_refs(&mut self, source_ref: Option<ElementId>, target_ref: Option<ElementId>) {
        self.source_ref = source_ref;
        self.target_ref = target_ref;
    }

    /// The process a participant holds, as read from its `processRef`.
    pub fn process_ref(&self) -> Option<ElementId> {
        self.process_ref
    }

    pub fn set_process_ref(&mut self, process_ref: Option<ElementId>) {
        self.process_ref = process_ref;
    }

    pub fn di(&self) -> &DiProperties {
        &self.di
    }

    pub fn di_mut(&mut self) -> &mut DiProperties {
        &mut self.di
    }
}

/// The invisible root every other element descends from.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    id: ElementId,
    element_type: ElementType,
    business_object: BusinessObject,
}

impl Root {
    pub fn new(id: ElementId, element_type: ElementType) -> Self {
        Self {
            id,
            element_type,
            business_object: BusinessObject::new(id, element_type),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn business_object(&self) -> &BusinessObject {
        &self.business_object
    }
}

/// A boxed node of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ElementId,
    element_type: ElementType,
    bounds: Bounds,
    is_expanded: Option<bool>,
    business_object: BusinessObject,
}

impl Shape {
    pub fn new(id: ElementId, element_type: ElementType, bounds: Bounds) -> Self {
        Self {
            id,
            element_type,
            bounds,
            is_expanded: None,
            business_object: BusinessObject::new(id, element_type),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// In-memory expanded flag of composite shapes.
    pub fn is_expanded(&self) -> Option<bool> {
        self.is_expanded
    }

    pub fn set_is_expanded(&mut self, is_expanded: Option<bool>) {
        self.is_expanded = is_expanded;
    }

    /// Returns true for a composite shape explicitly marked collapsed.
    pub fn is_collapsed(&self) -> bool {
        self.element_type.is_composite() && self.is_expanded == Some(false)
    }

    pub fn business_object(&self) -> &BusinessObject {
        &self.business_object
    }

    pub fn business_object_mut(&mut self) -> &mut BusinessObject {
        &mut self.business_object
    }
}

/// An edge between two shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    id: ElementId,
    element_type: ElementType,
    waypoints: Vec<Waypoint>,
    source: Option<ElementId>,
    target: Option<ElementId>,
    business_object: BusinessObject,
}

impl Connection {
    pub fn new(id: ElementId, element_type: ElementType, waypoints: Vec<Waypoint>) -> Self {
        Self {
            id,
            element_type,
            waypoints,
            source: None,
            target: None,
            business_object: BusinessObject::new(id, element_type),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
    }

    /// Resolved waypoints: the logical anchor of each waypoint.
    pub fn anchors(&self) -> impl Iterator<Item = Point> + '_ {
        self.waypoints.iter().map(Waypoint::anchor)
    }

    pub fn source(&self) -> Option<ElementId> {
        self.source
    }

    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    pub fn set_endpoints(&mut self, source: Option<ElementId>, target: Option<ElementId>) {
        self.source = source;
        self.target = target;
    }

    pub fn business_object(&self) -> &BusinessObject {
        &self.business_object
    }

    pub fn business_object_mut(&mut self) -> &mut BusinessObject {
        &mut self.business_object
    }
}

/// Any element of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Root(Root),
    Shape(Shape),
    Connection(Connection),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Self::Root(root) => root.id(),
            Self::Shape(shape) => shape.id(),
            Self::Connection(connection) => connection.id(),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Root(root) => root.element_type(),
            Self::Shape(shape) => shape.element_type(),
            Self::Connection(connection) => connection.element_type(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Root(_) => ElementKind::Root,
            Self::Shape(_) => ElementKind::Shape,
            Self::Connection(_) => ElementKind::Connection,
        }
    }

    pub fn business_object(&self) -> &BusinessObject {
        match self {
            Self::Root(root) => root.business_object(),
            Self::Shape(shape) => shape.business_object(),
            Self::Connection(connection) => connection.business_object(),
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Self::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut Shape> {
        match self {
            Self::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_connection(&self) -> Option<&Connection> {
        match self {
            Self::Connection(connection) => Some(connection),
            _ => None,
        }
    }

    pub fn as_connection_mut(&mut self) -> Option<&mut Connection> {
        match self {
            Self::Connection(connection) => Some(connection),
            _ => None,
        }
    }

    /// Returns the area covered by the element; `None` for the root.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Root(_) => None,
            Self::Shape(shape) => Some(shape.bounds()),
            Self::Connection(connection) => {
                Bounds::from_points(connection.waypoints().iter().map(Waypoint::point))
            }
        }
    }

    /// Returns true when new elements may be placed inside this one.
    pub fn accepts_children(&self) -> bool {
        match self {
            Self::Root(_) => true,
            Self::Shape(shape) => shape.element_type().is_container() && !shape.is_collapsed(),
            Self::Connection(_) => false,
        }
    }
}

impl From<Root> for Element {
    fn from(root: Root) -> Self {
        Self::Root(root)
    }
}

impl From<Shape> for Element {
    fn from(shape: Shape) -> Self {
        Self::Shape(shape)
    }
}

impl From<Connection> for Element {
    fn from(connection: Connection) -> Self {
        Self::Connection(connection)
    }
}

#[cfg(test)]
mod tests {
    use hfcanvas_core::geometry::Size;

    use super::*;
    use crate::element_type::{CustomType, NativeType};

    #[test]
    fn test_waypoint_anchor_prefers_original() {
        let docked = Waypoint::with_original(Point::new(10.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(docked.anchor(), Point::new(0.0, 0.0));
        assert_eq!(docked.point(), Point::new(10.0, 0.0));

        let plain = Waypoint::new(Point::new(3.0, 4.0));
        assert_eq!(plain.anchor(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_waypoint_translate_moves_both_points() {
        let moved = Waypoint::with_original(Point::new(1.0, 1.0), Point::new(2.0, 2.0))
            .translate(Point::new(10.0, 0.0));
        assert_eq!(moved.point(), Point::new(11.0, 1.0));
        assert_eq!(moved.original(), Some(Point::new(12.0, 2.0)));
    }

    #[test]
    fn test_collapsed_subprocess_rejects_children() {
        let bounds = Bounds::new_from_top_left(Point::default(), Size::new(100.0, 80.0));
        let mut sub = Shape::new(
            Id::new("SubProcess_1"),
            NativeType::SubProcess.into(),
            bounds,
        );
        sub.set_is_expanded(Some(false));
        assert!(sub.is_collapsed());
        assert!(!Element::from(sub.clone()).accepts_children());

        sub.set_is_expanded(Some(true));
        assert!(Element::from(sub).accepts_children());

        let email = Shape::new(Id::new("Email_1"), CustomType::Email.into(), bounds);
        assert!(!email.is_collapsed());
        assert!(!Element::from(email).accepts_children());
    }

    #[test]
    fn test_connection_bounds_cover_waypoints() {
        let connection = Connection::new(
            Id::new("Connection_1"),
            CustomType::Connection.into(),
            vec![
                Point::new(10.0, 20.0).into(),
                Point::new(110.0, 20.0).into(),
                Point::new(110.0, 80.0).into(),
            ],
        );
        let bounds = Element::from(connection).bounds().unwrap();
        assert_eq!(bounds.min_point(), Point::new(10.0, 20.0));
        assert_eq!(bounds.width(), 100.0);
        assert_eq!(bounds.height(), 60.0);
    }
}
