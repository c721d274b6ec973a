//! Element creation contract.
//!
//! The palette and the importer never build elements by hand; they describe
//! what they want with [`ShapeAttrs`] or [`ConnectionAttrs`] and let the
//! registered [`ElementFactory`] fill in ids, default sizes and business
//! objects.

use thiserror::Error;

use hfcanvas_core::geometry::{Point, Size};

use crate::{
    element_type::{ElementKind, ElementType},
    model::{Connection, ElementId, Root, Shape, Waypoint},
};

/// Errors raised while creating elements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactoryError {
    #[error("type `{element_type}` is a {kind}, expected a {expected}")]
    WrongKind {
        element_type: ElementType,
        kind: ElementKind,
        expected: ElementKind,
    },

    #[error("shape of type `{element_type}` cannot have size {width}x{height}")]
    DegenerateSize {
        element_type: ElementType,
        width: f32,
        height: f32,
    },

    #[error("connection of type `{element_type}` needs at least 2 waypoints, got {count}")]
    TooFewWaypoints {
        element_type: ElementType,
        count: usize,
    },
}

impl FactoryError {
    pub(crate) fn check_kind(element_type: ElementType, expected: ElementKind) -> Result<(), Self> {
        let kind = element_type.kind();
        if kind == expected {
            Ok(())
        } else {
            Err(Self::WrongKind {
                element_type,
                kind,
                expected,
            })
        }
    }
}

/// Description of a shape to create.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeAttrs {
    element_type: ElementType,
    id: Option<ElementId>,
    is_expanded: Option<bool>,
    size: Option<Size>,
    position: Option<Point>,
    name: Option<String>,
}

impl ShapeAttrs {
    pub fn new(element_type: impl Into<ElementType>) -> Self {
        Self {
            element_type: element_type.into(),
            id: None,
            is_expanded: None,
            size: None,
            position: None,
            name: None,
        }
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the expanded flag of composite shapes.
    pub fn expanded(mut self, is_expanded: bool) -> Self {
        self.is_expanded = Some(is_expanded);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Places the top-left corner of the shape.
    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn id(&self) -> Option<ElementId> {
        self.id
    }

    pub fn is_expanded(&self) -> Option<bool> {
        self.is_expanded
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Description of a connection to create.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionAttrs {
    element_type: ElementType,
    id: Option<ElementId>,
    waypoints: Vec<Waypoint>,
    source: Option<ElementId>,
    target: Option<ElementId>,
    name: Option<String>,
}

impl ConnectionAttrs {
    pub fn new(element_type: impl Into<ElementType>) -> Self {
        Self {
            element_type: element_type.into(),
            id: None,
            waypoints: Vec::new(),
            source: None,
            target: None,
            name: None,
        }
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Waypoint>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn between(mut self, source: ElementId, target: ElementId) -> Self {
        self.source = Some(source);
        self.target = Some(target);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn id(&self) -> Option<ElementId> {
        self.id
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn source(&self) -> Option<ElementId> {
        self.source
    }

    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// The `elementFactory` extension point.
pub trait ElementFactory {
    /// Creates an unplaced shape.
    fn create_shape(&self, attrs: ShapeAttrs) -> Result<Shape, FactoryError>;

    /// Creates an unplaced connection.
    fn create_connection(&self, attrs: ConnectionAttrs) -> Result<Connection, FactoryError>;

    /// Creates a pool shape, expanded unless `collapsed`.
    fn create_participant_shape(&self, collapsed: bool) -> Result<Shape, FactoryError>;

    /// Creates a root element of a root type.
    fn create_root(
        &self,
        element_type: ElementType,
        id: Option<ElementId>,
    ) -> Result<Root, FactoryError>;

    /// Marks an id as taken by an element created elsewhere, e.g. on import.
    fn reserve_id(&self, _id: ElementId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_type::{CustomType, NativeType};

    #[test]
    fn test_check_kind() {
        assert!(FactoryError::check_kind(CustomType::Email.into(), ElementKind::Shape).is_ok());

        let err = FactoryError::check_kind(NativeType::SequenceFlow.into(), ElementKind::Shape)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type `bpmn:SequenceFlow` is a connection, expected a shape"
        );
    }

    #[test]
    fn test_shape_attrs_builder() {
        let attrs = ShapeAttrs::new(NativeType::SubProcess)
            .expanded(true)
            .with_name("Review")
            .at(Point::new(10.0, 10.0));

        assert_eq!(attrs.element_type(), ElementType::Native(NativeType::SubProcess));
        assert_eq!(attrs.is_expanded(), Some(true));
        assert_eq!(attrs.name(), Some("Review"));
        assert_eq!(attrs.size(), None);
    }
}
