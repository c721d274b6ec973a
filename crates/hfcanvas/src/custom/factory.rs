//! The `elementFactory` provider.

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
};

use log::debug;

use hfcanvas_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use crate::{
    element_type::{CustomCategory, CustomType, ElementKind, ElementType, NativeType},
    host::factory::{ConnectionAttrs, ElementFactory, FactoryError, ShapeAttrs},
    model::{Connection, ElementId, Root, Shape, Waypoint},
};

/// Creates elements with default sizes and `<Type>_<n>` ids.
#[derive(Debug, Default)]
pub struct CustomElementFactory {
    counter: Cell<usize>,
    reserved: RefCell<HashSet<ElementId>>,
}

impl CustomElementFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free id for `element_type`.
    fn next_id(&self, element_type: ElementType) -> ElementId {
        let prefix = id_prefix(element_type);
        loop {
            let index = self.counter.get() + 1;
            self.counter.set(index);
            let id = Id::indexed(&prefix, index);
            if self.reserved.borrow_mut().insert(id) {
                return id;
            }
        }
    }

    fn resolve_id(&self, requested: Option<ElementId>, element_type: ElementType) -> ElementId {
        match requested {
            Some(id) => {
                self.reserved.borrow_mut().insert(id);
                id
            }
            None => self.next_id(element_type),
        }
    }
}

/// Default size of a shape type.
///
/// Composite types are larger when expanded.
pub fn default_size(element_type: ElementType, is_expanded: bool) -> Size {
    let (width, height) = match element_type {
        ElementType::Custom(ty) => match ty.category() {
            CustomCategory::Message | CustomCategory::Delay | CustomCategory::FlowControl => {
                (100.0, 60.0)
            }
            CustomCategory::Geometric if ty == CustomType::Triangle => (40.0, 40.0),
            CustomCategory::Geometric => (140.0, 140.0),
            CustomCategory::Connection => (0.0, 0.0),
        },
        ElementType::Native(ty) => match ty {
            NativeType::StartEvent | NativeType::IntermediateThrowEvent | NativeType::EndEvent => {
                (36.0, 36.0)
            }
            NativeType::ExclusiveGateway => (50.0, 50.0),
            NativeType::Task => (100.0, 80.0),
            NativeType::SubProcess if is_expanded => (350.0, 200.0),
            NativeType::SubProcess => (100.0, 80.0),
            NativeType::Participant if is_expanded => (600.0, 250.0),
            NativeType::Participant => (400.0, 60.0),
            NativeType::Process | NativeType::Collaboration | NativeType::SequenceFlow => {
                (0.0, 0.0)
            }
        },
    };
    Size::new(width, height)
}

/// Id prefix of a type: `Email` for `hf:email`, `SubProcess` for `bpmn:SubProcess`.
fn id_prefix(element_type: ElementType) -> String {
    let name = element_type.local_name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ElementFactory for CustomElementFactory {
    fn create_shape(&self, attrs: ShapeAttrs) -> Result<Shape, FactoryError> {
        let element_type = attrs.element_type();
        FactoryError::check_kind(element_type, ElementKind::Shape)?;

        let is_expanded = element_type.is_composite().then(|| {
            attrs
                .is_expanded()
                .unwrap_or(element_type == ElementType::Native(NativeType::Participant))
        });
        let size = attrs
            .size()
            .unwrap_or_else(|| default_size(element_type, is_expanded.unwrap_or(false)));
        if size.is_degenerate() {
            return Err(FactoryError::DegenerateSize {
                element_type,
                width: size.width(),
                height: size.height(),
            });
        }

        let id = self.resolve_id(attrs.id(), element_type);
        let top_left = attrs.position().unwrap_or_default();
        let mut shape = Shape::new(id, element_type, Bounds::new_from_top_left(top_left, size));
        shape.set_is_expanded(is_expanded);
        shape.business_object_mut().di_mut().set_is_expanded(is_expanded);
        shape
            .business_object_mut()
            .set_name(attrs.name().map(str::to_string));

        debug!(
            element:% = id,
            element_type:% = element_type,
            width = size.width(),
            height = size.height();
            "Shape created"
        );
        Ok(shape)
    }

    fn create_connection(&self, attrs: ConnectionAttrs) -> Result<Connection, FactoryError> {
        let element_type = attrs.element_type();
        FactoryError::check_kind(element_type, ElementKind::Connection)?;

        let waypoints: Vec<Waypoint> = if attrs.waypoints().is_empty() {
            vec![Point::new(0.0, 0.0).into(), Point::new(100.0, 0.0).into()]
        } else {
            attrs.waypoints().to_vec()
        };
        if waypoints.len() < 2 {
            return Err(FactoryError::TooFewWaypoints {
                element_type,
                count: waypoints.len(),
            });
        }

        let id = self.resolve_id(attrs.id(), element_type);
        let mut connection = Connection::new(id, element_type, waypoints);
        connection.set_endpoints(attrs.source(), attrs.target());
        connection
            .business_object_mut()
            .set_name(attrs.name().map(str::to_string));

        debug!(element:% = id, element_type:% = element_type; "Connection created");
        Ok(connection)
    }

    fn create_participant_shape(&self, collapsed: bool) -> Result<Shape, FactoryError> {
        self.create_shape(ShapeAttrs::new(NativeType::Participant).expanded(!collapsed))
    }

    fn create_root(
        &self,
        element_type: ElementType,
        id: Option<ElementId>,
    ) -> Result<Root, FactoryError> {
        FactoryError::check_kind(element_type, ElementKind::Root)?;
        let id = self.resolve_id(id, element_type);
        Ok(Root::new(id, element_type))
    }

    fn reserve_id(&self, id: ElementId) {
        self.reserved.borrow_mut().insert(id);
    }
}
