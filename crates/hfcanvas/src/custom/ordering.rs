//! Keeps custom connections above everything else.

use log::trace;

use crate::{
    element_type::{CustomType, ElementType},
    host::{
        ordering::{GetOrdering, InsertIndex, Ordering},
        tree::ElementTree,
    },
    model::{Element, ElementId},
};

/// Priority of [`CustomOrderingProvider`].
pub const CUSTOM_ORDERING_PRIORITY: i32 = 1000;

/// The `customOrderingProvider`.
///
/// Moves every `hf:connection` to the end of the root so it is painted on
/// top of all shapes, whatever parent it was proposed for.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomOrderingProvider;

impl CustomOrderingProvider {
    pub fn new() -> Self {
        Self
    }
}

impl GetOrdering for CustomOrderingProvider {
    fn get_ordering(
        &self,
        element: &Element,
        new_parent: ElementId,
        tree: &ElementTree,
    ) -> Option<Ordering> {
        if element.element_type() != ElementType::Custom(CustomType::Connection) {
            return None;
        }

        let ordering = Ordering::new(tree.root(), InsertIndex::Top);
        trace!(
            element:% = element.id(),
            proposed:% = new_parent,
            ordering:% = ordering;
            "Custom connection ordered on top"
        );
        Some(ordering)
    }
}

#[cfg(test)]
mod tests {
    use hfcanvas_core::{
        geometry::{Bounds, Point, Size},
        identifier::Id,
    };

    use super::*;
    use crate::{
        element_type::NativeType,
        model::{Connection, Root, Shape},
    };

    fn tree() -> ElementTree {
        let mut tree =
            ElementTree::new(Root::new(Id::new("Process_1"), NativeType::Process.into()));
        let root = tree.root();
        tree.insert(
            Shape::new(
                Id::new("Sub_1"),
                NativeType::SubProcess.into(),
                Bounds::new_from_top_left(Point::default(), Size::new(350.0, 200.0)),
            )
            .into(),
            root,
            InsertIndex::At(0),
        )
        .unwrap();
        tree
    }

    fn connection(ty: impl Into<ElementType>) -> Element {
        Connection::new(
            Id::new("Connection_1"),
            ty.into(),
            vec![Point::new(0.0, 0.0).into(), Point::new(10.0, 0.0).into()],
        )
        .into()
    }

    #[test]
    fn test_custom_connection_goes_to_root_top() {
        let tree = tree();
        let provider = CustomOrderingProvider::new();
        for parent in [Id::new("Sub_1"), tree.root()] {
            assert_eq!(
                provider.get_ordering(&connection(CustomType::Connection), parent, &tree),
                Some(Ordering::new(Id::new("Process_1"), InsertIndex::Top))
            );
        }
    }

    #[test]
    fn test_other_types_have_no_opinion() {
        let tree = tree();
        let provider = CustomOrderingProvider::new();
        let email: Element = Shape::new(
            Id::new("Email_1"),
            CustomType::Email.into(),
            Bounds::new_from_top_left(Point::default(), Size::new(100.0, 60.0)),
        )
        .into();

        assert_eq!(provider.get_ordering(&email, tree.root(), &tree), None);
        assert_eq!(
            provider.get_ordering(&connection(NativeType::SequenceFlow), tree.root(), &tree),
            None
        );
    }
}
