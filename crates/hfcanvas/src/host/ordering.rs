//! Z-order and parent placement.
//!
//! Whenever modeling inserts or moves an element it asks the registered
//! [`GetOrdering`] providers, highest priority first, where the element should
//! go. The first provider that answers wins; when none answers the host falls
//! back to [`default_ordering`], which sorts siblings by [`level`].

use std::fmt;

use log::trace;

use crate::{
    element_type::{ElementKind, ElementType, NativeType},
    host::tree::ElementTree,
    model::{Element, ElementId},
};

/// Insertion position among the children of a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertIndex {
    /// Explicit zero-based position
    At(usize),
    /// After every sibling, and kept above siblings inserted later
    Top,
}

/// Placement decided for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub parent: ElementId,
    pub index: InsertIndex,
}

impl Ordering {
    pub fn new(parent: ElementId, index: InsertIndex) -> Self {
        Self { parent, index }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            InsertIndex::At(index) => write!(f, "{}[{index}]", self.parent),
            InsertIndex::Top => write!(f, "{}[top]", self.parent),
        }
    }
}

/// Capability of overriding where elements are placed.
pub trait GetOrdering {
    /// Returns the placement for `element` proposed to go under `new_parent`,
    /// or `None` to leave the decision to other providers.
    fn get_ordering(
        &self,
        element: &Element,
        new_parent: ElementId,
        tree: &ElementTree,
    ) -> Option<Ordering>;
}

/// Rendering level of an element type; lower levels are painted first.
pub fn level(element_type: ElementType) -> i32 {
    match element_type {
        ElementType::Native(NativeType::Participant) => -2,
        ElementType::Native(NativeType::SubProcess) => 0,
        ty if ty.kind() == ElementKind::Connection => 3,
        _ => 1,
    }
}

/// Host placement used when no provider answers.
///
/// Keeps the proposed parent and inserts the element after the last sibling
/// whose level is not higher than its own. Pinned siblings stay above it.
pub fn default_ordering(element: &Element, new_parent: ElementId, tree: &ElementTree) -> Ordering {
    let own_level = level(element.element_type());
    let id = element.id();

    let index = tree
        .children(new_parent)
        .iter()
        .filter(|sibling| **sibling != id)
        .position(|sibling| {
            tree.is_pinned(*sibling)
                || tree
                    .get(*sibling)
                    .is_some_and(|sibling| level(sibling.element_type()) > own_level)
        });

    let ordering = match index {
        Some(index) => Ordering::new(new_parent, InsertIndex::At(index)),
        None => Ordering::new(
            new_parent,
            InsertIndex::At(
                tree.children(new_parent)
                    .iter()
                    .filter(|sibling| **sibling != id)
                    .count(),
            ),
        ),
    };
    trace!(element:% = id, ordering:% = ordering; "Default ordering");
    ordering
}
