//! Containment tree of diagram elements.
//!
//! The tree owns every element, records each element's parent and keeps the
//! children of each parent in z-order (first child is painted first). It also
//! remembers which elements were placed with [`InsertIndex::Top`] so the
//! default ordering can keep them above later siblings.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{
    host::ordering::InsertIndex,
    model::{Element, ElementId, Root},
};

/// Structural errors raised by [`ElementTree`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("element `{0}` already exists")]
    DuplicateId(ElementId),

    #[error("element `{0}` does not exist")]
    UnknownElement(ElementId),

    #[error("the root element `{0}` cannot be moved or removed")]
    RootImmutable(ElementId),

    #[error("element `{element}` cannot be placed inside its own descendant `{parent}`")]
    Cycle {
        element: ElementId,
        parent: ElementId,
    },
}

/// Elements with parent links and z-ordered child lists.
#[derive(Debug, Clone)]
pub struct ElementTree {
    root: ElementId,
    elements: HashMap<ElementId, Element>,
    children: HashMap<ElementId, Vec<ElementId>>,
    parents: HashMap<ElementId, ElementId>,
    pinned: HashSet<ElementId>,
}

impl ElementTree {
    pub fn new(root: Root) -> Self {
        let id = root.id();
        let mut elements = HashMap::new();
        elements.insert(id, Element::Root(root));

        Self {
            root: id,
            elements,
            children: HashMap::from([(id, Vec::new())]),
            parents: HashMap::new(),
            pinned: HashSet::new(),
        }
    }

    /// Returns the id of the root element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn root_element(&self) -> &Element {
        &self.elements[&self.root]
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Number of elements, root included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.parents.get(&id).copied()
    }

    /// Children of `id` in z-order; empty for leaves and unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Position of `id` among its siblings.
    pub fn index_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// Returns true when the element was last placed with [`InsertIndex::Top`].
    pub fn is_pinned(&self, id: ElementId) -> bool {
        self.pinned.contains(&id)
    }

    /// Returns true when `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// Inserts a new element under `parent` at `index`.
    pub fn insert(
        &mut self,
        element: Element,
        parent: ElementId,
        index: InsertIndex,
    ) -> Result<(), TreeError> {
        let id = element.id();
        if self.contains(id) {
            return Err(TreeError::DuplicateId(id));
        }
        if !self.contains(parent) {
            return Err(TreeError::UnknownElement(parent));
        }

        self.elements.insert(id, element);
        self.children.insert(id, Vec::new());
        self.attach(id, parent, index);
        Ok(())
    }

    /// Moves an existing element to a new position, possibly under a new parent.
    pub fn reparent(
        &mut self,
        id: ElementId,
        parent: ElementId,
        index: InsertIndex,
    ) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::RootImmutable(id));
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownElement(id));
        }
        if !self.contains(parent) {
            return Err(TreeError::UnknownElement(parent));
        }
        if self.is_ancestor(id, parent) {
            return Err(TreeError::Cycle {
                element: id,
                parent,
            });
        }

        self.detach(id);
        self.attach(id, parent, index);
        Ok(())
    }

    /// Removes an element and its whole subtree, returning them parent first.
    pub fn remove(&mut self, id: ElementId) -> Result<Vec<Element>, TreeError> {
        if id == self.root {
            return Err(TreeError::RootImmutable(id));
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownElement(id));
        }

        self.detach(id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(children) = self.children.remove(&current) {
                stack.extend(children.into_iter().rev());
            }
            self.parents.remove(&current);
            self.pinned.remove(&current);
            if let Some(element) = self.elements.remove(&current) {
                removed.push(element);
            }
        }
        Ok(removed)
    }

    /// All descendants of `id` in paint order, excluding `id` itself.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Every non-root element in paint order: depth first, children in z-order.
    pub fn paint_order(&self) -> Vec<ElementId> {
        self.descendants(self.root)
    }

    /// Iterates over every non-root element in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
        self.paint_order()
            .into_iter()
            .filter_map(|id| self.elements.get(&id))
    }

    fn attach(&mut self, id: ElementId, parent: ElementId, index: InsertIndex) {
        let siblings = self.children.entry(parent).or_default();
        match index {
            InsertIndex::Top => {
                siblings.push(id);
                self.pinned.insert(id);
            }
            InsertIndex::At(position) => {
                siblings.insert(position.min(siblings.len()), id);
                self.pinned.remove(&id);
            }
        }
        self.parents.insert(id, parent);
    }

    fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.parents.remove(&id) else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|child| *child != id);
        }
    }
}
