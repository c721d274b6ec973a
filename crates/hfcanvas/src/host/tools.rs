//! Interactive tools.
//!
//! The create tool holds a placement session: a freshly created shape waiting
//! for the user to drop it. The lasso and space tools only track whether they
//! are active.

use std::cell::{Cell, RefCell};

use log::debug;

use hfcanvas_core::geometry::Point;

use crate::model::Shape;

/// Pointer gesture that triggered a palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click,
    DragStart,
}

/// Input event handed to palette handlers and tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEvent {
    pub gesture: Gesture,
    pub position: Point,
}

impl PaletteEvent {
    pub fn click(position: Point) -> Self {
        Self {
            gesture: Gesture::Click,
            position,
        }
    }

    pub fn drag_start(position: Point) -> Self {
        Self {
            gesture: Gesture::DragStart,
            position,
        }
    }
}

/// Host-managed placement of unplaced shapes.
pub trait PlacementTool {
    /// Starts placing `shape`; replaces any session in progress.
    fn start(&self, event: &PaletteEvent, shape: Shape);
}

/// A tool that can be switched on from the palette.
pub trait ToolActivation {
    fn activate_selection(&self, event: &PaletteEvent);
}

/// A placement session in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    shape: Shape,
    started_at: Point,
}

impl Placement {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn started_at(&self) -> Point {
        self.started_at
    }

    pub fn into_shape(self) -> Shape {
        self.shape
    }
}

/// The host create tool.
#[derive(Debug, Default)]
pub struct CreateTool {
    session: RefCell<Option<Placement>>,
}

impl CreateTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Returns a copy of the pending placement, if any.
    pub fn pending(&self) -> Option<Placement> {
        self.session.borrow().clone()
    }

    /// Ends the session and hands the placement to the caller for commit.
    pub fn take(&self) -> Option<Placement> {
        self.session.borrow_mut().take()
    }

    /// Abandons the session; the shape never reaches the diagram.
    pub fn cancel(&self) -> Option<Shape> {
        let cancelled = self.take().map(Placement::into_shape);
        if let Some(shape) = &cancelled {
            debug!(element:% = shape.id(); "Placement cancelled");
        }
        cancelled
    }
}

impl PlacementTool for CreateTool {
    fn start(&self, event: &PaletteEvent, shape: Shape) {
        debug!(element:% = shape.id(), element_type:% = shape.element_type(); "Placement started");
        *self.session.borrow_mut() = Some(Placement {
            shape,
            started_at: event.position,
        });
    }
}

/// Activation state shared by the lasso and space tools.
#[derive(Debug, Default)]
struct Activation {
    active: Cell<bool>,
    activations: Cell<usize>,
}

impl Activation {
    fn activate(&self, tool: &str) {
        self.active.set(true);
        self.activations.set(self.activations.get() + 1);
        debug!(tool; "Tool activated");
    }
}

/// Rubber-band selection tool.
#[derive(Debug, Default)]
pub struct LassoTool {
    state: Activation,
}

impl LassoTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    /// Number of times the tool was activated.
    pub fn activations(&self) -> usize {
        self.state.activations.get()
    }

    pub fn deactivate(&self) {
        self.state.active.set(false);
    }
}

impl ToolActivation for LassoTool {
    fn activate_selection(&self, _event: &PaletteEvent) {
        self.state.activate("lasso");
    }
}

/// Tool that inserts or removes space between elements.
#[derive(Debug, Default)]
pub struct SpaceTool {
    state: Activation,
}

impl SpaceTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    pub fn activations(&self) -> usize {
        self.state.activations.get()
    }

    pub fn deactivate(&self) {
        self.state.active.set(false);
    }
}

impl ToolActivation for SpaceTool {
    fn activate_selection(&self, _event: &PaletteEvent) {
        self.state.activate("space");
    }
}

#[cfg(test)]
mod tests {
    use hfcanvas_core::{
        geometry::{Bounds, Size},
        identifier::Id,
    };

    use super::*;
    use crate::element_type::CustomType;

    fn email() -> Shape {
        Shape::new(
            Id::new("Email_1"),
            CustomType::Email.into(),
            Bounds::new_from_top_left(Point::default(), Size::new(100.0, 60.0)),
        )
    }

    #[test]
    fn test_create_session_lifecycle() {
        let tool = CreateTool::new();
        assert!(!tool.is_active());

        tool.start(&PaletteEvent::click(Point::new(5.0, 5.0)), email());
        assert!(tool.is_active());
        assert_eq!(tool.pending().unwrap().started_at(), Point::new(5.0, 5.0));

        let placement = tool.take().unwrap();
        assert_eq!(placement.shape().id(), Id::new("Email_1"));
        assert!(!tool.is_active());
    }

    #[test]
    fn test_cancel_discards_shape() {
        let tool = CreateTool::new();
        tool.start(&PaletteEvent::drag_start(Point::default()), email());
        assert_eq!(tool.cancel().map(|shape| shape.id()), Some(Id::new("Email_1")));
        assert!(tool.cancel().is_none());
    }

    #[test]
    fn test_tool_activation() {
        let lasso = LassoTool::new();
        let space = SpaceTool::new();
        lasso.activate_selection(&PaletteEvent::click(Point::default()));

        assert!(lasso.is_active());
        assert_eq!(lasso.activations(), 1);
        assert!(!space.is_active());

        lasso.deactivate();
        assert!(!lasso.is_active());
    }
}
