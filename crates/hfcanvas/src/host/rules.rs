//! Validation and post-change hooks.
//!
//! [`Rules`] providers are asked before modeling creates, moves or connects
//! elements. Each answer is optional; the first provider with an opinion, in
//! priority order, decides. [`Updater`]s run after a change has been applied
//! and may adjust the changed element.

use crate::{
    element_type::{ElementType, NativeType},
    model::{Connection, Element, Shape},
};

/// Outcome of a rule check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    Allow,
    Deny,
    /// Connecting is allowed with a connection of the given type
    Connect { connection_type: ElementType },
}

impl RuleVerdict {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Self::Deny)
    }
}

/// The `customRules` extension point.
///
/// Returning `None` leaves the decision to lower priority providers and
/// finally to the host defaults.
pub trait Rules {
    fn can_create(&self, _shape: &Shape, _target: &Element) -> Option<RuleVerdict> {
        None
    }

    fn can_move(&self, _shapes: &[&Shape], _target: &Element) -> Option<RuleVerdict> {
        None
    }

    fn can_connect(&self, _source: &Element, _target: &Element) -> Option<RuleVerdict> {
        None
    }
}

/// The `customUpdater` extension point.
pub trait Updater {
    /// Called after a connection was created or reconnected.
    fn connection_changed(&self, _connection: &mut Connection) {}

    /// Called after a shape was created, moved or resized.
    fn shape_changed(&self, _shape: &mut Shape) {}
}

/// Host default for placing a shape into `target`.
pub fn default_can_place(target: &Element) -> RuleVerdict {
    if target.accepts_children() {
        RuleVerdict::Allow
    } else {
        RuleVerdict::Deny
    }
}

/// Host default for connecting two elements.
pub fn default_can_connect(source: &Element, target: &Element) -> RuleVerdict {
    match (source, target) {
        (Element::Shape(source), Element::Shape(target)) if source.id() != target.id() => {
            RuleVerdict::Connect {
                connection_type: NativeType::SequenceFlow.into(),
            }
        }
        _ => RuleVerdict::Deny,
    }
}
