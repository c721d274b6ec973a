//! The `customRules` and `customUpdater` providers.

use log::{debug, trace};

use crate::{
    element_type::{CustomType, ElementType, NativeType},
    host::rules::{RuleVerdict, Rules, Updater},
    model::{Connection, Element, Shape},
};

/// Priority of [`CustomRules`] and [`CustomUpdater`].
pub const CUSTOM_RULES_PRIORITY: i32 = 1000;

/// Rules for custom elements.
///
/// Custom shapes are connected with `hf:connection` and never land inside a
/// collapsed sub-process. Everything else is left to the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomRules;

impl CustomRules {
    pub fn new() -> Self {
        Self
    }
}

fn is_collapsed_sub_process(target: &Element) -> bool {
    match target {
        Element::Shape(shape) => {
            shape.element_type() == ElementType::Native(NativeType::SubProcess)
                && shape.is_collapsed()
        }
        _ => false,
    }
}

fn placement_verdict<'s>(
    mut shapes: impl Iterator<Item = &'s Shape>,
    target: &Element,
) -> Option<RuleVerdict> {
    if is_collapsed_sub_process(target) && shapes.any(|shape| shape.element_type().is_custom()) {
        debug!(target:% = target.id(); "Custom shape denied in collapsed sub-process");
        Some(RuleVerdict::Deny)
    } else {
        None
    }
}

impl Rules for CustomRules {
    fn can_create(&self, shape: &Shape, target: &Element) -> Option<RuleVerdict> {
        placement_verdict(std::iter::once(shape), target)
    }

    fn can_move(&self, shapes: &[&Shape], target: &Element) -> Option<RuleVerdict> {
        placement_verdict(shapes.iter().copied(), target)
    }

    fn can_connect(&self, source: &Element, target: &Element) -> Option<RuleVerdict> {
        let (Element::Shape(source), Element::Shape(target)) = (source, target) else {
            return None;
        };
        if source.id() == target.id() {
            return None;
        }
        if source.element_type().is_custom() || target.element_type().is_custom() {
            Some(RuleVerdict::Connect {
                connection_type: CustomType::Connection.into(),
            })
        } else {
            None
        }
    }
}

/// Keeps the business object references of custom connections in sync with
/// their endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomUpdater;

impl CustomUpdater {
    pub fn new() -> Self {
        Self
    }
}

impl Updater for CustomUpdater {
    fn connection_changed(&self, connection: &mut Connection) {
        if connection.element_type() != ElementType::Custom(CustomType::Connection) {
            return;
        }
        let (source, target) = (connection.source(), connection.target());
        connection.business_object_mut().set_refs(source, target);
        trace!(element:% = connection.id(); "Connection references updated");
    }
}
