//! The `customInteractionLogger`: traces pointer interaction with elements.

use std::rc::Rc;

use log::trace;

use crate::host::event_bus::{Event, EventBus, EventKind, Subscription};

/// Priority of the hover listener.
pub const INTERACTION_LOGGER_PRIORITY: i32 = 1500;

/// Logs every `element.hover` event at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomInteractionLogger;

impl CustomInteractionLogger {
    pub fn new() -> Self {
        Self
    }

    /// Starts listening; the listener lives as long as the returned guard.
    pub fn attach(self, event_bus: &Rc<EventBus>) -> Subscription {
        event_bus.on(EventKind::ElementHover, INTERACTION_LOGGER_PRIORITY, |event| {
            if let Event::ElementHover { element } = event {
                trace!(element:% = element; "Element hovered");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use hfcanvas_core::identifier::Id;

    use super::*;

    #[test]
    fn test_listener_scoped_to_subscription() {
        let bus = EventBus::new();
        let subscription = CustomInteractionLogger::new().attach(&bus);
        let hover = Event::ElementHover {
            element: Id::new("Email_1"),
        };

        assert_eq!(bus.fire(&hover), 1);
        drop(subscription);
        assert_eq!(bus.fire(&hover), 0);
    }
}
