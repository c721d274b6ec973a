//! Current selection.

use std::{cell::RefCell, rc::Rc};

use log::trace;

use crate::{
    host::event_bus::{Event, EventBus, EventKind, Subscription},
    model::ElementId,
};

/// Priority of the listener that drops removed elements from the selection.
pub const SELECTION_CLEANUP_PRIORITY: i32 = 1500;

/// Ordered set of selected elements.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &[ElementId] {
        &self.selected
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    /// Adds `id` to the selection; fires `element.selected` when it was not selected.
    pub fn select(&mut self, id: ElementId, event_bus: &EventBus) -> bool {
        if self.is_selected(id) {
            return false;
        }
        self.selected.push(id);
        trace!(element:% = id; "Selected");
        event_bus.fire(&Event::ElementSelected { element: id });
        true
    }

    /// Removes `id`; fires `element.unselected` when it was selected.
    pub fn deselect(&mut self, id: ElementId, event_bus: &EventBus) -> bool {
        if !self.take(id) {
            return false;
        }
        event_bus.fire(&Event::ElementUnselected { element: id });
        true
    }

    fn take(&mut self, id: ElementId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|selected| *selected != id);
        let removed = self.selected.len() != before;
        if removed {
            trace!(element:% = id; "Deselected");
        }
        removed
    }

    /// Deselects everything.
    pub fn clear(&mut self, event_bus: &EventBus) {
        for id in std::mem::take(&mut self.selected) {
            event_bus.fire(&Event::ElementUnselected { element: id });
        }
    }
}

/// Deselects every element the bus reports as removed.
///
/// `element.unselected` is fired after the selection borrow is released, so
/// its listeners may read the selection.
pub fn deselect_on_remove(
    selection: &Rc<RefCell<Selection>>,
    event_bus: &Rc<EventBus>,
) -> Subscription {
    let selection = Rc::downgrade(selection);
    let bus = Rc::downgrade(event_bus);
    event_bus.on(
        EventKind::ElementRemoved,
        SELECTION_CLEANUP_PRIORITY,
        move |event| {
            let (Some(selection), Some(bus), Some(element)) =
                (selection.upgrade(), bus.upgrade(), event.element())
            else {
                return;
            };
            let was_selected = selection.borrow_mut().take(element);
            if was_selected {
                bus.fire(&Event::ElementUnselected { element });
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use hfcanvas_core::identifier::Id;

    use super::*;

    #[test]
    fn test_select_and_deselect_fire_once() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let selected = Rc::clone(&log);
        let _on_select = bus.on(EventKind::ElementSelected, 1000, move |event| {
            selected.borrow_mut().push(("selected", event.element()))
        });
        let unselected = Rc::clone(&log);
        let _on_unselect = bus.on(EventKind::ElementUnselected, 1000, move |event| {
            unselected.borrow_mut().push(("unselected", event.element()))
        });

        let mut selection = Selection::new();
        let email = Id::new("Email_1");
        assert!(selection.select(email, &bus));
        assert!(!selection.select(email, &bus));
        assert!(selection.deselect(email, &bus));
        assert!(!selection.deselect(email, &bus));

        assert_eq!(
            *log.borrow(),
            vec![("selected", Some(email)), ("unselected", Some(email))]
        );
    }

    #[test]
    fn test_removed_element_is_deselected() {
        let bus = EventBus::new();
        let selection = Rc::new(RefCell::new(Selection::new()));
        let _cleanup = deselect_on_remove(&selection, &bus);

        let unselected = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&unselected);
        let reader = Rc::clone(&selection);
        let _on_unselect = bus.on(EventKind::ElementUnselected, 1000, move |event| {
            log.borrow_mut().push((event.element(), reader.borrow().get().len()))
        });

        let email = Id::new("Email_1");
        let sms = Id::new("Sms_1");
        selection.borrow_mut().select(email, &bus);
        selection.borrow_mut().select(sms, &bus);

        bus.fire(&Event::ElementRemoved { element: email });
        bus.fire(&Event::ElementRemoved { element: Id::new("Task_1") });

        assert_eq!(selection.borrow().get(), &[sms]);
        assert_eq!(*unselected.borrow(), vec![(Some(email), 1)]);
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();
        let mut selection = Selection::new();
        selection.select(Id::new("A"), &bus);
        selection.select(Id::new("B"), &bus);
        selection.clear(&bus);
        assert!(selection.get().is_empty());
    }
}
