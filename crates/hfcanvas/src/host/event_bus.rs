//! Event bus with scoped subscriptions.
//!
//! Listeners are registered for one [`EventKind`] with a priority and are
//! called in descending priority order; listeners with equal priority run in
//! registration order. [`EventBus::on`] returns a [`Subscription`] guard and
//! the listener stays registered exactly as long as the guard lives.
//!
//! ```
//! # use std::{cell::Cell, rc::Rc};
//! # use hfcanvas::host::event_bus::{Event, EventBus, EventKind};
//! # use hfcanvas_core::identifier::Id;
//! let bus = EventBus::new();
//! let hovered = Rc::new(Cell::new(0));
//!
//! let counter = Rc::clone(&hovered);
//! let subscription = bus.on(EventKind::ElementHover, 1000, move |_| {
//!     counter.set(counter.get() + 1);
//! });
//!
//! bus.fire(&Event::ElementHover { element: Id::new("Email_1") });
//! drop(subscription);
//! bus.fire(&Event::ElementHover { element: Id::new("Email_1") });
//!
//! assert_eq!(hovered.get(), 1);
//! ```

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use log::trace;

use crate::{
    host::{canvas::Viewbox, import::ImportOutcome},
    model::ElementId,
};

/// Names of the events the host emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ElementHover,
    ElementSelected,
    ElementUnselected,
    ShapeAdded,
    ConnectionAdded,
    ElementChanged,
    ElementRemoved,
    ViewboxChanged,
    ImportDone,
}

impl EventKind {
    /// Returns the dotted event name, e.g. `element.hover`.
    pub fn name(self) -> &'static str {
        match self {
            Self::ElementHover => "element.hover",
            Self::ElementSelected => "element.selected",
            Self::ElementUnselected => "element.unselected",
            Self::ShapeAdded => "shape.added",
            Self::ConnectionAdded => "connection.added",
            Self::ElementChanged => "element.changed",
            Self::ElementRemoved => "element.removed",
            Self::ViewboxChanged => "canvas.viewbox.changed",
            Self::ImportDone => "import.done",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An event broadcast on the bus.
#[derive(Debug, Clone)]
pub enum Event {
    ElementHover { element: ElementId },
    ElementSelected { element: ElementId },
    ElementUnselected { element: ElementId },
    ShapeAdded { element: ElementId },
    ConnectionAdded { element: ElementId },
    ElementChanged { element: ElementId },
    ElementRemoved { element: ElementId },
    ViewboxChanged { viewbox: Viewbox },
    ImportDone(ImportOutcome),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ElementHover { .. } => EventKind::ElementHover,
            Self::ElementSelected { .. } => EventKind::ElementSelected,
            Self::ElementUnselected { .. } => EventKind::ElementUnselected,
            Self::ShapeAdded { .. } => EventKind::ShapeAdded,
            Self::ConnectionAdded { .. } => EventKind::ConnectionAdded,
            Self::ElementChanged { .. } => EventKind::ElementChanged,
            Self::ElementRemoved { .. } => EventKind::ElementRemoved,
            Self::ViewboxChanged { .. } => EventKind::ViewboxChanged,
            Self::ImportDone(_) => EventKind::ImportDone,
        }
    }

    /// Returns the element the event is about, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::ElementHover { element }
            | Self::ElementSelected { element }
            | Self::ElementUnselected { element }
            | Self::ShapeAdded { element }
            | Self::ConnectionAdded { element }
            | Self::ElementChanged { element }
            | Self::ElementRemoved { element } => Some(*element),
            Self::ViewboxChanged { .. } | Self::ImportDone(_) => None,
        }
    }
}

type Listener = Rc<dyn Fn(&Event)>;

struct ListenerEntry {
    id: u64,
    kind: EventKind,
    priority: i32,
    callback: Listener,
}

/// Synchronous publish/subscribe hub shared by the host services.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<ListenerEntry>>,
    next_id: Cell<u64>,
}

impl EventBus {
    /// Creates a new bus behind an `Rc`; subscriptions hold a weak handle to it.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Registers `callback` for `kind` events.
    ///
    /// The listener is removed when the returned [`Subscription`] is dropped.
    pub fn on(
        self: &Rc<Self>,
        kind: EventKind,
        priority: i32,
        callback: impl Fn(&Event) + 'static,
    ) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let mut listeners = self.listeners.borrow_mut();
        // Insert after every listener with the same or higher priority
        let position = listeners
            .iter()
            .position(|entry| entry.priority < priority)
            .unwrap_or(listeners.len());
        listeners.insert(
            position,
            ListenerEntry {
                id,
                kind,
                priority,
                callback: Rc::new(callback),
            },
        );
        trace!(event = kind.name(), priority, id; "Listener registered");

        Subscription {
            bus: Rc::downgrade(self),
            id,
        }
    }

    /// Delivers `event` to its listeners and returns how many were called.
    ///
    /// Listeners may subscribe or unsubscribe while the event is delivered;
    /// such changes take effect for the next event.
    pub fn fire(&self, event: &Event) -> usize {
        let kind = event.kind();
        let callbacks: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Rc::clone(&entry.callback))
            .collect();

        trace!(event = kind.name(), listeners = callbacks.len(); "Firing event");
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Returns the number of live listeners for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    fn off(&self, id: u64) {
        // The removed callback may own further subscriptions, so it is
        // dropped only after the borrow is released.
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            listeners
                .iter()
                .position(|entry| entry.id == id)
                .map(|position| listeners.remove(position))
        };
        if removed.is_some() {
            trace!(id; "Listener removed");
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

/// Guard for a registered listener; dropping it unsubscribes.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<EventBus>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.off(self.id);
        }
    }
}
