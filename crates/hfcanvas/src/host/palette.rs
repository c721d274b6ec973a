//! Palette entries and the host palette.
//!
//! Providers return an ordered map of entries; the host [`Palette`] merges
//! the maps of every registered provider and dispatches user gestures to the
//! matching entry action.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    host::{
        factory::FactoryError,
        tools::{Gesture, PaletteEvent},
    },
    model::Element,
};

/// Errors raised by palette actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    #[error("no palette entry named `{0}`")]
    UnknownEntry(String),

    #[error("palette entry `{0}` has no action")]
    NoAction(String),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// Handler bound to a palette gesture.
pub type ActionHandler = Rc<dyn Fn(&PaletteEvent) -> Result<(), PaletteError>>;

/// Handlers of a palette entry.
#[derive(Clone)]
pub struct EntryAction {
    click: ActionHandler,
    dragstart: Option<ActionHandler>,
}

impl EntryAction {
    /// Action reacting to clicks only.
    pub fn click(handler: ActionHandler) -> Self {
        Self {
            click: handler,
            dragstart: None,
        }
    }

    /// Action running the same handler on click and drag-start.
    pub fn click_and_drag(handler: ActionHandler) -> Self {
        Self {
            click: Rc::clone(&handler),
            dragstart: Some(handler),
        }
    }

    pub fn has_dragstart(&self) -> bool {
        self.dragstart.is_some()
    }

    /// Runs the handler for the event gesture. Returns `Ok(false)` when the
    /// gesture has no handler.
    pub fn trigger(&self, event: &PaletteEvent) -> Result<bool, PaletteError> {
        let handler = match event.gesture {
            Gesture::Click => Some(&self.click),
            Gesture::DragStart => self.dragstart.as_ref(),
        };
        match handler {
            Some(handler) => handler(event).map(|()| true),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryAction")
            .field("dragstart", &self.dragstart.is_some())
            .finish()
    }
}

/// One item of the palette.
#[derive(Debug, Clone)]
pub struct PaletteEntry {
    group: String,
    class_name: String,
    title: Option<String>,
    display_title: Option<String>,
    separator: bool,
    action: Option<EntryAction>,
}

impl PaletteEntry {
    /// An entry bound to an action.
    pub fn action(
        group: impl Into<String>,
        class_name: impl Into<String>,
        title: impl Into<String>,
        action: EntryAction,
    ) -> Self {
        Self {
            group: group.into(),
            class_name: class_name.into(),
            title: Some(title.into()),
            display_title: None,
            separator: false,
            action: Some(action),
        }
    }

    /// A visual separator closing `group`.
    pub fn separator(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            class_name: "separator".to_string(),
            title: None,
            display_title: None,
            separator: true,
            action: None,
        }
    }

    /// Sets the label shown next to the icon.
    pub fn with_display_title(mut self, display_title: impl Into<String>) -> Self {
        self.display_title = Some(display_title.into());
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn display_title(&self) -> Option<&str> {
        self.display_title.as_deref()
    }

    pub fn is_separator(&self) -> bool {
        self.separator
    }

    pub fn entry_action(&self) -> Option<&EntryAction> {
        self.action.as_ref()
    }
}

/// The `paletteProvider` extension point.
pub trait PaletteProvider {
    /// Returns the entries this provider contributes, in display order.
    fn palette_entries(&self, element: Option<&Element>) -> IndexMap<String, PaletteEntry>;
}

/// Host palette merging every registered provider.
pub struct Palette {
    providers: Vec<Rc<dyn PaletteProvider>>,
}

impl Palette {
    /// Creates a palette over `providers`, highest priority first.
    pub fn new(providers: Vec<Rc<dyn PaletteProvider>>) -> Self {
        Self { providers }
    }

    /// Merged entries; later providers do not replace ids already present.
    pub fn entries(&self) -> IndexMap<String, PaletteEntry> {
        let mut merged = IndexMap::new();
        for provider in &self.providers {
            for (id, entry) in provider.palette_entries(None) {
                merged.entry(id).or_insert(entry);
            }
        }
        merged
    }

    /// Runs the action of entry `id` for `event`.
    pub fn trigger(&self, id: &str, event: &PaletteEvent) -> Result<bool, PaletteError> {
        let entries = self.entries();
        let entry = entries
            .get(id)
            .ok_or_else(|| PaletteError::UnknownEntry(id.to_string()))?;
        let action = entry
            .entry_action()
            .ok_or_else(|| PaletteError::NoAction(id.to_string()))?;
        action.trigger(event)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use hfcanvas_core::geometry::Point;

    use super::*;

    struct Fixed {
        calls: Rc<Cell<usize>>,
        title: &'static str,
    }

    impl PaletteProvider for Fixed {
        fn palette_entries(&self, _element: Option<&Element>) -> IndexMap<String, PaletteEntry> {
            let calls = Rc::clone(&self.calls);
            let handler: ActionHandler =
                Rc::new(move |_: &PaletteEvent| -> Result<(), PaletteError> {
                    calls.set(calls.get() + 1);
                    Ok(())
                });

            let mut entries = IndexMap::new();
            entries.insert(
                "item".to_string(),
                PaletteEntry::action("group", "icon", self.title, EntryAction::click(handler)),
            );
            entries.insert("group-separator".to_string(), PaletteEntry::separator("group"));
            entries
        }
    }

    #[test]
    fn test_first_provider_wins() {
        let calls = Rc::new(Cell::new(0));
        let palette = Palette::new(vec![
            Rc::new(Fixed {
                calls: Rc::clone(&calls),
                title: "first",
            }),
            Rc::new(Fixed {
                calls: Rc::clone(&calls),
                title: "second",
            }),
        ]);

        let entries = palette.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["item"].title(), Some("first"));
    }

    #[test]
    fn test_trigger_dispatches_by_gesture() {
        let calls = Rc::new(Cell::new(0));
        let palette = Palette::new(vec![Rc::new(Fixed {
            calls: Rc::clone(&calls),
            title: "only",
        })]);

        assert!(palette.trigger("item", &PaletteEvent::click(Point::default())).unwrap());
        assert!(!palette
            .trigger("item", &PaletteEvent::drag_start(Point::default()))
            .unwrap());
        assert_eq!(calls.get(), 1);

        assert_eq!(
            palette.trigger("group-separator", &PaletteEvent::click(Point::default())),
            Err(PaletteError::NoAction("group-separator".to_string()))
        );
        assert_eq!(
            palette.trigger("missing", &PaletteEvent::click(Point::default())),
            Err(PaletteError::UnknownEntry("missing".to_string()))
        );
    }
}
