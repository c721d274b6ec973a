//! The `paletteProvider`: the catalog of creation and tool entries.
//!
//! Creation entries only build an unplaced shape and hand it to the host
//! placement tool; the provider never touches the diagram and keeps no state
//! between calls.

use std::rc::Rc;

use indexmap::IndexMap;
use log::debug;

use crate::{
    element_type::{CustomType, ElementType, NativeType},
    host::{
        factory::{ElementFactory, ShapeAttrs},
        palette::{ActionHandler, EntryAction, PaletteEntry, PaletteError, PaletteProvider},
        tools::{PaletteEvent, PlacementTool, ToolActivation},
    },
    model::Element,
};

/// Priority of [`CustomPaletteProvider`].
pub const CUSTOM_PALETTE_PRIORITY: i32 = 1000;

/// A creation entry of the catalog.
struct CreateEntry {
    id: &'static str,
    element_type: ElementType,
    group: &'static str,
    class_name: &'static str,
    title: Option<&'static str>,
    display_title: Option<&'static str>,
    is_expanded: Option<bool>,
}

impl CreateEntry {
    const fn custom(
        id: &'static str,
        ty: CustomType,
        group: &'static str,
        class_name: &'static str,
        title: &'static str,
        display_title: &'static str,
    ) -> Self {
        Self {
            id,
            element_type: ElementType::Custom(ty),
            group,
            class_name,
            title: Some(title),
            display_title: Some(display_title),
            is_expanded: None,
        }
    }

    const fn native(
        id: &'static str,
        ty: NativeType,
        group: &'static str,
        class_name: &'static str,
    ) -> Self {
        Self {
            id,
            element_type: ElementType::Native(ty),
            group,
            class_name,
            title: None,
            display_title: None,
            is_expanded: None,
        }
    }
}

const MESSAGES: [CreateEntry; 5] = [
    CreateEntry::custom(
        "messages-email",
        CustomType::Email,
        "messages",
        "icon-messages-email",
        "Email",
        "Email",
    ),
    CreateEntry::custom(
        "messages-pns",
        CustomType::Pns,
        "messages",
        "icon-messages-pns",
        "Push",
        "Push",
    ),
    CreateEntry::custom(
        "messages-sms",
        CustomType::Sms,
        "messages",
        "icon-messages-sms",
        "Text",
        "Text",
    ),
    CreateEntry::custom(
        "messages-msgcenter",
        CustomType::MsgCenter,
        "messages",
        "icon-messages-msgcenter",
        "Msg Center",
        "Msg Center",
    ),
    CreateEntry::custom(
        "messages-webhook",
        CustomType::Webhook,
        "messages",
        "icon-messages-webhook",
        "Web Hook",
        "Web Hook",
    ),
];

const DELAYS: [CreateEntry; 3] = [
    CreateEntry::custom(
        "delay-waituntil",
        CustomType::WaitUntil,
        "delay",
        "icon-delay-waituntil",
        "Wait Until",
        "Wait Until",
    ),
    CreateEntry::custom(
        "delay-timedelay",
        CustomType::TimeDelay,
        "delay",
        "icon-delay-timedelay",
        "Time Delay",
        "Time Delay",
    ),
    CreateEntry::custom(
        "delay-timewindow",
        CustomType::TimeWindow,
        "delay",
        "icon-delay-timewindow",
        "Time Window",
        "Time Window",
    ),
];

const FLOW_CONTROL: [CreateEntry; 4] = [
    CreateEntry::custom(
        "flowcontrol-truefalse",
        CustomType::TrueFalse,
        "flowcontrol",
        "icon-flowcontrol-truefalse",
        "True False Branch",
        "True False",
    ),
    CreateEntry::custom(
        "flowcontrol-multisplit",
        CustomType::MultiSplit,
        "flowcontrol",
        "icon-flowcontrol-multisplit",
        "Multi Split Branch",
        "Multi Split",
    ),
    CreateEntry::custom(
        "flowcontrol-start",
        CustomType::Start,
        "flowcontrol",
        "icon-flowcontrol-start",
        "Start",
        "Start",
    ),
    CreateEntry::custom(
        "flowcontrol-exit",
        CustomType::Exit,
        "flowcontrol",
        "icon-flowcontrol-exit",
        "Exit",
        "Exit",
    ),
];

const GEOMETRIC: [CreateEntry; 2] = [
    CreateEntry::custom(
        "custom-triangle",
        CustomType::Triangle,
        "custom",
        "icon-custom-triangle",
        "Triangle",
        "Triangle",
    ),
    CreateEntry::custom(
        "custom-circle",
        CustomType::Circle,
        "custom",
        "icon-custom-circle",
        "Circle",
        "Circle",
    ),
];

const NATIVE: [CreateEntry; 6] = [
    CreateEntry::native(
        "create.start-event",
        NativeType::StartEvent,
        "event",
        "bpmn-icon-start-event-none",
    ),
    CreateEntry::native(
        "create.intermediate-event",
        NativeType::IntermediateThrowEvent,
        "event",
        "bpmn-icon-intermediate-event-none",
    ),
    CreateEntry::native(
        "create.end-event",
        NativeType::EndEvent,
        "event",
        "bpmn-icon-end-event-none",
    ),
    CreateEntry::native(
        "create.exclusive-gateway",
        NativeType::ExclusiveGateway,
        "gateway",
        "bpmn-icon-gateway-xor",
    ),
    CreateEntry::native("create.task", NativeType::Task, "activity", "bpmn-icon-task"),
    CreateEntry {
        id: "create.subprocess-expanded",
        element_type: ElementType::Native(NativeType::SubProcess),
        group: "activity",
        class_name: "bpmn-icon-subprocess-expanded",
        title: Some("Create expanded SubProcess"),
        display_title: None,
        is_expanded: Some(true),
    },
];

/// Builds the palette catalog over the host factory and tools.
pub struct CustomPaletteProvider {
    factory: Rc<dyn ElementFactory>,
    create: Rc<dyn PlacementTool>,
    lasso_tool: Rc<dyn ToolActivation>,
    space_tool: Rc<dyn ToolActivation>,
}

impl CustomPaletteProvider {
    pub fn new(
        factory: Rc<dyn ElementFactory>,
        create: Rc<dyn PlacementTool>,
        lasso_tool: Rc<dyn ToolActivation>,
        space_tool: Rc<dyn ToolActivation>,
    ) -> Self {
        Self {
            factory,
            create,
            lasso_tool,
            space_tool,
        }
    }

    /// Entry creating a shape and starting its placement on click or drag.
    fn create_action(&self, entry: &CreateEntry) -> PaletteEntry {
        let factory = Rc::clone(&self.factory);
        let create = Rc::clone(&self.create);
        let element_type = entry.element_type;
        let is_expanded = entry.is_expanded;

        let handler: ActionHandler =
            Rc::new(move |event: &PaletteEvent| -> Result<(), PaletteError> {
                let mut attrs = ShapeAttrs::new(element_type);
                if let Some(is_expanded) = is_expanded {
                    attrs = attrs.expanded(is_expanded);
                }
                let mut shape = factory.create_shape(attrs)?;
                if is_expanded.is_some() {
                    shape.business_object_mut().di_mut().set_is_expanded(is_expanded);
                }
                create.start(event, shape);
                Ok(())
            });

        let title = entry
            .title
            .map_or_else(|| format!("Create {}", element_type.local_name()), str::to_string);
        let palette_entry = PaletteEntry::action(
            entry.group,
            entry.class_name,
            title,
            EntryAction::click_and_drag(handler),
        );
        match entry.display_title {
            Some(display_title) => palette_entry.with_display_title(display_title),
            None => palette_entry,
        }
    }

    fn tool_action(tool: &Rc<dyn ToolActivation>, class_name: &str, title: &str) -> PaletteEntry {
        let tool = Rc::clone(tool);
        let handler: ActionHandler =
            Rc::new(move |event: &PaletteEvent| -> Result<(), PaletteError> {
                tool.activate_selection(event);
                Ok(())
            });
        PaletteEntry::action("tools", class_name, title, EntryAction::click(handler))
    }

    fn participant_action(&self) -> PaletteEntry {
        let factory = Rc::clone(&self.factory);
        let create = Rc::clone(&self.create);
        let handler: ActionHandler =
            Rc::new(move |event: &PaletteEvent| -> Result<(), PaletteError> {
                let shape = factory.create_participant_shape(false)?;
                create.start(event, shape);
                Ok(())
            });
        PaletteEntry::action(
            "collaboration",
            "bpmn-icon-participant",
            "Create Pool/Participant",
            EntryAction::click_and_drag(handler),
        )
    }
}

impl PaletteProvider for CustomPaletteProvider {
    fn palette_entries(&self, _element: Option<&Element>) -> IndexMap<String, PaletteEntry> {
        let mut entries = IndexMap::new();

        for (group, separator, catalog) in [
            ("messages", "messages-separator", &MESSAGES[..]),
            ("delay", "delay-separator", &DELAYS[..]),
            ("flowcontrol", "flowcontrol-separator", &FLOW_CONTROL[..]),
            ("custom", "custom-separator", &GEOMETRIC[..]),
        ] {
            for entry in catalog {
                entries.insert(entry.id.to_string(), self.create_action(entry));
            }
            entries.insert(separator.to_string(), PaletteEntry::separator(group));
        }

        entries.insert(
            "lasso-tool".to_string(),
            Self::tool_action(&self.lasso_tool, "bpmn-icon-lasso-tool", "Activate the lasso tool"),
        );
        entries.insert(
            "space-tool".to_string(),
            Self::tool_action(
                &self.space_tool,
                "bpmn-icon-space-tool",
                "Activate the create/remove space tool",
            ),
        );
        entries.insert("tool-separator".to_string(), PaletteEntry::separator("tools"));

        for entry in &NATIVE {
            entries.insert(entry.id.to_string(), self.create_action(entry));
        }
        entries.insert(
            "create.participant-expanded".to_string(),
            self.participant_action(),
        );

        debug!(entries = entries.len(); "Palette entries built");
        entries
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use hfcanvas_core::geometry::Point;

    use super::*;
    use crate::{
        custom::factory::CustomElementFactory,
        host::{
            factory::{ConnectionAttrs, FactoryError},
            tools::{CreateTool, LassoTool, SpaceTool},
        },
        model::{Connection, ElementId, Root, Shape},
    };

    /// Factory recording the requested types.
    #[derive(Default)]
    struct RecordingFactory {
        inner: CustomElementFactory,
        shapes: RefCell<Vec<ShapeAttrs>>,
        participants: RefCell<Vec<bool>>,
    }

    impl ElementFactory for RecordingFactory {
        fn create_shape(&self, attrs: ShapeAttrs) -> Result<Shape, FactoryError> {
            self.shapes.borrow_mut().push(attrs.clone());
            self.inner.create_shape(attrs)
        }

        fn create_connection(&self, attrs: ConnectionAttrs) -> Result<Connection, FactoryError> {
            self.inner.create_connection(attrs)
        }

        fn create_participant_shape(&self, collapsed: bool) -> Result<Shape, FactoryError> {
            self.participants.borrow_mut().push(collapsed);
            self.inner.create_participant_shape(collapsed)
        }

        fn create_root(
            &self,
            element_type: ElementType,
            id: Option<ElementId>,
        ) -> Result<Root, FactoryError> {
            self.inner.create_root(element_type, id)
        }
    }

    /// Placement tool counting started sessions.
    #[derive(Default)]
    struct RecordingCreate {
        started: RefCell<Vec<Shape>>,
    }

    impl PlacementTool for RecordingCreate {
        fn start(&self, _event: &PaletteEvent, shape: Shape) {
            self.started.borrow_mut().push(shape);
        }
    }

    struct Fixture {
        factory: Rc<RecordingFactory>,
        create: Rc<RecordingCreate>,
        lasso: Rc<LassoTool>,
        space: Rc<SpaceTool>,
        provider: CustomPaletteProvider,
    }

    fn fixture() -> Fixture {
        let factory = Rc::new(RecordingFactory::default());
        let create = Rc::new(RecordingCreate::default());
        let lasso = Rc::new(LassoTool::new());
        let space = Rc::new(SpaceTool::new());
        let provider = CustomPaletteProvider::new(
            Rc::clone(&factory) as Rc<dyn ElementFactory>,
            Rc::clone(&create) as Rc<dyn PlacementTool>,
            Rc::clone(&lasso) as Rc<dyn ToolActivation>,
            Rc::clone(&space) as Rc<dyn ToolActivation>,
        );
        Fixture {
            factory,
            create,
            lasso,
            space,
            provider,
        }
    }

    #[test]
    fn test_catalog_order_and_separators() {
        let entries = fixture().provider.palette_entries(None);
        let ids: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(
            ids,
            vec![
                "messages-email",
                "messages-pns",
                "messages-sms",
                "messages-msgcenter",
                "messages-webhook",
                "messages-separator",
                "delay-waituntil",
                "delay-timedelay",
                "delay-timewindow",
                "delay-separator",
                "flowcontrol-truefalse",
                "flowcontrol-multisplit",
                "flowcontrol-start",
                "flowcontrol-exit",
                "flowcontrol-separator",
                "custom-triangle",
                "custom-circle",
                "custom-separator",
                "lasso-tool",
                "space-tool",
                "tool-separator",
                "create.start-event",
                "create.intermediate-event",
                "create.end-event",
                "create.exclusive-gateway",
                "create.task",
                "create.subprocess-expanded",
                "create.participant-expanded",
            ]
        );

        let separators = entries.values().filter(|entry| entry.is_separator()).count();
        assert_eq!(separators, 5);
        assert!(
            entries
                .values()
                .filter(|entry| entry.is_separator())
                .all(|entry| entry.entry_action().is_none())
        );

        assert_eq!(entries["create.task"].title(), Some("Create Task"));
        assert_eq!(entries["flowcontrol-start"].display_title(), Some("Start"));
        assert_eq!(entries["custom-circle"].title(), Some("Circle"));
        assert_eq!(entries["create.exclusive-gateway"].group(), "gateway");
    }

    #[test]
    fn test_creation_entry_creates_once_and_starts_once() {
        let fixture = fixture();
        let entries = fixture.provider.palette_entries(None);
        let action = entries["messages-sms"].entry_action().unwrap();

        assert!(action.trigger(&PaletteEvent::click(Point::new(10.0, 10.0))).unwrap());

        let shapes = fixture.factory.shapes.borrow();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].element_type(), ElementType::from(CustomType::Sms));
        let started = fixture.create.started.borrow();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].element_type(), ElementType::from(CustomType::Sms));
    }

    #[test]
    fn test_creation_entries_react_to_drag() {
        let fixture = fixture();
        let entries = fixture.provider.palette_entries(None);
        for (id, entry) in entries.iter().filter(|(id, _)| id.starts_with("create.")) {
            let action = entry.entry_action().unwrap();
            assert!(action.has_dragstart(), "{id}");
            action.trigger(&PaletteEvent::drag_start(Point::default())).unwrap();
        }
        assert_eq!(fixture.create.started.borrow().len(), 7);
        assert_eq!(*fixture.factory.participants.borrow(), vec![false]);
    }

    #[test]
    fn test_expanded_sub_process_mirrors_di() {
        let fixture = fixture();
        let entries = fixture.provider.palette_entries(None);
        entries["create.subprocess-expanded"]
            .entry_action()
            .unwrap()
            .trigger(&PaletteEvent::click(Point::default()))
            .unwrap();

        assert_eq!(fixture.factory.shapes.borrow()[0].is_expanded(), Some(true));
        let started = fixture.create.started.borrow();
        assert_eq!(started[0].is_expanded(), Some(true));
        assert_eq!(started[0].business_object().di().is_expanded(), Some(true));
    }

    #[test]
    fn test_tool_entries_activate_tools_without_creating() {
        let fixture = fixture();
        let entries = fixture.provider.palette_entries(None);

        let lasso = entries["lasso-tool"].entry_action().unwrap();
        assert!(!lasso.has_dragstart());
        assert!(lasso.trigger(&PaletteEvent::click(Point::default())).unwrap());
        assert!(!lasso.trigger(&PaletteEvent::drag_start(Point::default())).unwrap());
        entries["space-tool"]
            .entry_action()
            .unwrap()
            .trigger(&PaletteEvent::click(Point::default()))
            .unwrap();

        assert!(fixture.lasso.is_active());
        assert_eq!(fixture.space.activations(), 1);
        assert!(fixture.factory.shapes.borrow().is_empty());
        assert!(fixture.create.started.borrow().is_empty());
    }

    #[test]
    fn test_with_host_create_tool() {
        let create = Rc::new(CreateTool::new());
        let provider = CustomPaletteProvider::new(
            Rc::new(CustomElementFactory::new()),
            Rc::clone(&create) as Rc<dyn PlacementTool>,
            Rc::new(LassoTool::new()),
            Rc::new(SpaceTool::new()),
        );
        provider.palette_entries(None)["custom-triangle"]
            .entry_action()
            .unwrap()
            .trigger(&PaletteEvent::click(Point::new(5.0, 5.0)))
            .unwrap();

        let pending = create.pending().unwrap();
        assert_eq!(pending.shape().element_type(), ElementType::from(CustomType::Triangle));
        assert_eq!(pending.started_at(), Point::new(5.0, 5.0));
    }
}
