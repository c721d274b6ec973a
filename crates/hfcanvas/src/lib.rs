//! hfcanvas - Custom workflow shapes on top of a minimal BPMN canvas.
//!
//! The crate pairs a small diagram host (element tree, event bus, extension
//! registry, modeling, tools, BPMN DI import/export and an SVG paint pass)
//! with the custom module that teaches it the `hf` vocabulary of message,
//! delay, flow-control and geometric shapes.
//!
//! [`Modeler`] wires both together and is the entry point for most users.

pub mod config;
pub mod custom;
pub mod element_type;
pub mod host;
pub mod model;

mod error;

pub use hfcanvas_core::{apply_stroke, color, draw, geometry, identifier};

pub use error::HfCanvasError;

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use log::{debug, info};

use hfcanvas_core::{color::Color, geometry::Point};

use config::AppConfig;
use custom::CustomModule;
use element_type::NativeType;
use host::{
    canvas::{Canvas, Zoom},
    event_bus::{Event, EventBus, Subscription},
    export::export_document,
    import::{ImportOutcome, ImportWarning, parse_document},
    modeling::{Modeling, ModelingError},
    palette::{Palette, PaletteEntry},
    registry::{ExtensionRegistry, Services},
    selection::{Selection, deselect_on_remove},
    tools::PaletteEvent,
};
use model::{ElementId, Shape};

/// A canvas with the custom module installed.
///
/// The modeler owns the host services, the extension registry and the
/// canvas. Documents are loaded with [`Modeler::import_xml`], edited through
/// the palette and [`Modeler::modeling`], and written back with
/// [`Modeler::export_xml`] or painted with [`Modeler::render_svg`].
///
/// # Examples
///
/// ```rust,no_run
/// use hfcanvas::{Modeler, config::AppConfig};
///
/// let xml = std::fs::read_to_string("diagram.bpmn").expect("Failed to read");
///
/// let mut modeler = Modeler::new(AppConfig::default())
///     .expect("Failed to set up modeler");
/// let warnings = modeler.import_xml(&xml)
///     .expect("Failed to import");
/// for warning in &warnings {
///     eprintln!("{warning}");
/// }
///
/// modeler.fit_viewport();
/// let svg = modeler.render_svg();
/// println!("{}", svg);
/// ```
pub struct Modeler {
    services: Services,
    registry: ExtensionRegistry,
    canvas: Canvas,
    selection: Rc<RefCell<Selection>>,
    background: Option<Color>,
    _selection_cleanup: Subscription,
}

impl Modeler {
    /// Create a modeler with the custom module installed and an empty process.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration with style and canvas settings
    ///
    /// # Errors
    ///
    /// Returns `HfCanvasError::Config` if a configured colour cannot be
    /// parsed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hfcanvas::{Modeler, config::AppConfig};
    ///
    /// let modeler = Modeler::new(AppConfig::default())
    ///     .expect("Failed to set up modeler");
    /// assert_eq!(modeler.palette_entries().len(), 28);
    /// ```
    pub fn new(config: AppConfig) -> Result<Self, HfCanvasError> {
        let background = config
            .style()
            .background_color()
            .map_err(HfCanvasError::Config)?;
        let canvas_config = config.canvas().clone();

        let services = Services::new(config);
        let mut registry = ExtensionRegistry::new();
        registry
            .install(&CustomModule::new(), &services)
            .map_err(HfCanvasError::Config)?;

        let root = registry
            .element_factory()
            .ok_or(ModelingError::NoFactory)?
            .create_root(NativeType::Process.into(), None)
            .map_err(ModelingError::from)?;
        let selection = Rc::new(RefCell::new(Selection::new()));
        let selection_cleanup = deselect_on_remove(&selection, &services.event_bus);
        debug!(registry:? = registry; "Modeler ready");

        Ok(Self {
            services,
            registry,
            canvas: Canvas::new(root, canvas_config),
            selection,
            background,
            _selection_cleanup: selection_cleanup,
        })
    }

    /// Replace the diagram with a BPMN DI document.
    ///
    /// Unknown elements are skipped and reported as warnings. The outcome is
    /// broadcast as `import.done` in both the success and the error case.
    ///
    /// # Arguments
    ///
    /// * `xml` - The BPMN DI document
    ///
    /// # Errors
    ///
    /// Returns `HfCanvasError::Import` for malformed documents; the error
    /// carries the document so spans can be reported against it.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hfcanvas::{Modeler, config::AppConfig};
    ///
    /// let mut modeler = Modeler::new(AppConfig::default()).unwrap();
    /// let xml = std::fs::read_to_string("diagram.bpmn").unwrap();
    /// let warnings = modeler.import_xml(&xml)
    ///     .expect("Failed to import");
    /// ```
    pub fn import_xml(&mut self, xml: &str) -> Result<Vec<ImportWarning>, HfCanvasError> {
        info!(bytes = xml.len(); "Importing document");
        self.selection.borrow_mut().clear(&self.services.event_bus);

        let result = match parse_document(xml) {
            Ok(diagram) => {
                self.reserve_ids(
                    std::iter::once(diagram.root().id())
                        .chain(diagram.shapes().iter().map(|(shape, _)| shape.id()))
                        .chain(diagram.connections().iter().map(|(connection, _)| connection.id())),
                );
                diagram.apply(&mut self.canvas, &self.registry, &self.services.event_bus)
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(warnings) => {
                info!(
                    elements = self.canvas.tree().len() - 1,
                    warnings = warnings.len();
                    "Document imported"
                );
                self.services.event_bus.fire(&Event::ImportDone(ImportOutcome::Success {
                    warnings: warnings.clone(),
                }));
                Ok(warnings)
            }
            Err(err) => {
                self.services
                    .event_bus
                    .fire(&Event::ImportDone(ImportOutcome::Error { error: err.clone() }));
                Err(HfCanvasError::new_import_error(err, xml))
            }
        }
    }

    /// Serialize the diagram as a BPMN DI document.
    pub fn export_xml(&self) -> String {
        export_document(self.canvas.tree())
    }

    /// Paint the diagram in the current viewbox to an SVG string.
    ///
    /// Elements no renderer can draw are logged and left out.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hfcanvas::{Modeler, config::AppConfig};
    ///
    /// let mut modeler = Modeler::new(AppConfig::default()).unwrap();
    /// modeler.fit_viewport();
    /// let svg = modeler.render_svg();
    /// println!("{}", svg);
    /// ```
    pub fn render_svg(&self) -> String {
        self.canvas
            .paint(&self.registry, self.background)
            .to_string()
    }

    /// The palette entries of every registered provider, in display order.
    pub fn palette_entries(&self) -> IndexMap<String, PaletteEntry> {
        self.palette().entries()
    }

    /// Run palette entry `id` for `event`.
    ///
    /// Returns `Ok(false)` when the entry does not react to the gesture.
    ///
    /// # Errors
    ///
    /// Returns `HfCanvasError::Palette` for unknown entries, separators and
    /// factory failures.
    pub fn trigger_palette(&self, id: &str, event: &PaletteEvent) -> Result<bool, HfCanvasError> {
        Ok(self.palette().trigger(id, event)?)
    }

    /// Drop the shape waiting in the create tool at `position`.
    ///
    /// The shape is centered on `position` inside `parent`, or inside the
    /// root when no parent is given.
    ///
    /// # Errors
    ///
    /// Returns `HfCanvasError::Modeling` if no placement is in progress or
    /// the rules deny the creation. A denied placement is consumed.
    pub fn commit_placement(
        &mut self,
        position: Point,
        parent: Option<ElementId>,
    ) -> Result<ElementId, HfCanvasError> {
        let placement = self
            .services
            .create_tool
            .take()
            .ok_or(ModelingError::NoPlacement)?;
        let parent = parent.unwrap_or_else(|| self.canvas.tree().root());
        Ok(self
            .modeling()
            .create_shape(placement.into_shape(), position, parent)?)
    }

    /// Abandon the placement in progress, if any.
    pub fn cancel_placement(&self) -> Option<Shape> {
        self.services.create_tool.cancel()
    }

    /// Zoom to fit the diagram into the viewport and return the new scale.
    pub fn fit_viewport(&mut self) -> f32 {
        self.zoom(Zoom::FitViewport)
    }

    /// Apply `zoom`, broadcast `canvas.viewbox.changed` and return the new scale.
    pub fn zoom(&mut self, zoom: Zoom) -> f32 {
        let scale = self.canvas.zoom(zoom);
        self.services.event_bus.fire(&Event::ViewboxChanged {
            viewbox: self.canvas.viewbox(),
        });
        scale
    }

    /// Modeling operations on the diagram.
    pub fn modeling(&mut self) -> Modeling<'_> {
        Modeling::new(&mut self.canvas, &self.registry, &self.services.event_bus)
    }

    /// Add an element to the selection. Returns false for unknown or already
    /// selected elements.
    ///
    /// Removed elements leave the selection on their own.
    pub fn select(&mut self, id: ElementId) -> bool {
        self.canvas.tree().contains(id)
            && self
                .selection
                .borrow_mut()
                .select(id, &self.services.event_bus)
    }

    pub fn deselect(&mut self, id: ElementId) -> bool {
        self.selection
            .borrow_mut()
            .deselect(id, &self.services.event_bus)
    }

    pub fn selection(&self) -> Vec<ElementId> {
        self.selection.borrow().get().to_vec()
    }

    /// Report the pointer entering an element.
    pub fn hover(&self, id: ElementId) {
        self.services.event_bus.fire(&Event::ElementHover { element: id });
    }

    pub fn event_bus(&self) -> &Rc<EventBus> {
        &self.services.event_bus
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    fn palette(&self) -> Palette {
        Palette::new(
            self.registry
                .palette_providers()
                .iter()
                .map(|entry| Rc::clone(entry.service()))
                .collect(),
        )
    }

    fn reserve_ids(&self, ids: impl Iterator<Item = ElementId>) {
        if let Some(factory) = self.registry.element_factory() {
            for id in ids {
                factory.reserve_id(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use hfcanvas_core::identifier::Id;

    use super::*;
    use crate::{
        element_type::{CustomType, ElementType},
        host::{
            event_bus::{EventKind, Subscription},
            import::{BPMN_DI_NS, BPMN_MODEL_NS, DC_NS, DI_NS, HF_NS},
        },
    };

    fn document(process: &str, di: &str) -> String {
        format!(
            r#"<bpmn:definitions xmlns:bpmn="{BPMN_MODEL_NS}" xmlns:bpmndi="{BPMN_DI_NS}" xmlns:dc="{DC_NS}" xmlns:di="{DI_NS}" xmlns:hf="{HF_NS}">
{process}
<bpmndi:BPMNDiagram><bpmndi:BPMNPlane bpmnElement="Process_1">{di}</bpmndi:BPMNPlane></bpmndi:BPMNDiagram>
</bpmn:definitions>"#
        )
    }

    fn email_document() -> String {
        document(
            r#"<bpmn:process id="Process_1"><hf:email id="Email_1" /></bpmn:process>"#,
            r#"<bpmndi:BPMNShape bpmnElement="Email_1"><dc:Bounds x="0" y="0" width="100" height="60" /></bpmndi:BPMNShape>"#,
        )
    }

    fn record(modeler: &Modeler, kind: EventKind) -> (Rc<RefCell<Vec<Event>>>, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = modeler
            .event_bus()
            .on(kind, 0, move |event| sink.borrow_mut().push(event.clone()));
        (events, subscription)
    }

    #[test]
    fn test_import_fires_import_done() {
        let mut modeler = Modeler::new(AppConfig::default()).unwrap();
        let (events, _subscription) = record(&modeler, EventKind::ImportDone);

        let warnings = modeler.import_xml(&email_document()).unwrap();
        assert!(warnings.is_empty());
        assert!(modeler.canvas().tree().contains(Id::new("Email_1")));

        let result = modeler.import_xml("<bpmn:definitions");
        assert!(matches!(result, Err(HfCanvasError::Import { .. })));

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::ImportDone(outcome) if outcome.is_success()));
        assert!(matches!(&events[1], Event::ImportDone(ImportOutcome::Error { .. })));
    }

    #[test]
    fn test_created_ids_do_not_collide_with_imported_ones() {
        let mut modeler = Modeler::new(AppConfig::default()).unwrap();
        modeler.import_xml(&email_document()).unwrap();

        modeler
            .trigger_palette("messages-email", &PaletteEvent::click(Point::new(0.0, 0.0)))
            .unwrap();
        let id = modeler.commit_placement(Point::new(300.0, 200.0), None).unwrap();

        assert_ne!(id, Id::new("Email_1"));
        let shape = modeler.canvas().tree().get(id).unwrap();
        assert_eq!(shape.element_type(), ElementType::from(CustomType::Email));
    }

    #[test]
    fn test_commit_without_placement_fails() {
        let mut modeler = Modeler::new(AppConfig::default()).unwrap();
        assert!(matches!(
            modeler.commit_placement(Point::default(), None),
            Err(HfCanvasError::Modeling(ModelingError::NoPlacement))
        ));
    }

    #[test]
    fn test_selection_and_viewbox_events() {
        let mut modeler = Modeler::new(AppConfig::default()).unwrap();
        modeler.import_xml(&email_document()).unwrap();
        let (selected, _selected_sub) = record(&modeler, EventKind::ElementSelected);
        let (viewbox, _viewbox_sub) = record(&modeler, EventKind::ViewboxChanged);

        assert!(modeler.select(Id::new("Email_1")));
        assert!(!modeler.select(Id::new("Email_1")));
        assert!(!modeler.select(Id::new("Missing_1")));
        assert_eq!(selected.borrow().len(), 1);
        assert!(modeler.deselect(Id::new("Email_1")));
        assert!(modeler.selection().is_empty());

        let scale = modeler.fit_viewport();
        assert!(scale > 0.0 && scale <= 1.0);
        assert_eq!(viewbox.borrow().len(), 1);
    }

    #[test]
    fn test_removed_elements_leave_the_selection() {
        let mut modeler = Modeler::new(AppConfig::default()).unwrap();
        modeler.import_xml(&email_document()).unwrap();
        let (unselected, _unselected_sub) = record(&modeler, EventKind::ElementUnselected);

        let email = Id::new("Email_1");
        assert!(modeler.select(email));
        modeler.modeling().remove_element(email).unwrap();

        assert!(modeler.selection().is_empty());
        assert_eq!(unselected.borrow().len(), 1);
        assert!(!modeler.deselect(email));
        assert_eq!(unselected.borrow().len(), 1);
    }

    #[test]
    fn test_invalid_background_is_config_error() {
        let config: AppConfig = toml::from_str("[style]\nbackground_color = \"nope\"").unwrap();
        assert!(matches!(Modeler::new(config), Err(HfCanvasError::Config(_))));
    }
}
