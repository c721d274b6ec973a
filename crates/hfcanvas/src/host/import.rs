//! BPMN DI document import.
//!
//! Reads the subset of BPMN 2.0 the canvas understands: a process or a
//! collaboration of participants, flow nodes and nested sub-processes,
//! `hf:*` custom elements, sequence flows and custom connections, plus the
//! `bpmndi` shapes and edges that position them. Elements outside that subset
//! are reported as [`ImportWarning`]s and left out of the diagram.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    ops::Range,
};

use log::{debug, info, trace, warn};
use roxmltree::{Document, Node};
use thiserror::Error;

use hfcanvas_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use crate::{
    element_type::{CustomType, ElementType, NativeType},
    host::{
        canvas::Canvas,
        event_bus::EventBus,
        modeling::{Modeling, ModelingError},
        registry::ExtensionRegistry,
    },
    model::{Connection, ElementId, Root, Shape, Waypoint},
};

pub const BPMN_MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
pub const BPMN_DI_NS: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
pub const DC_NS: &str = "http://www.omg.org/spec/DD/20100524/DC";
pub const DI_NS: &str = "http://www.omg.org/spec/DD/20100524/DI";
pub const HF_NS: &str = "http://hfcanvas.dev/schema/1.0";

/// Semantic children that carry nothing the canvas shows.
const IGNORED_CHILDREN: [&str; 5] = [
    "incoming",
    "outgoing",
    "documentation",
    "extensionElements",
    "laneSet",
];

/// A recoverable problem found while importing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    message: String,
    element: Option<String>,
}

impl ImportWarning {
    fn new(message: impl Into<String>, element: Option<&str>) -> Self {
        Self {
            message: message.into(),
            element: element.map(str::to_string),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Id of the offending element, when it has one.
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(element) => write!(f, "{element}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Errors that abort an import.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("malformed XML at {line}:{column}: {message}")]
    Xml {
        message: String,
        line: u32,
        column: u32,
        offset: usize,
    },

    #[error("document root is not a bpmn:definitions element")]
    NotDefinitions,

    #[error("document contains neither a process nor a collaboration")]
    NoRootContainer,

    #[error("duplicate element id `{id}`")]
    DuplicateId { id: String, span: Range<usize> },

    #[error("invalid value `{value}` for attribute `{attribute}`")]
    InvalidAttribute {
        attribute: String,
        value: String,
        span: Range<usize>,
    },

    #[error("failed to insert imported element")]
    Modeling(#[from] ModelingError),
}

impl ImportError {
    /// Byte range of the document the error points at, when known.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::Xml { offset, .. } => Some(*offset..*offset),
            Self::DuplicateId { span, .. } | Self::InvalidAttribute { span, .. } => {
                Some(span.clone())
            }
            Self::NotDefinitions | Self::NoRootContainer | Self::Modeling(_) => None,
        }
    }
}

/// Result of an import, as broadcast with `import.done`.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Success { warnings: Vec<ImportWarning> },
    Error { error: ImportError },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A parsed document, ready to be inserted into a canvas.
///
/// Shapes are kept in document pre-order so parents always precede their
/// children; connections follow every shape.
#[derive(Debug, Clone)]
pub struct ImportedDiagram {
    root: Root,
    shapes: Vec<(Shape, ElementId)>,
    connections: Vec<(Connection, ElementId)>,
    warnings: Vec<ImportWarning>,
}

impl ImportedDiagram {
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// Shapes with their parent ids.
    pub fn shapes(&self) -> &[(Shape, ElementId)] {
        &self.shapes
    }

    /// Connections with their parent ids.
    pub fn connections(&self) -> &[(Connection, ElementId)] {
        &self.connections
    }

    pub fn warnings(&self) -> &[ImportWarning] {
        &self.warnings
    }

    /// Replaces the canvas content with this diagram.
    ///
    /// Every element is inserted through [`Modeling`], so the ordering
    /// providers decide where it lands and listeners see the additions.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Modeling`] if an element cannot be inserted.
    pub fn apply(
        self,
        canvas: &mut Canvas,
        registry: &ExtensionRegistry,
        event_bus: &EventBus,
    ) -> Result<Vec<ImportWarning>, ImportError> {
        canvas.set_root(self.root);
        let mut modeling = Modeling::new(canvas, registry, event_bus);

        for (shape, parent) in self.shapes {
            modeling.add_shape(shape, parent)?;
        }
        for (connection, parent) in self.connections {
            modeling.create_connection(connection, parent)?;
        }

        Ok(self.warnings)
    }
}

/// Position data of a `bpmndi:BPMNShape`.
#[derive(Debug, Clone, Copy)]
struct ShapeDi {
    bounds: Bounds,
    is_expanded: Option<bool>,
}

/// Parses a BPMN DI document.
///
/// # Errors
///
/// Returns an [`ImportError`] for malformed XML, a document that is not a
/// `bpmn:definitions`, a document without a process or collaboration,
/// duplicate ids or unparsable DI attributes.
pub fn parse_document(xml: &str) -> Result<ImportedDiagram, ImportError> {
    let doc = Document::parse(xml).map_err(|err| {
        let pos = err.pos();
        ImportError::Xml {
            message: err.to_string(),
            line: pos.row,
            column: pos.col,
            offset: offset_at(xml, pos.row, pos.col),
        }
    })?;

    let definitions = doc.root_element();
    if !is_element(definitions, BPMN_MODEL_NS, "definitions") {
        return Err(ImportError::NotDefinitions);
    }

    let mut importer = Importer::default();
    importer.read_diagram_interchange(definitions)?;

    let processes: HashMap<&str, Node> = element_children(definitions)
        .filter(|node| is_element(*node, BPMN_MODEL_NS, "process"))
        .filter_map(|node| node.attribute("id").map(|id| (id, node)))
        .collect();

    let root = if let Some(collaboration) = element_children(definitions)
        .find(|node| is_element(*node, BPMN_MODEL_NS, "collaboration"))
    {
        let root_id = importer.claim_id(collaboration)?;
        for participant in element_children(collaboration) {
            if !is_element(participant, BPMN_MODEL_NS, "participant") {
                importer.unsupported(participant);
                continue;
            }
            let Some(participant_id) =
                importer.add_shape(participant, NativeType::Participant.into(), root_id)?
            else {
                continue;
            };
            if let Some(process) = participant
                .attribute("processRef")
                .and_then(|process_ref| processes.get(process_ref))
            {
                let process_id = importer.claim_id(*process)?;
                importer.set_process_ref(participant_id, process_id);
                importer.walk(*process, participant_id)?;
            }
        }
        Root::new(root_id, NativeType::Collaboration.into())
    } else if let Some(process) = element_children(definitions)
        .find(|node| is_element(*node, BPMN_MODEL_NS, "process"))
    {
        let root_id = importer.claim_id(process)?;
        importer.walk(process, root_id)?;
        Root::new(root_id, NativeType::Process.into())
    } else {
        return Err(ImportError::NoRootContainer);
    };

    let diagram = importer.finish(root);
    info!(
        root:% = diagram.root.id(),
        shapes = diagram.shapes.len(),
        connections = diagram.connections.len(),
        warnings = diagram.warnings.len();
        "Document parsed"
    );
    Ok(diagram)
}

#[derive(Default)]
struct Importer {
    shape_di: HashMap<String, ShapeDi>,
    edge_di: HashMap<String, Vec<Point>>,
    ids: HashSet<String>,
    shapes: Vec<(Shape, ElementId)>,
    connections: Vec<(Connection, ElementId)>,
    warnings: Vec<ImportWarning>,
}

impl Importer {
    fn read_diagram_interchange(&mut self, definitions: Node) -> Result<(), ImportError> {
        for node in definitions.descendants() {
            if is_element(node, BPMN_DI_NS, "BPMNShape") {
                let Some(element) = node.attribute("bpmnElement") else {
                    continue;
                };
                let Some(bounds) = element_children(node).find(|n| is_element(*n, DC_NS, "Bounds"))
                else {
                    self.warn("diagram shape has no bounds", Some(element));
                    continue;
                };
                let bounds = Bounds::new_from_top_left(
                    Point::new(
                        number_attribute(bounds, "x")?,
                        number_attribute(bounds, "y")?,
                    ),
                    Size::new(
                        number_attribute(bounds, "width")?,
                        number_attribute(bounds, "height")?,
                    ),
                );
                let is_expanded = bool_attribute(node, "isExpanded")?;
                self.shape_di.insert(
                    element.to_string(),
                    ShapeDi {
                        bounds,
                        is_expanded,
                    },
                );
            } else if is_element(node, BPMN_DI_NS, "BPMNEdge") {
                let Some(element) = node.attribute("bpmnElement") else {
                    continue;
                };
                let waypoints = element_children(node)
                    .filter(|n| is_element(*n, DI_NS, "waypoint"))
                    .map(|n| -> Result<Point, ImportError> {
                        Ok(Point::new(number_attribute(n, "x")?, number_attribute(n, "y")?))
                    })
                    .collect::<Result<Vec<_>, ImportError>>()?;
                self.edge_di.insert(element.to_string(), waypoints);
            }
        }
        debug!(
            shapes = self.shape_di.len(),
            edges = self.edge_di.len();
            "Diagram interchange read"
        );
        Ok(())
    }

    /// Imports the flow elements of `container` under `parent`.
    fn walk(&mut self, container: Node, parent: ElementId) -> Result<(), ImportError> {
        for node in element_children(container) {
            let name = node.tag_name().name();
            match node.tag_name().namespace() {
                Some(BPMN_MODEL_NS) if IGNORED_CHILDREN.contains(&name) => {}
                Some(BPMN_MODEL_NS) => match NativeType::from_xml_name(name) {
                    Some(NativeType::SequenceFlow) => {
                        self.add_connection(node, NativeType::SequenceFlow.into(), parent)?;
                    }
                    Some(NativeType::SubProcess) => {
                        let sub_process = NativeType::SubProcess.into();
                        if let Some(id) = self.add_shape(node, sub_process, parent)? {
                            self.walk(node, id)?;
                        }
                    }
                    Some(
                        ty @ (NativeType::StartEvent
                        | NativeType::IntermediateThrowEvent
                        | NativeType::EndEvent
                        | NativeType::ExclusiveGateway
                        | NativeType::Task),
                    ) => {
                        self.add_shape(node, ty.into(), parent)?;
                    }
                    Some(NativeType::Process | NativeType::Collaboration | NativeType::Participant)
                    | None => self.unsupported(node),
                },
                Some(HF_NS) => match CustomType::from_local_name(name) {
                    Some(CustomType::Connection) => {
                        self.add_connection(node, CustomType::Connection.into(), parent)?;
                    }
                    Some(ty) => {
                        self.add_shape(node, ty.into(), parent)?;
                    }
                    None => self.unsupported(node),
                },
                _ => self.unsupported(node),
            }
        }
        Ok(())
    }

    /// Queues a shape; returns its id, or `None` when it was skipped.
    fn add_shape(
        &mut self,
        node: Node,
        element_type: ElementType,
        parent: ElementId,
    ) -> Result<Option<ElementId>, ImportError> {
        let id = self.claim_id(node)?;
        let key = id.to_string();
        let Some(di) = self.shape_di.get(&key).copied() else {
            self.warn("element has no diagram shape", Some(key.as_str()));
            return Ok(None);
        };
        if di.bounds.to_size().is_degenerate() {
            self.warn("diagram shape has no area", Some(key.as_str()));
            return Ok(None);
        }

        let mut shape = Shape::new(id, element_type, di.bounds);
        if element_type.is_composite() {
            let is_expanded = di
                .is_expanded
                .unwrap_or(element_type == ElementType::Native(NativeType::Participant));
            shape.set_is_expanded(Some(is_expanded));
            shape.business_object_mut().di_mut().set_is_expanded(Some(is_expanded));
        }
        shape
            .business_object_mut()
            .set_name(node.attribute("name").map(str::to_string));

        trace!(element:% = id, element_type:% = element_type, parent:% = parent; "Shape read");
        self.shapes.push((shape, parent));
        Ok(Some(id))
    }

    fn set_process_ref(&mut self, participant: ElementId, process: ElementId) {
        if let Some((shape, _)) = self
            .shapes
            .iter_mut()
            .find(|(shape, _)| shape.id() == participant)
        {
            shape.business_object_mut().set_process_ref(Some(process));
        }
    }

    fn add_connection(
        &mut self,
        node: Node,
        element_type: ElementType,
        parent: ElementId,
    ) -> Result<(), ImportError> {
        let id = self.claim_id(node)?;
        let key = id.to_string();
        let points = self.edge_di.get(&key).cloned().unwrap_or_default();
        if points.len() < 2 {
            self.warn("connection needs at least two waypoints", Some(key.as_str()));
            return Ok(());
        }
        let (Some(source), Some(target)) =
            (node.attribute("sourceRef"), node.attribute("targetRef"))
        else {
            self.warn("connection is missing sourceRef or targetRef", Some(key.as_str()));
            return Ok(());
        };

        let waypoints = points.into_iter().map(Waypoint::from).collect();
        let mut connection = Connection::new(id, element_type, waypoints);
        let (source, target) = (Id::new(source), Id::new(target));
        connection.set_endpoints(Some(source), Some(target));
        connection
            .business_object_mut()
            .set_refs(Some(source), Some(target));
        connection
            .business_object_mut()
            .set_name(node.attribute("name").map(str::to_string));

        trace!(element:% = id, element_type:% = element_type, parent:% = parent; "Connection read");
        self.connections.push((connection, parent));
        Ok(())
    }

    /// Registers the id of `node`, rejecting duplicates.
    fn claim_id(&mut self, node: Node) -> Result<ElementId, ImportError> {
        let id = node.attribute("id").unwrap_or_default();
        if id.is_empty() {
            return Err(ImportError::InvalidAttribute {
                attribute: "id".to_string(),
                value: String::new(),
                span: node.range(),
            });
        }
        if !self.ids.insert(id.to_string()) {
            return Err(ImportError::DuplicateId {
                id: id.to_string(),
                span: node.range(),
            });
        }
        Ok(Id::new(id))
    }

    fn unsupported(&mut self, node: Node) {
        let prefix = match node.tag_name().namespace() {
            Some(BPMN_MODEL_NS) => "bpmn:",
            Some(HF_NS) => "hf:",
            _ => "",
        };
        let message = format!("unsupported element `{prefix}{}`", node.tag_name().name());
        self.warn(message, node.attribute("id"));
    }

    fn warn(&mut self, message: impl Into<String>, element: Option<&str>) {
        let warning = ImportWarning::new(message, element);
        warn!(warning:% = warning; "Import warning");
        self.warnings.push(warning);
    }

    /// Drops connections whose endpoints were not imported as shapes.
    fn finish(mut self, root: Root) -> ImportedDiagram {
        let shape_ids: HashSet<ElementId> =
            self.shapes.iter().map(|(shape, _)| shape.id()).collect();
        let (connections, dangling): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.connections)
                .into_iter()
                .partition(|(connection, _)| {
                    [connection.source(), connection.target()]
                        .into_iter()
                        .flatten()
                        .all(|endpoint| shape_ids.contains(&endpoint))
                });
        for (connection, _) in dangling {
            self.warn(
                "connection endpoint is not a shape",
                Some(connection.id().to_string().as_str()),
            );
        }

        ImportedDiagram {
            root,
            shapes: self.shapes,
            connections,
            warnings: self.warnings,
        }
    }
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn is_element(node: Node, namespace: &str, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(namespace)
        && node.tag_name().name() == name
}

fn number_attribute(node: Node, attribute: &str) -> Result<f32, ImportError> {
    let value = node.attribute(attribute).unwrap_or_default();
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| ImportError::InvalidAttribute {
            attribute: attribute.to_string(),
            value: value.to_string(),
            span: node.range(),
        })
}

fn bool_attribute(node: Node, attribute: &str) -> Result<Option<bool>, ImportError> {
    match node.attribute(attribute) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(value) => Err(ImportError::InvalidAttribute {
            attribute: attribute.to_string(),
            value: value.to_string(),
            span: node.range(),
        }),
    }
}

/// Byte offset of a 1-based line and column.
fn offset_at(xml: &str, line: u32, column: u32) -> usize {
    let line_start: usize = xml
        .split_inclusive('\n')
        .take(line.saturating_sub(1) as usize)
        .map(str::len)
        .sum();
    let column_offset: usize = xml[line_start..]
        .chars()
        .take(column.saturating_sub(1) as usize)
        .map(char::len_utf8)
        .sum();
    line_start + column_offset
}
