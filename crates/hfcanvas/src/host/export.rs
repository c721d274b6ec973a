//! BPMN DI document export.
//!
//! Writes the same subset [`parse_document`](super::import::parse_document)
//! reads. Connections the ordering moved to a collaboration root are written
//! into the process of the participant that holds their source.

use std::fmt::{self, Write};

use log::{info, warn};

use crate::{
    element_type::{ElementType, NativeType},
    host::{
        import::{BPMN_DI_NS, BPMN_MODEL_NS, DC_NS, DI_NS, HF_NS},
        tree::ElementTree,
    },
    model::{Connection, Element, ElementId, Shape},
};

/// Serializes the diagram held by `tree`.
pub fn export_document(tree: &ElementTree) -> String {
    let xml = DocumentXml::new(tree).to_string();
    info!(elements = tree.len() - 1, bytes = xml.len(); "Document exported");
    xml
}

/// [`fmt::Display`] adapter writing a BPMN DI document.
pub struct DocumentXml<'a> {
    tree: &'a ElementTree,
}

impl<'a> DocumentXml<'a> {
    pub fn new(tree: &'a ElementTree) -> Self {
        Self { tree }
    }

    fn write_semantic(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.tree.root_element();
        let root_id = root.id();

        if root.element_type() != ElementType::Native(NativeType::Collaboration) {
            writeln!(f, r#"  <bpmn:process id="{}">"#, Escaped(&root_id.to_string()))?;
            self.write_flow(f, root_id, &[], 2)?;
            return writeln!(f, "  </bpmn:process>");
        }

        let children = self.tree.children(root_id);
        let participants: Vec<&Shape> = children
            .iter()
            .filter_map(|id| self.tree.get(*id).and_then(Element::as_shape))
            .filter(|shape| shape.element_type() == ElementType::Native(NativeType::Participant))
            .collect();
        let floating: Vec<&Connection> = children
            .iter()
            .filter_map(|id| self.tree.get(*id).and_then(Element::as_connection))
            .collect();

        writeln!(f, r#"  <bpmn:collaboration id="{}">"#, Escaped(&root_id.to_string()))?;
        for participant in &participants {
            write!(
                f,
                r#"    <bpmn:participant id="{}""#,
                Escaped(&participant.id().to_string())
            )?;
            write_name(f, participant.business_object().name())?;
            writeln!(f, r#" processRef="{}" />"#, Escaped(&process_id(participant)))?;
        }
        writeln!(f, "  </bpmn:collaboration>")?;

        for connection in &floating {
            let owned = participants.iter().any(|participant| {
                connection
                    .source()
                    .is_some_and(|source| self.tree.is_ancestor(participant.id(), source))
            });
            if !owned {
                warn!(element:% = connection.id(); "Connection outside every participant left out");
            }
        }

        for participant in &participants {
            let extra: Vec<&Connection> = floating
                .iter()
                .copied()
                .filter(|connection| {
                    connection
                        .source()
                        .is_some_and(|source| self.tree.is_ancestor(participant.id(), source))
                })
                .collect();
            writeln!(
                f,
                r#"  <bpmn:process id="{}">"#,
                Escaped(&process_id(participant))
            )?;
            self.write_flow(f, participant.id(), &extra, 2)?;
            writeln!(f, "  </bpmn:process>")?;
        }
        Ok(())
    }

    fn write_flow(
        &self,
        f: &mut fmt::Formatter<'_>,
        container: ElementId,
        extra: &[&Connection],
        depth: usize,
    ) -> fmt::Result {
        let indent = "  ".repeat(depth);
        for id in self.tree.children(container) {
            match self.tree.get(*id) {
                Some(Element::Shape(shape)) => {
                    let tag = tag_name(shape.element_type());
                    write!(f, r#"{indent}<{tag} id="{}""#, Escaped(&id.to_string()))?;
                    write_name(f, shape.business_object().name())?;
                    if self.tree.children(*id).is_empty() {
                        writeln!(f, " />")?;
                    } else {
                        writeln!(f, ">")?;
                        self.write_flow(f, *id, &[], depth + 1)?;
                        writeln!(f, "{indent}</{tag}>")?;
                    }
                }
                Some(Element::Connection(connection)) => {
                    write_connection(f, connection, &indent)?;
                }
                Some(Element::Root(_)) | None => {}
            }
        }
        for connection in extra {
            write_connection(f, connection, &indent)?;
        }
        Ok(())
    }

    fn write_diagram(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"  <bpmndi:BPMNDiagram id="BPMNDiagram_1">"#)?;
        writeln!(
            f,
            r#"    <bpmndi:BPMNPlane id="BPMNPlane_1" bpmnElement="{}">"#,
            Escaped(&self.tree.root().to_string())
        )?;

        for shape in self.tree.iter().filter_map(Element::as_shape) {
            let id = shape.id().to_string();
            write!(
                f,
                r#"      <bpmndi:BPMNShape id="{}_di" bpmnElement="{}""#,
                Escaped(&id),
                Escaped(&id)
            )?;
            if let Some(is_expanded) = shape.business_object().di().is_expanded() {
                write!(f, r#" isExpanded="{is_expanded}""#)?;
            }
            let bounds = shape.bounds();
            writeln!(f, ">")?;
            writeln!(
                f,
                r#"        <dc:Bounds x="{}" y="{}" width="{}" height="{}" />"#,
                bounds.min_x(),
                bounds.min_y(),
                bounds.width(),
                bounds.height()
            )?;
            writeln!(f, "      </bpmndi:BPMNShape>")?;
        }

        for connection in self.tree.iter().filter_map(Element::as_connection) {
            let id = connection.id().to_string();
            writeln!(
                f,
                r#"      <bpmndi:BPMNEdge id="{}_di" bpmnElement="{}">"#,
                Escaped(&id),
                Escaped(&id)
            )?;
            for waypoint in connection.waypoints() {
                let point = waypoint.point();
                writeln!(
                    f,
                    r#"        <di:waypoint x="{}" y="{}" />"#,
                    point.x(),
                    point.y()
                )?;
            }
            writeln!(f, "      </bpmndi:BPMNEdge>")?;
        }

        writeln!(f, "    </bpmndi:BPMNPlane>")?;
        writeln!(f, "  </bpmndi:BPMNDiagram>")
    }
}

impl fmt::Display for DocumentXml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            f,
            r#"<bpmn:definitions xmlns:bpmn="{BPMN_MODEL_NS}" xmlns:bpmndi="{BPMN_DI_NS}" xmlns:dc="{DC_NS}" xmlns:di="{DI_NS}" xmlns:hf="{HF_NS}" id="Definitions_1">"#
        )?;
        self.write_semantic(f)?;
        self.write_diagram(f)?;
        writeln!(f, "</bpmn:definitions>")
    }
}

fn write_connection(
    f: &mut fmt::Formatter<'_>,
    connection: &Connection,
    indent: &str,
) -> fmt::Result {
    let business_object = connection.business_object();
    write!(
        f,
        r#"{indent}<{} id="{}""#,
        tag_name(connection.element_type()),
        Escaped(&connection.id().to_string())
    )?;
    write_name(f, business_object.name())?;
    if let Some(source) = business_object.source_ref().or(connection.source()) {
        write!(f, r#" sourceRef="{}""#, Escaped(&source.to_string()))?;
    }
    if let Some(target) = business_object.target_ref().or(connection.target()) {
        write!(f, r#" targetRef="{}""#, Escaped(&target.to_string()))?;
    }
    writeln!(f, " />")
}

fn write_name(f: &mut fmt::Formatter<'_>, name: Option<&str>) -> fmt::Result {
    match name {
        Some(name) => write!(f, r#" name="{}""#, Escaped(name)),
        None => Ok(()),
    }
}

/// Qualified element name, e.g. `bpmn:subProcess` or `hf:email`.
fn tag_name(element_type: ElementType) -> String {
    match element_type {
        ElementType::Custom(ty) => format!("hf:{}", ty.local_name()),
        ElementType::Native(ty) => format!("bpmn:{}", ty.xml_name()),
    }
}

/// The imported process id when there is one, otherwise one derived from
/// the participant.
fn process_id(participant: &Shape) -> String {
    match participant.business_object().process_ref() {
        Some(process) => process.to_string(),
        None => format!("Process_{}", participant.id()),
    }
}

/// Attribute value with XML special characters escaped.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hfcanvas_core::{
        geometry::{Bounds, Point, Size},
        identifier::Id,
    };

    use super::*;
    use crate::{
        element_type::CustomType,
        host::{import::parse_document, ordering::InsertIndex},
        model::Root,
    };

    fn bounds(x: f32, y: f32, w: f32, h: f32) -> Bounds {
        Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            Escaped(r#"Tom & "Jerry" <3"#).to_string(),
            "Tom &amp; &quot;Jerry&quot; &lt;3"
        );
    }

    #[test]
    fn test_export_then_import_keeps_structure() {
        let mut tree =
            ElementTree::new(Root::new(Id::new("Process_1"), NativeType::Process.into()));
        let root = tree.root();

        let mut sub = Shape::new(
            Id::new("Sub_1"),
            NativeType::SubProcess.into(),
            bounds(0.0, 0.0, 350.0, 200.0),
        );
        sub.set_is_expanded(Some(true));
        sub.business_object_mut().di_mut().set_is_expanded(Some(true));
        tree.insert(sub.into(), root, InsertIndex::At(0)).unwrap();

        let mut email = Shape::new(
            Id::new("Email_1"),
            CustomType::Email.into(),
            bounds(20.0, 20.0, 100.0, 60.0),
        );
        email.business_object_mut().set_name(Some("Say \"hi\"".to_string()));
        tree.insert(email.into(), Id::new("Sub_1"), InsertIndex::At(0)).unwrap();
        tree.insert(
            Shape::new(
                Id::new("Sms_1"),
                CustomType::Sms.into(),
                bounds(200.0, 20.0, 100.0, 60.0),
            )
            .into(),
            Id::new("Sub_1"),
            InsertIndex::At(1),
        )
        .unwrap();

        let mut connection = Connection::new(
            Id::new("Connection_1"),
            CustomType::Connection.into(),
            vec![Point::new(120.0, 50.0).into(), Point::new(200.0, 50.0).into()],
        );
        connection.set_endpoints(Some(Id::new("Email_1")), Some(Id::new("Sms_1")));
        tree.insert(connection.into(), root, InsertIndex::Top).unwrap();

        let xml = export_document(&tree);
        assert!(xml.contains(r#"isExpanded="true""#));
        assert!(xml.contains(r#"name="Say &quot;hi&quot;""#));

        let diagram = parse_document(&xml).unwrap();
        assert!(diagram.warnings().is_empty());
        let ids: Vec<String> = diagram
            .shapes()
            .iter()
            .map(|(shape, _)| shape.id().to_string())
            .collect();
        assert_eq!(ids, vec!["Sub_1", "Email_1", "Sms_1"]);
        assert_eq!(diagram.shapes()[0].0.business_object().di().is_expanded(), Some(true));
        assert_eq!(diagram.shapes()[1].0.business_object().name(), Some("Say \"hi\""));
        assert_eq!(diagram.connections()[0].0.source(), Some(Id::new("Email_1")));
    }

    #[test]
    fn test_collaboration_connections_land_in_source_process() {
        let mut tree = ElementTree::new(Root::new(
            Id::new("Collaboration_1"),
            NativeType::Collaboration.into(),
        ));
        let root = tree.root();
        tree.insert(
            Shape::new(
                Id::new("Participant_1"),
                NativeType::Participant.into(),
                bounds(0.0, 0.0, 600.0, 250.0),
            )
            .into(),
            root,
            InsertIndex::At(0),
        )
        .unwrap();
        for (index, id) in ["Email_1", "Sms_1"].into_iter().enumerate() {
            tree.insert(
                Shape::new(
                    Id::new(id),
                    CustomType::Email.into(),
                    bounds(50.0 + 200.0 * index as f32, 50.0, 100.0, 60.0),
                )
                .into(),
                Id::new("Participant_1"),
                InsertIndex::At(index),
            )
            .unwrap();
        }
        let mut connection = Connection::new(
            Id::new("Connection_1"),
            CustomType::Connection.into(),
            vec![Point::new(150.0, 80.0).into(), Point::new(250.0, 80.0).into()],
        );
        connection.set_endpoints(Some(Id::new("Email_1")), Some(Id::new("Sms_1")));
        tree.insert(connection.into(), root, InsertIndex::Top).unwrap();

        let diagram = parse_document(&export_document(&tree)).unwrap();
        assert_eq!(diagram.connections().len(), 1);
        assert_eq!(diagram.connections()[0].1, "Participant_1");
    }

    #[test]
    fn test_imported_process_id_survives_export() {
        let mut tree = ElementTree::new(Root::new(
            Id::new("Collaboration_1"),
            NativeType::Collaboration.into(),
        ));
        let root = tree.root();
        let participants = [("Participant_A", Some("Onboarding")), ("Participant_B", None)];
        for (index, (id, process)) in participants.into_iter().enumerate() {
            let mut participant = Shape::new(
                Id::new(id),
                NativeType::Participant.into(),
                bounds(0.0, 300.0 * index as f32, 600.0, 250.0),
            );
            participant
                .business_object_mut()
                .set_process_ref(process.map(Id::new));
            tree.insert(participant.into(), root, InsertIndex::At(index))
                .unwrap();
        }

        let xml = export_document(&tree);
        assert!(xml.contains(r#"processRef="Onboarding""#));
        assert!(xml.contains(r#"<bpmn:process id="Onboarding">"#));
        assert!(xml.contains(r#"processRef="Process_Participant_B""#));

        let diagram = parse_document(&xml).unwrap();
        let process_refs: Vec<Option<String>> = diagram
            .shapes()
            .iter()
            .map(|(shape, _)| {
                shape
                    .business_object()
                    .process_ref()
                    .map(|id| id.to_string())
            })
            .collect();
        assert_eq!(
            process_refs,
            vec![
                Some("Onboarding".to_string()),
                Some("Process_Participant_B".to_string())
            ]
        );
    }
}
