//! Element type tags.
//!
//! Every element carries an [`ElementType`]: either one of the custom workflow
//! types in the `hf` namespace or one of the native BPMN types the host knows
//! about in the `bpmn` namespace. Types print and parse as `namespace:local`
//! tags.
//!
//! ```
//! # use hfcanvas::element_type::{CustomType, ElementType, NativeType};
//! let email: ElementType = "hf:email".parse().unwrap();
//! assert_eq!(email, ElementType::Custom(CustomType::Email));
//! assert!(email.is_custom());
//!
//! let task = ElementType::Native(NativeType::Task);
//! assert_eq!(task.to_string(), "bpmn:Task");
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Namespace of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Custom workflow vocabulary
    Hf,
    /// Native BPMN vocabulary handled by the host
    Bpmn,
}

impl Namespace {
    /// Returns the tag prefix of this namespace.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Hf => "hf",
            Self::Bpmn => "bpmn",
        }
    }
}

/// Structural kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Root,
    Shape,
    Connection,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Shape => "shape",
            Self::Connection => "connection",
        };
        write!(f, "{name}")
    }
}

/// Visual family of a custom type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomCategory {
    Message,
    Delay,
    FlowControl,
    Geometric,
    Connection,
}

impl CustomCategory {
    /// Returns the CSS class of the outer badge group, for badge categories.
    pub fn group_class(self) -> Option<&'static str> {
        match self {
            Self::Message => Some("message"),
            Self::Delay => Some("delay"),
            Self::FlowControl => Some("control"),
            Self::Geometric | Self::Connection => None,
        }
    }
}

/// Custom types rendered as labelled rounded-rectangle badges.
///
/// The discriminant doubles as the index into per-badge tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    Email = 0,
    Pns,
    Sms,
    MsgCenter,
    Webhook,
    WaitUntil,
    TimeDelay,
    TimeWindow,
    TrueFalse,
    MultiSplit,
    Start,
    Exit,
}

impl BadgeKind {
    /// Number of badge kinds.
    pub const COUNT: usize = 12;

    /// All badge kinds in index order.
    pub const ALL: [BadgeKind; Self::COUNT] = [
        Self::Email,
        Self::Pns,
        Self::Sms,
        Self::MsgCenter,
        Self::Webhook,
        Self::WaitUntil,
        Self::TimeDelay,
        Self::TimeWindow,
        Self::TrueFalse,
        Self::MultiSplit,
        Self::Start,
        Self::Exit,
    ];

    /// Position of this kind in [`BadgeKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the custom type drawn with this badge.
    pub fn custom_type(self) -> CustomType {
        match self {
            Self::Email => CustomType::Email,
            Self::Pns => CustomType::Pns,
            Self::Sms => CustomType::Sms,
            Self::MsgCenter => CustomType::MsgCenter,
            Self::Webhook => CustomType::Webhook,
            Self::WaitUntil => CustomType::WaitUntil,
            Self::TimeDelay => CustomType::TimeDelay,
            Self::TimeWindow => CustomType::TimeWindow,
            Self::TrueFalse => CustomType::TrueFalse,
            Self::MultiSplit => CustomType::MultiSplit,
            Self::Start => CustomType::Start,
            Self::Exit => CustomType::Exit,
        }
    }
}

/// Element types in the `hf` namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomType {
    Email,
    Pns,
    Sms,
    MsgCenter,
    Webhook,
    WaitUntil,
    TimeDelay,
    TimeWindow,
    TrueFalse,
    MultiSplit,
    Start,
    Exit,
    Triangle,
    Circle,
    Connection,
}

impl CustomType {
    /// Every custom type.
    pub const ALL: [CustomType; 15] = [
        Self::Email,
        Self::Pns,
        Self::Sms,
        Self::MsgCenter,
        Self::Webhook,
        Self::WaitUntil,
        Self::TimeDelay,
        Self::TimeWindow,
        Self::TrueFalse,
        Self::MultiSplit,
        Self::Start,
        Self::Exit,
        Self::Triangle,
        Self::Circle,
        Self::Connection,
    ];

    /// Local part of the type tag, e.g. `msgcenter`.
    pub fn local_name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Pns => "pns",
            Self::Sms => "sms",
            Self::MsgCenter => "msgcenter",
            Self::Webhook => "webhook",
            Self::WaitUntil => "waituntil",
            Self::TimeDelay => "timedelay",
            Self::TimeWindow => "timewindow",
            Self::TrueFalse => "truefalse",
            Self::MultiSplit => "multisplit",
            Self::Start => "start",
            Self::Exit => "exit",
            Self::Triangle => "triangle",
            Self::Circle => "circle",
            Self::Connection => "connection",
        }
    }

    pub fn category(self) -> CustomCategory {
        match self {
            Self::Email | Self::Pns | Self::Sms | Self::MsgCenter | Self::Webhook => {
                CustomCategory::Message
            }
            Self::WaitUntil | Self::TimeDelay | Self::TimeWindow => CustomCategory::Delay,
            Self::TrueFalse | Self::MultiSplit | Self::Start | Self::Exit => {
                CustomCategory::FlowControl
            }
            Self::Triangle | Self::Circle => CustomCategory::Geometric,
            Self::Connection => CustomCategory::Connection,
        }
    }

    /// Returns the badge drawn for this type, if it is a badge type.
    pub fn badge(self) -> Option<BadgeKind> {
        match self {
            Self::Email => Some(BadgeKind::Email),
            Self::Pns => Some(BadgeKind::Pns),
            Self::Sms => Some(BadgeKind::Sms),
            Self::MsgCenter => Some(BadgeKind::MsgCenter),
            Self::Webhook => Some(BadgeKind::Webhook),
            Self::WaitUntil => Some(BadgeKind::WaitUntil),
            Self::TimeDelay => Some(BadgeKind::TimeDelay),
            Self::TimeWindow => Some(BadgeKind::TimeWindow),
            Self::TrueFalse => Some(BadgeKind::TrueFalse),
            Self::MultiSplit => Some(BadgeKind::MultiSplit),
            Self::Start => Some(BadgeKind::Start),
            Self::Exit => Some(BadgeKind::Exit),
            Self::Triangle | Self::Circle | Self::Connection => None,
        }
    }

    /// Looks up a custom type by the local part of its tag.
    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.local_name() == name)
    }
}

/// Element types in the `bpmn` namespace understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Process,
    Collaboration,
    Participant,
    StartEvent,
    IntermediateThrowEvent,
    EndEvent,
    ExclusiveGateway,
    Task,
    SubProcess,
    SequenceFlow,
}

impl NativeType {
    pub const ALL: [NativeType; 10] = [
        Self::Process,
        Self::Collaboration,
        Self::Participant,
        Self::StartEvent,
        Self::IntermediateThrowEvent,
        Self::EndEvent,
        Self::ExclusiveGateway,
        Self::Task,
        Self::SubProcess,
        Self::SequenceFlow,
    ];

    /// Local part of the type tag, e.g. `SubProcess`.
    pub fn local_name(self) -> &'static str {
        match self {
            Self::Process => "Process",
            Self::Collaboration => "Collaboration",
            Self::Participant => "Participant",
            Self::StartEvent => "StartEvent",
            Self::IntermediateThrowEvent => "IntermediateThrowEvent",
            Self::EndEvent => "EndEvent",
            Self::ExclusiveGateway => "ExclusiveGateway",
            Self::Task => "Task",
            Self::SubProcess => "SubProcess",
            Self::SequenceFlow => "SequenceFlow",
        }
    }

    /// Element name used in BPMN XML documents, e.g. `subProcess`.
    pub fn xml_name(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Collaboration => "collaboration",
            Self::Participant => "participant",
            Self::StartEvent => "startEvent",
            Self::IntermediateThrowEvent => "intermediateThrowEvent",
            Self::EndEvent => "endEvent",
            Self::ExclusiveGateway => "exclusiveGateway",
            Self::Task => "task",
            Self::SubProcess => "subProcess",
            Self::SequenceFlow => "sequenceFlow",
        }
    }

    pub fn from_xml_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.xml_name() == name)
    }

    fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.local_name() == name)
    }
}

/// Type tag of a diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Custom(CustomType),
    Native(NativeType),
}

impl ElementType {
    pub fn namespace(self) -> Namespace {
        match self {
            Self::Custom(_) => Namespace::Hf,
            Self::Native(_) => Namespace::Bpmn,
        }
    }

    /// Returns true for types in the custom `hf` namespace.
    pub fn is_custom(self) -> bool {
        self.namespace() == Namespace::Hf
    }

    pub fn local_name(self) -> &'static str {
        match self {
            Self::Custom(ty) => ty.local_name(),
            Self::Native(ty) => ty.local_name(),
        }
    }

    /// Returns the structural kind elements of this type have.
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Custom(CustomType::Connection) | Self::Native(NativeType::SequenceFlow) => {
                ElementKind::Connection
            }
            Self::Native(NativeType::Process | NativeType::Collaboration) => ElementKind::Root,
            Self::Custom(_) | Self::Native(_) => ElementKind::Shape,
        }
    }

    /// Returns true for shape types that can hold child elements.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::Native(
                NativeType::Process
                    | NativeType::Collaboration
                    | NativeType::Participant
                    | NativeType::SubProcess
            )
        )
    }

    /// Returns true for types with an expanded/collapsed state.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            Self::Native(NativeType::Participant | NativeType::SubProcess)
        )
    }
}

impl From<CustomType> for ElementType {
    fn from(ty: CustomType) -> Self {
        Self::Custom(ty)
    }
}

impl From<NativeType> for ElementType {
    fn from(ty: NativeType) -> Self {
        Self::Native(ty)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace().prefix(), self.local_name())
    }
}

/// Error returned when a type tag cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTypeError {
    #[error("type tag `{0}` has no namespace prefix")]
    MissingNamespace(String),

    #[error("unknown namespace `{namespace}` in type tag `{tag}`")]
    UnknownNamespace { namespace: String, tag: String },

    #[error("unknown element type `{0}`")]
    UnknownType(String),
}

impl FromStr for ElementType {
    type Err = ParseTypeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let (prefix, local) = tag
            .split_once(':')
            .ok_or_else(|| ParseTypeError::MissingNamespace(tag.to_string()))?;

        match prefix {
            "hf" => CustomType::from_local_name(local)
                .map(Self::Custom)
                .ok_or_else(|| ParseTypeError::UnknownType(tag.to_string())),
            "bpmn" => NativeType::from_local_name(local)
                .map(Self::Native)
                .ok_or_else(|| ParseTypeError::UnknownType(tag.to_string())),
            _ => Err(ParseTypeError::UnknownNamespace {
                namespace: prefix.to_string(),
                tag: tag.to_string(),
            }),
        }
    }
}
