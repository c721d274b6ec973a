//! Visual constants of the custom elements.
//!
//! [`StyleTable`] is built once from [`StyleConfig`] and shared read-only with
//! the renderer. Badge styles are stored in an array indexed by [`BadgeKind`],
//! so every badge has a style by construction.

use hfcanvas_core::{
    color::Color,
    draw::{FontWeight, TextDefinition},
};

use crate::{
    config::StyleConfig,
    element_type::BadgeKind,
    host::styles::StyleOverrides,
};

const BADGE_FILL: &str = "#F4B400";
const BADGE_STROKE: &str = "#0F9D58";
const BADGE_TEXT: &str = "#4285F4";
const BADGE_STROKE_WIDTH: f32 = 1.0;
const BADGE_CORNER_RADIUS: f32 = 10.0;

const TRIANGLE_COLOR: &str = "#52B415";
const TRIANGLE_STROKE_WIDTH: f32 = 2.0;

const CIRCLE_COLOR: &str = "#ffc800";
const CIRCLE_STROKE_WIDTH: f32 = 4.0;

const CONNECTION_COLOR: &str = "#cc0000";
const CONNECTION_STROKE_WIDTH: f32 = 2.0;

/// Style of one badge kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeStyle {
    group_class: &'static str,
    class_name: &'static str,
    label: String,
    fill: Color,
    stroke: Color,
    stroke_width: f32,
    corner_radius: f32,
    text: TextDefinition,
}

impl BadgeStyle {
    /// Class of the outer badge element: `message`, `delay` or `control`.
    pub fn group_class(&self) -> &'static str {
        self.group_class
    }

    /// Class of the inner group, e.g. `email-msg`.
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn text(&self) -> &TextDefinition {
        &self.text
    }

    /// Overrides passed to the host `styles` service for the badge rectangle.
    pub fn overrides(&self) -> StyleOverrides {
        StyleOverrides {
            stroke: Some(self.stroke),
            stroke_width: Some(self.stroke_width),
            fill: Some(self.fill),
        }
    }
}

/// Single-colour style of a geometric shape or connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    color: Color,
    stroke_width: f32,
}

impl ShapeStyle {
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    /// Overrides painting stroke and fill in the same colour.
    pub fn filled(&self) -> StyleOverrides {
        StyleOverrides {
            stroke: Some(self.color),
            stroke_width: Some(self.stroke_width),
            fill: Some(self.color),
        }
    }

    /// Overrides painting only the stroke.
    pub fn outline(&self) -> StyleOverrides {
        StyleOverrides {
            stroke: Some(self.color),
            stroke_width: Some(self.stroke_width),
            fill: None,
        }
    }
}

/// Every style the custom renderer draws with.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    badges: [BadgeStyle; BadgeKind::COUNT],
    triangle: ShapeStyle,
    circle: ShapeStyle,
    connection: ShapeStyle,
}

impl StyleTable {
    /// Builds the table, applying the overrides of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error message when a configured colour cannot be parsed.
    pub fn new(config: &StyleConfig) -> Result<Self, String> {
        let fill = color_or(config.badge_fill()?, BADGE_FILL)?;
        let stroke = color_or(config.badge_stroke()?, BADGE_STROKE)?;
        let text_color = color_or(config.badge_text()?, BADGE_TEXT)?;
        let corner_radius = config.corner_radius().unwrap_or(BADGE_CORNER_RADIUS);

        let mut text = TextDefinition::new();
        text.set_font_weight(FontWeight::Bold);
        text.set_color(Some(text_color));

        let badges = BadgeKind::ALL.map(|kind| BadgeStyle {
            group_class: group_class(kind),
            class_name: class_name(kind),
            label: config
                .label(kind.custom_type().local_name())
                .map_or_else(|| default_label(kind).to_string(), str::to_string),
            fill,
            stroke,
            stroke_width: BADGE_STROKE_WIDTH,
            corner_radius,
            text: text.clone(),
        });

        Ok(Self {
            badges,
            triangle: ShapeStyle {
                color: color_or(config.triangle_color()?, TRIANGLE_COLOR)?,
                stroke_width: TRIANGLE_STROKE_WIDTH,
            },
            circle: ShapeStyle {
                color: color_or(config.circle_color()?, CIRCLE_COLOR)?,
                stroke_width: CIRCLE_STROKE_WIDTH,
            },
            connection: ShapeStyle {
                color: color_or(config.connection_color()?, CONNECTION_COLOR)?,
                stroke_width: CONNECTION_STROKE_WIDTH,
            },
        })
    }

    pub fn badge(&self, kind: BadgeKind) -> &BadgeStyle {
        &self.badges[kind.index()]
    }

    pub fn triangle(&self) -> ShapeStyle {
        self.triangle
    }

    pub fn circle(&self) -> ShapeStyle {
        self.circle
    }

    pub fn connection(&self) -> ShapeStyle {
        self.connection
    }
}

fn color_or(configured: Option<Color>, default: &str) -> Result<Color, String> {
    match configured {
        Some(color) => Ok(color),
        None => Color::new(default),
    }
}

fn group_class(kind: BadgeKind) -> &'static str {
    match kind {
        BadgeKind::Email
        | BadgeKind::Pns
        | BadgeKind::Sms
        | BadgeKind::MsgCenter
        | BadgeKind::Webhook => "message",
        BadgeKind::WaitUntil | BadgeKind::TimeDelay | BadgeKind::TimeWindow => "delay",
        BadgeKind::TrueFalse | BadgeKind::MultiSplit | BadgeKind::Start | BadgeKind::Exit => {
            "control"
        }
    }
}

fn class_name(kind: BadgeKind) -> &'static str {
    match kind {
        BadgeKind::Email => "email-msg",
        BadgeKind::Pns => "pns-msg",
        BadgeKind::Sms => "sms-msg",
        BadgeKind::MsgCenter => "msgcenter-msg",
        BadgeKind::Webhook => "webhook-msg",
        BadgeKind::WaitUntil => "waituntil-delay",
        BadgeKind::TimeDelay => "timedelay-delay",
        BadgeKind::TimeWindow => "timewindow-delay",
        BadgeKind::TrueFalse => "truefalse-control",
        BadgeKind::MultiSplit => "multisplit-control",
        BadgeKind::Start => "start-control",
        BadgeKind::Exit => "exit-control",
    }
}

fn default_label(kind: BadgeKind) -> &'static str {
    match kind {
        BadgeKind::Email => "Email",
        BadgeKind::Pns => "Push Notifications",
        BadgeKind::Sms => "Text",
        BadgeKind::MsgCenter => "Msg Center",
        BadgeKind::Webhook => "WebHook",
        BadgeKind::WaitUntil => "Wait Until",
        BadgeKind::TimeDelay => "Timedelay",
        BadgeKind::TimeWindow => "Time Window",
        BadgeKind::TrueFalse => "truefalse",
        BadgeKind::MultiSplit => "multisplit",
        BadgeKind::Start => "start",
        BadgeKind::Exit => "exit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_every_badge_has_a_style() {
        let table = StyleTable::new(&StyleConfig::default()).unwrap();
        for kind in BadgeKind::ALL {
            let style = table.badge(kind);
            assert!(!style.label().is_empty());
            assert_eq!(
                Some(style.group_class()),
                kind.custom_type().category().group_class()
            );
            assert!(style.class_name().starts_with(kind.custom_type().local_name()));
        }
    }

    #[test]
    fn test_defaults() {
        let table = StyleTable::new(&StyleConfig::default()).unwrap();
        let email = table.badge(BadgeKind::Email);

        assert_eq!(email.class_name(), "email-msg");
        assert_eq!(email.corner_radius(), 10.0);
        assert_eq!(email.overrides().fill, Some(Color::new(BADGE_FILL).unwrap()));
        assert_eq!(email.text().font_weight(), FontWeight::Bold);
        assert_eq!(table.badge(BadgeKind::MsgCenter).label(), "Msg Center");
        assert_eq!(table.circle().stroke_width(), 4.0);
        assert_eq!(table.connection().outline().fill, None);
    }

    #[test]
    fn test_config_overrides() {
        let config: AppConfig = toml::from_str(
            r##"
            [style]
            badge_fill = "#ffffff"
            triangle_color = "blue"
            corner_radius = 4.0

            [style.labels]
            sms = "SMS"
            "##,
        )
        .unwrap();

        let table = StyleTable::new(config.style()).unwrap();
        assert_eq!(table.badge(BadgeKind::Sms).label(), "SMS");
        assert_eq!(table.badge(BadgeKind::Email).label(), "Email");
        assert_eq!(table.badge(BadgeKind::Webhook).corner_radius(), 4.0);
        assert_eq!(
            table.badge(BadgeKind::Pns).overrides().fill,
            Some(Color::new("#ffffff").unwrap())
        );
        assert_eq!(table.triangle().color(), Color::new("blue").unwrap());
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let config: AppConfig = toml::from_str("[style]\ncircle_color = \"not-a-color\"").unwrap();
        let err = StyleTable::new(config.style()).unwrap_err();
        assert!(err.contains("circle_color"));
    }
}
