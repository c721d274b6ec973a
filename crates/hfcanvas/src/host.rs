//! Minimal diagram host.
//!
//! The services here implement only the contracts the custom module plugs
//! into: the element tree and its canvas, an event bus, the extension
//! registry, modeling operations, interactive tools and BPMN DI
//! import/export.

pub mod canvas;
pub mod event_bus;
pub mod export;
pub mod factory;
pub mod import;
pub mod modeling;
pub mod ordering;
pub mod palette;
pub mod registry;
pub mod render;
pub mod rules;
pub mod selection;
pub mod styles;
pub mod tools;
pub mod tree;
