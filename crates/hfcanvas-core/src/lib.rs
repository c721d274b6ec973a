//! hfcanvas Core Types and Definitions
//!
//! This crate provides the foundational types shared by the hfcanvas host and
//! its workflow extension. It includes:
//!
//! - **Identifiers**: Efficient string-interned element identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Points, sizes and bounding boxes ([`geometry`] module)
//! - **Draw**: Strokes, layered SVG output and outline paths ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
