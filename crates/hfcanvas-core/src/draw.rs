//! Drawing primitives shared by the host paint pass and the renderers.
//!
//! - [`StrokeDefinition`] and the [`apply_stroke!`](crate::apply_stroke!) macro
//! - [`TextDefinition`] for element labels
//! - [`LayeredOutput`] for collecting SVG nodes by [`RenderLayer`]
//! - [`OutlinePath`] for the outlines used in selection and hit-testing

mod layer;
mod path;
mod stroke;
mod text;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use path::{OutlinePath, PathSegment};
pub use stroke::{StrokeCap, StrokeDefinition, StrokeJoin};
pub use text::{FontWeight, TextDefinition};
