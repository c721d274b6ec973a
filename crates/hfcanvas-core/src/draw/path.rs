//! Outline paths for selection and hit-testing.
//!
//! An [`OutlinePath`] is a sequence of absolute [`PathSegment`]s. It is built
//! with the same absolute/relative commands as SVG path data (`M`, `m`, `L`,
//! `l`, `a`, `z`), but resolves relative commands on the fly so the outline can
//! be inspected (vertices, bounding box) as well as serialized to a `d`
//! attribute.
//!
//! # Example
//!
//! ```
//! # use hfcanvas_core::draw::OutlinePath;
//! # use hfcanvas_core::geometry::Point;
//! let triangle = OutlinePath::new()
//!     .move_to(Point::new(50.0, 0.0))
//!     .line_by(50.0, 60.0)
//!     .line_by(-100.0, 0.0)
//!     .close();
//!
//! assert_eq!(triangle.to_string(), "M 50,0 L 100,60 L 0,60 Z");
//! assert_eq!(triangle.bounds().unwrap().width(), 100.0);
//! ```

use std::{f32::consts, fmt};

use crate::geometry::{Bounds, Point};

/// A single absolute path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Circular arc from the current point to `to`.
    Arc {
        radius: f32,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

/// An outline made of absolute path segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlinePath {
    segments: Vec<PathSegment>,
    current: Point,
    subpath_start: Point,
}

impl OutlinePath {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// `M`: starts a new subpath at an absolute point.
    pub fn move_to(mut self, point: Point) -> Self {
        self.segments.push(PathSegment::MoveTo(point));
        self.current = point;
        self.subpath_start = point;
        self
    }

    /// `m`: starts a new subpath relative to the current point.
    pub fn move_by(self, dx: f32, dy: f32) -> Self {
        let target = self.current.add_point(Point::new(dx, dy));
        self.move_to(target)
    }

    /// `L`: straight line to an absolute point.
    pub fn line_to(mut self, point: Point) -> Self {
        self.segments.push(PathSegment::LineTo(point));
        self.current = point;
        self
    }

    /// `l`: straight line relative to the current point.
    pub fn line_by(self, dx: f32, dy: f32) -> Self {
        let target = self.current.add_point(Point::new(dx, dy));
        self.line_to(target)
    }

    /// `a`: circular arc to a point relative to the current point.
    pub fn arc_by(mut self, radius: f32, large_arc: bool, sweep: bool, dx: f32, dy: f32) -> Self {
        let to = self.current.add_point(Point::new(dx, dy));
        self.segments.push(PathSegment::Arc {
            radius,
            large_arc,
            sweep,
            to,
        });
        self.current = to;
        self
    }

    /// `z`: closes the current subpath.
    pub fn close(mut self) -> Self {
        self.segments.push(PathSegment::Close);
        self.current = self.subpath_start;
        self
    }

    /// Returns the absolute segments of the path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns true when the path has no drawing commands.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the end point of every move, line and arc, in order.
    pub fn vertices(&self) -> Vec<Point> {
        self.segments
            .iter()
            .filter_map(|segment| match *segment {
                PathSegment::MoveTo(point) | PathSegment::LineTo(point) => Some(point),
                PathSegment::Arc { to, .. } => Some(to),
                PathSegment::Close => None,
            })
            .collect()
    }

    /// Returns the exact bounding box of the outline, or `None` when empty.
    ///
    /// Arcs contribute their extreme points, not only their end points, so a
    /// circle drawn as two half arcs yields the circle's bounding square.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = Vec::new();
        let mut current = Point::default();

        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(point) | PathSegment::LineTo(point) => {
                    points.push(point);
                    current = point;
                }
                PathSegment::Arc {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } => {
                    points.push(to);
                    points.extend(arc_extremes(current, to, radius, large_arc, sweep));
                    current = to;
                }
                PathSegment::Close => {}
            }
        }

        Bounds::from_points(points)
    }
}

impl fmt::Display for OutlinePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            match *segment {
                PathSegment::MoveTo(p) => write!(f, "M {},{}", p.x(), p.y())?,
                PathSegment::LineTo(p) => write!(f, "L {},{}", p.x(), p.y())?,
                PathSegment::Arc {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } => write!(
                    f,
                    "A {radius},{radius} 0 {},{} {},{}",
                    u8::from(large_arc),
                    u8::from(sweep),
                    to.x(),
                    to.y()
                )?,
                PathSegment::Close => write!(f, "Z")?,
            }
        }
        Ok(())
    }
}

/// Axis-extreme points of a circular arc that fall within its sweep.
///
/// Uses the SVG endpoint-to-center conversion specialised to `rx == ry` and no
/// rotation. A radius too small for the chord is scaled up as SVG does.
fn arc_extremes(from: Point, to: Point, radius: f32, large_arc: bool, sweep: bool) -> Vec<Point> {
    let half = from.sub_point(to).scale(0.5);
    let half_chord = half.hypot();
    if half_chord < f32::EPSILON || radius <= 0.0 {
        return Vec::new();
    }

    let radius = radius.max(half_chord);
    // A chord within rounding of the diameter is a semicircle; the square
    // root below would magnify that rounding into a shifted center.
    let coef = if radius - half_chord <= radius * 1e-4 {
        0.0
    } else {
        let sign = if large_arc != sweep { 1.0 } else { -1.0 };
        let ratio = (radius * radius - half_chord * half_chord) / (half_chord * half_chord);
        sign * ratio.max(0.0).sqrt()
    };

    // Center relative to the chord midpoint
    let center_offset = Point::new(coef * half.y(), -coef * half.x());
    let center = center_offset.add_point(from.midpoint(to));

    let start = Point::new(
        (half.x() - center_offset.x()) / radius,
        (half.y() - center_offset.y()) / radius,
    );
    let end = Point::new(
        (-half.x() - center_offset.x()) / radius,
        (-half.y() - center_offset.y()) / radius,
    );

    let theta_start = start.y().atan2(start.x());
    let cross = start.x() * end.y() - start.y() * end.x();
    let dot = start.x() * end.x() + start.y() * end.y();
    let mut delta = cross.atan2(dot);
    if !sweep && delta > 0.0 {
        delta -= consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += consts::TAU;
    }

    [0.0, consts::FRAC_PI_2, consts::PI, 3.0 * consts::FRAC_PI_2]
        .into_iter()
        .filter(|angle| {
            let travelled = if delta >= 0.0 {
                (angle - theta_start).rem_euclid(consts::TAU)
            } else {
                (theta_start - angle).rem_euclid(consts::TAU)
            };
            travelled <= delta.abs() + 1e-4
        })
        .map(|angle| {
            Point::new(
                radius.mul_add(angle.cos(), center.x()),
                radius.mul_add(angle.sin(), center.y()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn circle(cx: f32, cy: f32, r: f32) -> OutlinePath {
        OutlinePath::new()
            .move_to(Point::new(cx, cy))
            .move_by(0.0, -r)
            .arc_by(r, true, true, 0.0, 2.0 * r)
            .arc_by(r, true, true, 0.0, -2.0 * r)
            .close()
    }

    #[test]
    fn test_relative_commands_resolve_to_absolute() {
        let path = OutlinePath::new()
            .move_to(Point::new(10.0, 10.0))
            .line_by(100.0, 0.0)
            .line_by(0.0, 60.0)
            .line_by(-100.0, 0.0)
            .close();

        assert_eq!(
            path.vertices(),
            vec![
                Point::new(10.0, 10.0),
                Point::new(110.0, 10.0),
                Point::new(110.0, 70.0),
                Point::new(10.0, 70.0),
            ]
        );
    }

    #[test]
    fn test_close_returns_to_subpath_start() {
        let path = OutlinePath::new()
            .move_to(Point::new(5.0, 5.0))
            .line_by(10.0, 0.0)
            .close()
            .line_by(0.0, 10.0);

        assert_eq!(path.vertices().last(), Some(&Point::new(5.0, 15.0)));
    }

    #[test]
    fn test_circle_bounds() {
        let bounds = circle(40.0, 40.0, 40.0).bounds().unwrap();

        assert_approx_eq!(f32, bounds.min_x(), 0.0, epsilon = 0.001);
        assert_approx_eq!(f32, bounds.min_y(), 0.0, epsilon = 0.001);
        assert_approx_eq!(f32, bounds.max_x(), 80.0, epsilon = 0.001);
        assert_approx_eq!(f32, bounds.max_y(), 80.0, epsilon = 0.001);
    }

    #[test]
    fn test_semicircle_center_away_from_origin() {
        // The half chord of each arc rounds just below the radius at this offset
        let bounds = circle(110.40672, 464.57658, 110.0).bounds().unwrap();

        assert_approx_eq!(f32, bounds.center().x(), 110.40672, epsilon = 0.01);
        assert_approx_eq!(f32, bounds.center().y(), 464.57658, epsilon = 0.01);
        assert_approx_eq!(f32, bounds.max_x(), 220.40672, epsilon = 0.01);
        assert_approx_eq!(f32, bounds.width(), 220.0, epsilon = 0.01);
    }

    #[test]
    fn test_quarter_arc_bounds() {
        // Quarter circle from (0,-10) to (10,0) around the origin, clockwise on screen
        let path = OutlinePath::new()
            .move_to(Point::new(0.0, -10.0))
            .arc_by(10.0, false, true, 10.0, 10.0);
        let bounds = path.bounds().unwrap();

        assert_approx_eq!(f32, bounds.min_x(), 0.0, epsilon = 0.001);
        assert_approx_eq!(f32, bounds.max_x(), 10.0, epsilon = 0.001);
        assert_approx_eq!(f32, bounds.min_y(), -10.0, epsilon = 0.001);
        assert_approx_eq!(f32, bounds.max_y(), 0.0, epsilon = 0.001);
    }

    #[test]
    fn test_display_arc() {
        let path = circle(40.0, 40.0, 40.0);
        assert_eq!(
            path.to_string(),
            "M 40,40 M 40,0 A 40,40 0 1,1 40,80 A 40,40 0 1,1 40,0 Z"
        );
    }

    #[test]
    fn test_empty_path() {
        let path = OutlinePath::new();
        assert!(path.is_empty());
        assert!(path.bounds().is_none());
        assert_eq!(path.to_string(), "");
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    /// A circle outline always spans exactly its diameter on both axes.
    fn check_circle_bounds_span_diameter(cx: f32, cy: f32, r: f32) -> Result<(), TestCaseError> {
        let path = OutlinePath::new()
            .move_to(Point::new(cx, cy))
            .move_by(0.0, -r)
            .arc_by(r, true, true, 0.0, 2.0 * r)
            .arc_by(r, true, true, 0.0, -2.0 * r)
            .close();
        let bounds = path.bounds().expect("circle has bounds");

        prop_assert!(approx_eq!(f32, bounds.width(), 2.0 * r, epsilon = 0.05));
        prop_assert!(approx_eq!(f32, bounds.height(), 2.0 * r, epsilon = 0.05));
        Ok(())
    }

    proptest! {
        #[test]
        fn circle_bounds_span_diameter(
            cx in -500.0f32..500.0,
            cy in -500.0f32..500.0,
            r in 1.0f32..300.0,
        ) {
            check_circle_bounds_span_diameter(cx, cy, r)?;
        }
    }
}
