//! Polar geometry for the radial chart: the dual-unit [`Angle`],
//! polar/Cartesian transforms, the perpendicular-bisector control point that
//! bows the data curve, and the per-axis chart layout.
//!
//! Everything here works in center-origin coordinates; the renderer
//! translates (and rotates) into canvas space.

use std::f64::consts::PI;
use std::ops::{Add, Sub};

use thiserror::Error;

/// Errors surfaced by the geometry layer. These are data errors: the
/// renderer aborts the current redraw and hands them to the caller rather
/// than drawing a silently-wrong polygon.
#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Two adjacent sample points coincide, so the perpendicular bisector
    /// of their segment has no defined direction.
    #[error("degenerate segment: adjacent sample points coincide")]
    DegenerateSegment,
}

// ============================================================================
// ANGLE
// ============================================================================

/// One angular measurement exposing synchronized degree and radian views.
///
/// Instances are immutable; [`Angle::add`] and [`Angle::sub`] return new
/// values. Constructing from either unit derives the other immediately, so
/// the two views can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    degrees: f64,
    radians: f64,
}

impl Angle {
    pub fn from_degrees(degrees: f64) -> Self {
        Self {
            degrees,
            radians: degrees * (PI / 180.0),
        }
    }

    pub fn from_radians(radians: f64) -> Self {
        Self {
            degrees: radians * (180.0 / PI),
            radians,
        }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn radians(&self) -> f64 {
        self.radians
    }

    /// New angle offset forward by `delta_degrees`.
    pub fn add(&self, delta_degrees: f64) -> Self {
        Self::from_degrees(self.degrees + delta_degrees)
    }

    /// New angle offset backward by `delta_degrees`.
    pub fn sub(&self, delta_degrees: f64) -> Self {
        Self::from_degrees(self.degrees - delta_degrees)
    }
}

// ============================================================================
// POINT & COORDINATE TRANSFORMS
// ============================================================================

/// A plain Cartesian pair, copied freely.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Rotation about the origin. The renderer uses this to apply the
    /// global chart rotation while mapping geometry into canvas space.
    pub fn rotated(&self, angle: Angle) -> Self {
        let (sin, cos) = angle.radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Polar form of a point: distance from the origin plus direction.
#[derive(Debug, Clone, Copy)]
pub struct Polar {
    pub radius: f64,
    pub angle: Angle,
}

pub fn polar_to_cartesian(radius: f64, angle: Angle) -> Point {
    let radians = angle.radians();
    Point::new(radius * radians.cos(), radius * radians.sin())
}

/// Inverse of [`polar_to_cartesian`].
///
/// The single-argument arctangent here collapses opposite quadrants onto
/// each other, so the angle is only faithful for points with `x > 0`. The
/// chart only ever travels polar -> Cartesian on the render path; the
/// limitation is kept as-is rather than widened to a two-argument form.
pub fn cartesian_to_polar(x: f64, y: f64) -> Polar {
    Polar {
        radius: (x * x + y * y).sqrt(),
        angle: Angle::from_radians((y / x).atan()),
    }
}

/// Where a ray leaving the center of a `width` x `height` rectangle exits
/// it, with the exit distance from the center.
#[derive(Debug, Clone, Copy)]
pub struct RayIntersection {
    pub point: Point,
    pub radius: f64,
}

/// Extending all four rectangle edges splits the plane into a grid the ray
/// must cross; the exit point is the nearer of the vertical-edge intercept
/// `|hw / cos t|` and the horizontal-edge intercept `|hh / sin t|`.
pub fn rect_ray_intersection(width: f64, height: f64, angle: Angle) -> RayIntersection {
    let half_width = width / 2.0;
    let half_height = height / 2.0;
    let radians = angle.radians();
    let vertical_hit = (half_width / radians.cos()).abs();
    let horizontal_hit = (half_height / radians.sin()).abs();
    let radius = vertical_hit.min(horizontal_hit);
    RayIntersection {
        point: polar_to_cartesian(radius, angle),
        radius,
    }
}

// ============================================================================
// CURVE CONTROL-POINT SOLVER
// ============================================================================

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

const COINCIDENT_EPSILON: f64 = 1e-9;

/// Point on the perpendicular bisector of `a`-`b`, displaced `offset` from
/// the midpoint.
///
/// The displacement direction is the normalized segment direction rotated a
/// quarter turn clockwise (`(x, y) -> (y, -x)`), so with the uniform
/// `current -> next` traversal of the data polygon a positive offset bows
/// every edge to the same side and a negative offset to the other.
///
/// Fails with [`ChartError::DegenerateSegment`] when the endpoints
/// coincide, since the segment then has no direction to bisect.
pub fn bisection_point(a: Point, b: Point, offset: f64) -> Result<Point, ChartError> {
    let v = b - a;
    let length = (v.x * v.x + v.y * v.y).sqrt();
    if length < COINCIDENT_EPSILON {
        return Err(ChartError::DegenerateSegment);
    }
    let perpendicular = Point::new(v.y / length, -v.x / length);
    let mid = midpoint(a, b);
    Ok(Point::new(
        mid.x + perpendicular.x * offset,
        mid.y + perpendicular.y * offset,
    ))
}

// ============================================================================
// CHART GEOMETRY BUILDER
// ============================================================================

/// Number of concentric reference rings.
pub const RING_COUNT: usize = 5;

/// One labeled axis value. The value convention is [0, 1] of full scale,
/// but it is deliberately not clamped: values outside the range simply
/// place the sample beyond or within the ring extent.
#[derive(Debug, Clone)]
pub struct Item {
    pub label: String,
    pub value: f64,
}

impl Item {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Layout of one axis: its spoke endpoints, label placement, and the
/// item's sample point, all in center-origin coordinates.
#[derive(Debug, Clone)]
pub struct AxisLayout {
    pub angle: Angle,
    pub spoke_start: Point,
    pub spoke_end: Point,
    pub label: String,
    pub label_anchor: Point,
    pub label_rotation: Angle,
    pub sample: Point,
}

/// Derived chart layout, rebuilt from scratch on every redraw.
#[derive(Debug, Clone)]
pub struct ChartGeometry {
    /// Ring radii, innermost first. The last entry is the full-scale
    /// radius that item values are measured against.
    pub rings: [f64; RING_COUNT],
    pub axes: Vec<AxisLayout>,
}

impl ChartGeometry {
    pub fn outer_ring(&self) -> f64 {
        self.rings[RING_COUNT - 1]
    }

    /// Sample points in item order, the vertices of the data polygon.
    pub fn samples(&self) -> impl Iterator<Item = Point> + '_ {
        self.axes.iter().map(|axis| axis.sample)
    }
}

/// Computes ring radii, spokes, label anchors and sample points for the
/// given items.
///
/// Rings are evenly spaced: `gap = (size - 2 * padding) / 10`, ring `i` at
/// `(i + 1) * gap`. Axis `i` of `n` sits at `360 / n * i` degrees before
/// any global rotation; its label anchor sits `label_offset` beyond the
/// outer ring and is rotated a quarter turn past the axis so the text runs
/// across the spoke.
pub fn build_geometry(
    items: &[Item],
    size: f64,
    padding: f64,
    label_offset: f64,
) -> Result<ChartGeometry, ChartError> {
    if items.is_empty() {
        return Err(ChartError::InvalidArgument(
            "chart layout needs at least one item",
        ));
    }

    let gap = (size - padding * 2.0) / 10.0;
    let mut rings = [0.0; RING_COUNT];
    for (i, ring) in rings.iter_mut().enumerate() {
        *ring = (i + 1) as f64 * gap;
    }
    let outer = rings[RING_COUNT - 1];

    let step = 360.0 / items.len() as f64;
    let axes = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let angle = Angle::from_degrees(step * i as f64);
            AxisLayout {
                angle,
                spoke_start: polar_to_cartesian(rings[0], angle),
                spoke_end: polar_to_cartesian(outer, angle),
                label: item.label.clone(),
                label_anchor: polar_to_cartesian(outer + label_offset, angle),
                label_rotation: angle.add(90.0),
                sample: polar_to_cartesian(item.value * outer, angle),
            }
        })
        .collect();

    Ok(ChartGeometry { rings, axes })
}

// ============================================================================
// TESTS
// ============================================================================
