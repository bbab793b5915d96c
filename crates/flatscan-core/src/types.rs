// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for flatscan: points, quadrilaterals, output modes, and
// the fixed rectification frame.

use serde::{Deserialize, Serialize};

use crate::error::{FlatscanError, Result};

/// A point in image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Exactly four points describing a document outline.
///
/// The points carry no inherent order; `order_corners` in `flatscan-document`
/// imposes the canonical `[top-left, top-right, bottom-right, bottom-left]`
/// order before the quadrilateral is used for rectification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quadrilateral {
    points: [Point; 4],
}

impl Quadrilateral {
    pub const fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// The full-image rectangle `(0,0), (w-1,0), (w-1,h-1), (0,h-1)`.
    pub fn full_frame(width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1) as f64;
        let max_y = height.saturating_sub(1) as f64;
        Self::new([
            Point::new(0.0, 0.0),
            Point::new(max_x, 0.0),
            Point::new(max_x, max_y),
            Point::new(0.0, max_y),
        ])
    }

    /// Build a quadrilateral from caller-supplied points.
    ///
    /// Fails with `InvalidInput` unless there are exactly four points with
    /// finite coordinates.
    pub fn try_from_slice(points: &[Point]) -> Result<Self> {
        let points: [Point; 4] = points.try_into().map_err(|_| {
            FlatscanError::InvalidInput(format!(
                "expected exactly 4 corner points, got {}",
                points.len()
            ))
        })?;
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(FlatscanError::InvalidInput(format!(
                "corner coordinates must be finite, got ({}, {})",
                bad.x, bad.y
            )));
        }
        Ok(Self::new(points))
    }

    /// Parse a corner payload of the form `[[x, y], [x, y], [x, y], [x, y]]`.
    ///
    /// Only a JSON array of four numeric pairs is accepted; objects, strings,
    /// extra nesting, and wrong arity are all rejected with `InvalidInput`.
    pub fn from_json(payload: &str) -> Result<Self> {
        let pairs: Vec<[f64; 2]> = serde_json::from_str(payload).map_err(|err| {
            FlatscanError::InvalidInput(format!("malformed corner list: {err}"))
        })?;
        let points: Vec<Point> = pairs.into_iter().map(Point::from).collect();
        Self::try_from_slice(&points)
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    pub fn into_points(self) -> [Point; 4] {
        self.points
    }

    /// Absolute enclosed area using the shoelace formula, taking the points
    /// in their stored order.
    pub fn area(&self) -> f64 {
        let p = &self.points;
        let twice: f64 = (0..4)
            .map(|i| {
                let j = (i + 1) % 4;
                p[i].x * p[j].y - p[j].x * p[i].y
            })
            .sum();
        twice.abs() / 2.0
    }

    /// Whether the polygon through the points in stored order does not
    /// cross itself.
    pub fn is_simple(&self) -> bool {
        let [a, b, c, d] = self.points;
        !segments_intersect(a, b, c, d) && !segments_intersect(b, c, d, a)
    }

    /// Whether every vertex lies in `[0, width) x [0, height)`.
    pub fn within_bounds(&self, width: u32, height: u32) -> bool {
        self.points.iter().all(|p| {
            p.x >= 0.0 && p.y >= 0.0 && p.x < width as f64 && p.y < height as f64
        })
    }

    /// Reject corners that lie implausibly far from a `width` x `height`
    /// image: every coordinate must sit inside the image extent grown by one
    /// full image dimension on each side.
    pub fn check_range(&self, width: u32, height: u32) -> Result<()> {
        let (w, h) = (width as f64, height as f64);
        for p in &self.points {
            if !p.is_finite() || p.x < -w || p.x > 2.0 * w || p.y < -h || p.y > 2.0 * h {
                return Err(FlatscanError::InvalidInput(format!(
                    "corner ({}, {}) is outside the accepted range for a {width}x{height} image",
                    p.x, p.y
                )));
            }
        }
        Ok(())
    }
}

/// Signed cross product of `(b - a) x (c - a)`.
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Proper intersection test for segments `p1-p2` and `q1-q2`.
fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Whether the rectified page stays in colour or is binarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    #[default]
    #[serde(rename = "color")]
    Color,
    #[serde(rename = "bw")]
    BlackAndWhite,
}

impl std::str::FromStr for OutputMode {
    type Err = FlatscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(Self::Color),
            "bw" | "blackandwhite" | "black-and-white" => Ok(Self::BlackAndWhite),
            other => Err(FlatscanError::InvalidInput(format!(
                "unknown output mode {other:?} (expected \"color\" or \"bw\")"
            ))),
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Color => write!(f, "color"),
            Self::BlackAndWhite => write!(f, "bw"),
        }
    }
}

/// Dimensions of the rectified output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFrame {
    pub width: u32,
    pub height: u32,
}

impl TargetFrame {
    /// Frame of the given height whose width is `round(height * aspect_ratio)`.
    pub fn from_height(height: u32, aspect_ratio: f64) -> Self {
        let width = (height as f64 * aspect_ratio).round() as u32;
        Self { width, height }
    }

    /// The frame's own corners in canonical order.
    pub fn corners(&self) -> Quadrilateral {
        Quadrilateral::full_frame(self.width, self.height)
    }
}

impl Default for TargetFrame {
    /// A4 portrait, 1100 px tall.
    fn default() -> Self {
        Self::from_height(1100, 0.707)
    }
}

/// Outcome of a corner detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub corners: Quadrilateral,
    /// True when no candidate contour qualified and the full frame was used.
    pub fallback: bool,
    /// How many candidate contours were simplified and inspected.
    pub candidates_examined: usize,
}
