// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canonical corner ordering: top-left, top-right, bottom-right, bottom-left.

use std::cmp::Ordering;

use flatscan_core::error::{FlatscanError, Result};
use flatscan_core::{Point, Quadrilateral};

/// Quadrilaterals enclosing less than this many square pixels are degenerate.
const MIN_AREA: f64 = 1.0;

/// Order four points as `[top-left, top-right, bottom-right, bottom-left]`.
///
/// Top-left has the smallest `x + y`, bottom-right the largest; top-right has
/// the largest `x - y` and bottom-left the smallest (y grows downwards).
/// When that rule hands one point two roles (ties, or shapes rotated close
/// to 45 degrees) the points are instead sorted clockwise around their
/// centroid, starting from the smallest `x + y`.
///
/// Fails with `InvalidGeometry` for collinear, coincident, or
/// self-intersecting corners.
pub fn order_corners(points: [Point; 4]) -> Result<Quadrilateral> {
    if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
        return Err(FlatscanError::InvalidInput(format!(
            "corner coordinates must be finite, got ({}, {})",
            bad.x, bad.y
        )));
    }

    let sum = |p: &Point| p.x + p.y;
    let diff = |p: &Point| p.x - p.y;

    let tl = extreme(&points, sum, Ordering::Less);
    let br = extreme(&points, sum, Ordering::Greater);
    let tr = extreme(&points, diff, Ordering::Greater);
    let bl = extreme(&points, diff, Ordering::Less);

    let roles = [tl, tr, br, bl];
    let distinct = (0..4).all(|i| (i + 1..4).all(|j| roles[i] != roles[j]));

    let ordered = if distinct {
        Quadrilateral::new(roles.map(|i| points[i]))
    } else {
        angular_order(points)
    };

    let area = ordered.area();
    if area < MIN_AREA {
        return Err(FlatscanError::InvalidGeometry(format!(
            "corners enclose {area:.3} px², they are collinear or coincident"
        )));
    }
    if !ordered.is_simple() {
        return Err(FlatscanError::InvalidGeometry(
            "corners form a self-intersecting outline".into(),
        ));
    }
    Ok(ordered)
}

/// Index of the point with the smallest (`Less`) or largest (`Greater`)
/// key; the earliest such point wins ties.
fn extreme(points: &[Point; 4], key: impl Fn(&Point) -> f64, want: Ordering) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if key(&points[i]).partial_cmp(&key(&points[best])) == Some(want) {
            best = i;
        }
    }
    best
}

/// Clockwise (in image coordinates, y down) order around the centroid,
/// rotated to start at the point with the smallest `x + y`.
fn angular_order(points: [Point; 4]) -> Quadrilateral {
    let cx = points.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / 4.0;

    let mut sorted = points;
    sorted.sort_by(|a, b| {
        let ta = (a.y - cy).atan2(a.x - cx);
        let tb = (b.y - cy).atan2(b.x - cx);
        ta.partial_cmp(&tb).unwrap_or(Ordering::Equal)
    });

    let start = extreme(&sorted, |p| p.x + p.y, Ordering::Less);
    sorted.rotate_left(start);
    Quadrilateral::new(sorted)
}
