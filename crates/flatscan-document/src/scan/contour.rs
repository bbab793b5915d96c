// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Closed-contour simplification on top of imageproc's Douglas-Peucker.

use flatscan_core::Point;
use imageproc::contours::Contour;
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point as PixelPoint;

/// A contour's pixel positions as floating-point points.
pub fn contour_points(contour: &Contour<u32>) -> Vec<PixelPoint<f64>> {
    contour
        .points
        .iter()
        .map(|p| PixelPoint::new(p.x as f64, p.y as f64))
        .collect()
}

/// Index of the point farthest from `from`; earliest index wins ties.
fn farthest_from(points: &[PixelPoint<f64>], from: PixelPoint<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = -1.0;
    for (i, p) in points.iter().enumerate() {
        let d = (p.x - from.x).hypot(p.y - from.y);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Simplify a closed contour with Douglas-Peucker at tolerance `epsilon`.
///
/// The curve is split at two mutually distant points (both lie on the convex
/// hull, so for a quadrilateral outline they are corners) and each half is
/// simplified as an open chain.
pub fn simplify_closed(points: &[PixelPoint<f64>], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 3 || !(epsilon > 0.0) {
        return points.iter().map(|p| Point::new(p.x, p.y)).collect();
    }

    let first = farthest_from(points, points[0]);
    let second = farthest_from(points, points[first]);
    if first == second {
        return vec![Point::new(points[first].x, points[first].y)];
    }

    // Rotate so the first anchor sits at index 0 and close the loop.
    let mut ring: Vec<PixelPoint<f64>> = points[first..].iter().chain(&points[..first]).copied().collect();
    ring.push(ring[0]);
    let split = (second + n - first) % n;

    // Each half ends on the other's start; drop the duplicates.
    let mut simplified = approximate_polygon_dp(&ring[..=split], epsilon, false);
    simplified.pop();
    let mut back = approximate_polygon_dp(&ring[split..], epsilon, false);
    back.pop();
    simplified.extend(back);

    simplified.into_iter().map(|p| Point::new(p.x, p.y)).collect()
}
