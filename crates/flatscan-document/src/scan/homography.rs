// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar projective transform solved exactly from four point correspondences.

use flatscan_core::Point;
use flatscan_core::error::{FlatscanError, Result};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Below this, the normalised 8x8 system is treated as singular.
const SINGULAR_DET: f64 = 1e-9;

/// A 3x3 homography mapping source points to destination points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    h: Matrix3<f64>,
}

impl Homography {
    /// Solve `dst ~ H * src` for four correspondences.
    ///
    /// Both point sets are Hartley-normalised (centroid at the origin, mean
    /// distance sqrt(2)) before the 8x8 system is solved with `h33 = 1`, which
    /// keeps the solve well conditioned for pixel-scale coordinates. A
    /// singular system (collinear or coincident corners) is an
    /// `InvalidGeometry` error rather than a garbage matrix.
    pub fn from_correspondences(src: &[Point; 4], dst: &[Point; 4]) -> Result<Self> {
        let (src_n, t_src) = normalize(src)?;
        let (dst_n, t_dst) = normalize(dst)?;

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for k in 0..4 {
            let (x, y) = (src_n[k].x, src_n[k].y);
            let (u, v) = (dst_n[k].x, dst_n[k].y);

            let r0 = 2 * k;
            a[(r0, 0)] = x;
            a[(r0, 1)] = y;
            a[(r0, 2)] = 1.0;
            a[(r0, 6)] = -u * x;
            a[(r0, 7)] = -u * y;
            b[r0] = u;

            let r1 = 2 * k + 1;
            a[(r1, 3)] = x;
            a[(r1, 4)] = y;
            a[(r1, 5)] = 1.0;
            a[(r1, 6)] = -v * x;
            a[(r1, 7)] = -v * y;
            b[r1] = v;
        }

        let lu = a.lu();
        if lu.determinant().abs() < SINGULAR_DET {
            return Err(singular("correspondence system is singular"));
        }
        let x = lu
            .solve(&b)
            .ok_or_else(|| singular("correspondence system has no solution"))?;

        let hn = Matrix3::new(
            x[0], x[1], x[2], //
            x[3], x[4], x[5], //
            x[6], x[7], 1.0,
        );
        let t_dst_inv = t_dst
            .try_inverse()
            .ok_or_else(|| singular("destination normalisation is not invertible"))?;
        Self::normalized(t_dst_inv * hn * t_src)
    }

    /// Scale so `h33 == 1`, rejecting non-finite or rank-deficient matrices.
    fn normalized(h: Matrix3<f64>) -> Result<Self> {
        let s = h[(2, 2)];
        if !s.is_finite() || s.abs() < 1e-12 {
            return Err(singular("homography has a vanishing scale term"));
        }
        let h = h / s;
        if h.iter().any(|v| !v.is_finite()) {
            return Err(singular("homography has non-finite entries"));
        }
        if h.determinant().abs() < 1e-12 {
            return Err(singular("homography is rank deficient"));
        }
        Ok(Self { h })
    }

    /// Map a point. Returns `None` for points on the line at infinity.
    #[inline]
    pub fn apply(&self, p: Point) -> Option<Point> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if !w.is_finite() || w.abs() < 1e-12 {
            return None;
        }
        Some(Point::new(v[0] / w, v[1] / w))
    }

    pub fn inverse(&self) -> Result<Self> {
        let inv = self
            .h
            .try_inverse()
            .ok_or_else(|| singular("homography is not invertible"))?;
        Self::normalized(inv)
    }

    /// Row-major matrix entries.
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }
}

fn singular(msg: &str) -> FlatscanError {
    FlatscanError::InvalidGeometry(msg.into())
}

/// Hartley normalisation of four points.
fn normalize(pts: &[Point; 4]) -> Result<([Point; 4], Matrix3<f64>)> {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;
    if !(mean_dist > 1e-12) || !mean_dist.is_finite() {
        return Err(singular("corner points coincide"));
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let out = pts.map(|p| Point::new(s * (p.x - cx), s * (p.y - cy)));
    Ok((out, t))
}
