// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document corner detection — find the page outline in a photo as a
// four-vertex polygon, or fall back to the full frame.

use std::cmp::Ordering;

use flatscan_core::{
    DetectorConfig, Detection, EdgeThresholds, Point, Quadrilateral, ScanEvent, ScanObserver,
};
use image::{DynamicImage, GrayImage};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::bilateral_filter;
use imageproc::geometry::{arc_length, contour_area};
use imageproc::morphology::dilate;
use imageproc::point::Point as PixelPoint;
use tracing::{debug, info, instrument};

use super::contour::{contour_points, simplify_closed};
use super::contrast::{equalize_adaptive, median_intensity};
use super::order::order_corners;

/// Canny thresholds never drop below this; a zero high threshold would mark
/// every flat pixel as an edge.
pub const MIN_EDGE_THRESHOLD: f32 = 1.0;

/// Locates the four corners of a document in a photo.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Contrast-limited adaptive histogram equalisation, so faint page edges
///    survive uneven lighting
/// 3. Bilateral filter: removes sensor and background noise while keeping the
///    page boundary sharp
/// 4. Canny edges, with fixed thresholds or thresholds scaled from the median
///    intensity of the smoothed image
/// 5. One 3x3 dilation to close small gaps in the outline
/// 6. Flat contour extraction
/// 7. The largest contours by enclosed area (at most `max_candidates`) are
///    simplified with Douglas-Peucker at 2% of their perimeter
/// 8. The first one that simplifies to exactly four vertices, all inside the
///    image, enclosing at least `min_area_ratio` of the image wins
///
/// When nothing qualifies the full image rectangle is returned and a
/// [`ScanEvent::DetectionFallback`] is reported; detection itself never fails.
#[derive(Debug, Clone, Default)]
pub struct CornerDetector {
    config: DetectorConfig,
}

impl CornerDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Four corners of the document, or the full frame.
    pub fn detect(&self, image: &DynamicImage, observer: &dyn ScanObserver) -> Quadrilateral {
        self.detect_with_report(image, observer).corners
    }

    /// Like [`Self::detect`], also reporting whether the fallback was taken.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect_with_report(&self, image: &DynamicImage, observer: &dyn ScanObserver) -> Detection {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return fallback(width, height, 0, "image has no pixels", observer);
        }

        let edges = self.edge_map(&image.to_luma8());
        let contours = find_contours::<u32>(&edges);
        debug!(contours = contours.len(), "Contours extracted");

        // Rank by enclosed area, largest first; equal areas keep extraction order.
        let mut ranked: Vec<(f64, Vec<PixelPoint<f64>>)> = contours
            .iter()
            .map(contour_points)
            .map(|pts| (contour_area(&pts), pts))
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.max_candidates);

        let image_area = width as f64 * height as f64;
        let min_area = image_area * self.config.min_area_ratio;

        for (rank, (_, points)) in ranked.iter().enumerate() {
            let epsilon = self.config.approx_epsilon_ratio * arc_length(points, true);
            let approx = simplify_closed(points, epsilon);

            let reject = |reason: String| {
                observer.on_event(&ScanEvent::CandidateRejected {
                    rank,
                    vertices: approx.len(),
                    reason,
                });
            };

            let Ok(vertices) = <[Point; 4]>::try_from(approx.as_slice()) else {
                reject(format!("simplifies to {} vertices", approx.len()));
                continue;
            };
            let candidate = Quadrilateral::new(vertices);
            if !candidate.within_bounds(width, height) {
                reject("vertex outside the image".into());
                continue;
            }
            let area = candidate.area();
            if area < min_area {
                reject(format!("area {area:.0} below minimum {min_area:.0}"));
                continue;
            }
            let corners = match order_corners(vertices) {
                Ok(ordered) => ordered,
                Err(err) => {
                    reject(err.to_string());
                    continue;
                }
            };

            let candidates_examined = rank + 1;
            observer.on_event(&ScanEvent::CornersDetected {
                corners,
                candidates_examined,
            });
            info!(rank, area, "Document outline found");
            return Detection {
                corners,
                fallback: false,
                candidates_examined,
            };
        }

        let reason = if ranked.is_empty() {
            "no contours in the edge map"
        } else {
            "no candidate simplified to a large enough quadrilateral"
        };
        fallback(width, height, ranked.len(), reason, observer)
    }

    /// Steps 2-5: equalise, smooth, detect edges, dilate.
    fn edge_map(&self, gray: &GrayImage) -> GrayImage {
        let c = &self.config;
        let equalized = equalize_adaptive(gray, c.clahe_clip_limit, c.clahe_tiles);
        let smoothed = bilateral_filter(
            &equalized,
            c.bilateral_window,
            c.bilateral_sigma_color,
            c.bilateral_sigma_spatial,
        );
        let (low, high) = self.edge_thresholds(&smoothed);
        debug!(low, high, "Canny thresholds");
        let edges = canny(&smoothed, low, high);
        dilate(&edges, Norm::LInf, 1)
    }

    /// Resolve the configured thresholds against the smoothed image.
    fn edge_thresholds(&self, smoothed: &GrayImage) -> (f32, f32) {
        let (low, high) = match self.config.edge_thresholds {
            EdgeThresholds::Fixed { low, high } => (low, high),
            EdgeThresholds::Adaptive {
                low_ratio,
                high_ratio,
            } => {
                let median = median_intensity(smoothed) as f32;
                (low_ratio * median, high_ratio * median)
            }
        };
        let low = low.clamp(MIN_EDGE_THRESHOLD, 255.0);
        let high = high.clamp(MIN_EDGE_THRESHOLD, 255.0);
        (low.min(high), high)
    }
}

fn fallback(
    width: u32,
    height: u32,
    candidates_examined: usize,
    reason: &str,
    observer: &dyn ScanObserver,
) -> Detection {
    observer.on_event(&ScanEvent::DetectionFallback {
        reason: reason.into(),
        candidates_examined,
    });
    Detection {
        corners: Quadrilateral::full_frame(width, height),
        fallback: true,
        candidates_examined,
    }
}
