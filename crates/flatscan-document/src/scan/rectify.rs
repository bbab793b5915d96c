// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — warp the document quadrilateral into a fixed,
// axis-aligned A4 frame.

use flatscan_core::error::{FlatscanError, Result};
use flatscan_core::{
    DetectorConfig, Interpolation, Point, Quadrilateral, RectifierConfig, ScanEvent, ScanObserver,
    TargetFrame,
};
use image::{DynamicImage, ImageBuffer, Luma, Pixel, Rgb};
use tracing::{debug, info, instrument};

use super::detect::CornerDetector;
use super::homography::Homography;
use super::order::order_corners;

/// Flattens a photographed page into the target frame.
///
/// ## Pipeline
///
/// 1. Use the caller's corners, or detect them when none are given
/// 2. Order them top-left, top-right, bottom-right, bottom-left
/// 3. Solve the homography from those corners to the frame's own corners
/// 4. Sample the source through its inverse for every output pixel
///
/// Grayscale input produces a grayscale page; everything else is resampled
/// as RGB.
#[derive(Debug, Clone, Default)]
pub struct Rectifier {
    config: RectifierConfig,
    detector: CornerDetector,
}

impl Rectifier {
    pub fn new(config: RectifierConfig, detector: DetectorConfig) -> Self {
        Self {
            config,
            detector: CornerDetector::new(detector),
        }
    }

    pub fn target_frame(&self) -> TargetFrame {
        self.config.target_frame()
    }

    pub fn detector(&self) -> &CornerDetector {
        &self.detector
    }

    /// Rectify `image` using `corners` if given, detected corners otherwise.
    ///
    /// Errors: `InvalidInput` for corner lists that are not four finite,
    /// plausibly placed points; `InvalidGeometry` when the corners are
    /// collinear, coincident, or cross over.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), explicit = corners.is_some()))]
    pub fn process(
        &self,
        image: &DynamicImage,
        corners: Option<&[Point]>,
        observer: &dyn ScanObserver,
    ) -> Result<DynamicImage> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(FlatscanError::InvalidInput("image has no pixels".into()));
        }

        let quad = match corners {
            Some(points) => {
                let quad = Quadrilateral::try_from_slice(points)?;
                quad.check_range(width, height)?;
                quad
            }
            None => self.detector.detect(image, observer),
        };

        let ordered = order_corners(quad.into_points())?;
        debug!(
            top_left = ?ordered.points()[0],
            top_right = ?ordered.points()[1],
            bottom_right = ?ordered.points()[2],
            bottom_left = ?ordered.points()[3],
            "Corners ordered"
        );

        let frame = self.target_frame();
        let forward = Homography::from_correspondences(ordered.points(), frame.corners().points())?;
        let inverse = forward.inverse()?;

        let [r, g, b] = self.config.fill;
        let interpolation = self.config.interpolation;
        let output = match image {
            DynamicImage::ImageLuma8(gray) => {
                let fill = Luma([luma_of(r, g, b)]);
                DynamicImage::ImageLuma8(warp(gray, &inverse, frame, interpolation, fill))
            }
            other => {
                let rgb = other.to_rgb8();
                DynamicImage::ImageRgb8(warp(&rgb, &inverse, frame, interpolation, Rgb([r, g, b])))
            }
        };

        observer.on_event(&ScanEvent::Rectified {
            width: frame.width,
            height: frame.height,
        });
        info!(out_w = frame.width, out_h = frame.height, "Perspective correction applied");
        Ok(output)
    }
}

/// Rec. 601 luma, matching `image`'s RGB-to-gray conversion.
fn luma_of(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Resample `src` into a `frame`-sized buffer through `inverse`
/// (destination to source).
///
/// Source positions within half a pixel of the image edge are clamped onto
/// it; anything further out (or at infinity) receives `fill`. An empty source
/// yields a frame of `fill`.
pub fn warp<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    inverse: &Homography,
    frame: TargetFrame,
    interpolation: Interpolation,
    fill: P,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (sw, sh) = src.dimensions();
    let mut out = ImageBuffer::from_pixel(frame.width, frame.height, fill);
    if sw == 0 || sh == 0 {
        return out;
    }
    let max_x = sw as f64 - 1.0;
    let max_y = sh as f64 - 1.0;
    let channels = P::CHANNEL_COUNT as usize;
    let mut sample = [0u8; 4];

    for y in 0..frame.height {
        for x in 0..frame.width {
            let Some(p) = inverse.apply(Point::new(x as f64, y as f64)) else {
                continue;
            };
            if p.x < -0.5 || p.y < -0.5 || p.x > max_x + 0.5 || p.y > max_y + 0.5 {
                continue;
            }
            let sx = p.x.clamp(0.0, max_x);
            let sy = p.y.clamp(0.0, max_y);

            match interpolation {
                Interpolation::Nearest => {
                    let px = src.get_pixel(sx.round() as u32, sy.round() as u32);
                    out.put_pixel(x, y, *px);
                }
                Interpolation::Bilinear => {
                    let x0 = sx.floor() as u32;
                    let y0 = sy.floor() as u32;
                    let x1 = (x0 + 1).min(sw - 1);
                    let y1 = (y0 + 1).min(sh - 1);
                    let fx = (sx - x0 as f64) as f32;
                    let fy = (sy - y0 as f64) as f32;

                    let tl = src.get_pixel(x0, y0).channels();
                    let tr = src.get_pixel(x1, y0).channels();
                    let bl = src.get_pixel(x0, y1).channels();
                    let br = src.get_pixel(x1, y1).channels();
                    for c in 0..channels {
                        let top = tl[c] as f32 * (1.0 - fx) + tr[c] as f32 * fx;
                        let bottom = bl[c] as f32 * (1.0 - fx) + br[c] as f32 * fx;
                        let v = top * (1.0 - fy) + bottom * fy;
                        sample[c] = v.round().clamp(0.0, 255.0) as u8;
                    }
                    out.put_pixel(x, y, *P::from_slice(&sample[..channels]));
                }
            }
        }
    }
    out
}
