// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-call scanning: rectify a photographed page and optionally binarize it.

use flatscan_core::error::Result;
use flatscan_core::{Detection, OutputMode, Point, ScanConfig, ScanEvent, ScanObserver};
use image::DynamicImage;
use tracing::{info, instrument};

use super::binarize::Binarizer;
use super::rectify::Rectifier;

/// Entry point tying the pipeline together.
///
/// Holds only configuration; every call is independent, so one scanner can
/// serve any number of threads.
///
/// ```ignore
/// let scanner = DocumentScanner::new(ScanConfig::default())?;
/// let page = scanner.scan(&photo, None, OutputMode::BlackAndWhite, &TracingObserver)?;
/// ```
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    config: ScanConfig,
    rectifier: Rectifier,
    binarizer: Binarizer,
}

impl DocumentScanner {
    /// Build a scanner after validating `config`.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: ScanConfig) -> Self {
        Self {
            rectifier: Rectifier::new(config.rectifier.clone(), config.detector.clone()),
            binarizer: Binarizer::new(config.binarizer.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Detect the page corners without warping, e.g. to let a user adjust
    /// them before calling [`Self::scan`].
    pub fn detect_corners(&self, image: &DynamicImage, observer: &dyn ScanObserver) -> Detection {
        self.rectifier.detector().detect_with_report(image, observer)
    }

    /// Rectify `image` (detecting corners if `corners` is `None`) and, in
    /// black-and-white mode, binarize the result.
    #[instrument(skip_all, fields(mode = %mode))]
    pub fn scan(
        &self,
        image: &DynamicImage,
        corners: Option<&[Point]>,
        mode: OutputMode,
        observer: &dyn ScanObserver,
    ) -> Result<DynamicImage> {
        let page = self.rectifier.process(image, corners, observer)?;
        let output = match mode {
            OutputMode::Color => page,
            OutputMode::BlackAndWhite => {
                let bw = self.binarizer.to_black_and_white(&page);
                observer.on_event(&ScanEvent::Binarized {
                    width: bw.width(),
                    height: bw.height(),
                });
                DynamicImage::ImageLuma8(bw)
            }
        };
        info!(width = output.width(), height = output.height(), "Scan complete");
        Ok(output)
    }
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::assemble(ScanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatscan_core::{FlatscanError, MemoryObserver, NoopObserver};
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point as PixelPoint;

    /// A bright page, seen at an angle, carrying three dark text lines.
    fn skewed_page_with_text() -> (DynamicImage, [(i32, i32); 4]) {
        let corners = [(110, 80), (500, 120), (540, 720), (70, 690)];
        let mut img = RgbImage::from_pixel(600, 800, Rgb([35, 40, 45]));
        let poly: Vec<PixelPoint<i32>> = corners.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect();
        draw_polygon_mut(&mut img, &poly, Rgb([240, 238, 230]));
        for line in 0..3 {
            let y = 300 + line * 60;
            for dy in 0..4 {
                for x in 200..400 {
                    img.put_pixel(x, (y + dy) as u32, Rgb([20, 20, 20]));
                }
            }
        }
        (DynamicImage::ImageRgb8(img), corners)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ScanConfig::default();
        config.binarizer.block_size = 4;
        assert!(matches!(
            DocumentScanner::new(config),
            Err(FlatscanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn default_matches_validated_default_config() {
        let built = DocumentScanner::new(ScanConfig::default()).unwrap();
        assert_eq!(DocumentScanner::default().config(), built.config());
        assert_eq!(
            DocumentScanner::default().rectifier.target_frame(),
            built.rectifier.target_frame()
        );
    }

    #[test]
    fn colour_scan_of_solid_gray_is_uniform() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(400, 300, Luma([90])));
        let out = DocumentScanner::default()
            .scan(&img, None, OutputMode::Color, &NoopObserver)
            .unwrap();
        assert_eq!((out.width(), out.height()), (778, 1100));
        assert!(out.to_luma8().pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn black_and_white_scan_is_binary() {
        let (img, _) = skewed_page_with_text();
        let observer = MemoryObserver::new();
        let out = DocumentScanner::default()
            .scan(&img, None, OutputMode::BlackAndWhite, &observer)
            .unwrap();

        let DynamicImage::ImageLuma8(page) = out else {
            panic!("black-and-white output must be single channel");
        };
        assert_eq!(page.dimensions(), (778, 1100));
        assert!(page.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(
            observer
                .events()
                .iter()
                .any(|e| matches!(e, ScanEvent::Binarized { .. }))
        );
    }

    #[test]
    fn detected_page_fills_the_rectified_frame() {
        let (img, truth) = skewed_page_with_text();
        let scanner = DocumentScanner::default();
        let observer = MemoryObserver::new();

        let detection = scanner.detect_corners(&img, &observer);
        assert!(!detection.fallback, "events: {:?}", observer.events());
        for (found, &(x, y)) in detection.corners.points().iter().zip(&truth) {
            assert!(found.distance(&Point::new(x as f64, y as f64)) < 8.0);
        }

        let page = scanner
            .scan(&img, Some(detection.corners.points()), OutputMode::Color, &observer)
            .unwrap()
            .to_luma8();

        // Away from the outline itself the page is paper or ink, never the
        // dark background.
        let inner: Vec<u8> = page
            .enumerate_pixels()
            .filter(|(x, y, _)| (20..758).contains(x) && (20..1080).contains(y))
            .map(|(_, _, p)| p.0[0])
            .collect();
        let bright = inner.iter().filter(|&&v| v > 200).count();
        assert!(
            bright as f64 > 0.9 * inner.len() as f64,
            "only {bright} of {} inner pixels are paper",
            inner.len()
        );
    }

    #[test]
    fn collinear_corners_surface_invalid_geometry() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(400, 300, Luma([90])));
        let corners = [
            Point::new(10.0, 150.0),
            Point::new(100.0, 150.0),
            Point::new(200.0, 150.0),
            Point::new(390.0, 150.0),
        ];
        let err = DocumentScanner::default()
            .scan(&img, Some(&corners), OutputMode::BlackAndWhite, &NoopObserver)
            .unwrap_err();
        assert!(matches!(err, FlatscanError::InvalidGeometry(_)));
    }
}
