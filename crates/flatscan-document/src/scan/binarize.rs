// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Black-and-white conversion by locally adaptive (Gaussian-weighted)
// thresholding.

use flatscan_core::BinarizerConfig;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;
use tracing::{debug, instrument};

/// Turns a page into pure black and white.
///
/// Each pixel is compared against the Gaussian-weighted mean of its
/// `block_size x block_size` neighbourhood minus `offset`: pixels at or above
/// that threshold become white (255), the rest black (0). Following the local
/// mean keeps text legible under the lighting gradients of hand-held photos,
/// where a single global threshold blacks out shadowed regions.
#[derive(Debug, Clone, Default)]
pub struct Binarizer {
    config: BinarizerConfig,
}

impl Binarizer {
    pub fn new(config: BinarizerConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn to_black_and_white(&self, image: &DynamicImage) -> GrayImage {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return gray;
        }

        // Filter in f32 so the local mean is not rounded before comparison.
        let levels: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(width, height, |x, y| Luma([gray.get_pixel(x, y).0[0] as f32]));
        let kernel = gaussian_kernel(self.config.block_size);
        let local_mean = separable_filter_equal(&levels, &kernel);
        let offset = self.config.offset;

        let output = GrayImage::from_fn(width, height, |x, y| {
            let threshold = local_mean.get_pixel(x, y).0[0] - offset;
            let binary = if gray.get_pixel(x, y).0[0] as f32 >= threshold { 255u8 } else { 0u8 };
            Luma([binary])
        });

        debug!(block_size = self.config.block_size, offset, "Binarization complete");
        output
    }
}

/// Normalised 1-D Gaussian of odd length `size`, with the customary
/// size-derived sigma `0.3 * ((size - 1) / 2 - 1) + 0.8`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (size / 2) as i32;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i * i) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / total) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A light page with a shading gradient and a few dark strokes.
    fn shaded_page() -> GrayImage {
        let mut img = GrayImage::from_fn(120, 80, |x, _| Luma([150 + (x / 2) as u8]));
        for y in 20..23 {
            for x in 10..110 {
                img.put_pixel(x, y, Luma([40]));
            }
        }
        for y in 30..70 {
            for x in 60..63 {
                img.put_pixel(x, y, Luma([60]));
            }
        }
        img
    }

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(11);
        assert_eq!(k.len(), 11);
        let total: f32 = k.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        for i in 0..5 {
            assert!((k[i] - k[10 - i]).abs() < 1e-7);
        }
        assert!(k[5] > k[4]);
    }

    #[test]
    fn output_is_single_channel_and_binary() {
        let bw = Binarizer::default().to_black_and_white(&DynamicImage::ImageLuma8(shaded_page()));
        assert_eq!(bw.dimensions(), (120, 80));
        assert!(bw.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn strokes_turn_black_and_shaded_paper_white() {
        let bw = Binarizer::default().to_black_and_white(&DynamicImage::ImageLuma8(shaded_page()));
        assert_eq!(bw.get_pixel(50, 21).0[0], 0);
        assert_eq!(bw.get_pixel(61, 50).0[0], 0);
        assert_eq!(bw.get_pixel(5, 5).0[0], 255);
        assert_eq!(bw.get_pixel(115, 75).0[0], 255);
    }

    #[test]
    fn border_pixels_use_replicated_neighbours() {
        // A dark left column: replicated padding makes it dominate the mean
        // at the border, so it stays black only if it is below mean - offset.
        let img = GrayImage::from_fn(20, 20, |x, _| Luma([if x == 0 { 100 } else { 200 }]));
        let bw = Binarizer::default().to_black_and_white(&DynamicImage::ImageLuma8(img));
        assert_eq!(bw.get_pixel(0, 10).0[0], 0);
        assert_eq!(bw.get_pixel(1, 10).0[0], 255);
        assert_eq!(bw.get_pixel(19, 0).0[0], 255);
    }

    #[test]
    fn uniform_image_becomes_white() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(30, 30, Luma([90])));
        let bw = Binarizer::default().to_black_and_white(&img);
        assert!(bw.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn binarizing_twice_changes_nothing() {
        let binarizer = Binarizer::default();
        let once = binarizer.to_black_and_white(&DynamicImage::ImageLuma8(shaded_page()));
        let twice = binarizer.to_black_and_white(&DynamicImage::ImageLuma8(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn colour_input_is_accepted() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(16, 16, image::Rgb([200, 180, 160])));
        let bw = Binarizer::default().to_black_and_white(&img);
        assert_eq!(bw.dimensions(), (16, 16));
    }
}
