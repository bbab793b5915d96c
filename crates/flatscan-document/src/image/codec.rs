// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image codec — turn encoded bytes or files into rasters and back, using the
// `image` crate.

use std::path::Path;

use flatscan_core::error::{FlatscanError, Result};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument};

/// Stateless decode/encode helpers for the raster images the scanner consumes
/// and produces.
pub struct ImageCodec;

impl ImageCodec {
    /// Decode raw encoded bytes (JPEG, PNG, TIFF, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<DynamicImage> {
        let img = image::load_from_memory(data).map_err(|err| {
            FlatscanError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(img)
    }

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<DynamicImage> {
        let img = image::open(path.as_ref()).map_err(|err| {
            FlatscanError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(img)
    }

    /// Encode into the given format.
    ///
    /// JPEG has no alpha channel, so colour images are flattened to RGB and
    /// grayscale images stay single-channel.
    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let prepared = prepare_for(image, format);
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        prepared.write_to(&mut cursor, format).map_err(|err| {
            FlatscanError::ImageError(format!("image encoding failed: {}", err))
        })?;
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    #[instrument(skip(image), fields(path = %path.as_ref().display()))]
    pub fn save(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
        let format = ImageFormat::from_path(path.as_ref()).map_err(|err| {
            FlatscanError::ImageError(format!(
                "cannot infer image format for {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        let bytes = Self::encode(image, format)?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(width = image.width(), height = image.height(), "Image saved");
        Ok(())
    }
}

fn prepare_for(image: &DynamicImage, format: ImageFormat) -> DynamicImage {
    match (format, image) {
        (ImageFormat::Jpeg, DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_)) => {
            image.clone()
        }
        (ImageFormat::Jpeg, img) if img.color().channel_count() <= 2 => {
            DynamicImage::ImageLuma8(img.to_luma8())
        }
        (ImageFormat::Jpeg, img) => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => image.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn png_round_trip_keeps_pixels() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(16, 8, |x, y| {
            Luma([(x * 10 + y) as u8])
        }));
        let bytes = ImageCodec::encode(&img, ImageFormat::Png).unwrap();
        let decoded = ImageCodec::decode(&bytes).unwrap();
        assert_eq!(decoded.to_luma8(), img.to_luma8());
    }

    #[test]
    fn jpeg_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 128])));
        let bytes = ImageCodec::encode(&img, ImageFormat::Jpeg).unwrap();
        let decoded = ImageCodec::decode(&bytes).unwrap();
        assert_eq!(decoded.color().channel_count(), 3);
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        let err = ImageCodec::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, FlatscanError::ImageError(_)));
    }

    #[test]
    fn save_infers_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([200])));
        ImageCodec::save(&img, &path).unwrap();
        let loaded = ImageCodec::open(&path).unwrap();
        assert_eq!(loaded.to_luma8().get_pixel(2, 2).0[0], 200);

        let bad = dir.path().join("page.unknown");
        assert!(matches!(
            ImageCodec::save(&img, &bad),
            Err(FlatscanError::ImageError(_))
        ));
    }
}
