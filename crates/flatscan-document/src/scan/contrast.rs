// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalisation (CLAHE) and histogram
// statistics used by the corner detector.

use image::{GrayImage, Luma};
use imageproc::stats::percentile;

/// Grey-level histogram of an 8-bit image region.
fn region_histogram(gray: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) -> [u32; 256] {
    let mut histogram = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    histogram
}

/// Median grey level of the whole image.
pub fn median_intensity(gray: &GrayImage) -> u8 {
    if gray.width() == 0 || gray.height() == 0 {
        return 0;
    }
    percentile(gray, 50)
}

/// Build the clipped-histogram lookup table for one tile.
///
/// Bins above `clip_limit * mean_bin_height` are cut down and the excess is
/// spread evenly over all 256 bins, then the cumulative distribution is scaled
/// to 0..=255. Counts stay fractional, so tiles of different sizes with the
/// same histogram shape get the same table.
fn tile_lut(histogram: [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    let area = area.max(1) as f32;
    let limit = (clip_limit * area / 256.0).max(1.0);

    let mut clipped = [0f32; 256];
    let mut excess = 0f32;
    for (bin, &count) in clipped.iter_mut().zip(&histogram) {
        let count = count as f32;
        *bin = count.min(limit);
        excess += count - *bin;
    }
    let per_bin = excess / 256.0;

    let scale = 255.0 / area;
    let mut lut = [0u8; 256];
    let mut cumulative = 0f32;
    for (entry, &count) in lut.iter_mut().zip(&clipped) {
        cumulative += count + per_bin;
        *entry = (cumulative * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Equalise local contrast over a `tiles x tiles` grid.
///
/// Each tile gets its own clipped-histogram mapping; pixels are mapped by
/// bilinear interpolation between the four nearest tile mappings so no seams
/// appear at tile borders. The grid shrinks on images smaller than `tiles`
/// pixels along an axis.
pub fn equalize_adaptive(gray: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }
    let tiles_x = tiles.clamp(1, w);
    let tiles_y = tiles.clamp(1, h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        let y0 = ty * h / tiles_y;
        let y1 = (ty + 1) * h / tiles_y;
        for tx in 0..tiles_x {
            let x0 = tx * w / tiles_x;
            let x1 = (tx + 1) * w / tiles_x;
            let histogram = region_histogram(gray, x0, y0, x1, y1);
            luts.push(tile_lut(histogram, (x1 - x0) * (y1 - y0), clip_limit));
        }
    }

    let tile_w = w as f32 / tiles_x as f32;
    let tile_h = h as f32 / tiles_y as f32;

    // Neighbouring tile indices and the weight of the second one.
    let neighbours = |pos: u32, size: f32, count: u32| -> (usize, usize, f32) {
        let t = (pos as f32 + 0.5) / size - 0.5;
        let first = t.floor();
        let weight = t - first;
        let clamp = |v: f32| (v.max(0.0) as u32).min(count - 1) as usize;
        (clamp(first), clamp(first + 1.0), weight)
    };

    GrayImage::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y).0[0] as usize;
        let (tx0, tx1, wx) = neighbours(x, tile_w, tiles_x);
        let (ty0, ty1, wy) = neighbours(y, tile_h, tiles_y);
        let row = tiles_x as usize;

        let top = luts[ty0 * row + tx0][v] as f32 * (1.0 - wx) + luts[ty0 * row + tx1][v] as f32 * wx;
        let bottom =
            luts[ty1 * row + tx0][v] as f32 * (1.0 - wx) + luts[ty1 * row + tx1][v] as f32 * wx;
        let mapped = top * (1.0 - wy) + bottom * wy;
        Luma([mapped.round().clamp(0.0, 255.0) as u8])
    })
}
