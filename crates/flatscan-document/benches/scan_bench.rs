// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the flatscan-document scanning pipeline: corner
// detection, rectification, and binarization on synthetic photos.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use flatscan_core::{NoopObserver, OutputMode, Point};
use flatscan_document::{Binarizer, CornerDetector, DocumentScanner};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 400x300 dark frame with a bright page rectangle from (40, 30) to
/// (360, 270).
fn synthetic_photo() -> DynamicImage {
    let mut img = GrayImage::from_pixel(400, 300, Luma([30u8]));
    for y in 30..270 {
        for x in 40..360 {
            img.put_pixel(x, y, Luma([235u8]));
        }
    }
    DynamicImage::ImageLuma8(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_corner_detection(c: &mut Criterion) {
    let photo = synthetic_photo();
    let detector = CornerDetector::default();

    c.bench_function("corner_detection (400x300)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&photo), &NoopObserver)));
    });
}

/// Rectification with caller-supplied corners, so only the homography and
/// the 778x1100 resample are measured.
fn bench_rectify_explicit_corners(c: &mut Criterion) {
    let photo = synthetic_photo();
    let scanner = DocumentScanner::default();
    let corners = [
        Point::new(40.0, 30.0),
        Point::new(359.0, 30.0),
        Point::new(359.0, 269.0),
        Point::new(40.0, 269.0),
    ];

    c.bench_function("rectify explicit corners (400x300 -> 778x1100)", |b| {
        b.iter(|| {
            let page = scanner
                .scan(black_box(&photo), Some(&corners), OutputMode::Color, &NoopObserver)
                .ok();
            black_box(page);
        });
    });
}

fn bench_binarize(c: &mut Criterion) {
    let page = DynamicImage::ImageLuma8(GrayImage::from_fn(778, 1100, |x, y| {
        Luma([if (x / 7 + y / 13) % 5 == 0 { 20 } else { 220 }])
    }));
    let binarizer = Binarizer::default();

    c.bench_function("binarize (778x1100)", |b| {
        b.iter(|| black_box(binarizer.to_black_and_white(black_box(&page))));
    });
}

criterion_group!(
    benches,
    bench_corner_detection,
    bench_rectify_explicit_corners,
    bench_binarize
);
criterion_main!(benches);
