// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatscan-document — Document rectification for photographed pages.
//
// Provides corner detection (contrast equalisation, edge-preserving smoothing,
// Canny edges, contour search), canonical corner ordering, homography-based
// perspective correction into a fixed A4 frame, adaptive black-and-white
// conversion, and image decode/encode helpers.

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `flatscan_document::DocumentScanner` etc.
pub use self::image::codec::ImageCodec;
pub use scan::binarize::Binarizer;
pub use scan::detect::CornerDetector;
pub use scan::homography::Homography;
pub use scan::order::order_corners;
pub use scan::rectify::Rectifier;
pub use scan::scanner::DocumentScanner;
