// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — corner detection, corner ordering, perspective
// rectification, and black-and-white conversion.

pub mod binarize;
pub mod contour;
pub mod contrast;
pub mod detect;
pub mod homography;
pub mod order;
pub mod rectify;
pub mod scanner;

pub use binarize::Binarizer;
pub use detect::CornerDetector;
pub use rectify::Rectifier;
pub use scanner::DocumentScanner;
