// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatscan — Core types, configuration, observer sink, and error definitions
// shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod observer;
pub mod types;

pub use config::{BinarizerConfig, DetectorConfig, EdgeThresholds, Interpolation, RectifierConfig, ScanConfig};
pub use error::FlatscanError;
pub use observer::{MemoryObserver, NoopObserver, ScanEvent, ScanObserver, TracingObserver};
pub use types::*;
