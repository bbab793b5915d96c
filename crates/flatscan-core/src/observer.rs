// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Diagnostic sink passed into the detector and rectifier.
//
// The pipeline never reaches for process-wide logging state on its own
// behalf: callers hand it a `ScanObserver`, and the stock `TracingObserver`
// forwards events to whatever `tracing` subscriber the caller installed.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::types::Quadrilateral;

/// Something the pipeline wants a caller to know about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScanEvent {
    /// A candidate contour produced a usable document outline.
    CornersDetected {
        corners: Quadrilateral,
        candidates_examined: usize,
    },
    /// A candidate contour was inspected and discarded.
    CandidateRejected {
        /// 0-based position in the area ranking.
        rank: usize,
        /// Vertex count after polygon simplification.
        vertices: usize,
        reason: String,
    },
    /// No candidate qualified; the full image frame is used instead.
    DetectionFallback {
        reason: String,
        candidates_examined: usize,
    },
    /// The page was warped into the target frame.
    Rectified { width: u32, height: u32 },
    /// The page was converted to black and white.
    Binarized { width: u32, height: u32 },
}

/// Receiver for [`ScanEvent`]s.
pub trait ScanObserver: Send + Sync {
    fn on_event(&self, event: &ScanEvent);
}

/// Forwards events to `tracing`. Fallbacks are logged at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScanObserver for TracingObserver {
    fn on_event(&self, event: &ScanEvent) {
        match event {
            ScanEvent::CornersDetected {
                corners,
                candidates_examined,
            } => tracing::info!(?corners, candidates_examined, "document corners detected"),
            ScanEvent::CandidateRejected {
                rank,
                vertices,
                reason,
            } => tracing::debug!(rank, vertices, %reason, "contour candidate rejected"),
            ScanEvent::DetectionFallback {
                reason,
                candidates_examined,
            } => tracing::warn!(
                %reason,
                candidates_examined,
                "no document outline found; using full frame"
            ),
            ScanEvent::Rectified { width, height } => {
                tracing::info!(width, height, "perspective correction applied")
            }
            ScanEvent::Binarized { width, height } => {
                tracing::debug!(width, height, "page binarized")
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_event(&self, _event: &ScanEvent) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<ScanEvent>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<ScanEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any `DetectionFallback` was recorded.
    pub fn saw_fallback(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ScanEvent::DetectionFallback { .. }))
    }
}

impl ScanObserver for MemoryObserver {
    fn on_event(&self, event: &ScanEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
