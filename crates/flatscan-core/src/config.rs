// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlatscanError, Result};
use crate::types::TargetFrame;

/// Settings for every stage of the scan pipeline.
///
/// Missing sections or fields in a JSON file fall back to their defaults, so a
/// config file only needs to name what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detector: DetectorConfig,
    pub rectifier: RectifierConfig,
    pub binarizer: BinarizerConfig,
}

/// How the Canny hysteresis thresholds are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeThresholds {
    /// Fixed gradient thresholds.
    Fixed { low: f32, high: f32 },
    /// Thresholds derived from the median intensity of the smoothed image,
    /// `ratio * median`, clamped to the valid gradient range.
    Adaptive { low_ratio: f32, high_ratio: f32 },
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self::Adaptive {
            low_ratio: 0.67,
            high_ratio: 1.33,
        }
    }
}

/// Corner detector tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// CLAHE clip limit, as a multiple of the mean histogram bin height.
    pub clahe_clip_limit: f32,
    /// Number of CLAHE tiles along each axis.
    pub clahe_tiles: u32,
    /// Bilateral filter window size.
    pub bilateral_window: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_spatial: f32,
    pub edge_thresholds: EdgeThresholds,
    /// At most this many contours (largest area first) are inspected.
    pub max_candidates: usize,
    /// Polygon simplification tolerance as a fraction of contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Minimum quadrilateral area as a fraction of the image area.
    pub min_area_ratio: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            bilateral_window: 5,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_spatial: 75.0,
            edge_thresholds: EdgeThresholds::default(),
            max_candidates: 5,
            approx_epsilon_ratio: 0.02,
            min_area_ratio: 0.10,
        }
    }
}

/// Resampling filter used when warping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Bilinear,
    Nearest,
}

/// Output frame and resampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifierConfig {
    /// Output height in pixels.
    pub target_height: u32,
    /// Output width divided by height (A4 portrait is about 1/sqrt(2)).
    pub aspect_ratio: f64,
    pub interpolation: Interpolation,
    /// RGB colour written where the destination maps outside the source.
    pub fill: [u8; 3],
}

impl RectifierConfig {
    pub fn target_frame(&self) -> TargetFrame {
        TargetFrame::from_height(self.target_height, self.aspect_ratio)
    }
}

impl Default for RectifierConfig {
    fn default() -> Self {
        Self {
            target_height: 1100,
            aspect_ratio: 0.707,
            interpolation: Interpolation::Bilinear,
            fill: [255, 255, 255],
        }
    }
}

/// Adaptive threshold settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizerConfig {
    /// Side of the square Gaussian neighbourhood; odd, at least 3.
    pub block_size: u32,
    /// Subtracted from the local mean to form the threshold.
    pub offset: f32,
}

impl Default for BinarizerConfig {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
        }
    }
}

impl ScanConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&data)?;
        tracing::debug!(path = %path.as_ref().display(), "scan config loaded");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Check the invariants each stage relies on.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        if !(d.clahe_clip_limit > 0.0) {
            return invalid("detector.clahe_clip_limit must be positive");
        }
        if d.clahe_tiles == 0 {
            return invalid("detector.clahe_tiles must be at least 1");
        }
        if d.bilateral_window == 0 {
            return invalid("detector.bilateral_window must be at least 1");
        }
        if !(d.bilateral_sigma_color > 0.0 && d.bilateral_sigma_spatial > 0.0) {
            return invalid("detector bilateral sigmas must be positive");
        }
        match d.edge_thresholds {
            EdgeThresholds::Fixed { low, high } => {
                if !(low >= 0.0 && low <= high) {
                    return invalid("fixed edge thresholds need 0 <= low <= high");
                }
            }
            EdgeThresholds::Adaptive {
                low_ratio,
                high_ratio,
            } => {
                if !(low_ratio > 0.0 && low_ratio <= high_ratio) {
                    return invalid("adaptive edge ratios need 0 < low_ratio <= high_ratio");
                }
            }
        }
        if d.max_candidates == 0 {
            return invalid("detector.max_candidates must be at least 1");
        }
        if !(d.approx_epsilon_ratio > 0.0 && d.approx_epsilon_ratio < 1.0) {
            return invalid("detector.approx_epsilon_ratio must be in (0, 1)");
        }
        if !(0.0..=1.0).contains(&d.min_area_ratio) {
            return invalid("detector.min_area_ratio must be in [0, 1]");
        }

        let r = &self.rectifier;
        if r.target_height < 2 {
            return invalid("rectifier.target_height must be at least 2");
        }
        if !(r.aspect_ratio > 0.0 && r.aspect_ratio.is_finite()) || r.target_frame().width < 2 {
            return invalid("rectifier.aspect_ratio must give a frame at least 2 px wide");
        }

        let b = &self.binarizer;
        if b.block_size < 3 || b.block_size % 2 == 0 {
            return invalid("binarizer.block_size must be odd and at least 3");
        }
        if !b.offset.is_finite() {
            return invalid("binarizer.offset must be finite");
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Result<()> {
    Err(FlatscanError::InvalidConfig(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScanConfig::default();
        config.validate().unwrap();
        assert_eq!(config.rectifier.target_frame(), TargetFrame::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ScanConfig::from_json_str(
            r#"{ "binarizer": { "offset": 5.0 },
                 "detector": { "edge_thresholds": { "kind": "fixed", "low": 75.0, "high": 200.0 } } }"#,
        )
        .unwrap();
        assert_eq!(config.binarizer.offset, 5.0);
        assert_eq!(config.binarizer.block_size, 11);
        assert_eq!(
            config.detector.edge_thresholds,
            EdgeThresholds::Fixed {
                low: 75.0,
                high: 200.0
            }
        );
        assert_eq!(config.rectifier, RectifierConfig::default());
    }

    #[test]
    fn even_block_size_is_rejected() {
        let err = ScanConfig::from_json_str(r#"{ "binarizer": { "block_size": 10 } }"#).unwrap_err();
        assert!(matches!(err, FlatscanError::InvalidConfig(_)));
    }

    #[test]
    fn inverted_fixed_thresholds_are_rejected() {
        let mut config = ScanConfig::default();
        config.detector.edge_thresholds = EdgeThresholds::Fixed {
            low: 200.0,
            high: 75.0,
        };
        assert!(matches!(config.validate(), Err(FlatscanError::InvalidConfig(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");

        let mut config = ScanConfig::default();
        config.rectifier.interpolation = Interpolation::Nearest;
        config.rectifier.target_height = 800;
        config.save(&path).unwrap();

        let loaded = ScanConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
