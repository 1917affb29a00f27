//! Analysis parameters.
//!
//! Every threshold is an explicit value handed to the operation that needs
//! it. [`AnalysisConfig`] only bundles them so a driver can keep one JSON
//! document per test rig.

use serde::{Deserialize, Serialize};

use crate::data::model::{Channel, ExtremumKind};
use crate::error::{ConfigurationError, Result};

/// Thresholds for one call of the extrema detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Minimum index distance between retained extrema (≥ 1).
    pub min_distance: usize,
    /// Minimum amplitude of a retained extremum. For troughs this applies to
    /// the negated signal.
    pub min_height: f64,
}

impl DetectionParams {
    pub fn new(min_distance: usize, min_height: f64) -> Self {
        Self {
            min_distance,
            min_height,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_distance < 1 {
            return Err(ConfigurationError::MinDistance(self.min_distance).into());
        }
        if !self.min_height.is_finite() {
            return Err(ConfigurationError::NonFiniteHeight(self.min_height).into());
        }
        Ok(())
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_distance: 1,
            min_height: f64::MIN,
        }
    }
}

/// Detection and segmentation settings for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub peaks: DetectionParams,
    pub troughs: DetectionParams,
    /// Which extrema delimit the cycles of this channel.
    pub cycle_boundary: ExtremumKind,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            peaks: DetectionParams::default(),
            troughs: DetectionParams::default(),
            cycle_boundary: ExtremumKind::Trough,
        }
    }
}

impl ChannelConfig {
    pub fn params(&self, kind: ExtremumKind) -> DetectionParams {
        match kind {
            ExtremumKind::Peak => self.peaks,
            ExtremumKind::Trough => self.troughs,
        }
    }
}

/// Settings for origin-calibrated cycle curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Length of the window taken from the start of each cycle, in seconds.
    pub window_duration: f64,
    /// Which channel's cycle labels select the rows.
    pub basis: Channel,
    pub x: Channel,
    pub y: Channel,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_duration: 1.0,
            basis: Channel::Strain,
            x: Channel::Strain,
            y: Channel::Stress,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.window_duration.is_finite() || self.window_duration < 0.0 {
            return Err(ConfigurationError::InvalidWindow(self.window_duration).into());
        }
        Ok(())
    }
}

/// Names of the required input columns in a record batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub time_ms: String,
    pub time_s: String,
    pub strain: String,
    pub stress: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            time_ms: "time_ms".into(),
            time_s: "time_s".into(),
            strain: "strain".into(),
            stress: "stress".into(),
        }
    }
}

/// Full parameter set for [`crate::analysis::analyze`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub strain: ChannelConfig,
    pub stress: ChannelConfig,
    pub calibration: CalibrationConfig,
    pub columns: ColumnNames,
}

impl AnalysisConfig {
    /// Parse and validate a JSON document. Missing sections take defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(text)
            .map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn channel(&self, channel: Channel) -> &ChannelConfig {
        match channel {
            Channel::Strain => &self.strain,
            Channel::Stress => &self.stress,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for cfg in [&self.strain, &self.stress] {
            cfg.peaks.validate()?;
            cfg.troughs.validate()?;
        }
        self.calibration.validate()
    }
}
