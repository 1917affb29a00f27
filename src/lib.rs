//! Post-processing of cyclic tensile-test time series.
//!
//! ```text
//!  TensileSeries ──► extrema ──► cycles ──► calibrate
//!   (time, strain,   peaks and    cycle id    origin-shifted
//!    stress)         troughs      per sample  curve per cycle
//! ```
//!
//! [`analysis::analyze`] runs the whole chain with an [`AnalysisConfig`];
//! each stage is also usable on its own through [`extrema::find_peaks`],
//! [`cycles::segment`] and [`calibrate::calibrate`].

pub mod analysis;
pub mod calibrate;
pub mod config;
pub mod cycles;
pub mod data;
pub mod error;
pub mod extrema;
pub mod synth;

pub use analysis::{analyze, analyze_batch, AnalyzedSeries};
pub use calibrate::{CalibratedCurve, CycleCalibrator};
pub use config::{AnalysisConfig, CalibrationConfig, ChannelConfig, ColumnNames, DetectionParams};
pub use cycles::{CycleSegmenter, Segmentation, UNASSIGNED};
pub use data::model::{Channel, CycleSpan, ExtremaBundle, ExtremaSet, ExtremumKind, TensileSeries};
pub use error::{ConfigurationError, DataError, Error, Result};
pub use extrema::ExtremaDetector;
pub use synth::SyntheticTest;
