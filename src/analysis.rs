use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use log::info;

use crate::calibrate::{CalibratedCurve, CycleCalibrator};
use crate::config::AnalysisConfig;
use crate::cycles::{segment, Segmentation};
use crate::data::filter::flagged_indices;
use crate::data::loader;
use crate::data::model::{Channel, CycleSpan, ExtremaBundle, ExtremumKind, TensileSeries};
use crate::error::Result;
use crate::extrema::detect_all;

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

/// A series together with everything derived from it: the four extrema sets
/// and the cycle labels of both channels.
///
/// Derived fields are computed once by [`analyze`]; running again with
/// different thresholds builds a new value.
#[derive(Debug, Clone)]
pub struct AnalyzedSeries {
    series: TensileSeries,
    extrema: ExtremaBundle,
    strain_cycles: Segmentation,
    stress_cycles: Segmentation,
    config: AnalysisConfig,
}

/// Detect extrema on both channels and segment both into cycles.
pub fn analyze(series: TensileSeries, config: &AnalysisConfig) -> Result<AnalyzedSeries> {
    config.validate()?;

    let extrema = detect_all(&series, &config.strain, &config.stress)?;
    let strain_cycles = segment(
        series.time_s(),
        extrema.get(Channel::Strain, config.strain.cycle_boundary),
    )?;
    let stress_cycles = segment(
        series.time_s(),
        extrema.get(Channel::Stress, config.stress.cycle_boundary),
    )?;

    info!(
        "analyzed {} samples: {} strain cycles (mean period {:.3} s), {} stress cycles (mean period {:.3} s)",
        series.len(),
        strain_cycles.cycle_count,
        strain_cycles.mean_period,
        stress_cycles.cycle_count,
        stress_cycles.mean_period,
    );

    Ok(AnalyzedSeries {
        series,
        extrema,
        strain_cycles,
        stress_cycles,
        config: config.clone(),
    })
}

/// Ingest a record batch using the configured column names, then analyze it.
pub fn analyze_batch(batch: &RecordBatch, config: &AnalysisConfig) -> Result<AnalyzedSeries> {
    let series = loader::series_from_batch(batch, &config.columns)?;
    analyze(series, config)
}

impl AnalyzedSeries {
    pub fn series(&self) -> &TensileSeries {
        &self.series
    }

    pub fn extrema(&self) -> &ExtremaBundle {
        &self.extrema
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn segmentation(&self, channel: Channel) -> &Segmentation {
        match channel {
            Channel::Strain => &self.strain_cycles,
            Channel::Stress => &self.stress_cycles,
        }
    }

    /// Cycle label column of `channel` (0 = unassigned).
    pub fn labels(&self, channel: Channel) -> &[u32] {
        &self.segmentation(channel).labels
    }

    /// 0/1 flag column for one extremum set.
    pub fn flags(&self, channel: Channel, kind: ExtremumKind) -> Vec<u8> {
        self.extrema.get(channel, kind).flags(self.series.len())
    }

    /// Rows flagged as `kind` in `channel`, for plotting detected extrema.
    pub fn flagged_rows(&self, channel: Channel, kind: ExtremumKind) -> Vec<usize> {
        flagged_indices(&self.flags(channel, kind))
    }

    pub fn cycle_ids(&self, channel: Channel) -> Vec<u32> {
        self.segmentation(channel).cycle_ids()
    }

    pub fn cycle_spans(&self, channel: Channel) -> Vec<CycleSpan> {
        self.segmentation(channel).spans(self.series.time_s())
    }

    /// Calibrated curve of one cycle using the configured window, basis and
    /// axes.
    pub fn calibrated_curve(&self, cycle_id: u32) -> Result<CalibratedCurve> {
        let calibration = &self.config.calibration;
        CycleCalibrator::from_config(calibration)?.calibrate(
            &self.series,
            self.labels(calibration.basis),
            cycle_id,
        )
    }

    /// Calibrated curves of every populated cycle of the configured basis.
    pub fn calibrated_curves(&self) -> Result<Vec<CalibratedCurve>> {
        let calibration = &self.config.calibration;
        let ids = self.cycle_ids(calibration.basis);
        CycleCalibrator::from_config(calibration)?.calibrate_cycles(
            &self.series,
            self.labels(calibration.basis),
            &ids,
        )
    }

    /// The input rows augmented with flag and cycle columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        loader::to_record_batch(self, &self.config.columns)
    }

    /// Text table of the augmented rows.
    pub fn pretty(&self) -> Result<String> {
        let batch = self.to_record_batch()?;
        Ok(pretty_format_batches(&[batch])?.to_string())
    }
}
