//! Origin calibration of a single cycle's curve.
//!
//! The rows of one cycle are cut to an initial window of `window_duration`
//! seconds, and each axis is shifted so its minimum sits at zero. Curves of
//! different cycles can then be overlaid from a common origin.

use log::{debug, warn};

use crate::config::CalibrationConfig;
use crate::cycles::UNASSIGNED;
use crate::data::filter::{cycle_indices, window_indices};
use crate::data::model::{Channel, TensileSeries};
use crate::error::{ConfigurationError, DataError, Result};

/// Origin-anchored `[x, y]` points of one cycle window.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedCurve {
    pub cycle: u32,
    /// First timestamp of the cycle (`t0`), seconds; `None` when the cycle
    /// has no rows.
    pub start_s: Option<f64>,
    /// Value subtracted from every x.
    pub x_offset: f64,
    /// Value subtracted from every y.
    pub y_offset: f64,
    pub points: Vec<[f64; 2]>,
}

impl CalibratedCurve {
    fn empty(cycle: u32, start_s: Option<f64>) -> Self {
        CalibratedCurve {
            cycle,
            start_s,
            x_offset: 0.0,
            y_offset: 0.0,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[0])
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[1])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleCalibrator {
    window_duration: f64,
    x: Channel,
    y: Channel,
}

impl CycleCalibrator {
    pub fn new(window_duration: f64, x: Channel, y: Channel) -> Result<Self> {
        if !window_duration.is_finite() || window_duration < 0.0 {
            return Err(ConfigurationError::InvalidWindow(window_duration).into());
        }
        Ok(Self {
            window_duration,
            x,
            y,
        })
    }

    pub fn from_config(config: &CalibrationConfig) -> Result<Self> {
        Self::new(config.window_duration, config.x, config.y)
    }

    pub fn window_duration(&self) -> f64 {
        self.window_duration
    }

    /// Calibrated curve of `cycle_id`, selecting rows through `labels`.
    ///
    /// An id with no rows, or a window that keeps no rows, gives an empty
    /// curve rather than an error.
    pub fn calibrate(
        &self,
        series: &TensileSeries,
        labels: &[u32],
        cycle_id: u32,
    ) -> Result<CalibratedCurve> {
        if cycle_id == UNASSIGNED {
            return Err(ConfigurationError::UnassignedCycle.into());
        }
        if labels.len() != series.len() {
            return Err(DataError::LengthMismatch {
                column: "cycle labels".into(),
                expected: series.len(),
                actual: labels.len(),
            }
            .into());
        }

        let time = series.time_s();
        let rows = cycle_indices(labels, cycle_id);
        if rows.is_empty() {
            warn!("cycle {cycle_id} has no samples");
            return Ok(CalibratedCurve::empty(cycle_id, None));
        }

        let t0 = rows.iter().map(|&i| time[i]).fold(f64::INFINITY, f64::min);
        let window = window_indices(time, &rows, t0, self.window_duration);
        if window.is_empty() {
            warn!(
                "cycle {cycle_id}: no samples in [{t0:.4}, {:.4}) s",
                t0 + self.window_duration
            );
            return Ok(CalibratedCurve::empty(cycle_id, Some(t0)));
        }

        let xs = series.channel(self.x);
        let ys = series.channel(self.y);
        let x_offset = window.iter().map(|&i| xs[i]).fold(f64::INFINITY, f64::min);
        let y_offset = window.iter().map(|&i| ys[i]).fold(f64::INFINITY, f64::min);

        let points: Vec<[f64; 2]> = window
            .iter()
            .map(|&i| [xs[i] - x_offset, ys[i] - y_offset])
            .collect();

        debug!(
            "cycle {cycle_id}: {} of {} samples in window, offsets ({}, {})",
            points.len(),
            rows.len(),
            x_offset,
            y_offset
        );

        Ok(CalibratedCurve {
            cycle: cycle_id,
            start_s: Some(t0),
            x_offset,
            y_offset,
            points,
        })
    }

    /// One curve per id, in the order given.
    pub fn calibrate_cycles(
        &self,
        series: &TensileSeries,
        labels: &[u32],
        cycle_ids: &[u32],
    ) -> Result<Vec<CalibratedCurve>> {
        cycle_ids
            .iter()
            .map(|&id| self.calibrate(series, labels, id))
            .collect()
    }
}

/// Calibrated `(x, y)` curve of one cycle's initial window.
pub fn calibrate(
    series: &TensileSeries,
    labels: &[u32],
    cycle_id: u32,
    window_duration: f64,
    x: Channel,
    y: Channel,
) -> Result<CalibratedCurve> {
    CycleCalibrator::new(window_duration, x, y)?.calibrate(series, labels, cycle_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;

    fn series() -> TensileSeries {
        TensileSeries::from_seconds(
            vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0],
            vec![0.01, 0.05, 0.02, 0.03, 0.04, 0.05, 0.01],
            vec![5.0, 40.0, 10.0, 20.0, 30.0, 40.0, 5.0],
        )
        .unwrap()
    }

    const LABELS: [u32; 7] = [0, 0, 1, 1, 1, 1, 0];

    #[test]
    fn shifts_each_axis_to_zero() {
        let curve = calibrate(&series(), &LABELS, 1, 10.0, Channel::Strain, Channel::Stress).unwrap();
        assert_eq!(curve.len(), 4);
        assert_eq!(curve.start_s, Some(1.0));
        assert_relative_eq!(curve.x_offset, 0.02);
        assert_relative_eq!(curve.y_offset, 10.0);
        assert_eq!(curve.xs().fold(f64::INFINITY, f64::min), 0.0);
        assert_eq!(curve.ys().fold(f64::INFINITY, f64::min), 0.0);
        assert_relative_eq!(curve.points[3][0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(curve.points[3][1], 30.0);
    }

    #[test]
    fn window_upper_bound_is_exclusive() {
        let curve = calibrate(&series(), &LABELS, 1, 1.0, Channel::Strain, Channel::Stress).unwrap();
        assert_eq!(curve.len(), 2);
        assert_relative_eq!(curve.y_offset, 10.0);
        assert_relative_eq!(curve.points[1][1], 10.0);
    }

    #[test]
    fn zero_window_gives_empty_curve() {
        let curve = calibrate(&series(), &LABELS, 1, 0.0, Channel::Strain, Channel::Stress).unwrap();
        assert!(curve.is_empty());
        assert_eq!(curve.start_s, Some(1.0));
    }

    #[test]
    fn unknown_cycle_gives_empty_curve() {
        let curve = calibrate(&series(), &LABELS, 9, 1.0, Channel::Strain, Channel::Stress).unwrap();
        assert!(curve.is_empty());
        assert_eq!(curve.start_s, None);
    }

    #[test]
    fn rejects_unassigned_id_and_bad_window() {
        assert_eq!(
            calibrate(&series(), &LABELS, 0, 1.0, Channel::Strain, Channel::Stress).unwrap_err(),
            Error::Configuration(ConfigurationError::UnassignedCycle)
        );
        assert!(matches!(
            calibrate(&series(), &LABELS, 1, -0.5, Channel::Strain, Channel::Stress),
            Err(Error::Configuration(ConfigurationError::InvalidWindow(_)))
        ));
    }

    #[test]
    fn rejects_misaligned_labels() {
        assert!(matches!(
            calibrate(&series(), &[1, 1], 1, 1.0, Channel::Strain, Channel::Stress),
            Err(Error::Data(DataError::LengthMismatch { expected: 7, actual: 2, .. }))
        ));
    }

    #[test]
    fn calibration_is_idempotent() {
        let calibrator = CycleCalibrator::new(2.0, Channel::Strain, Channel::Stress).unwrap();
        let s = series();
        let a = calibrator.calibrate_cycles(&s, &LABELS, &[1, 2]).unwrap();
        let b = calibrator.calibrate_cycles(&s, &LABELS, &[1, 2]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].cycle, 1);
        assert!(a[1].is_empty());
    }
}
