//! Cycle labelling from extremum boundaries.
//!
//! Boundaries are the `time_s` values at the extremum indices. A sample
//! belongs to cycle `i` when `b[i-1] < t <= b[i]`, so a boundary sample
//! closes its cycle. Anything up to and including the first boundary is
//! unassigned (0). The open tail after the last boundary is labelled as one
//! more cycle, ending one mean boundary period after the last boundary.

use log::{debug, warn};

use crate::data::model::{CycleSpan, ExtremaSet};
use crate::error::{ConfigurationError, Result};

/// Label assigned to samples outside every cycle.
pub const UNASSIGNED: u32 = 0;

/// Cycle labels of one channel plus the statistics used to derive them.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// One label per sample, aligned with the time column.
    pub labels: Vec<u32>,
    /// Mean time between consecutive boundaries, in seconds.
    pub mean_period: f64,
    /// Timestamp closing the trailing partial cycle.
    pub estimated_end: f64,
    /// Highest cycle id in use (the trailing cycle).
    pub cycle_count: u32,
}

impl Segmentation {
    /// Ids that label at least one sample, ascending.
    pub fn cycle_ids(&self) -> Vec<u32> {
        crate::data::filter::assigned_cycle_ids(&self.labels)
    }

    /// Start/end/sample count per populated cycle.
    pub fn spans(&self, time: &[f64]) -> Vec<CycleSpan> {
        cycle_spans(time, &self.labels)
    }
}

/// Validated boundary timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSegmenter {
    boundaries: Vec<f64>,
    mean_period: f64,
}

impl CycleSegmenter {
    /// Resolve `boundaries` against `time` and compute the mean period.
    pub fn new(time: &[f64], boundaries: &ExtremaSet) -> Result<Self> {
        let indices = &boundaries.indices;
        if indices.len() < 2 {
            return Err(ConfigurationError::TooFewBoundaries {
                found: indices.len(),
            }
            .into());
        }
        if let Some(&index) = indices.iter().find(|&&idx| idx >= time.len()) {
            return Err(ConfigurationError::BoundaryOutOfRange {
                index,
                len: time.len(),
            }
            .into());
        }
        if let Some(position) = indices.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ConfigurationError::UnorderedBoundaries {
                position: position + 1,
            }
            .into());
        }

        let times = boundaries.times(time);
        let mean_period = mean_period(&times);
        Ok(Self {
            boundaries: times,
            mean_period,
        })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn mean_period(&self) -> f64 {
        self.mean_period
    }

    /// End of the trailing partial cycle.
    pub fn estimated_end(&self) -> f64 {
        // Non-empty: `new` requires two boundaries.
        self.boundaries[self.boundaries.len() - 1] + self.mean_period
    }

    /// Cycle id of a single timestamp.
    pub fn label_of(&self, t: f64) -> u32 {
        let n = self.boundaries.len();
        // Number of boundaries strictly before `t`.
        let before = self.boundaries.partition_point(|&b| b < t);
        if before == 0 {
            UNASSIGNED
        } else if before < n {
            before as u32
        } else if t <= self.estimated_end() {
            n as u32
        } else {
            UNASSIGNED
        }
    }

    pub fn label(&self, time: &[f64]) -> Segmentation {
        let labels: Vec<u32> = time.iter().map(|&t| self.label_of(t)).collect();
        let estimated_end = self.estimated_end();

        let beyond = time.iter().filter(|&&t| t > estimated_end).count();
        if beyond > 0 {
            warn!(
                "{beyond} samples after the estimated end {estimated_end:.4} s are left unassigned"
            );
        }
        debug!(
            "{} boundaries, mean period {:.4} s, {} cycles",
            self.boundaries.len(),
            self.mean_period,
            self.boundaries.len()
        );

        Segmentation {
            labels,
            mean_period: self.mean_period,
            estimated_end,
            cycle_count: self.boundaries.len() as u32,
        }
    }
}

/// Label every sample of `time` using the extrema in `boundaries`.
pub fn segment(time: &[f64], boundaries: &ExtremaSet) -> Result<Segmentation> {
    Ok(CycleSegmenter::new(time, boundaries)?.label(time))
}

fn mean_period(times: &[f64]) -> f64 {
    let gaps: f64 = times.windows(2).map(|w| w[1] - w[0]).sum();
    gaps / (times.len() - 1) as f64
}

/// Spans of every populated cycle in `labels`, ascending by id.
pub fn cycle_spans(time: &[f64], labels: &[u32]) -> Vec<CycleSpan> {
    let mut spans: Vec<CycleSpan> = Vec::new();
    for (&t, &id) in time.iter().zip(labels) {
        if id == UNASSIGNED {
            continue;
        }
        match spans.iter_mut().find(|s| s.id == id) {
            Some(span) => {
                span.start_s = span.start_s.min(t);
                span.end_s = span.end_s.max(t);
                span.samples += 1;
            }
            None => spans.push(CycleSpan {
                id,
                start_s: t,
                end_s: t,
                samples: 1,
            }),
        }
    }
    spans.sort_by_key(|s| s.id);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ExtremumKind;
    use crate::error::Error;
    use approx::assert_relative_eq;

    fn troughs(indices: Vec<usize>) -> ExtremaSet {
        ExtremaSet::new(ExtremumKind::Trough, indices)
    }

    #[test]
    fn labels_complete_and_trailing_cycles() {
        let time: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let seg = segment(&time, &troughs(vec![2, 5, 8])).unwrap();

        assert_relative_eq!(seg.mean_period, 3.0);
        assert_relative_eq!(seg.estimated_end, 11.0);
        assert_eq!(seg.cycle_count, 3);
        assert_eq!(seg.labels, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn boundary_sample_closes_its_cycle() {
        let time: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let seg = segment(&time, &troughs(vec![1, 4])).unwrap();
        assert_eq!(seg.labels[1], 0);
        assert_eq!(seg.labels[4], 1);
        assert_eq!(seg.labels[5], 2);
    }

    #[test]
    fn samples_past_estimated_end_stay_unassigned() {
        let time: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let seg = segment(&time, &troughs(vec![0, 2])).unwrap();
        assert_eq!(seg.labels, vec![0, 1, 1, 2, 2, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn too_few_boundaries_is_a_configuration_error() {
        let time = [0.0, 1.0, 2.0];
        for indices in [vec![], vec![1]] {
            let found = indices.len();
            assert_eq!(
                segment(&time, &troughs(indices)).unwrap_err(),
                Error::Configuration(ConfigurationError::TooFewBoundaries { found })
            );
        }
    }

    #[test]
    fn rejects_bad_boundary_indices() {
        let time = [0.0, 1.0, 2.0];
        assert!(matches!(
            segment(&time, &troughs(vec![0, 3])),
            Err(Error::Configuration(ConfigurationError::BoundaryOutOfRange { index: 3, len: 3 }))
        ));
        assert!(matches!(
            segment(&time, &troughs(vec![2, 1])),
            Err(Error::Configuration(ConfigurationError::UnorderedBoundaries { position: 1 }))
        ));
    }

    #[test]
    fn uneven_boundaries_use_mean_period() {
        let time: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let seg = segment(&time, &troughs(vec![0, 4, 12])).unwrap();
        assert_relative_eq!(seg.mean_period, 0.6, epsilon = 1e-12);
        assert_eq!(seg.labels[16], 3);
        assert_eq!(seg.labels[17], 3);
        assert_eq!(seg.labels[19], UNASSIGNED);
    }

    #[test]
    fn spans_summarise_each_cycle() {
        let time: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let seg = segment(&time, &troughs(vec![2, 5, 8])).unwrap();
        let spans = seg.spans(&time);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].id, 1);
        assert_relative_eq!(spans[0].start_s, 3.0);
        assert_relative_eq!(spans[0].end_s, 5.0);
        assert_eq!(spans[2].samples, 3);
        assert_eq!(seg.cycle_ids(), vec![1, 2, 3]);
    }
}
