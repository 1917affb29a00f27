use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ColumnNames;
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Channel / ExtremumKind – what a derived column is about
// ---------------------------------------------------------------------------

/// One of the two measured channels of a cyclic tensile test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Strain,
    Stress,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Strain, Channel::Stress];

    /// Column-name prefix used for the derived flag and cycle columns.
    pub fn prefix(self) -> &'static str {
        match self {
            Channel::Strain => "strain",
            Channel::Stress => "stress",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Peak,
    Trough,
}

impl fmt::Display for ExtremumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtremumKind::Peak => f.write_str("peak"),
            ExtremumKind::Trough => f.write_str("trough"),
        }
    }
}

// ---------------------------------------------------------------------------
// TensileSeries – the validated input table
// ---------------------------------------------------------------------------

/// A cyclic tensile-test time series stored column-wise.
///
/// Construction validates the schema once: all four columns have the same
/// length, every value is finite and both time columns are strictly
/// increasing. Everything downstream relies on that and does not re-check.
#[derive(Debug, Clone, PartialEq)]
pub struct TensileSeries {
    time_ms: Vec<f64>,
    time_s: Vec<f64>,
    strain: Vec<f64>,
    stress: Vec<f64>,
}

impl TensileSeries {
    /// Build a series from plain column vectors using the default column
    /// names in error messages.
    pub fn from_columns(
        time_ms: Vec<f64>,
        time_s: Vec<f64>,
        strain: Vec<f64>,
        stress: Vec<f64>,
    ) -> Result<Self> {
        let names = ColumnNames::default();
        Self::validated(&names, time_ms, time_s, strain, stress)
    }

    /// Build a series from seconds only; `time_ms` is derived.
    pub fn from_seconds(time_s: Vec<f64>, strain: Vec<f64>, stress: Vec<f64>) -> Result<Self> {
        let time_ms = time_s.iter().map(|t| t * 1000.0).collect();
        Self::from_columns(time_ms, time_s, strain, stress)
    }

    pub(crate) fn validated(
        names: &ColumnNames,
        time_ms: Vec<f64>,
        time_s: Vec<f64>,
        strain: Vec<f64>,
        stress: Vec<f64>,
    ) -> Result<Self> {
        let expected = time_s.len();
        for (name, col) in [
            (&names.time_ms, &time_ms),
            (&names.time_s, &time_s),
            (&names.strain, &strain),
            (&names.stress, &stress),
        ] {
            if col.len() != expected {
                return Err(DataError::LengthMismatch {
                    column: name.clone(),
                    expected,
                    actual: col.len(),
                }
                .into());
            }
            if let Some(row) = col.iter().position(|v| !v.is_finite()) {
                return Err(DataError::NonFinite {
                    column: name.clone(),
                    row,
                }
                .into());
            }
        }

        for (name, col) in [(&names.time_ms, &time_ms), (&names.time_s, &time_s)] {
            if let Some(row) = col.windows(2).position(|w| w[1] <= w[0]) {
                return Err(DataError::NonMonotonicTime {
                    column: name.clone(),
                    row: row + 1,
                }
                .into());
            }
        }

        Ok(TensileSeries {
            time_ms,
            time_s,
            strain,
            stress,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }

    pub fn time_ms(&self) -> &[f64] {
        &self.time_ms
    }

    /// Time in seconds; the unit every cycle boundary and window uses.
    pub fn time_s(&self) -> &[f64] {
        &self.time_s
    }

    pub fn strain(&self) -> &[f64] {
        &self.strain
    }

    pub fn stress(&self) -> &[f64] {
        &self.stress
    }

    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Strain => &self.strain,
            Channel::Stress => &self.stress,
        }
    }
}

// ---------------------------------------------------------------------------
// ExtremaSet / ExtremaBundle – detector output
// ---------------------------------------------------------------------------

/// Ordered sample indices of one extremum kind in one signal.
///
/// Indices are strictly increasing and consecutive indices are at least the
/// detector's `min_distance` apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtremaSet {
    pub kind: ExtremumKind,
    pub indices: Vec<usize>,
}

impl ExtremaSet {
    pub fn new(kind: ExtremumKind, indices: Vec<usize>) -> Self {
        ExtremaSet { kind, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Flag column of length `len`: 1 at every extremum index, 0 elsewhere.
    /// Indices past `len` are ignored.
    pub fn flags(&self, len: usize) -> Vec<u8> {
        let mut flags = vec![0u8; len];
        for &idx in &self.indices {
            if let Some(slot) = flags.get_mut(idx) {
                *slot = 1;
            }
        }
        flags
    }

    /// Timestamps of the extrema, looked up in `time`.
    pub fn times(&self, time: &[f64]) -> Vec<f64> {
        self.indices
            .iter()
            .filter_map(|&idx| time.get(idx).copied())
            .collect()
    }
}

/// The four extrema sets of a tensile series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtremaBundle {
    pub strain_peaks: ExtremaSet,
    pub strain_troughs: ExtremaSet,
    pub stress_peaks: ExtremaSet,
    pub stress_troughs: ExtremaSet,
}

impl ExtremaBundle {
    pub fn get(&self, channel: Channel, kind: ExtremumKind) -> &ExtremaSet {
        match (channel, kind) {
            (Channel::Strain, ExtremumKind::Peak) => &self.strain_peaks,
            (Channel::Strain, ExtremumKind::Trough) => &self.strain_troughs,
            (Channel::Stress, ExtremumKind::Peak) => &self.stress_peaks,
            (Channel::Stress, ExtremumKind::Trough) => &self.stress_troughs,
        }
    }
}

// ---------------------------------------------------------------------------
// CycleSpan – summary of one labelled cycle
// ---------------------------------------------------------------------------

/// First/last timestamp and sample count of one cycle, derived from a label
/// column on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSpan {
    pub id: u32,
    pub start_s: f64,
    pub end_s: f64,
    pub samples: usize,
}

impl CycleSpan {
    pub fn duration_s(&self) -> f64 {
        self.end_s - self.start_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn rejects_non_monotonic_time() {
        let err = TensileSeries::from_seconds(
            vec![0.0, 0.1, 0.1, 0.2],
            vec![0.0; 4],
            vec![0.0; 4],
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::Data(DataError::NonMonotonicTime {
                column: "time_ms".into(),
                row: 2
            })
        );
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TensileSeries::from_seconds(vec![0.0, 1.0], vec![0.0], vec![0.0, 0.0])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Data(DataError::LengthMismatch { ref column, expected: 2, actual: 1 })
                if column == "strain"
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = TensileSeries::from_seconds(
            vec![0.0, 1.0, 2.0],
            vec![0.0, f64::NAN, 0.0],
            vec![0.0; 3],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Data(DataError::NonFinite { row: 1, .. })));
    }

    #[test]
    fn flags_mark_only_extrema() {
        let set = ExtremaSet::new(ExtremumKind::Peak, vec![1, 4]);
        assert_eq!(set.flags(6), vec![0, 1, 0, 0, 1, 0]);
        assert_eq!(set.flags(3), vec![0, 1, 0]);
    }

    #[test]
    fn empty_series_is_valid() {
        let series = TensileSeries::from_seconds(vec![], vec![], vec![]).unwrap();
        assert!(series.is_empty());
    }
}
