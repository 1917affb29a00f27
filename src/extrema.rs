//! Peak and trough detection for a single channel.
//!
//! Candidates are local maxima against their immediate neighbours (a flat
//! plateau counts once, at its middle sample). They are then filtered by
//! height and thinned so that no two survivors are closer than
//! `min_distance` samples, keeping the taller one. Troughs are the peaks of
//! the negated signal.

use log::{debug, warn};

use crate::config::{ChannelConfig, DetectionParams};
use crate::data::model::{Channel, ExtremaBundle, ExtremaSet, ExtremumKind, TensileSeries};
use crate::error::Result;

/// Validated detector for one set of thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremaDetector {
    params: DetectionParams,
}

impl ExtremaDetector {
    pub fn new(params: DetectionParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> DetectionParams {
        self.params
    }

    /// Indices of the peaks of `signal`.
    pub fn peaks(&self, signal: &[f64]) -> ExtremaSet {
        ExtremaSet::new(ExtremumKind::Peak, find_peaks_impl(signal, self.params))
    }

    /// Indices of the troughs of `signal`; `min_height` is compared against
    /// the negated values.
    pub fn troughs(&self, signal: &[f64]) -> ExtremaSet {
        let negated: Vec<f64> = signal.iter().map(|v| -v).collect();
        ExtremaSet::new(ExtremumKind::Trough, find_peaks_impl(&negated, self.params))
    }

    pub fn detect(&self, signal: &[f64], kind: ExtremumKind) -> ExtremaSet {
        match kind {
            ExtremumKind::Peak => self.peaks(signal),
            ExtremumKind::Trough => self.troughs(signal),
        }
    }
}

/// Peak indices of `signal` with the given spacing and height thresholds.
pub fn find_peaks(signal: &[f64], min_distance: usize, min_height: f64) -> Result<Vec<usize>> {
    let detector = ExtremaDetector::new(DetectionParams::new(min_distance, min_height))?;
    Ok(detector.peaks(signal).indices)
}

/// Run peak and trough detection on one channel of `series`.
pub fn detect_channel(
    series: &TensileSeries,
    channel: Channel,
    config: &ChannelConfig,
) -> Result<(ExtremaSet, ExtremaSet)> {
    let signal = series.channel(channel);
    let peaks = ExtremaDetector::new(config.peaks)?.peaks(signal);
    let troughs = ExtremaDetector::new(config.troughs)?.troughs(signal);

    debug!(
        "{channel}: {} peaks (distance {}, height {}), {} troughs (distance {}, height {})",
        peaks.len(),
        config.peaks.min_distance,
        config.peaks.min_height,
        troughs.len(),
        config.troughs.min_distance,
        config.troughs.min_height,
    );
    for set in [&peaks, &troughs] {
        if set.is_empty() && !signal.is_empty() {
            warn!("{channel}: no {} found in {} samples", set.kind, signal.len());
        }
    }

    Ok((peaks, troughs))
}

/// Detect all four extrema sets of a series.
pub fn detect_all(
    series: &TensileSeries,
    strain: &ChannelConfig,
    stress: &ChannelConfig,
) -> Result<ExtremaBundle> {
    let (strain_peaks, strain_troughs) = detect_channel(series, Channel::Strain, strain)?;
    let (stress_peaks, stress_troughs) = detect_channel(series, Channel::Stress, stress)?;
    Ok(ExtremaBundle {
        strain_peaks,
        strain_troughs,
        stress_peaks,
        stress_troughs,
    })
}

// ---------------------------------------------------------------------------
// Core algorithm
// ---------------------------------------------------------------------------

fn find_peaks_impl(x: &[f64], params: DetectionParams) -> Vec<usize> {
    let distance = params.min_distance;
    if x.len() <= distance.saturating_mul(2) {
        return Vec::new();
    }

    let mut peaks = local_maxima(x);
    peaks.retain(|&idx| x[idx] >= params.min_height);
    if distance > 1 {
        peaks = select_by_distance(x, &peaks, distance);
    }
    peaks
}

/// Local maxima, with plateaus reported at their middle sample (the lower
/// one for even widths). Endpoints are never maxima.
fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut out = Vec::new();
    if x.len() < 3 {
        return out;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                out.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    out
}

/// Greedy thinning in descending height order. Equal heights are visited in
/// index order, so the earlier of two tied peaks survives.
fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| x[peaks[b]].total_cmp(&x[peaks[a]]));

    let mut keep = vec![true; peaks.len()];
    for &i in &order {
        if !keep[i] {
            continue;
        }
        let mut j = i;
        while j > 0 && peaks[i] - peaks[j - 1] < distance {
            j -= 1;
            keep[j] = false;
        }
        let mut k = i + 1;
        while k < peaks.len() && peaks[k] - peaks[i] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, Error};

    #[test]
    fn finds_simple_peaks() {
        let x = [0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0];
        assert_eq!(find_peaks(&x, 1, f64::MIN).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn height_filter_drops_small_peaks() {
        let x = [0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0];
        assert_eq!(find_peaks(&x, 1, 2.0).unwrap(), vec![3, 5]);
    }

    #[test]
    fn plateau_reports_middle_sample() {
        let x = [0.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&x, 1, 0.0).unwrap(), vec![2]);
        let even = [0.0, 2.0, 2.0, 0.0, 0.0];
        assert_eq!(find_peaks(&even, 1, 0.0).unwrap(), vec![1]);
    }

    #[test]
    fn rising_edge_into_endpoint_is_not_a_peak() {
        let x = [0.0, 1.0, 2.0, 3.0];
        assert!(find_peaks(&x, 1, f64::MIN).unwrap().is_empty());
        let shoulder = [0.0, 1.0, 1.0, 1.0];
        assert!(find_peaks(&shoulder, 1, f64::MIN).unwrap().is_empty());
    }

    #[test]
    fn distance_keeps_taller_peak() {
        let x = [0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&x, 3, f64::MIN).unwrap(), vec![3]);
        assert_eq!(find_peaks(&x, 2, f64::MIN).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn distance_tie_keeps_earlier_peak() {
        let x = [0.0, 2.0, 0.0, 2.0, 0.0, 0.0, 0.0];
        assert_eq!(find_peaks(&x, 3, f64::MIN).unwrap(), vec![1]);
    }

    #[test]
    fn short_signal_yields_empty_set() {
        let x = [0.0, 1.0, 0.0, 0.5];
        assert!(find_peaks(&x, 2, f64::MIN).unwrap().is_empty());
        assert_eq!(find_peaks(&x, 1, f64::MIN).unwrap(), vec![1]);
    }

    #[test]
    fn nan_samples_are_never_peaks() {
        let x = [0.0, f64::NAN, 0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&x, 1, f64::MIN).unwrap(), vec![3]);
    }

    #[test]
    fn troughs_use_negated_height() {
        let x = [0.0, -1.0, 0.0, -3.0, 0.0];
        let detector = ExtremaDetector::new(DetectionParams::new(1, 2.0)).unwrap();
        let troughs = detector.troughs(&x);
        assert_eq!(troughs.kind, ExtremumKind::Trough);
        assert_eq!(troughs.indices, vec![3]);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(
            find_peaks(&[0.0, 1.0, 0.0], 0, 0.0).unwrap_err(),
            Error::Configuration(ConfigurationError::MinDistance(0))
        );
        assert!(matches!(
            find_peaks(&[0.0, 1.0, 0.0], 1, f64::NAN),
            Err(Error::Configuration(ConfigurationError::NonFiniteHeight(_)))
        ));
    }

    #[test]
    fn detection_is_deterministic() {
        let x: Vec<f64> = (0..500).map(|i| (i as f64 * 0.3).sin() + (i as f64 * 0.07).cos()).collect();
        let detector = ExtremaDetector::new(DetectionParams::new(5, 0.2)).unwrap();
        let a = detector.peaks(&x);
        let b = detector.peaks(&x);
        assert_eq!(a, b);
        assert_eq!(a.flags(x.len()), b.flags(x.len()));
    }
}
