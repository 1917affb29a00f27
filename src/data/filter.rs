use std::collections::BTreeSet;

use crate::cycles::UNASSIGNED;

// ---------------------------------------------------------------------------
// Row selections over derived columns
// ---------------------------------------------------------------------------

/// Rows whose flag is set, e.g. to overlay detected peaks on a plot.
pub fn flagged_indices(flags: &[u8]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, &flag)| flag == 1)
        .map(|(i, _)| i)
        .collect()
}

/// Rows labelled with cycle `id`.
pub fn cycle_indices(labels: &[u32], id: u32) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, &label)| label == id)
        .map(|(i, _)| i)
        .collect()
}

/// Subset of `rows` whose time lies in `[start, start + duration)`.
///
/// Only the upper bound is checked against `time`; callers pass rows that
/// already start at or after `start`.
pub fn window_indices(time: &[f64], rows: &[usize], start: f64, duration: f64) -> Vec<usize> {
    let end = start + duration;
    rows.iter().copied().filter(|&i| time[i] < end).collect()
}

/// Sorted set of cycle ids present in `labels`, without the unassigned id.
pub fn assigned_cycle_ids(labels: &[u32]) -> Vec<u32> {
    labels
        .iter()
        .copied()
        .filter(|&id| id != UNASSIGNED)
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_flagged_rows() {
        assert_eq!(flagged_indices(&[0, 1, 0, 0, 1]), vec![1, 4]);
        assert!(flagged_indices(&[]).is_empty());
    }

    #[test]
    fn selects_cycle_rows() {
        let labels = [0, 1, 1, 2, 2, 2, 0];
        assert_eq!(cycle_indices(&labels, 2), vec![3, 4, 5]);
        assert!(cycle_indices(&labels, 7).is_empty());
    }

    #[test]
    fn window_upper_bound_is_exclusive() {
        let time = [0.0, 0.5, 1.0, 1.5, 2.0];
        assert_eq!(window_indices(&time, &[1, 2, 3, 4], 0.5, 1.0), vec![1, 2]);
        assert!(window_indices(&time, &[1, 2], 0.5, 0.0).is_empty());
    }

    #[test]
    fn lists_assigned_ids_once() {
        assert_eq!(assigned_cycle_ids(&[0, 2, 2, 1, 3, 0]), vec![1, 2, 3]);
    }
}
