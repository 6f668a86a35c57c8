// gapfill_core/src/stats.rs

//! Descriptive statistics over inter-sample intervals.
//!
//! All functions are pure and operate on nanosecond durations. Statistics
//! over the anomalous subset are `Option`-typed: an empty subset means
//! "no gaps", which must never be confused with zero-width gaps.

use crate::settings::SearchParams;

/// Statistics of one interval sequence.
///
/// `median` and `gap` describe the full sequence; `max`/`min`/`mean`/
/// `count`/`sum` describe only the intervals at or above the threshold
/// the stats were computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalStats {
    /// Gap threshold induced by the median, `median * mult / div`.
    pub gap: i64,
    /// Median of the full interval sequence.
    pub median: i64,
    pub max: Option<i64>,
    pub min: Option<i64>,
    pub mean: Option<i64>,
    pub count: usize,
    pub sum: Option<i64>,
}

/// Median of a duration sequence, `None` when empty.
/// Even-length input averages the two middle values.
pub fn median(intervals: &[i64]) -> Option<i64> {
    if intervals.is_empty() {
        return None;
    }

    let mut sorted = intervals.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2)
    }
}

/// Arithmetic mean of a duration sequence, `None` when empty.
pub fn mean(intervals: &[i64]) -> Option<i64> {
    if intervals.is_empty() {
        return None;
    }

    let sum: i128 = intervals.iter().map(|&d| d as i128).sum();
    Some((sum / intervals.len() as i128) as i64)
}

/// Computes interval statistics against the sequence's own induced gap
/// threshold: the anomalous subset is every interval `>= median * mult / div`.
///
/// # Returns
/// * `Some(IntervalStats)` - Statistics of the sequence.
/// * `None` - The sequence is empty, so no median exists.
pub fn interval_stats(intervals: &[i64], params: &SearchParams) -> Option<IntervalStats> {
    let med = median(intervals)?;
    interval_stats_with_threshold(intervals, params.gap_for(med), params)
}

/// Computes interval statistics with an explicit anomaly threshold.
///
/// # Arguments
/// * `intervals` - Nanosecond durations between adjacent samples.
/// * `threshold` - Durations `>=` this are the anomalous subset.
/// * `params` - Scale factor used to derive `gap` from the median.
///
/// # Returns
/// * `Some(IntervalStats)` - `median`/`gap` over the full input,
///   subset statistics over the anomalous intervals only.
/// * `None` - The input is empty.
pub fn interval_stats_with_threshold(
    intervals: &[i64],
    threshold: i64,
    params: &SearchParams,
) -> Option<IntervalStats> {
    let med = median(intervals)?;

    let mut count = 0usize;
    let mut sum = 0i64;
    let mut max: Option<i64> = None;
    let mut min: Option<i64> = None;
    for &duration in intervals.iter().filter(|&&d| d >= threshold) {
        count += 1;
        sum += duration;
        max = Some(max.map_or(duration, |m| m.max(duration)));
        min = Some(min.map_or(duration, |m| m.min(duration)));
    }

    Some(IntervalStats {
        gap: params.gap_for(med),
        median: med,
        max,
        min,
        mean: if count > 0 { Some(sum / count as i64) } else { None },
        count,
        sum: if count > 0 { Some(sum) } else { None },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: i64 = 1_000_000_000;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3, 1, 2]), Some(2));
        assert_eq!(median(&[4, 1, 2, 3]), Some(2));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn mean_of_durations() {
        assert_eq!(mean(&[1, 2, 3]), Some(2));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn gap_is_median_times_scale_factor() {
        let params = SearchParams::default();
        let stats = interval_stats(&[SEC, SEC, SEC, SEC, 100 * SEC], &params).unwrap();

        assert_eq!(stats.median, SEC);
        assert_eq!(stats.gap, 10 * SEC);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.max, Some(100 * SEC));
        assert_eq!(stats.min, Some(100 * SEC));
        assert_eq!(stats.sum, Some(100 * SEC));
        assert_eq!(stats.mean, Some(100 * SEC));
    }

    #[test]
    fn empty_anomalous_subset_uses_no_value_sentinels() {
        let params = SearchParams::default();
        let stats = interval_stats(&[SEC, SEC, SEC], &params).unwrap();

        // no interval reaches 10x the median
        assert_eq!(stats.count, 0);
        assert_eq!(stats.max, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.sum, None);
    }

    #[test]
    fn empty_input_has_no_stats() {
        let params = SearchParams::default();
        assert!(interval_stats(&[], &params).is_none());
    }

    #[test]
    fn explicit_threshold_filters_subset() {
        let params = SearchParams::default();
        let stats =
            interval_stats_with_threshold(&[SEC, 2 * SEC, 5 * SEC], 2 * SEC, &params).unwrap();

        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, Some(2 * SEC));
        assert_eq!(stats.max, Some(5 * SEC));
        assert_eq!(stats.sum, Some(7 * SEC));
    }
}
