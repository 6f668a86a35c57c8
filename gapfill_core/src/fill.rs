// gapfill_core/src/fill.rs

//! Gap filling by linear interpolation.
//!
//! Every interval at or above the gap threshold (and, when a gap limit is
//! set, not above it) is closed with synthetic samples interpolated between
//! its endpoints. Synthetic timestamps advance by `threshold - 1 ns` so the
//! last one never collides with the right endpoint. Passthrough columns are
//! copied from the left endpoint.

use itertools::Itertools;

use crate::series::{Sample, Series};
use crate::settings::SearchParams;
use crate::stats;

/// Outcome of filling one series, including the verification pass.
#[derive(Debug, Clone, Copy)]
pub struct FillReport {
    /// Threshold used for filling, in nanoseconds.
    pub threshold: i64,
    /// Number of synthetic samples spliced in.
    pub inserted: usize,
    /// Intervals still at or above the threshold after filling (within the
    /// gap limit, when set). Gaps skipped for exceeding the limit land here.
    pub residual_gaps: usize,
    /// Gap threshold the post-fill interval distribution would call for.
    pub required_gap_after: Option<i64>,
    /// False when the post-fill required gap is smaller than the threshold
    /// used, meaning the threshold was inconsistent with the distribution.
    pub consistent: bool,
}

fn within_limit(duration: i64, gap_limit: Option<i64>) -> bool {
    match gap_limit {
        Some(limit) => duration <= limit,
        None => true,
    }
}

/// Fills the gaps of a series with linearly interpolated samples.
///
/// # Arguments
/// * `series` - The prepared series.
/// * `threshold` - Gap threshold in nanoseconds; intervals `>=` it are filled.
/// * `gap_limit` - When set, intervals wider than this are legitimate
///   outages and are left untouched.
/// * `params` - Scale factor for the verification statistics.
///
/// # Returns
/// * `(Series, FillReport)` - The filled series (original samples plus all
///   synthetic ones, re-sorted) and the verification outcome. The filled
///   series is produced even when the verification flags an inconsistency.
pub fn fill_gaps(
    series: &Series,
    threshold: i64,
    gap_limit: Option<i64>,
    params: &SearchParams,
) -> (Series, FillReport) {
    // a step of threshold - 1 ns must still move time forward
    if threshold <= 1 {
        log::warn!("gap threshold {} ns is too small to fill with; series left unchanged", threshold);
        return (
            series.clone(),
            FillReport {
                threshold,
                inserted: 0,
                residual_gaps: 0,
                required_gap_after: None,
                consistent: true,
            },
        );
    }

    let step = threshold - 1;
    let mut synthetic: Vec<Sample> = Vec::new();

    for (left, right) in series.samples().iter().tuple_windows() {
        let duration = (right.timestamp - left.timestamp)
            .num_nanoseconds()
            .unwrap_or(i64::MAX);
        if duration < threshold || !within_limit(duration, gap_limit) {
            continue;
        }

        let slope = (right.value - left.value) / duration as f64;
        let mut offset = step;
        while offset < duration {
            synthetic.push(Sample {
                timestamp: left.timestamp + chrono::Duration::nanoseconds(offset),
                value: left.value + slope * offset as f64,
                passthrough: left.passthrough.clone(),
            });
            offset += step;
        }
    }

    let inserted = synthetic.len();

    // one bulk merge and re-sort instead of per-gap splicing
    let mut merged = series.samples().to_vec();
    merged.extend(synthetic);
    let filled = Series::from_samples(merged);

    // verification pass over the result
    let new_intervals = filled.intervals();
    let residual_gaps = new_intervals
        .iter()
        .filter(|&&d| d >= threshold && within_limit(d, gap_limit))
        .count();
    let required_gap_after = stats::interval_stats(&new_intervals, params).map(|s| s.gap);
    let consistent = match required_gap_after {
        Some(required) => threshold <= required,
        None => true,
    };

    (
        filled,
        FillReport {
            threshold,
            inserted,
            residual_gaps,
            required_gap_after,
            consistent,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: i64 = 1_000_000_000;

    fn series_at_seconds(points: &[(i64, f64)]) -> Series {
        let samples = points
            .iter()
            .map(|&(sec, value)| Sample {
                timestamp: chrono::DateTime::from_timestamp(sec, 0).unwrap(),
                value,
                passthrough: vec!["pump-3".to_string()],
            })
            .collect();
        Series::from_samples(samples)
    }

    #[test]
    fn fills_sparse_scenario_with_interpolated_points() {
        // samples at 0 s, 100 s and 1000 s; threshold 50 s
        let series = series_at_seconds(&[(0, 0.0), (100, 10.0), (1000, 20.0)]);
        let params = SearchParams::default();

        let (filled, report) = fill_gaps(&series, 50 * SEC, None, &params);

        let t100 = chrono::DateTime::from_timestamp(100, 0).unwrap();
        let t1000 = chrono::DateTime::from_timestamp(1000, 0).unwrap();

        // the 900 s gap takes 18 synthetic points roughly 50 s apart
        let big_gap: Vec<&Sample> = filled
            .samples()
            .iter()
            .filter(|s| s.timestamp > t100 && s.timestamp < t1000)
            .collect();
        assert_eq!(big_gap.len(), 18);

        // values interpolate linearly from 10 to 20 across the gap
        for sample in &big_gap {
            let offset_ns = (sample.timestamp - t100).num_nanoseconds().unwrap();
            let expected = 10.0 + offset_ns as f64 * 10.0 / (900.0 * SEC as f64);
            assert!((sample.value - expected).abs() < 1e-6);
            assert_eq!(sample.passthrough, vec!["pump-3".to_string()]);
        }

        // the first point of the 100 s gap sits a nanosecond shy of 50 s
        let first = &filled.samples()[1];
        assert_eq!(
            (first.timestamp - filled.samples()[0].timestamp).num_nanoseconds(),
            Some(50 * SEC - 1)
        );
        assert!((first.value - 5.0).abs() < 1e-6);

        assert_eq!(report.inserted, filled.len() - 3);
        assert_eq!(report.residual_gaps, 0);
    }

    #[test]
    fn output_timestamps_are_strictly_increasing() {
        let series = series_at_seconds(&[(0, 0.0), (100, 10.0), (1000, 20.0)]);
        let params = SearchParams::default();

        let (filled, _) = fill_gaps(&series, 50 * SEC, None, &params);

        for pair in filled.samples().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn dense_series_is_left_unchanged() {
        let series = series_at_seconds(&[(0, 1.0), (10, 2.0), (20, 3.0), (30, 4.0)]);
        let params = SearchParams::default();

        let (filled, report) = fill_gaps(&series, 50 * SEC, None, &params);

        assert_eq!(report.inserted, 0);
        assert_eq!(filled.len(), series.len());
        for (a, b) in filled.samples().iter().zip(series.samples()) {
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.value, b.value);
        }
    }

    #[test]
    fn refilling_with_the_same_threshold_adds_nothing() {
        let series = series_at_seconds(&[(0, 0.0), (100, 10.0), (1000, 20.0)]);
        let params = SearchParams::default();

        let (filled_once, _) = fill_gaps(&series, 50 * SEC, None, &params);
        let (filled_twice, report) = fill_gaps(&filled_once, 50 * SEC, None, &params);

        assert_eq!(report.inserted, 0);
        assert_eq!(filled_twice.len(), filled_once.len());
    }

    #[test]
    fn gaps_beyond_the_limit_stay_unfilled() {
        let series = series_at_seconds(&[(0, 0.0), (100, 10.0), (1000, 20.0)]);
        let params = SearchParams::default();

        let (filled, report) = fill_gaps(&series, 50 * SEC, Some(500 * SEC), &params);

        let t100 = chrono::DateTime::from_timestamp(100, 0).unwrap();
        let t1000 = chrono::DateTime::from_timestamp(1000, 0).unwrap();
        let inside_big_gap = filled
            .samples()
            .iter()
            .filter(|s| s.timestamp > t100 && s.timestamp < t1000)
            .count();

        assert_eq!(inside_big_gap, 0);
        // the 100 s gap is still eligible
        assert!(report.inserted > 0);
    }

    #[test]
    fn degenerate_threshold_is_refused() {
        let series = series_at_seconds(&[(0, 0.0), (100, 10.0)]);
        let params = SearchParams::default();

        let (filled, report) = fill_gaps(&series, 1, None, &params);

        assert_eq!(report.inserted, 0);
        assert_eq!(filled.len(), 2);
        assert!(report.consistent);
    }
}
