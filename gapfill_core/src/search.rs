// gapfill_core/src/search.rs

//! Adaptive gap-threshold search.
//!
//! Finds, without user tuning, the largest "normal interval" estimate whose
//! induced gap threshold is self-consistent: after conceptually splitting
//! every anomalous interval into threshold-sized pieces, the recomputed
//! statistics no longer call for a larger threshold. This is a bounded
//! one-dimensional boundary search over the estimate, not over the
//! threshold itself (the threshold is always `estimate * mult / div`).

use crate::settings::SearchParams;
use crate::stats;

/// Outcome of the threshold search for one series.
#[derive(Debug, Clone, Copy)]
pub struct GapEstimate {
    /// Gap threshold to fill with, in nanoseconds.
    pub gap: i64,
    /// False when the iteration cap was hit and the initial median-based
    /// estimate was used as a conservative fallback.
    pub converged: bool,
    pub iterations: usize,
}

/// Splits every interval `>= gap` into `floor(d / gap)` copies of `gap`
/// plus one remainder interval, leaving the rest untouched. The result is
/// the trial interval sequence the series would have after filling.
///
/// The remainder is kept even when it is zero; it stands for the final
/// sub-interval of the gap and weighs on the trial median.
fn trial_fill(intervals: &[i64], gap: i64) -> Vec<i64> {
    let mut trial = Vec::with_capacity(intervals.len());
    for &duration in intervals {
        if duration >= gap {
            let full = duration / gap;
            for _ in 0..full {
                trial.push(gap);
            }
            trial.push(duration - full * gap);
        } else {
            trial.push(duration);
        }
    }
    trial
}

/// Searches for the gap threshold to fill a series with.
///
/// # Arguments
/// * `intervals` - Nanosecond durations between adjacent samples.
/// * `params` - Scale factor and iteration cap.
///
/// # Returns
/// * `Some(GapEstimate)` - The threshold to hand to the gap filler.
/// * `None` - Nothing to fill: the series has no intervals, or no interval
///   reaches the initial median-based threshold.
///
/// The search walks the estimate upward from the median in steps of
/// `max(median, mean) / div`, watching the trial-fill statistics. Two
/// stopping conditions exist: the trial median repeating exactly across a
/// step (no better estimate exists), and a boundary crossing, where the
/// residual anomalous count jumps from zero back to nonzero, meaning the
/// estimate overshot. On a crossing the search rolls back and retries with
/// a step shrunk to `max(dt / 3, dt_small)` until the step reaches the
/// small-step resolution. The `dt / 3` shrink is a heuristic with no
/// global-convergence proof for pathological interval distributions, hence
/// the hard iteration cap and the conservative fallback.
pub fn find_gap_threshold(intervals: &[i64], params: &SearchParams) -> Option<GapEstimate> {
    let initial = stats::interval_stats(intervals, params)?;
    if initial.count == 0 {
        log::debug!("no interval reaches {} ns; nothing to do", initial.gap);
        return None;
    }

    let init_med = initial.median;
    let mean_all = stats::mean(intervals).unwrap_or(init_med);

    // step sizes proportional to the interval scale
    let dt_small = init_med.min(mean_all) / params.div;
    let mut dt = init_med.max(mean_all) / params.div;

    let mut med = init_med;
    let mut gap = initial.gap;
    let mut prev_count = initial.count;
    let mut prev_med = init_med;
    let mut found = false;
    let mut iterations = 0usize;

    log::debug!(
        "initial median {} ns, gap {} ns, {} gaps between {:?} and {:?} ns",
        init_med,
        gap,
        initial.count,
        initial.min,
        initial.max
    );

    for i in 0..params.max_iterations {
        iterations = i + 1;

        let trial = trial_fill(intervals, gap);
        let Some(trial_stats) = stats::interval_stats(&trial, params) else {
            break;
        };
        let required_med = trial_stats.median;
        let mut count = trial_stats.count;

        // the required median stopped moving: this estimate is the answer
        if required_med == prev_med {
            found = true;
            break;
        }

        // boundary crossing: many estimates leave zero residual gaps, and
        // the answer sits where the count starts increasing again
        if count > 0 && prev_count == 0 {
            if (prev_med - med).abs() <= dt_small {
                found = true;
                break;
            }
            log::debug!(
                "boundary crossed at iteration {}; backing up to {} ns with smaller step",
                i,
                prev_med
            );
            med = prev_med;
            dt = (dt / 3).max(dt_small);
            count = 0;
        }

        prev_count = count;
        prev_med = med;

        // increase the estimate and try again
        med += dt;
        gap = params.gap_for(med);
    }

    let final_med = if found {
        prev_med
    } else {
        log::warn!(
            "gap search exhausted {} iterations; falling back to the initial median {} ns",
            params.max_iterations,
            init_med
        );
        init_med
    };

    Some(GapEstimate {
        gap: params.gap_for(final_med),
        converged: found,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: i64 = 1_000_000_000;

    #[test]
    fn trial_fill_conserves_total_duration() {
        let intervals = vec![SEC, SEC, 7 * SEC, 100 * SEC, 3 * SEC];
        let gap = 10 * SEC;

        let trial = trial_fill(&intervals, gap);

        let before: i64 = intervals.iter().sum();
        let after: i64 = trial.iter().sum();
        assert_eq!(before, after);
    }

    #[test]
    fn trial_fill_splits_exact_multiples_with_zero_remainder() {
        let trial = trial_fill(&[100, 7], 10);
        assert_eq!(trial.len(), 12);
        assert_eq!(trial.iter().filter(|&&d| d == 10).count(), 10);
        assert_eq!(trial.iter().filter(|&&d| d == 0).count(), 1);
        assert!(trial.contains(&7));
    }

    #[test]
    fn no_anomalous_intervals_means_nothing_to_fill() {
        let params = SearchParams::default();
        assert!(find_gap_threshold(&[SEC, SEC, SEC, SEC], &params).is_none());
    }

    #[test]
    fn empty_intervals_mean_nothing_to_fill() {
        let params = SearchParams::default();
        assert!(find_gap_threshold(&[], &params).is_none());
    }

    #[test]
    fn single_outlier_converges_before_the_cap() {
        // four one-second intervals and one hundred-second outage
        let intervals = vec![SEC, SEC, SEC, SEC, 100 * SEC];
        let params = SearchParams::default();

        let estimate = find_gap_threshold(&intervals, &params).unwrap();

        assert!(estimate.converged);
        assert!(estimate.iterations < params.max_iterations);
        // the search must improve on the single-pass estimate without
        // letting the outlier itself pass as normal
        assert!(estimate.gap > 10 * SEC);
        assert!(estimate.gap < 100 * SEC);
    }

    #[test]
    fn search_is_deterministic() {
        let intervals = vec![SEC, 2 * SEC, SEC, 90 * SEC, SEC, 2 * SEC];
        let params = SearchParams::default();

        let a = find_gap_threshold(&intervals, &params).unwrap();
        let b = find_gap_threshold(&intervals, &params).unwrap();

        assert_eq!(a.gap, b.gap);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn iteration_cap_falls_back_to_initial_median() {
        let intervals = vec![SEC, SEC, SEC, SEC, 100 * SEC];
        // a cap of one iteration cannot converge on this input
        let params = SearchParams {
            max_iterations: 1,
            ..SearchParams::default()
        };

        let estimate = find_gap_threshold(&intervals, &params).unwrap();

        assert!(!estimate.converged);
        assert_eq!(estimate.gap, 10 * SEC);
    }
}
