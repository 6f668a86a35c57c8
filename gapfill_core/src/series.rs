// gapfill_core/src/series.rs

//! Time series model and preparation.
//!
//! Raw tabular records are turned into a `Series`: timestamps parsed,
//! values coerced to finite floats, samples sorted ascending and
//! deduplicated by timestamp (keep-first). Records that fail either
//! conversion are dropped and counted, never fatal.

use itertools::Itertools;

use anyhow::Context;

/// How timestamps in the input are encoded.
#[derive(Debug, Clone)]
pub enum TimeFormat {
    /// ISO-8601 / RFC 3339 timestamps, possibly carrying an offset.
    Iso,
    /// A strftime-style pattern, e.g. "%Y-%m-%d %H:%M:%S".
    Pattern(String),
}

impl TimeFormat {
    /// Builds a `TimeFormat` from a command-line value.
    /// The literal `ISO` (any case) selects ISO-8601 parsing; anything else
    /// is treated as a strftime pattern.
    pub fn from_arg(value: &str) -> Self {
        if value.eq_ignore_ascii_case("iso") {
            TimeFormat::Iso
        } else {
            TimeFormat::Pattern(value.to_string())
        }
    }

    /// Rejects patterns chrono cannot interpret before any file is touched.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            TimeFormat::Iso => anyhow::Ok(()),
            TimeFormat::Pattern(pattern) => {
                let broken = chrono::format::StrftimeItems::new(pattern)
                    .any(|item| matches!(item, chrono::format::Item::Error));
                if broken {
                    anyhow::bail!("'{}' is not a valid timestamp format", pattern);
                }
                anyhow::Ok(())
            }
        }
    }

    /// Converts a string representation of a date and time into a `chrono::DateTime<chrono::Utc>`.
    ///
    /// # Arguments
    /// * `raw` - The date-time string to parse (e.g., "2025-07-08 15:30:00").
    ///
    /// # Returns
    /// * `anyhow::Result<chrono::DateTime<chrono::Utc>>` - The parsed UTC date-time, or an error if parsing fails.
    pub fn parse(&self, raw: &str) -> anyhow::Result<chrono::DateTime<chrono::Utc>> {
        match self {
            TimeFormat::Iso => {
                let dt = chrono::DateTime::parse_from_rfc3339(raw.trim())
                    .with_context(|| format!("'{}' is not an ISO-8601 timestamp", raw))?;
                anyhow::Ok(dt.with_timezone(&chrono::Utc))
            }
            TimeFormat::Pattern(pattern) => {
                let dt = chrono::NaiveDateTime::parse_from_str(raw.trim(), pattern)
                    .with_context(|| format!("'{}' does not match format '{}'", raw, pattern))?;
                anyhow::Ok(chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
                    dt,
                    chrono::Utc,
                ))
            }
        }
    }

    /// Serializes a timestamp for output files.
    ///
    /// ISO mode round-trips as RFC 3339. Pattern mode always writes
    /// `%Y-%m-%d %H:%M:%S%.f`: synthetic samples carry sub-second offsets
    /// that a seconds-only input pattern could not express.
    pub fn format(&self, timestamp: &chrono::DateTime<chrono::Utc>) -> String {
        match self {
            TimeFormat::Iso => timestamp.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            TimeFormat::Pattern(_) => timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        }
    }
}

/// One row of the input table, as read from disk: unparsed timestamp and
/// value plus the remaining cells in their original column order.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub timestamp: String,
    pub value: String,
    pub passthrough: Vec<String>,
}

/// One prepared sample. `value` is always finite.
#[derive(Debug, Clone)]
pub struct Sample {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub value: f64,
    pub passthrough: Vec<String>,
}

/// Record-level drop accounting produced by `Series::prepare`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrepareStats {
    pub rows_in: usize,
    pub dropped_bad_timestamps: usize,
    pub dropped_bad_values: usize,
    pub dropped_duplicates: usize,
}

/// An ordered series of samples with strictly increasing timestamps.
#[derive(Debug, Clone)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Builds a prepared series from raw records.
    ///
    /// # Arguments
    /// * `records` - Raw rows in original file order.
    /// * `format` - Timestamp encoding of the input.
    ///
    /// # Returns
    /// * `(Series, PrepareStats)` - The prepared series plus drop counts.
    pub fn prepare(records: Vec<RawRecord>, format: &TimeFormat) -> (Self, PrepareStats) {
        let mut stats = PrepareStats {
            rows_in: records.len(),
            ..PrepareStats::default()
        };

        let mut samples: Vec<Sample> = Vec::with_capacity(records.len());
        for record in records {
            let timestamp = match format.parse(&record.timestamp) {
                Ok(ts) => ts,
                Err(_) => {
                    stats.dropped_bad_timestamps += 1;
                    continue;
                }
            };

            let value = match record.value.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    stats.dropped_bad_values += 1;
                    continue;
                }
            };

            samples.push(Sample {
                timestamp,
                value,
                passthrough: record.passthrough,
            });
        }

        // Stable sort keeps original order among equal timestamps, so the
        // keep-first dedup below matches the input file order.
        samples.sort_by_key(|sample| sample.timestamp);
        let before = samples.len();
        samples.dedup_by_key(|sample| sample.timestamp);
        stats.dropped_duplicates = before - samples.len();

        (Series { samples }, stats)
    }

    /// Wraps already-built samples, restoring the timestamp order invariant.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|sample| sample.timestamp);
        Series { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Nanosecond deltas between adjacent samples; length is `len() - 1`.
    pub fn intervals(&self) -> Vec<i64> {
        self.samples
            .iter()
            .tuple_windows()
            .map(|(left, right)| {
                (right.timestamp - left.timestamp)
                    .num_nanoseconds()
                    // wider than chrono can count in ns; treat as an enormous gap
                    .unwrap_or(i64::MAX)
            })
            .collect()
    }
}
