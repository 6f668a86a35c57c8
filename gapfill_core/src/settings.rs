// gapfill_core/src/settings.rs

//! Configuration structures for the gapfill pipeline.
//! Holds the gap-classification tuning constants and the validated
//! per-run job settings.

use crate::series;

/// Tuning constants for gap classification and the adaptive threshold
/// search. The induced gap threshold is always `estimate * mult / div`.
///
/// These were process-wide globals in earlier incarnations of the tool;
/// here they are an immutable value passed into the search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub mult: i64,
    pub div: i64,
    pub max_iterations: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            mult: 100,
            div: 10,
            max_iterations: 5000,
        }
    }
}

impl SearchParams {
    /// Gap threshold induced by a normal-interval estimate, in nanoseconds.
    pub fn gap_for(&self, estimate_ns: i64) -> i64 {
        estimate_ns * self.mult / self.div
    }
}

/// Validated settings for one batch run.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub input_dir: std::path::PathBuf,
    pub output_dir: std::path::PathBuf,
    pub time_column: String,
    pub value_column: String,
    pub time_format: series::TimeFormat,
    /// Gap threshold in nanoseconds; when set, the adaptive search is skipped.
    pub gap_size_override: Option<i64>,
    /// Intervals wider than this (ns) are legitimate outages and stay unfilled.
    pub gap_limit: Option<i64>,
    pub enable_plots: bool,
    pub threads: Option<usize>,
    pub search: SearchParams,
}

impl JobSettings {
    /// Validates the settings, clamping `threads` to the available cores.
    ///
    /// # Returns
    /// * `anyhow::Result<()>` - Ok when every option is usable as-is.
    pub fn validate(&mut self) -> anyhow::Result<()> {
        // check input directory
        {
            if !self.input_dir.is_dir() {
                anyhow::bail!(
                    "Input directory {} is not valid",
                    self.input_dir.display()
                );
            }
        }

        // check column names
        {
            if self.time_column.is_empty() || self.value_column.is_empty() {
                anyhow::bail!("Column names cannot be empty!");
            }
        }

        // check time format
        {
            self.time_format.validate()?;
        }

        // check gap override and limit
        {
            if let Some(gap) = self.gap_size_override {
                if gap <= 0 {
                    anyhow::bail!("Gap size must be positive and greater than zero");
                }
            }
            if let Some(limit) = self.gap_limit {
                if limit <= 0 {
                    anyhow::bail!("Max gap must be positive and greater than zero");
                }
            }
        }

        // check threads
        {
            match self.threads {
                Some(threads) => {
                    if threads == 0 {
                        anyhow::bail!("Settings validation error: 'threads' cannot be zero.");
                    }
                    let available_threads = num_cpus::get();
                    if threads > available_threads {
                        self.threads = Some(available_threads);
                    }
                }
                None => {}
            }
        }

        // check search constants
        {
            if self.search.mult <= 0 || self.search.div <= 0 {
                anyhow::bail!("Search scale factors must be positive!");
            }
            if self.search.max_iterations == 0 {
                anyhow::bail!("Search iteration cap must be greater than zero!");
            }
        }

        anyhow::Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dir: &std::path::Path) -> JobSettings {
        JobSettings {
            input_dir: dir.to_path_buf(),
            output_dir: dir.join("Output"),
            time_column: "time".to_string(),
            value_column: "value".to_string(),
            time_format: series::TimeFormat::from_arg("%Y-%m-%d %H:%M:%S"),
            gap_size_override: None,
            gap_limit: None,
            enable_plots: false,
            threads: None,
            search: SearchParams::default(),
        }
    }

    #[test]
    fn default_scale_factor_is_ten() {
        let params = SearchParams::default();
        assert_eq!(params.gap_for(1_000_000_000), 10_000_000_000);
    }

    #[test]
    fn rejects_missing_input_dir() {
        let mut bad = settings(std::path::Path::new("/definitely/not/here"));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_override() {
        let dir = std::env::temp_dir();
        let mut bad = settings(&dir);
        bad.gap_size_override = Some(0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn clamps_threads_to_available_cores() {
        let dir = std::env::temp_dir();
        let mut s = settings(&dir);
        s.threads = Some(usize::MAX);
        s.validate().unwrap();
        assert!(s.threads.unwrap() <= num_cpus::get());
    }
}
