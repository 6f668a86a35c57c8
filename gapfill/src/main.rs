// gapfill/src/main.rs

mod cli;
mod io;
mod plot;

use rayon::prelude::*;

use gapfill_core::report;
use gapfill_core::series;
use gapfill_core::settings;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let start_time = std::time::Instant::now();

    let args = cli::Args::parse();
    let mut job_settings = settings::JobSettings {
        output_dir: args
            .output_dir
            .unwrap_or_else(|| args.input_dir.join("Output")),
        input_dir: args.input_dir,
        time_column: args.time_column,
        value_column: args.value_column,
        time_format: series::TimeFormat::from_arg(&args.time_format),
        gap_size_override: args.gap_size,
        gap_limit: args.gap_limit,
        enable_plots: args.plots,
        threads: args.threads,
        search: settings::SearchParams::default(),
    };
    job_settings.validate()?;

    io::prepare_output_dir(&job_settings.output_dir)?;
    let files = io::list_input_files(&job_settings.input_dir)?;
    if files.is_empty() {
        log::warn!(
            "no .csv files found in {}",
            job_settings.input_dir.display()
        );
    }

    // one file per task; files are independent, so order does not matter
    let threads = job_settings.threads.unwrap_or(num_cpus::get());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("Failed to create thread pool");

    let outcomes: Vec<(String, anyhow::Result<report::FileReport>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                (name, process_file(path, &job_settings))
            })
            .collect()
    });

    let mut run_report = report::RunReport::default();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(file_report) => run_report.files.push(file_report),
            Err(error) => {
                log::error!("processing {} failed: {:#}", file, error);
                run_report.failures.push(report::FileFailure {
                    file,
                    error: format!("{:#}", error),
                });
            }
        }
    }
    run_report.save(job_settings.output_dir.join("run_report.json"))?;

    println!(
        "Processed {} files ({} failed) in {:.3} seconds",
        run_report.files.len(),
        run_report.failures.len(),
        start_time.elapsed().as_secs_f64()
    );
    anyhow::Ok(())
}

/// Runs the whole pipeline for one input file: read, prepare, write the
/// cleansed artifact, pick the gap threshold, fill, verify, write the
/// filled artifact and the optional plot.
fn process_file(
    path: &std::path::Path,
    job_settings: &settings::JobSettings,
) -> anyhow::Result<report::FileReport> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    log::info!("processing {}", path.display());

    let (layout, records) = io::read_records(
        path,
        &job_settings.time_column,
        &job_settings.value_column,
    )?;
    let rows_read = records.len();

    let (prepared, prepare_stats) = series::Series::prepare(records, &job_settings.time_format);
    log::info!(
        "{}: {} of {} rows kept ({} bad timestamps, {} bad values, {} duplicates dropped)",
        stem,
        prepared.len(),
        rows_read,
        prepare_stats.dropped_bad_timestamps,
        prepare_stats.dropped_bad_values,
        prepare_stats.dropped_duplicates
    );

    io::write_series(
        &job_settings.output_dir.join(format!("{}_cleansed.csv", stem)),
        &layout,
        &prepared,
        &job_settings.time_format,
    )?;

    let intervals = prepared.intervals();

    let (gap, threshold_source) = match job_settings.gap_size_override {
        Some(gap) => (Some(gap), report::ThresholdSource::Override),
        None => match gapfill_core::search::find_gap_threshold(&intervals, &job_settings.search) {
            Some(estimate) => {
                if estimate.converged {
                    log::info!(
                        "{}: gap search converged after {} iterations on {} ns",
                        stem,
                        estimate.iterations,
                        estimate.gap
                    );
                } else {
                    log::warn!(
                        "{}: gap search did not converge; using the median-based estimate {} ns",
                        stem,
                        estimate.gap
                    );
                }
                (
                    Some(estimate.gap),
                    report::ThresholdSource::Searched {
                        converged: estimate.converged,
                        iterations: estimate.iterations,
                    },
                )
            }
            None => {
                log::info!("{}: no gaps to fill", stem);
                (None, report::ThresholdSource::NoGaps)
            }
        },
    };

    let (filled, fill_outcome) = match gap {
        Some(threshold) => {
            let (filled, outcome) = gapfill_core::fill::fill_gaps(
                &prepared,
                threshold,
                job_settings.gap_limit,
                &job_settings.search,
            );
            log::info!(
                "{}: using delta of {} ns to fill gaps; rows {} -> {}",
                stem,
                threshold,
                prepared.len(),
                filled.len()
            );
            if outcome.residual_gaps > 0 {
                log::warn!("{}: {} gaps left after filling", stem, outcome.residual_gaps);
            }
            if !outcome.consistent {
                log::warn!(
                    "{}: required gap {:?} ns after filling is smaller than the {} ns used; output flagged for review",
                    stem,
                    outcome.required_gap_after,
                    threshold
                );
            }
            (filled, Some(outcome))
        }
        // nothing qualified as a gap; the prepared series goes out as-is
        None => (prepared.clone(), None),
    };

    io::write_series(
        &job_settings.output_dir.join(format!("{}_filled.csv", stem)),
        &layout,
        &filled,
        &job_settings.time_format,
    )?;

    if job_settings.enable_plots {
        let plot_path = job_settings.output_dir.join(format!("{}_fig.png", stem));
        // a failed plot is cosmetic, never a file failure
        if let Err(error) = plot::scatter_before_after(&plot_path, &prepared, &filled) {
            log::warn!("{}: plotting failed: {:#}", stem, error);
        }
    }

    anyhow::Ok(report::FileReport {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.to_string()),
        rows_read,
        rows_prepared: prepared.len(),
        dropped_bad_timestamps: prepare_stats.dropped_bad_timestamps,
        dropped_bad_values: prepare_stats.dropped_bad_values,
        dropped_duplicates: prepare_stats.dropped_duplicates,
        threshold_source,
        gap_ns: gap,
        rows_filled: filled.len(),
        residual_gaps: fill_outcome.map_or(0, |o| o.residual_gaps),
        threshold_consistent: fill_outcome.map_or(true, |o| o.consistent),
    })
}
