// gapfill/src/cli.rs

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub input_dir: std::path::PathBuf,
    pub output_dir: Option<std::path::PathBuf>,
    pub time_column: String,
    pub value_column: String,
    pub time_format: String,
    pub gap_size: Option<i64>,
    pub gap_limit: Option<i64>,
    pub plots: bool,
    pub threads: Option<usize>,
}

/// Command-line arguments parser using Clap.
///
/// Mirrors the flags of the original gap-filling script: input/output
/// directories, column names, timestamp format, gap override and limit.
impl Args {
    /// Parses command-line arguments using `clap`.
    ///
    /// # Returns
    /// * `Args` - Struct containing parsed arguments.
    ///
    /// # Errors
    /// * If required arguments are missing or invalid.
    pub fn parse() -> Self {
        let matches = clap::Command::new("gapfill")
            .version("0.1.0")
            .about("Fills gaps in irregularly sampled time series with interpolated points")
            .arg(
                clap::Arg::new("input-dir")
                .short('i')
                .long("input-dir")
                .help("Path to input directory containing signal files to be processed")
                .required(true)
                .num_args(1),
            )
            .arg(
                clap::Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .help("Path to output directory. Default: 'Output' subdirectory of the input directory")
                .num_args(1),
            )
            .arg(
                clap::Arg::new("time-column")
                .short('t')
                .long("time-column")
                .help("Name of the column that contains timestamps")
                .default_value("time")
                .num_args(1),
            )
            .arg(
                clap::Arg::new("value-column")
                .short('v')
                .long("value-column")
                .help("Name of the column that contains the values")
                .default_value("value")
                .num_args(1),
            )
            .arg(
                clap::Arg::new("time-format")
                .short('f')
                .long("time-format")
                .help("strftime-style timestamp format, or 'ISO' for ISO-8601")
                .default_value("%Y-%m-%d %H:%M:%S")
                .num_args(1),
            )
            .arg(
                clap::Arg::new("gap-size")
                .short('g')
                .long("gap-size")
                .help("Gap size in nanoseconds. Skips the adaptive search and uses this value instead")
                .value_parser(clap::value_parser!(i64))
                .num_args(1),
            )
            .arg(
                clap::Arg::new("gap-limit")
                .short('m')
                .long("gap-limit")
                .help("Max expected gap in nanoseconds. Wider gaps are treated as outages and not filled")
                .value_parser(clap::value_parser!(i64))
                .num_args(1),
            )
            .arg(
                clap::Arg::new("plots")
                .short('p')
                .long("plots")
                .help("Creates and saves before/after plots")
                .action(clap::ArgAction::SetTrue),
            )
            .arg(
                clap::Arg::new("threads")
                .long("threads")
                .help("Number of files to process in parallel. Default: all available cores")
                .value_parser(clap::value_parser!(usize))
                .num_args(1),
            )
            .get_matches();

        Args {
            input_dir: matches.get_one::<String>("input-dir").unwrap().clone().into(),
            output_dir: matches.get_one::<String>("output-dir").map(|dir| dir.clone().into()),
            time_column: matches.get_one::<String>("time-column").unwrap().clone(),
            value_column: matches.get_one::<String>("value-column").unwrap().clone(),
            time_format: matches.get_one::<String>("time-format").unwrap().clone(),
            gap_size: matches.get_one::<i64>("gap-size").copied(),
            gap_limit: matches.get_one::<i64>("gap-limit").copied(),
            plots: matches.get_flag("plots"),
            threads: matches.get_one::<usize>("threads").copied(),
        }
    }
}
