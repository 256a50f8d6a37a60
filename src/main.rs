use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use recon_subtotals::{AggregationSpec, ReportConfig, ReportModel, SubtotalError};

/// Join two datasets and write a subtotal report over every combination of
/// the grouping dimensions.
#[derive(Parser, Debug)]
#[command(name = "subtotals")]
struct Cli {
    /// Directory holding the input files; the report is written there too
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    /// Left input CSV
    #[arg(long)]
    left: Option<String>,

    /// Right input CSV
    #[arg(long)]
    right: Option<String>,

    /// Output CSV
    #[arg(short, long)]
    output: Option<String>,

    /// Column both inputs are joined on
    #[arg(long)]
    join_key: Option<String>,

    /// Grouping dimension, in report order (repeatable)
    #[arg(short, long = "dimension")]
    dimensions: Vec<String>,

    /// Aggregation as column=reduction, e.g. rating=max (repeatable)
    #[arg(short, long = "agg")]
    aggs: Vec<String>,

    /// Label for dimensions a subtotal does not group by
    #[arg(long)]
    sentinel: Option<String>,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Result<(PathBuf, ReportConfig), SubtotalError> {
        let mut config = ReportConfig::default();

        if let Some(left) = self.left {
            config.left_file = left;
        }
        if let Some(right) = self.right {
            config.right_file = right;
        }
        if let Some(output) = self.output {
            config.output_file = output;
        }
        if let Some(key) = self.join_key {
            config.join_key = key;
        }
        if let Some(sentinel) = self.sentinel {
            config.sentinel = sentinel;
        }
        if !self.dimensions.is_empty() {
            config.dimensions = self.dimensions;
        }
        if !self.aggs.is_empty() {
            config.aggregations = self
                .aggs
                .iter()
                .map(|a| AggregationSpec::parse_assignment(a))
                .collect::<Result<AggregationSpec, _>>()?;
        }

        Ok((self.base_path, config))
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(?cli, "parsed arguments");

    let result = cli
        .into_config()
        .and_then(|(base_path, config)| ReportModel::with_config(base_path, config).run());

    match result {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
