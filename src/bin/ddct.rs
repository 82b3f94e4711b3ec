//! DDCT - Delta-Delta-Ct CLI
//!
//! Command-line interface for relative quantification of qPCR runs.

use clap::{Parser, Subcommand, ValueEnum};
use composable_ddct::data::{DeltaCtResult, ReplicateSpec, Statistic, Transform, ValueGroup};
use composable_ddct::delta::AnchorPolicy;
use composable_ddct::error::Result;
use composable_ddct::filter::{FilterConfig, OutlierAction};
use composable_ddct::io::{read_dataset, read_datasets, read_table, write_summary, write_table};
use composable_ddct::pipeline::{Analysis, AnalysisConfig, Study};
use composable_ddct::stats::summarize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI-friendly transform enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTransform {
    /// Fold change, 2^-(Ct - anchor)
    Exponential,
    /// Plain Ct difference
    Linear,
}

impl From<CliTransform> for Transform {
    fn from(t: CliTransform) -> Self {
        match t {
            CliTransform::Exponential => Transform::Exponential,
            CliTransform::Linear => Transform::Linear,
        }
    }
}

/// Relative quantification of qPCR data
#[derive(Parser)]
#[command(name = "ddct")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full Delta-Delta-Ct analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Target assay CSV files (sample, Ct)
        #[arg(short, long, num_args = 1.., required = true)]
        assays: Vec<PathBuf>,

        /// Reference gene CSV files (sample, Ct)
        #[arg(short, long, num_args = 1.., required = true)]
        normalizers: Vec<PathBuf>,

        /// Output directory for result tables
        #[arg(short, long)]
        output: PathBuf,

        /// Write one row per group regardless of the config
        #[arg(long)]
        transpose: bool,

        /// Also write the full result as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Compute Delta-Ct values for a single dataset
    Delta {
        /// Input CSV (sample, Ct)
        #[arg(short, long)]
        input: PathBuf,

        /// Replicates per group: one size, or one size per group
        #[arg(short, long, value_delimiter = ',', default_value = "3")]
        replicates: Vec<usize>,

        /// Group names, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        groups: Option<Vec<String>>,

        /// Anchor: "first", "grouped" or a Ct value
        #[arg(long, default_value = "grouped")]
        anchor: String,

        /// Transform applied to Ct differences
        #[arg(short, long, value_enum, default_value = "exponential")]
        transform: CliTransform,

        /// Mask outliers with the IQR filter before Delta-Ct
        #[arg(long)]
        iqr: bool,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// One row per group
        #[arg(long)]
        transpose: bool,
    },

    /// Summarize a previously exported result table
    Summarize {
        /// Exported table CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Input table has one row per group
        #[arg(long)]
        transposed: bool,

        /// Statistics to compute, comma-separated (mean, stdev, median)
        #[arg(short, long, value_delimiter = ',', default_value = "mean,stdev")]
        statistics: Vec<String>,

        /// Output CSV path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate an example configuration file
    Example {
        /// Output path for example config
        #[arg(short, long, default_value = "ddct_config.yaml")]
        output: PathBuf,
    },
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            assays,
            normalizers,
            output,
            transpose,
            json,
        } => cmd_run(&config, &assays, &normalizers, &output, transpose, json.as_ref()),

        Commands::Delta {
            input,
            replicates,
            groups,
            anchor,
            transform,
            iqr,
            output,
            transpose,
        } => cmd_delta(
            &input, &replicates, groups, &anchor, transform, iqr, &output, transpose,
        ),

        Commands::Summarize {
            input,
            transposed,
            statistics,
            output,
        } => cmd_summarize(&input, transposed, &statistics, output.as_ref()),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    config_path: &PathBuf,
    assay_paths: &[PathBuf],
    normalizer_paths: &[PathBuf],
    output_dir: &PathBuf,
    transpose: bool,
    json_path: Option<&PathBuf>,
) -> Result<()> {
    eprintln!("Loading analysis configuration from {:?}...", config_path);
    let config = AnalysisConfig::from_file(config_path)?;

    eprintln!("Loading data...");
    let assays = read_datasets(assay_paths)?;
    let normalizers = read_datasets(normalizer_paths)?;
    eprintln!(
        "Loaded {} assays and {} normalizers",
        assays.len(),
        normalizers.len()
    );

    let transpose = transpose || config.transpose;
    let export = config.export;
    let analysis = Analysis::from_config(config);

    eprintln!("Running analysis...");
    let results = Study::run(&analysis, &assays, &normalizers)?;

    for report in &results.filter_reports {
        if report.n_flagged() > 0 {
            eprintln!("{}", report);
        }
    }

    if export {
        eprintln!("Writing results to {:?}...", output_dir);
        let written = results.export(output_dir, transpose)?;
        eprintln!("Done! {} files written", written.len());
    } else {
        eprintln!("Export disabled in configuration; printing summaries");
    }

    for assay in &results.assays {
        println!("{}", assay.summary);
    }

    if let Some(path) = json_path {
        std::fs::write(path, results.to_json()?)?;
        eprintln!("Wrote JSON results to {:?}", path);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_delta(
    input: &PathBuf,
    replicates: &[usize],
    groups: Option<Vec<String>>,
    anchor: &str,
    transform: CliTransform,
    iqr: bool,
    output: &PathBuf,
    transpose: bool,
) -> Result<()> {
    eprintln!("Loading {:?}...", input);
    let dataset = read_dataset(input)?;
    eprintln!("Loaded {} records", dataset.len());

    let spec = match replicates {
        [n] => ReplicateSpec::Uniform(*n),
        sizes => ReplicateSpec::Sizes(sizes.to_vec()),
    };

    let mut analysis = Analysis::new()
        .replicates(spec)
        .anchor(anchor.parse::<AnchorPolicy>()?)
        .transform(transform.into());
    if let Some(names) = groups {
        analysis = analysis.group_names(names);
    }
    if iqr {
        analysis = analysis.filter(FilterConfig::Iqr {
            lower: 1.5,
            upper: 1.5,
            ignore_nan: true,
            action: OutlierAction::Mask,
        });
    }

    let analysed = analysis.analyse(&dataset)?;
    if let Some(report) = &analysed.filter_report {
        eprintln!("{}", report);
    }

    write_table(&analysed.delta, output, transpose)?;
    eprintln!("Wrote Delta-Ct table to {:?}", output);

    Ok(())
}

fn cmd_summarize(
    input: &PathBuf,
    transposed: bool,
    statistics: &[String],
    output: Option<&PathBuf>,
) -> Result<()> {
    let statistics = statistics
        .iter()
        .map(|s| s.parse::<Statistic>())
        .collect::<Result<Vec<_>>>()?;

    eprintln!("Loading {:?}...", input);
    let grouped = read_table(input, transposed)?;
    let groups = grouped
        .groups()
        .iter()
        .map(|g| ValueGroup::new(g.name.clone(), g.cts()))
        .collect();
    // The transform tag is not stored in exports and does not affect summaries.
    let table = DeltaCtResult::new(grouped.id(), Transform::default(), groups)?;

    let summary = summarize(&table, &statistics)?;
    match output {
        Some(path) => {
            write_summary(&summary, path, false)?;
            eprintln!("Wrote summary to {:?}", path);
        }
        None => println!("{}", summary),
    }

    Ok(())
}

fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let config = AnalysisConfig {
        replicates: ReplicateSpec::Uniform(3),
        group_names: Some(vec!["control".to_string(), "treated".to_string()]),
        filter: Some(FilterConfig::Iqr {
            lower: 1.5,
            upper: 1.5,
            ignore_nan: true,
            action: OutlierAction::Mask,
        }),
        ..AnalysisConfig::default()
    };
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
