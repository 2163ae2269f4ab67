//! RuleMine CLI - Command-line interface for directional rule mining.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "rulemine")]
#[command(author, version, about = "RuleMine - Influencer → user association rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default rulemine.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Turn a numeric CSV into a boolean feature table
    Itemize {
        /// Numeric CSV with namespaced columns
        input: String,

        /// Output CSV path
        #[arg(short, long, default_value = "features.csv")]
        output: String,

        /// Columns to split at the mean even if binary (e.g., "inf_verified,usr_media")
        #[arg(short, long)]
        force: Option<String>,
    },

    /// Sample and split a feature table into training and validation CSVs
    Split {
        /// Boolean feature table (CSV)
        table: String,

        /// Rows to sample before splitting
        #[arg(short, long)]
        sample_size: Option<usize>,

        /// Feature columns to sample before splitting
        #[arg(short, long)]
        feature_count: Option<usize>,
    },

    /// Mine influencer → user rules
    Mine {
        /// Boolean feature table (CSV)
        table: String,

        /// Rows to sample before splitting
        #[arg(long)]
        sample_size: Option<usize>,

        /// Feature columns to sample before splitting
        #[arg(long)]
        feature_count: Option<usize>,

        /// Minimum support fraction, in (0, 1]
        #[arg(short, long)]
        support: Option<f64>,

        /// Minimum confidence fraction, in [0, 1]
        #[arg(short, long)]
        confidence: Option<f64>,

        /// Mining mode: exhaustive or maximal_only
        #[arg(short, long)]
        mode: Option<String>,

        /// Largest itemset size
        #[arg(long)]
        max_len: Option<usize>,

        /// Rule file format: json or csv
        #[arg(long, default_value = "csv")]
        format: String,

        /// Mine the whole table (it is already a training partition)
        #[arg(long)]
        no_split: bool,
    },

    /// Mine every support × confidence combination concurrently
    Sweep {
        /// Boolean feature table (CSV)
        table: String,

        /// Comma-separated minimum supports
        #[arg(long)]
        supports: String,

        /// Comma-separated minimum confidences
        #[arg(long)]
        confidences: String,

        /// Rows to sample before splitting
        #[arg(long)]
        sample_size: Option<usize>,

        /// Feature columns to sample before splitting
        #[arg(long)]
        feature_count: Option<usize>,

        /// Mining mode: exhaustive or maximal_only
        #[arg(short, long)]
        mode: Option<String>,

        /// Largest itemset size
        #[arg(long)]
        max_len: Option<usize>,

        /// Rule file format: json or csv
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Score a rule set against a held-out table
    Validate {
        /// Rule set (.json or .csv)
        rules: String,

        /// Held-out feature table (CSV)
        table: String,

        /// Report path (.json or .csv)
        #[arg(short, long)]
        output: Option<String>,

        /// Number of rules to print
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Summarise a rule set
    Inspect {
        /// Rule set (.json or .csv)
        rules: String,

        /// Number of rules to print
        #[arg(short, long, default_value = "10")]
        top: usize,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Itemize { input, output, force } => {
            commands::itemize::run(&input, &output, force.as_deref())
        }
        Commands::Split { table, sample_size, feature_count } => {
            commands::split::run(&table, sample_size, feature_count)
        }
        Commands::Mine {
            table,
            sample_size,
            feature_count,
            support,
            confidence,
            mode,
            max_len,
            format,
            no_split,
        } => commands::mine::run(commands::mine::MineArgs {
            table,
            sample_size,
            feature_count,
            overrides: config::MiningOverrides {
                min_support: support,
                min_confidence: confidence,
                mode,
                max_len,
            },
            format,
            no_split,
        }),
        Commands::Sweep {
            table,
            supports,
            confidences,
            sample_size,
            feature_count,
            mode,
            max_len,
            format,
        } => commands::sweep::run(commands::sweep::SweepArgs {
            table,
            supports,
            confidences,
            sample_size,
            feature_count,
            mode,
            max_len,
            format,
        }),
        Commands::Validate { rules, table, output, top } => {
            commands::validate::run(&rules, &table, output.as_deref(), top)
        }
        Commands::Inspect { rules, top } => commands::inspect::run(&rules, top),
    }
}
