mod commands;
mod output;

use anyhow::Result;
use checker_core::SizeStrategy;
use clap::{ArgAction, Parser, ValueEnum};
use output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "parquet_checker")]
#[command(version, about = "Check Parquet file schema and element sizes", long_about = None)]
struct Cli {
    /// Path to the Parquet file
    file_path: PathBuf,

    /// Check the sizes of elements in the Parquet file
    #[arg(long)]
    check_element_sizes: bool,

    /// Rows per batch when scanning
    #[arg(long)]
    batch_size: Option<usize>,

    /// Per-value ceiling in KiB above which a column is flagged
    #[arg(long)]
    size_limit_kb: Option<f64>,

    /// Size audit strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Audit configuration file (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Push down when supported, otherwise scan
    Auto,
    /// Always scan row batches
    Scan,
    /// Query column aggregates through DataFusion
    PushDown,
}

impl From<StrategyArg> for SizeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => SizeStrategy::Auto,
            StrategyArg::Scan => SizeStrategy::Scan,
            StrategyArg::PushDown => SizeStrategy::PushDown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the report
    let log_level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .with_ansi(!cli.no_color)
                .compact(),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    commands::check::execute(&cli).await
}
