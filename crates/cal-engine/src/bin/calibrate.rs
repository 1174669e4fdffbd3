//! Grid search over gradient-descent hyperparameters.
//!
//! Usage:
//!   calibrate -i training.csv -t 8 -b 2 < grids.jsonl
//!
//! The task stream holds JSON grids such as
//! `{"outpath":"out.csv","alpha":["0.01","0.1"],"numEpochs":["100","1000"]}`.
//! `-t 0` runs the sequential search instead of the parallel pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use cal_data::{CsvResultWriter, DatasetLoader, TaskSource};
use cal_engine::CalibrationEngine;
use cal_search::SearchConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "calibrate")]
#[command(about = "Grid search of learning rate and epoch count for a univariate linear regression")]
#[command(version)]
struct Args {
    /// Training data: headerless CSV of x,y pairs
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// The training CSV starts with a header row
    #[arg(long)]
    headers: bool,

    /// Total thread budget (0 = sequential search)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,

    /// Number of grids a reader takes from the task stream at once
    #[arg(short = 'b', long, default_value = "1")]
    batch_size: usize,

    /// Reader count (defaults to a fifth of the thread budget, rounded up)
    #[arg(long)]
    readers: Option<usize>,

    /// File of JSON grid records (defaults to stdin)
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Directory relative outpaths are resolved against
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let sequential = args.threads == 0;
    let mut config = SearchConfig::new(args.threads.max(1)).with_batch_size(args.batch_size);
    if let Some(readers) = args.readers {
        config = config.with_readers(readers);
    }
    let writer = match &args.output_dir {
        Some(dir) => CsvResultWriter::with_output_dir(dir.clone()),
        None => CsvResultWriter::new(),
    };

    let dataset = DatasetLoader::new()
        .with_headers(args.headers)
        .load_csv_file(&args.input)?;
    let engine = CalibrationEngine::new(config, dataset, Arc::new(writer))?;
    tracing::info!(
        path = %args.input.display(),
        min = engine.dataset().min(),
        max = engine.dataset().max(),
        "Loaded training data"
    );
    let source = TaskSource::open(args.tasks.as_deref())?;

    let report = if sequential {
        engine.run_sequential(&source)?
    } else {
        engine.run(&source)?
    };

    for outcome in &report.outcomes {
        let result = &outcome.result;
        match &result.point {
            Some(point) => println!(
                "{}: alpha={} numEpochs={} beta={:.6} mu={:.6} mse={:.6}",
                result.outpath,
                point.learning_rate,
                point.epochs,
                result.parameters.slope,
                result.parameters.intercept,
                result.error
            ),
            None => println!("{}: no permutations evaluated", result.outpath),
        }
    }
    println!(
        "{} grids written, {} failed, {} records skipped",
        report.grids_written, report.grids_failed, report.records_skipped
    );

    if let Some(path) = &args.report {
        report.write_json(path)?;
        tracing::info!("Run report written to {}", path.display());
    }

    if !report.is_success() {
        anyhow::bail!("{} grid(s) failed to write", report.grids_failed);
    }
    Ok(())
}
