// CLI entry point: single-document and batch triage
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use pdftriage::{BatchOrchestrator, DocumentProcessor, TriageConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify PDFs as raster or vector and extract accordingly")]
struct Args {
    /// TOML config with detector thresholds and pipeline settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process one PDF and write its artifacts to the output directory
    Single {
        pdf: PathBuf,
        #[arg(short, long, default_value = "output/single")]
        output: PathBuf,
    },
    /// Process every PDF in a directory under a bounded worker pool
    Batch {
        input_dir: PathBuf,
        #[arg(short, long, default_value = "output/batch")]
        output: PathBuf,
        /// Worker pool size; defaults to available parallelism
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pdftriage=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => TriageConfig::load(path)?,
        None => TriageConfig::default(),
    };

    match args.command {
        Command::Single { pdf, output } => {
            let processor = DocumentProcessor::new(config);
            let result =
                tokio::task::spawn_blocking(move || processor.run(&pdf, &output)).await?;
            if let Some(reason) = &result.error {
                eprintln!("processing failed: {reason}");
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Batch {
            input_dir,
            output,
            workers,
        } => {
            let mut config = config;
            if let Some(n) = workers {
                config.batch.workers = n;
            }
            let orchestrator = BatchOrchestrator::new(config);
            let summary = orchestrator.run(&input_dir, &output).await?;
            println!(
                "processed {} PDFs: {} ok, {} failed",
                summary.total_pdfs, summary.successful_processing, summary.failed_processing
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
