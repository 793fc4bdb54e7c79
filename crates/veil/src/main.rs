//! veil: CLI front end for the batch perturbation pipeline.
//!
//! Parses arguments, hands the batch to `veil-batch`, and renders the
//! per-task reports either as a human-readable summary or as JSON.
//!
//! # Usage
//!
//! ```text
//! veil [OPTIONS] <INPUT>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use veil_batch::{BatchConfig, TaskReport, TaskStatus, run_batch};
use veil_pipeline::Preset;

/// Disrupt statistical origin fingerprints in raster images.
///
/// Processes a single image file, or every image found by walking a
/// directory recursively, and writes metadata-free PNG outputs.
#[derive(Parser)]
#[command(name = "veil", version)]
struct Cli {
    /// Input image file or directory (png, jpg, jpeg, bmp, tiff).
    input: PathBuf,

    /// Processing strength.
    #[arg(short, long, value_enum, default_value_t = Strength::Light)]
    preset: Strength,

    /// Output directory, created if absent.
    #[arg(short, long, default_value = "cleaned")]
    out: PathBuf,

    /// Number of parallel workers (0 = available hardware parallelism).
    #[arg(short = 't', long, default_value_t = 0)]
    workers: usize,

    /// Seed the noise stages for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the task reports as JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,
}

/// Strength preset selection.
#[derive(Clone, Copy, ValueEnum)]
enum Strength {
    /// Minimal perturbation; highest fidelity.
    Light,
    /// Balanced perturbation.
    Medium,
    /// Strongest perturbation; lowest fidelity.
    Strong,
}

impl From<Strength> for Preset {
    fn from(strength: Strength) -> Self {
        match strength {
            Strength::Light => Self::Light,
            Strength::Medium => Self::Medium,
            Strength::Strong => Self::Strong,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let preset = Preset::from(cli.preset);
    let config = BatchConfig {
        preset,
        output_dir: cli.out.clone(),
        workers: cli.workers,
        seed: cli.seed,
    };

    if !cli.json {
        let workers = if cli.workers == 0 {
            "auto".to_string()
        } else {
            cli.workers.to_string()
        };
        eprintln!(
            "Processing {} with preset '{preset}' using {workers} worker(s)",
            cli.input.display(),
        );
    }

    let reports = match run_batch(&cli.input, &config) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing reports: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_summary(&reports);
    }

    if reports.iter().all(TaskReport::is_success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print one line per task plus an overall success count.
fn print_summary(reports: &[TaskReport]) {
    for report in reports {
        match &report.status {
            TaskStatus::Succeeded { output, psnr_db } => {
                let name = output
                    .file_name()
                    .map_or_else(|| output.to_string_lossy(), |n| n.to_string_lossy());
                println!("  {name:<40} PSNR: {psnr_db:6.1} dB");
            }
            TaskStatus::Failed { message } => {
                println!("  {}: {message}", report.source.display());
            }
        }
    }

    let succeeded = reports.iter().filter(|r| r.is_success()).count();
    println!();
    println!("{succeeded} / {} image(s) processed", reports.len());
}
