//! veil-batch: batch orchestration for the veil pipeline.
//!
//! Fans a list of independent image tasks out across a fixed-size
//! worker pool, each task running the full perturbation pipeline once,
//! and collects one report per task in submission order. Workers share
//! no mutable state; the only shared resource is the output directory,
//! and deterministic per-task filenames keep writes from colliding.
//!
//! Fault containment: every task runs under `catch_unwind`, so a
//! panicking or failing task produces exactly one `Failed` report and
//! never affects sibling tasks or the orchestrator. There is no
//! cancellation or timeout; a slow task delays batch completion but
//! not sibling results.

pub mod discover;
pub mod output;
pub mod types;

use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

pub use discover::{IMAGE_EXTENSIONS, discover};
pub use output::{OUTPUT_PREFIX, output_path, write_clean_png};
pub use types::{BatchError, Task, TaskError, TaskReport, TaskStatus};

use veil_pipeline::Preset;

/// Configuration of one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Strength preset applied to every task.
    pub preset: Preset,
    /// Directory outputs are written into; created if absent.
    pub output_dir: PathBuf,
    /// Worker count; 0 selects the available hardware parallelism.
    pub workers: usize,
    /// Base seed for reproducible batches. Each task derives its own
    /// generator from `seed + task index`, so results do not depend on
    /// scheduling order. `None` seeds every task from OS entropy.
    pub seed: Option<u64>,
}

/// Discover inputs under `input` and run the full pipeline on each.
///
/// Returns one [`TaskReport`] per discovered file, in discovery
/// (submission) order regardless of which worker finished first.
///
/// # Errors
///
/// Returns [`BatchError::NoInputs`] when discovery finds nothing --
/// before the output directory is created or any worker starts.
/// Returns [`BatchError::CreateOutputDir`] / [`BatchError::WorkerPool`]
/// when the run cannot be set up. Per-task failures are *not* errors:
/// they surface as `Failed` reports.
pub fn run_batch(input: &Path, config: &BatchConfig) -> Result<Vec<TaskReport>, BatchError> {
    let sources = discover(input);
    if sources.is_empty() {
        return Err(BatchError::NoInputs(input.to_path_buf()));
    }

    fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::CreateOutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let tasks: Vec<Task> = sources
        .into_iter()
        .map(|source| Task {
            source,
            preset: config.preset,
            output_dir: config.output_dir.clone(),
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;

    debug!(
        "dispatching {} task(s) across {} worker(s)",
        tasks.len(),
        pool.current_num_threads(),
    );

    // Indexed map + collect preserves submission order in the output
    // regardless of completion order.
    let reports = pool.install(|| {
        tasks
            .par_iter()
            .enumerate()
            .map(|(index, task)| run_supervised(task, per_task_seed(config.seed, index)))
            .collect()
    });

    Ok(reports)
}

/// Derive the seed for task `index` from the batch seed, if any.
const fn per_task_seed(seed: Option<u64>, index: usize) -> Option<u64> {
    match seed {
        Some(s) => Some(s.wrapping_add(index as u64)),
        None => None,
    }
}

/// Run one task with panic capture at the task boundary.
///
/// Panics and errors alike terminate in a `Failed` report; nothing
/// crosses into the orchestrator.
fn run_supervised(task: &Task, seed: Option<u64>) -> TaskReport {
    let result = catch_unwind(AssertUnwindSafe(|| run_task(task, seed)));

    let status = match result {
        Ok(Ok((output, psnr_db))) => TaskStatus::Succeeded { output, psnr_db },
        Ok(Err(error)) => TaskStatus::Failed {
            message: error.to_string(),
        },
        Err(payload) => TaskStatus::Failed {
            message: format!("task panicked: {}", panic_message(payload.as_ref())),
        },
    };

    TaskReport {
        source: task.source.clone(),
        status,
    }
}

/// Read, process, and write one image.
fn run_task(task: &Task, seed: Option<u64>) -> Result<(PathBuf, f64), TaskError> {
    debug!("processing {}", task.source.display());

    let bytes = fs::read(&task.source).map_err(|source| TaskError::UnreadableInput {
        path: task.source.clone(),
        source,
    })?;

    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let outcome = veil_pipeline::process(&bytes, task.preset.params(), &mut rng)?;

    let output = output_path(&task.output_dir, task.preset, &task.source);
    write_clean_png(&outcome.image, &output)?;

    debug!(
        "wrote {} ({:.1} dB)",
        output.display(),
        outcome.psnr_db,
    );
    Ok((output, outcome.psnr_db))
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload.downcast_ref::<&str>().map_or_else(
        || {
            payload
                .downcast_ref::<String>()
                .map_or("unknown panic payload", String::as_str)
        },
        |s| s,
    )
}
