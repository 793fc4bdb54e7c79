//! Shared types for batch orchestration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use veil_pipeline::{PipelineError, Preset};

/// One unit of work: a single source image to perturb and write.
///
/// Created once per discovered input file, never mutated afterwards,
/// and consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Path of the input image.
    pub source: PathBuf,
    /// Strength preset applied to this task.
    pub preset: Preset,
    /// Directory the output PNG is written into.
    pub output_dir: PathBuf,
}

/// Terminal outcome of one task, produced by the worker that ran it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Path of the input image this report refers to.
    pub source: PathBuf,
    /// Terminal state of the task.
    pub status: TaskStatus,
}

/// Terminal task states. A task is pending until a worker picks it
/// up and running until that worker returns; only the terminal state
/// is materialized, and it is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    /// The full pipeline completed and the output file was written.
    Succeeded {
        /// Path of the written PNG.
        output: PathBuf,
        /// Fidelity between input and output, in dB.
        psnr_db: f64,
    },
    /// The task failed; no output file was written.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

impl TaskReport {
    /// Whether the task reached the `Succeeded` state.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, TaskStatus::Succeeded { .. })
    }
}

/// Batch-level failures that abort the run before any worker starts.
///
/// Per-task failures never surface here; they are converted into
/// `Failed` reports at the task boundary.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Discovery found no image files under the input path.
    #[error("no image files found under {0}")]
    NoInputs(PathBuf),

    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failures local to one task, converted into a [`TaskStatus::Failed`]
/// report at the task boundary.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The input file could not be read from disk.
    #[error("failed to read {path}: {source}")]
    UnreadableInput {
        /// The input path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The pipeline rejected the input (decode failure or empty file).
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The output PNG could not be encoded or written.
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        /// The output path.
        path: PathBuf,
        /// The underlying encode/write error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
