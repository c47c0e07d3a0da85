//! Batch processing of tree files.
//!
//! A run reads a tree batch, processes every tree on a [WorkerPool] and
//! writes the collected records as CSV:
//! * [Mode::CladeDistance]: `<input>_dist.csv` with one record per tree
//! * [Mode::Pairwise]: `<input>_dist.csv` with one record per leaf pair and
//!   `<input>_norm.csv` with the normalising clade of each tree
//!
//! A tree that fails is logged and left out; the batch is still written.
//! With [RunConfig::strict] the run then fails with [PipelineError::TreeFailures].

pub mod batch;
pub mod config;
pub mod error;
pub mod normalise;
pub mod output;
pub mod pool;
pub mod record;
pub mod tables;

pub use batch::{TreeRecord, read_batch};
pub use config::{Mode, RunConfig, TargetGroup, TreeFilter};
pub use error::PipelineError;
pub use normalise::{CladeDistance, NormalisingGroup, Pairwise, PairwiseOutput};
pub use pool::WorkerPool;
pub use record::Record;
pub use tables::{AgeTable, load_feature_table};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A tree that could not be processed.
#[derive(Debug)]
pub struct TreeFailure {
    pub seed: String,
    pub error: PipelineError,
}

/// Outcome of [run].
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Trees that produced records
    pub processed: usize,
    /// Trees rejected by the pairwise filter
    pub filtered: usize,
    pub failures: Vec<TreeFailure>,
    pub outputs: Vec<PathBuf>,
    /// Set if existing outputs were kept and nothing was run
    pub skipped: bool,
}

enum Outcome {
    Tree(Record),
    Pairs(PairwiseOutput),
    Filtered,
}

/// Runs a whole batch as configured.
///
/// # Errors
/// Configuration, input and output errors abort the run. Failing trees only
/// do so in strict mode, after the outputs have been written.
pub fn run(config: &RunConfig) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let outputs = config.output_paths();
    if !config.force && output::outputs_exist(&outputs) {
        info!("Outputs exist, skipping: {}", display_paths(&outputs));
        return Ok(RunSummary {
            outputs,
            skipped: true,
            ..RunSummary::default()
        });
    }

    let table = load_feature_table(&config.groups)?;
    let records = read_batch(&config.input, config.mode)?;
    let group = NormalisingGroup::from_config(config);
    info!("Processing {} trees of {} with {} workers", records.len(), config.input.display(), config.workers);

    let progress = spinner(config.mode);
    let results = match config.mode {
        Mode::CladeDistance => {
            let ages_path = config
                .ages
                .as_ref()
                .ok_or_else(|| PipelineError::InvalidConfig("no age table given".to_string()))?;
            let ages = AgeTable::from_path(ages_path)?.for_phylome(&config.phylome_id())?.clone();
            let processor = Arc::new(CladeDistance {
                group,
                targets: config.targets.clone(),
                ages,
                table,
            });
            process_all(config.workers, records, &progress, move |r| processor.process(r).map(Outcome::Tree))?
        }
        Mode::Pairwise => {
            let processor = Arc::new(Pairwise {
                group,
                filter: config.filter,
                phylome: config.phylome_id(),
                table,
            });
            process_all(config.workers, records, &progress, move |r| {
                processor
                    .process(r)
                    .map(|out| out.map_or(Outcome::Filtered, Outcome::Pairs))
            })?
        }
    };
    progress.finish_and_clear();

    let mut summary = RunSummary::default();
    let mut main_records = Vec::new();
    let mut norm_records = Vec::new();
    for (seed, result) in results {
        match result {
            Ok(Outcome::Tree(record)) => {
                summary.processed += 1;
                main_records.push(record);
            }
            Ok(Outcome::Pairs(out)) => {
                summary.processed += 1;
                norm_records.push(out.norm);
                main_records.extend(out.pairs);
            }
            Ok(Outcome::Filtered) => summary.filtered += 1,
            Err(error) => {
                warn!("Tree {seed} failed: {error}");
                summary.failures.push(TreeFailure { seed, error });
            }
        }
    }

    output::write_records_to_path(&outputs[0], &main_records)?;
    if let Some(norm_path) = outputs.get(1) {
        output::write_records_to_path(norm_path, &norm_records)?;
    }
    info!(
        "Wrote {} ({} trees processed, {} filtered, {} failed)",
        display_paths(&outputs),
        summary.processed,
        summary.filtered,
        summary.failures.len()
    );
    summary.outputs = outputs;

    if config.strict && !summary.failures.is_empty() {
        return Err(PipelineError::TreeFailures(summary.failures.len()));
    }
    Ok(summary)
}

/// Processes all records on a pool and pairs each result with its seed.
///
/// A panic while processing one record becomes that record's
/// [PipelineError::Panicked] and leaves the worker running.
fn process_all<F>(
    workers: usize,
    records: Vec<TreeRecord>,
    progress: &ProgressBar,
    process: F,
) -> Result<Vec<(String, Result<Outcome, PipelineError>)>, PipelineError>
where
    F: Fn(&TreeRecord) -> Result<Outcome, PipelineError> + Send + Sync + 'static,
{
    let tick = progress.clone();
    let pool = WorkerPool::new(workers, move |record: TreeRecord| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| process(&record))).unwrap_or_else(|payload| {
            Err(PipelineError::Panicked {
                seed: record.seed.clone(),
                message: panic_message(payload.as_ref()),
            })
        });
        tick.inc(1);
        (record.seed, result)
    });
    for record in records {
        pool.submit(record)?;
    }
    pool.finish()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn spinner(mode: Mode) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg} {pos} trees") {
        progress.set_style(style);
    }
    progress.set_message(format!("{mode}"));
    progress.enable_steady_tick(Duration::from_millis(200));
    progress
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
