//! Bounded thread pool for per-tree jobs.

use crate::pipeline::error::PipelineError;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::sync::Arc;
use std::thread;

/// Runs one job at a time on each of a fixed number of threads.
///
/// Jobs queue in a channel bounded by the number of workers, so
/// [WorkerPool::submit] blocks while all workers are busy and the queue is
/// full. Results arrive in completion order and are handed out by
/// [WorkerPool::finish] once all workers have been joined.
pub struct WorkerPool<J, R> {
    handles: Vec<thread::JoinHandle<()>>,
    jobs: Sender<J>,
    results: Receiver<R>,
}

impl<J: Send + 'static, R: Send + 'static> WorkerPool<J, R> {
    /// Starts `num_workers` threads (at least one) applying `work` to each job.
    pub fn new<F>(num_workers: usize, work: F) -> Self
    where
        F: Fn(J) -> R + Send + Sync + 'static,
    {
        let num_workers = num_workers.max(1);
        let (jobs, job_rx) = bounded::<J>(num_workers);
        let (result_tx, results) = unbounded::<R>();
        let work = Arc::new(work);

        let handles = (0..num_workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let work = Arc::clone(&work);
                thread::spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        if result_tx.send(work(job)).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        WorkerPool {
            handles,
            jobs,
            results,
        }
    }

    /// Queues a job, blocking until there is room.
    ///
    /// # Errors
    /// [PipelineError::WorkerPanicked] if no worker is left to take the job.
    pub fn submit(&self, job: J) -> Result<(), PipelineError> {
        self.jobs.send(job).map_err(|_| PipelineError::WorkerPanicked)
    }

    /// Waits for all queued jobs and returns their results.
    ///
    /// # Errors
    /// [PipelineError::WorkerPanicked] if a worker thread panicked.
    pub fn finish(self) -> Result<Vec<R>, PipelineError> {
        drop(self.jobs);
        let results: Vec<R> = self.results.iter().collect();

        let mut panicked = false;
        for handle in self.handles {
            panicked |= handle.join().is_err();
        }
        if panicked {
            return Err(PipelineError::WorkerPanicked);
        }
        Ok(results)
    }
}
