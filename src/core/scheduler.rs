//! Copy worker pool
//!
//! The walker submits tasks, a fixed set of threads copies them, and the
//! outcomes flow back over a result channel. Each worker owns its own task
//! queue and tasks are routed by a hash of their destination path, so every
//! write to a given destination happens on one thread, in submission order.

use crate::core::{sort_file, SortTask, TaskOutcome};
use crate::error::{Result, SortError};
use crate::fs::FileCopier;
use crate::logging::RunLog;
use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use xxhash_rust::xxh3::xxh3_64;

/// Everything a worker needs to run the file copier
#[derive(Debug, Clone)]
pub struct WorkerContext {
    /// Output root the extension folders live under
    pub output_root: PathBuf,
    /// File copier
    pub copier: FileCopier,
    /// Run log
    pub log: RunLog,
    /// Plan only, copy nothing
    pub dry_run: bool,
}

impl WorkerContext {
    /// Run one task to completion
    pub fn run(&self, task: &SortTask) -> TaskOutcome {
        sort_file(task, &self.output_root, &self.copier, &self.log, self.dry_run)
    }
}

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Pending tasks allowed per worker before `submit` blocks
    pub queue_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            queue_size: 256,
        }
    }
}

/// Fixed-size pool of copy threads
pub struct CopyPool {
    /// One queue per worker
    queues: Vec<Sender<SortTask>>,
    /// Worker handles, same order as `queues`
    handles: Vec<JoinHandle<()>>,
    /// Outcomes from all workers
    results: Receiver<TaskOutcome>,
}

impl CopyPool {
    /// Spawn the workers
    pub fn start(config: &PoolConfig, context: WorkerContext) -> Result<Self> {
        let workers = config.workers.max(1);
        let (result_tx, result_rx) = unbounded();

        let mut queues = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let (task_tx, task_rx) = bounded::<SortTask>(config.queue_size.max(1));
            let result_tx = result_tx.clone();
            let context = context.clone();

            let handle = thread::Builder::new()
                .name(format!("extsort-copy-{}", worker_id))
                .spawn(move || {
                    let _guard = context.log.span().enter();
                    for task in task_rx.iter() {
                        let outcome = context.run(&task);
                        if result_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                    tracing::trace!("Worker {} shutting down", worker_id);
                })
                .map_err(|e| SortError::ThreadPool(e.to_string()))?;

            queues.push(task_tx);
            handles.push(handle);
        }

        context.log.pool_started(workers);

        Ok(Self {
            queues,
            handles,
            results: result_rx,
        })
    }

    /// Number of workers
    pub fn workers(&self) -> usize {
        self.queues.len()
    }

    /// Queue a task on the worker that owns its destination
    ///
    /// Blocks while that worker's queue is full.
    pub fn submit(&self, task: SortTask) -> Result<()> {
        let shard = shard_for(&task, self.queues.len());
        self.queues[shard]
            .send(task)
            .map_err(|_| SortError::WorkerPanicked(shard))
    }

    /// Outcomes that are ready now, without waiting
    pub fn ready(&self) -> impl Iterator<Item = TaskOutcome> + '_ {
        self.results.try_iter()
    }

    /// Close the queues, wait for the workers, and return the outcomes
    /// not yet taken through [`CopyPool::ready`]
    pub fn finish(self) -> Result<Vec<TaskOutcome>> {
        let Self {
            queues,
            handles,
            results,
        } = self;
        drop(queues);

        let mut panicked = None;
        for (worker_id, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() && panicked.is_none() {
                panicked = Some(worker_id);
            }
        }

        let outcomes: Vec<_> = results.try_iter().collect();

        match panicked {
            Some(worker_id) => Err(SortError::WorkerPanicked(worker_id)),
            None => Ok(outcomes),
        }
    }
}

/// Worker index for a task
pub fn shard_for(task: &SortTask, workers: usize) -> usize {
    if workers <= 1 {
        return 0;
    }
    let hash = xxh3_64(task.dest.as_os_str().as_encoded_bytes());
    (hash % workers as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn context(output: &Path) -> WorkerContext {
        WorkerContext {
            output_root: output.to_path_buf(),
            copier: FileCopier::default(),
            log: RunLog::disabled(),
            dry_run: false,
        }
    }

    #[test]
    fn test_same_destination_same_shard() {
        let a = SortTask::new(PathBuf::from("src/one/notes.txt"), Path::new("dist"));
        let b = SortTask::new(PathBuf::from("src/two/notes.txt"), Path::new("dist"));
        assert_eq!(a.dest, b.dest);

        for workers in 1..8 {
            assert_eq!(shard_for(&a, workers), shard_for(&b, workers));
            assert!(shard_for(&a, workers) < workers);
        }
    }

    #[test]
    fn test_pool_copies_all_tasks() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let mut tasks = Vec::new();
        for i in 0..40 {
            let name = format!("file_{}.{}", i, if i % 2 == 0 { "txt" } else { "bin" });
            let path = src.path().join(&name);
            File::create(&path).unwrap().write_all(name.as_bytes()).unwrap();
            tasks.push(SortTask::new(path, out.path()));
        }

        let config = PoolConfig {
            workers: 4,
            queue_size: 2,
        };
        let pool = CopyPool::start(&config, context(out.path())).unwrap();
        assert_eq!(pool.workers(), 4);

        let mut outcomes = Vec::new();
        for task in tasks {
            pool.submit(task).unwrap();
            outcomes.extend(pool.ready());
        }
        outcomes.extend(pool.finish().unwrap());

        assert_eq!(outcomes.len(), 40);
        assert!(outcomes.iter().all(|o| matches!(o, TaskOutcome::Copied { .. })));
        assert!(out.path().join("txt/file_0.txt").exists());
        assert!(out.path().join("bin/file_39.bin").exists());
    }

    #[test]
    fn test_pool_reports_failures() {
        let out = TempDir::new().unwrap();
        let pool = CopyPool::start(&PoolConfig::default(), context(out.path())).unwrap();

        pool.submit(SortTask::new(out.path().join("missing.txt"), out.path()))
            .unwrap();
        let outcomes = pool.finish().unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], TaskOutcome::Failed { .. }));
    }

    #[test]
    fn test_pool_zero_workers_clamped() {
        let out = TempDir::new().unwrap();
        let config = PoolConfig {
            workers: 0,
            queue_size: 0,
        };
        let pool = CopyPool::start(&config, context(out.path())).unwrap();
        assert_eq!(pool.workers(), 1);
        assert!(pool.finish().unwrap().is_empty());
    }
}
