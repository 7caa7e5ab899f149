//! Executors that run a window of work items.
//!
//! The orchestrator hands an executor at most [`Executor::max_in_flight`]
//! items at a time and receives their results in the same order. Swapping
//! the sequential executor for a worker pool changes throughput, not the
//! contract of any stage.

/// Runs a task over a window of items, preserving order.
pub trait Executor {
    /// Largest window the orchestrator should hand to [`Executor::execute`].
    ///
    /// This bounds how many decoded images are alive at once.
    fn max_in_flight(&self) -> usize;

    /// Run `task` on every item; `results[i]` belongs to `items[i]`.
    fn execute<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync;
}

/// Runs items one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn max_in_flight(&self) -> usize {
        1
    }

    fn execute<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        items.iter().map(task).collect()
    }
}

/// Bounded rayon pool; one window holds at most one item per worker.
#[cfg(feature = "parallel")]
#[derive(Debug)]
pub struct PoolExecutor {
    pool: rayon::ThreadPool,
    workers: usize,
}

#[cfg(feature = "parallel")]
impl PoolExecutor {
    /// Build a pool with `workers` threads; `0` means one per available core.
    pub fn new(workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            workers
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("resizepack-worker-{i}"))
            .build()?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

#[cfg(feature = "parallel")]
impl Executor for PoolExecutor {
    fn max_in_flight(&self) -> usize {
        self.workers
    }

    fn execute<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        use rayon::prelude::*;

        self.pool
            .install(|| items.par_iter().map(|item| task(item)).collect())
    }
}

/// Executor chosen at runtime from a worker count.
#[derive(Debug)]
pub enum BatchExecutor {
    Sequential(SequentialExecutor),
    #[cfg(feature = "parallel")]
    Pool(PoolExecutor),
}

impl BatchExecutor {
    /// `1` runs sequentially; anything else builds a pool when the
    /// `parallel` feature is enabled and falls back to sequential otherwise.
    pub fn from_workers(workers: usize) -> Result<Self, String> {
        if workers == 1 {
            return Ok(BatchExecutor::Sequential(SequentialExecutor));
        }

        #[cfg(feature = "parallel")]
        {
            PoolExecutor::new(workers)
                .map(BatchExecutor::Pool)
                .map_err(|e| e.to_string())
        }

        #[cfg(not(feature = "parallel"))]
        {
            tracing::debug!(workers, "parallel feature disabled, running sequentially");
            Ok(BatchExecutor::Sequential(SequentialExecutor))
        }
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        BatchExecutor::Sequential(SequentialExecutor)
    }
}

impl Executor for BatchExecutor {
    fn max_in_flight(&self) -> usize {
        match self {
            BatchExecutor::Sequential(executor) => executor.max_in_flight(),
            #[cfg(feature = "parallel")]
            BatchExecutor::Pool(executor) => executor.max_in_flight(),
        }
    }

    fn execute<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        match self {
            BatchExecutor::Sequential(executor) => executor.execute(items, task),
            #[cfg(feature = "parallel")]
            BatchExecutor::Pool(executor) => executor.execute(items, task),
        }
    }
}
