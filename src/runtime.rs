//! Fork/join task runtimes.
//!
//! Every parallel phase of a frame is expressed as one call to
//! [`ParallelRuntime::spawn_and_join`]: run a task once per index of an extent, then block until
//! all of them have completed. Tasks get no other synchronization from the runtime.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Number of task invocations along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskExtent {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl TaskExtent {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// A one-dimensional extent of `count` tasks.
    pub fn linear(count: usize) -> Self {
        Self::new(count, 1, 1)
    }

    pub fn len(&self) -> usize {
        self.x * self.y * self.z
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps a linear invocation number to its index, x varying fastest.
    pub fn index(&self, linear: usize) -> TaskIndex {
        TaskIndex {
            x: linear % self.x,
            y: (linear / self.x) % self.y,
            z: linear / (self.x * self.y),
        }
    }
}

/// Position of one task invocation inside its [`TaskExtent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskIndex {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// A fork/join scheduler.
pub trait ParallelRuntime: Send + Sync {
    /// Runs `task` exactly once for every index in `extent` and returns once all invocations
    /// have completed. Invocations may run concurrently and in any order.
    fn spawn_and_join(&self, extent: TaskExtent, task: &(dyn Fn(TaskIndex) + Sync));
}

/// Runs tasks on rayon, either on the global pool or on a dedicated one.
pub struct RayonRuntime {
    pool: Option<rayon::ThreadPool>,
}

impl RayonRuntime {
    /// Uses rayon's global thread pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Builds a dedicated pool of `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("tileraster-worker-{index}"))
            .build()?;
        Ok(Self { pool: Some(pool) })
    }

    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl ParallelRuntime for RayonRuntime {
    fn spawn_and_join(&self, extent: TaskExtent, task: &(dyn Fn(TaskIndex) + Sync)) {
        if extent.is_empty() {
            return;
        }

        let run = || {
            (0..extent.len())
                .into_par_iter()
                .for_each(|linear| task(extent.index(linear)))
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

/// Runs every task on the calling thread, in index order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialRuntime;

impl ParallelRuntime for SerialRuntime {
    fn spawn_and_join(&self, extent: TaskExtent, task: &(dyn Fn(TaskIndex) + Sync)) {
        for linear in 0..extent.len() {
            task(extent.index(linear));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn extent_index_varies_x_fastest() {
        let extent = TaskExtent::new(3, 2, 2);
        assert_eq!(extent.len(), 12);
        assert_eq!(extent.index(0), TaskIndex { x: 0, y: 0, z: 0 });
        assert_eq!(extent.index(4), TaskIndex { x: 1, y: 1, z: 0 });
        assert_eq!(extent.index(11), TaskIndex { x: 2, y: 1, z: 1 });
    }

    #[test]
    fn serial_runtime_visits_indices_in_order() {
        let visited = Mutex::new(Vec::new());
        SerialRuntime.spawn_and_join(TaskExtent::new(2, 2, 1), &|index| {
            visited.lock().unwrap().push((index.x, index.y));
        });
        assert_eq!(
            visited.into_inner().unwrap(),
            vec![(0, 0), (1, 0), (0, 1), (1, 1)]
        );
    }

    #[test]
    fn rayon_runtime_runs_every_index_once_before_returning() {
        let runtime = RayonRuntime::with_threads(4).unwrap();
        let hits: Vec<AtomicUsize> = (0..1000).map(|_| AtomicUsize::new(0)).collect();
        runtime.spawn_and_join(TaskExtent::linear(1000), &|index| {
            hits[index.x].fetch_add(1, Ordering::Relaxed);
        });
        assert!(hits.iter().all(|hit| hit.load(Ordering::Relaxed) == 1));
        assert_eq!(runtime.num_threads(), 4);
    }

    #[test]
    fn empty_extent_runs_nothing() {
        let calls = AtomicUsize::new(0);
        RayonRuntime::global().spawn_and_join(TaskExtent::new(0, 5, 1), &|_| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }
}
