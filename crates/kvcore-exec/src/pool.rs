//! Thread-backed multi-core runtime.
//!
//! [`CorePool`] gives every logical core except the coordinator its own
//! worker thread and job channel:
//!
//! ```text
//! coordinator thread(s)          lanes[core]              worker (core n)
//!     |                              |                          |
//!     |--remote_launch(n, job)------>| unbounded crossbeam chan |
//!     |   in_flight += 1             |                  jobs.recv()
//!     |                              |                  job(ctx on n)
//!     |                              |                  in_flight -= 1
//!     |--wait_all(): block until in_flight == 0 --------------->|
//! ```
//!
//! Threads that are not pool workers act as the coordinator, the way the
//! main thread of a core-pinned runtime does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use kvcore_core::{CoreAllocator, CoreContext, CoreId, CoreRuntime, DispatchError, Job};

use crate::config::{ConfigError, PoolConfig};
use crate::worker::{self, InFlight};

/// Counter for unique pool IDs, so a worker of one pool is never mistaken
/// for a worker of another.
static POOL_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Report from [`CorePool::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent closing lanes and joining workers.
    pub total_ms: u64,
    /// Number of worker threads joined cleanly.
    pub workers_joined: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolState {
    Running,
    Stopped,
}

/// A fixed set of logical cores, each served by one worker thread.
pub struct CorePool {
    id: u64,
    coordinator: CoreId,
    core_count: usize,
    /// Indexed by core. `None` for the coordinator, which has no worker.
    lanes: Vec<Option<Sender<Job>>>,
    in_flight: Arc<InFlight>,
    workers: Vec<JoinHandle<()>>,
    state: PoolState,
}

// Compile-time assertion: CorePool must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<CorePool>();
};

impl CorePool {
    /// Validate `config` and spawn one worker per non-coordinator core.
    pub fn new(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let core_count = config.resolved_core_count();

        let mut pool = Self {
            id: POOL_COUNTER.fetch_add(1, Ordering::Relaxed),
            coordinator: config.coordinator,
            core_count,
            lanes: Vec::with_capacity(core_count),
            in_flight: Arc::new(InFlight::new()),
            workers: Vec::with_capacity(core_count.saturating_sub(1)),
            state: PoolState::Running,
        };

        for index in 0..core_count {
            let core = CoreId(index as u32);
            if core == pool.coordinator {
                pool.lanes.push(None);
                continue;
            }
            let (job_tx, job_rx) = crossbeam_channel::unbounded();
            let ctx = pool.coordinator_context().on(core);
            let pool_id = pool.id;
            let in_flight = Arc::clone(&pool.in_flight);
            // On spawn failure `pool` is dropped, which joins the workers
            // already started.
            let handle = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name_prefix))
                .spawn(move || worker::worker_loop(pool_id, ctx, job_rx, in_flight))
                .map_err(|e| ConfigError::ThreadSpawnFailed {
                    reason: format!("core {core}: {e}"),
                })?;
            pool.lanes.push(Some(job_tx));
            pool.workers.push(handle);
        }

        tracing::debug!(
            pool = pool.id,
            cores = core_count,
            coordinator = %pool.coordinator,
            "core pool started"
        );
        Ok(pool)
    }

    /// The coordinator core.
    pub fn coordinator(&self) -> CoreId {
        self.coordinator
    }

    /// Context of the calling thread: its own core on a pool worker,
    /// the coordinator anywhere else.
    pub fn context(&self) -> CoreContext {
        match worker::current_lane() {
            Some((pool, core)) if pool == self.id => CoreContext::new(core, self.coordinator),
            _ => self.coordinator_context(),
        }
    }

    /// Context of code running on the coordinator.
    pub fn coordinator_context(&self) -> CoreContext {
        CoreContext::coordinator(self.coordinator)
    }

    /// [`run_on_core`](crate::run_on_core) from the calling thread's context.
    pub fn run_on<F, T>(&self, core: CoreId, f: F) -> Result<T, DispatchError>
    where
        F: FnOnce(CoreContext) -> T + Send + 'static,
        T: Send + 'static,
    {
        crate::dispatch::run_on_core(self, self.context(), core, f)
    }

    /// [`allocate_on_core`](crate::allocate_on_core) from the calling
    /// thread's context.
    pub fn allocate_on<A: CoreAllocator>(
        &self,
        allocator: &Arc<A>,
        size: usize,
        core: CoreId,
    ) -> Result<Option<A::Block>, DispatchError> {
        crate::alloc::allocate_on_core(self, allocator, self.context(), size, core)
    }

    /// Close every lane and join the workers.
    ///
    /// Jobs already queued still run before their worker exits. Calling
    /// this again is a no-op.
    ///
    /// When this runs on one of the pool's own workers (a job dropped the
    /// last handle to the pool), that worker's thread is not joined; it
    /// exits after the current job returns and is not counted in
    /// [`ShutdownReport::workers_joined`].
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == PoolState::Stopped {
            return ShutdownReport {
                total_ms: 0,
                workers_joined: 0,
            };
        }
        let start = Instant::now();
        self.state = PoolState::Stopped;

        // Dropping the senders ends each worker's recv loop.
        self.lanes.clear();

        let me = thread::current().id();
        let mut workers_joined = 0;
        for handle in self.workers.drain(..) {
            if handle.thread().id() == me {
                tracing::debug!(pool = self.id, "shutdown on own worker; not joining it");
                continue;
            }
            if handle.join().is_ok() {
                workers_joined += 1;
            }
        }

        let report = ShutdownReport {
            total_ms: saturating_millis(start.elapsed()),
            workers_joined,
        };
        tracing::info!(
            pool = self.id,
            workers_joined = report.workers_joined,
            total_ms = report.total_ms,
            "core pool shut down"
        );
        report
    }
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl CoreRuntime for CorePool {
    fn core_count(&self) -> usize {
        self.core_count
    }

    fn remote_launch(&self, core: CoreId, job: Job) -> Result<(), DispatchError> {
        if self.state == PoolState::Stopped {
            return Err(DispatchError::RuntimeShutdown);
        }
        let lane = self
            .lanes
            .get(core.index())
            .and_then(Option::as_ref)
            .ok_or(DispatchError::UnknownCore {
                core,
                core_count: self.core_count,
            })?;

        self.in_flight.begin();
        if lane.send(job).is_err() {
            self.in_flight.finish();
            return Err(DispatchError::RuntimeShutdown);
        }
        Ok(())
    }

    /// # Aborts
    ///
    /// Aborts the process when called from one of this pool's workers: the
    /// calling job is itself in flight, so the wait could never end.
    fn wait_all(&self) {
        if let Some((pool, core)) = worker::current_lane() {
            if pool == self.id {
                crate::dispatch::coordinator_violation(format_args!(
                    "wait_all from core {core}: only coordinator core {} may wait for launched work",
                    self.coordinator,
                ));
            }
        }
        self.in_flight.wait_idle();
    }
}

impl Drop for CorePool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn single_core_pool_has_no_workers() {
        let mut pool = CorePool::new(PoolConfig::with_cores(1)).unwrap();
        assert_eq!(pool.core_count(), 1);
        assert_eq!(pool.run_on(CoreId(0), |ctx| ctx.current).unwrap(), CoreId(0));
        assert_eq!(pool.shutdown().workers_joined, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            CorePool::new(PoolConfig::with_cores(0)),
            Err(ConfigError::NoCores)
        ));
    }

    #[test]
    fn outside_threads_are_the_coordinator() {
        let pool = CorePool::new(PoolConfig::with_cores(2)).unwrap();
        assert!(pool.context().is_coordinator());
        assert_eq!(pool.context(), pool.coordinator_context());
    }

    #[test]
    fn worker_sees_its_own_core() {
        let pool = Arc::new(CorePool::new(PoolConfig::with_cores(3)).unwrap());
        let inner = Arc::clone(&pool);
        let seen = pool
            .run_on(CoreId(2), move |_| inner.context())
            .unwrap();
        assert_eq!(seen, CoreContext::new(CoreId(2), CoreId(0)));
    }

    #[test]
    fn worker_threads_are_named() {
        let config = PoolConfig {
            thread_name_prefix: "shard".into(),
            ..PoolConfig::with_cores(2)
        };
        let pool = CorePool::new(config).unwrap();
        let name = pool
            .run_on(CoreId(1), |_| {
                thread::current().name().map(str::to_owned)
            })
            .unwrap();
        assert_eq!(name.as_deref(), Some("shard-1"));
    }

    #[test]
    fn non_zero_coordinator() {
        let config = PoolConfig {
            coordinator: CoreId(2),
            ..PoolConfig::with_cores(3)
        };
        let pool = CorePool::new(config).unwrap();
        assert_eq!(pool.coordinator(), CoreId(2));
        assert_eq!(pool.run_on(CoreId(0), |ctx| ctx.current).unwrap(), CoreId(0));
        assert_eq!(
            pool.remote_launch(CoreId(2), Box::new(|_| {})),
            Err(DispatchError::UnknownCore {
                core: CoreId(2),
                core_count: 3,
            })
        );
    }

    #[test]
    fn launch_to_unknown_core_fails() {
        let pool = CorePool::new(PoolConfig::with_cores(2)).unwrap();
        let err = pool.remote_launch(CoreId(9), Box::new(|_| {})).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownCore {
                core: CoreId(9),
                core_count: 2,
            }
        );
    }

    #[test]
    fn wait_all_covers_every_core() {
        let pool = CorePool::new(PoolConfig::with_cores(4)).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        for round in 0..10 {
            for core in 1..4u32 {
                let h = Arc::clone(&hits);
                pool.remote_launch(
                    CoreId(core),
                    Box::new(move |_| {
                        h.fetch_add(round + 1, Ordering::Relaxed);
                    }),
                )
                .unwrap();
            }
        }
        pool.wait_all();
        // 3 cores * (1 + 2 + ... + 10)
        assert_eq!(hits.load(Ordering::Relaxed), 3 * 55);
    }

    #[test]
    fn shutdown_is_idempotent_and_blocks_new_work() {
        let mut pool = CorePool::new(PoolConfig::with_cores(3)).unwrap();
        let report = pool.shutdown();
        assert_eq!(report.workers_joined, 2);
        assert_eq!(pool.shutdown().workers_joined, 0);
        assert_eq!(
            pool.run_on(CoreId(1), |_| ()),
            Err(DispatchError::RuntimeShutdown)
        );
    }

    #[test]
    fn shutdown_millis_saturate() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn last_handle_dropped_on_worker_does_not_self_join() {
        let pool = Arc::new(CorePool::new(PoolConfig::with_cores(3)).unwrap());
        let inner = Arc::clone(&pool);
        let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(1);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        pool.remote_launch(
            CoreId(1),
            Box::new(move |_| {
                let _ = release_rx.recv();
                // Last handle: CorePool::drop runs here, on core 1's thread.
                drop(inner);
                let _ = done_tx.send(());
            }),
        )
        .unwrap();

        drop(pool);
        release_tx.send(()).unwrap();
        assert!(done_rx
            .recv_timeout(Duration::from_secs(10))
            .is_ok());
    }

    #[test]
    fn queued_jobs_finish_before_shutdown_returns() {
        let mut pool = CorePool::new(PoolConfig::with_cores(2)).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let h = Arc::clone(&hits);
            pool.remote_launch(
                CoreId(1),
                Box::new(move |_| {
                    h.fetch_add(1, Ordering::Relaxed);
                }),
            )
            .unwrap();
        }
        pool.shutdown();
        assert_eq!(hits.load(Ordering::Relaxed), 100);
    }
}
