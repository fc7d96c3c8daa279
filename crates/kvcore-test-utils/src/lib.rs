//! Test utilities and mock types for kvcore development.
//!
//! Provides mock implementations of the runtime seams ([`CoreRuntime`],
//! [`CoreAllocator`]) so the dispatch protocol can be exercised without
//! spawning threads, and [`assert_aborts`] for code paths that terminate
//! the process.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use kvcore_core::{CoreAllocator, CoreContext, CoreId, CoreRuntime, DispatchError, Job};

/// Mock [`CoreRuntime`] that records every launch.
///
/// Jobs run immediately on the calling thread with the context of the
/// target core, so a remote dispatch completes before `remote_launch`
/// returns. Inspect [`launched_to`](RecordingRuntime::launched_to) to
/// check whether the remote path was taken.
pub struct RecordingRuntime {
    core_count: usize,
    coordinator: CoreId,
    launched: Mutex<Vec<CoreId>>,
    waits: AtomicUsize,
}

impl RecordingRuntime {
    pub fn new(core_count: usize, coordinator: CoreId) -> Self {
        Self {
            core_count,
            coordinator,
            launched: Mutex::new(Vec::new()),
            waits: AtomicUsize::new(0),
        }
    }

    /// Target cores of every accepted launch, in order.
    pub fn launched_to(&self) -> Vec<CoreId> {
        self.launched.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launched.lock().unwrap().len()
    }

    /// Number of `wait_all` calls.
    pub fn wait_count(&self) -> usize {
        self.waits.load(Ordering::Relaxed)
    }
}

impl CoreRuntime for RecordingRuntime {
    fn core_count(&self) -> usize {
        self.core_count
    }

    fn remote_launch(&self, core: CoreId, job: Job) -> Result<(), DispatchError> {
        if core.index() >= self.core_count {
            return Err(DispatchError::UnknownCore {
                core,
                core_count: self.core_count,
            });
        }
        self.launched.lock().unwrap().push(core);
        job(CoreContext::new(core, self.coordinator));
        Ok(())
    }

    fn wait_all(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }
}

/// Mock [`CoreRuntime`] that accepts jobs and drops them unrun, as a core
/// that died mid-job would.
pub struct DiscardingRuntime {
    core_count: usize,
}

impl DiscardingRuntime {
    pub fn new(core_count: usize) -> Self {
        Self { core_count }
    }
}

impl CoreRuntime for DiscardingRuntime {
    fn core_count(&self) -> usize {
        self.core_count
    }

    fn remote_launch(&self, _core: CoreId, job: Job) -> Result<(), DispatchError> {
        drop(job);
        Ok(())
    }

    fn wait_all(&self) {}
}

/// Mock [`CoreAllocator`] that always fails, counting attempts.
#[derive(Default)]
pub struct NullAllocator {
    calls: AtomicUsize,
}

impl NullAllocator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl CoreAllocator for NullAllocator {
    type Block = Vec<u8>;

    fn allocate_local(&self, _ctx: CoreContext, _size: usize) -> Option<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        None
    }
}

/// Mock [`CoreAllocator`] that records the core each request ran on.
///
/// Blocks are plain zeroed `Vec<u8>`s of the requested size.
#[derive(Default)]
pub struct RecordingAllocator {
    seen: Mutex<Vec<(CoreId, usize)>>,
}

impl RecordingAllocator {
    /// `(core, size)` of every request, in order.
    pub fn requests(&self) -> Vec<(CoreId, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

impl CoreAllocator for RecordingAllocator {
    type Block = Vec<u8>;

    fn allocate_local(&self, ctx: CoreContext, size: usize) -> Option<Vec<u8>> {
        self.seen.lock().unwrap().push((ctx.current, size));
        Some(vec![0; size])
    }
}

/// Set in the child process spawned by [`assert_aborts`].
const ABORT_CHILD_ENV: &str = "KVCORE_ABORT_CHILD";

/// Assert that `body` aborts the process with `expected` on stderr.
///
/// Call it from a `#[test]` and pass that test's full name as the harness
/// prints it (`module::tests::name` for unit tests, `name` for integration
/// tests). The test binary re-runs itself with only that test selected;
/// the child executes `body`, and the parent checks the child died by
/// abort rather than by exiting.
pub fn assert_aborts(test_name: &str, expected: &str, body: impl FnOnce()) {
    if std::env::var_os(ABORT_CHILD_ENV).is_some() {
        body();
        return;
    }

    let exe = std::env::current_exe().expect("test binary path");
    let output = Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(ABORT_CHILD_ENV, test_name)
        .output()
        .expect("spawn child test process");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        !output.status.success(),
        "{test_name}: expected abort, child exited with {:?}\nstderr:\n{stderr}",
        output.status,
    );
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(
            output.status.signal(),
            Some(6),
            "{test_name}: expected SIGABRT\nstderr:\n{stderr}"
        );
    }
    assert!(
        stderr.contains(expected),
        "{test_name}: stderr lacks {expected:?}\nstderr:\n{stderr}"
    );
}
