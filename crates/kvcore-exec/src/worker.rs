//! Per-core worker loop for [`CorePool`](crate::CorePool).
//!
//! Each worker owns the receiving end of its core's job channel and runs
//! jobs one at a time, in arrival order, until every sender is dropped.
//! A panicking job is contained so the core keeps serving; its captured
//! reply sender is dropped during unwinding, which the dispatcher reports
//! as `WorkerLost`.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use crossbeam_channel::Receiver;

use kvcore_core::{CoreContext, CoreId, Job};

thread_local! {
    /// `(pool id, core)` for pool worker threads; `None` everywhere else.
    static LANE: Cell<Option<(u64, CoreId)>> = const { Cell::new(None) };
}

/// The pool and core the calling thread serves, if it is a pool worker.
pub(crate) fn current_lane() -> Option<(u64, CoreId)> {
    LANE.with(Cell::get)
}

/// Count of launched-but-unfinished jobs across all cores.
pub(crate) struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            idle: Condvar::new(),
        }
    }

    pub fn begin(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    pub fn finish(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    /// Block until the count reaches zero.
    pub fn wait_idle(&self) {
        let count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        let _idle = self
            .idle
            .wait_while(count, |n| *n > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Main loop for one core's worker thread.
pub(crate) fn worker_loop(
    pool_id: u64,
    ctx: CoreContext,
    jobs: Receiver<Job>,
    in_flight: Arc<InFlight>,
) {
    LANE.with(|lane| lane.set(Some((pool_id, ctx.current))));
    tracing::debug!(core = %ctx.current, "core worker started");

    while let Ok(job) = jobs.recv() {
        if panic::catch_unwind(AssertUnwindSafe(|| job(ctx))).is_err() {
            tracing::warn!(core = %ctx.current, "job panicked; core keeps serving");
        }
        in_flight.finish();
    }

    // Channel closed: the pool is shutting down.
    tracing::debug!(core = %ctx.current, "core worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn non_worker_thread_has_no_lane() {
        assert_eq!(current_lane(), None);
    }

    #[test]
    fn worker_runs_jobs_and_reports_lane() {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let in_flight = Arc::new(InFlight::new());
        let ctx = CoreContext::new(CoreId(3), CoreId(0));
        let flight = Arc::clone(&in_flight);
        let handle = std::thread::spawn(move || worker_loop(99, ctx, rx, flight));

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        in_flight.begin();
        tx.send(Box::new(move |here: CoreContext| {
            let _ = reply_tx.send((here, current_lane()));
        }))
        .unwrap();
        let (here, lane) = reply_rx.recv().unwrap();
        assert_eq!(here, ctx);
        assert_eq!(lane, Some((99, CoreId(3))));

        in_flight.wait_idle();
        assert_eq!(in_flight.pending(), 0);
        drop(tx);
        handle.join().unwrap();
    }

    #[test]
    fn panicking_job_does_not_stop_worker() {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let in_flight = Arc::new(InFlight::new());
        let ctx = CoreContext::new(CoreId(1), CoreId(0));
        let flight = Arc::clone(&in_flight);
        let handle = std::thread::spawn(move || worker_loop(1, ctx, rx, flight));

        let ran = Arc::new(AtomicUsize::new(0));
        in_flight.begin();
        tx.send(Box::new(|_: CoreContext| panic!("job failure")))
            .unwrap();
        let r = Arc::clone(&ran);
        in_flight.begin();
        tx.send(Box::new(move |_: CoreContext| {
            r.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        in_flight.wait_idle();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        drop(tx);
        handle.join().unwrap();
    }
}
