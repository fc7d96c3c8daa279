//! Dispatch decision and the blocking remote call.

use std::fmt;

use kvcore_core::{CoreContext, CoreId, CoreRuntime, DispatchError};

/// Run `f` on `core` and return its result.
///
/// If the caller is already on `core`, `f` runs inline and the runtime is
/// never touched. Otherwise `f` is sent to `core` through
/// [`CoreRuntime::remote_launch`] and the calling thread blocks, with no
/// timeout, until the target reports back over a one-shot channel. Writes
/// made by `f` are visible to the caller once this returns.
///
/// # Aborts
///
/// Aborts the process if a remote dispatch is attempted from a core other
/// than `ctx.coordinator`.
pub fn run_on_core<R, F, T>(
    runtime: &R,
    ctx: CoreContext,
    core: CoreId,
    f: F,
) -> Result<T, DispatchError>
where
    R: CoreRuntime + ?Sized,
    F: FnOnce(CoreContext) -> T + Send + 'static,
    T: Send + 'static,
{
    if ctx.current == core {
        tracing::trace!(%core, "dispatch inline");
        return Ok(f(ctx));
    }
    assert_coordinator(ctx, core);
    tracing::trace!(%core, from = %ctx.current, "dispatch remote");

    let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
    runtime.remote_launch(
        core,
        Box::new(move |remote| {
            // The caller is blocked on reply_rx until this lands.
            let _ = reply_tx.send(f(remote));
        }),
    )?;

    reply_rx.recv().map_err(|_| DispatchError::WorkerLost { core })
}

/// Start `f` on `core` without waiting for it.
///
/// Inline on the current core (so it has finished when this returns);
/// otherwise queued on `core`. Pair with [`CoreRuntime::wait_all`] to
/// collect completion of everything launched.
///
/// # Aborts
///
/// Same coordinator rule as [`run_on_core`].
pub fn launch_on_core<R, F>(
    runtime: &R,
    ctx: CoreContext,
    core: CoreId,
    f: F,
) -> Result<(), DispatchError>
where
    R: CoreRuntime + ?Sized,
    F: FnOnce(CoreContext) + Send + 'static,
{
    if ctx.current == core {
        tracing::trace!(%core, "launch inline");
        f(ctx);
        return Ok(());
    }
    assert_coordinator(ctx, core);
    tracing::trace!(%core, from = %ctx.current, "launch remote");
    runtime.remote_launch(core, Box::new(f))
}

fn assert_coordinator(ctx: CoreContext, target: CoreId) {
    if !ctx.is_coordinator() {
        coordinator_violation(format_args!(
            "remote dispatch to core {target} from core {}: only coordinator core {} may dispatch",
            ctx.current, ctx.coordinator,
        ));
    }
}

/// Log `message` and abort the process.
///
/// Not a panic: a worker's `catch_unwind` and the embedding crate's panic
/// strategy must not be able to turn a broken coordinator invariant into
/// a recoverable error.
#[cold]
#[inline(never)]
pub(crate) fn coordinator_violation(message: fmt::Arguments<'_>) -> ! {
    tracing::error!("{message}; aborting");
    eprintln!("kvcore fatal: {message}");
    std::process::abort()
}
