//! Error types for core-affine dispatch.
//!
//! Only recoverable runtime conditions live here. Dispatching remotely from
//! a non-coordinator core is a protocol violation and aborts instead.

use std::error::Error;
use std::fmt;

use crate::id::CoreId;

/// Errors that can occur while dispatching work to another core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// The target core does not exist or cannot accept remote work.
    UnknownCore {
        /// The requested target.
        core: CoreId,
        /// Number of cores the runtime manages.
        core_count: usize,
    },
    /// The runtime has shut down and no longer accepts work.
    RuntimeShutdown,
    /// The target core dropped the completion signal without reporting a
    /// result (the job panicked or the worker exited).
    WorkerLost {
        /// The core that was running the job.
        core: CoreId,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCore { core, core_count } => {
                write!(
                    f,
                    "core {core} cannot accept remote work (runtime has {core_count} cores)"
                )
            }
            Self::RuntimeShutdown => write!(f, "runtime has shut down"),
            Self::WorkerLost { core } => {
                write!(f, "core {core} exited without reporting completion")
            }
        }
    }
}

impl Error for DispatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_core() {
        let err = DispatchError::UnknownCore {
            core: CoreId(9),
            core_count: 4,
        };
        assert_eq!(
            err.to_string(),
            "core 9 cannot accept remote work (runtime has 4 cores)"
        );
        assert_eq!(
            DispatchError::WorkerLost { core: CoreId(2) }.to_string(),
            "core 2 exited without reporting completion"
        );
    }
}
