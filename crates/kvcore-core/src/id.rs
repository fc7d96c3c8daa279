//! Strongly-typed logical core identifiers and the per-call [`CoreContext`].

use std::fmt;

/// Identifies a logical core known to the multi-core runtime.
///
/// Opaque outside the runtime: kvcore only compares core IDs and uses them
/// to address a dispatch. `CoreId(n)` is the n-th core of the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreId(pub u32);

impl CoreId {
    /// The core conventionally used as coordinator.
    pub const FIRST: Self = Self(0);

    /// The core ID as an index into per-core tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CoreId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Where the calling code is running, relative to the coordinator.
///
/// Passed explicitly into every dispatch call instead of being read from
/// runtime globals, so the coordinator invariant can be checked (and
/// tested) without a live runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoreContext {
    /// The logical core the caller is executing on.
    pub current: CoreId,
    /// The single core permitted to initiate remote dispatches.
    pub coordinator: CoreId,
}

impl CoreContext {
    /// Create a context for code running on `current`.
    pub fn new(current: CoreId, coordinator: CoreId) -> Self {
        Self {
            current,
            coordinator,
        }
    }

    /// Context for code running on the coordinator itself.
    pub fn coordinator(coordinator: CoreId) -> Self {
        Self::new(coordinator, coordinator)
    }

    /// Whether the caller is the coordinator core.
    #[inline]
    pub fn is_coordinator(&self) -> bool {
        self.current == self.coordinator
    }

    /// The same coordinator, seen from `core`.
    ///
    /// Used by runtimes to build the context a dispatched job runs under.
    pub fn on(self, core: CoreId) -> Self {
        Self::new(core, self.coordinator)
    }
}
