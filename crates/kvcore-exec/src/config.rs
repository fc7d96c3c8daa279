//! Pool configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use kvcore_core::CoreId;

/// Upper bound on the number of logical cores a [`CorePool`](crate::CorePool)
/// will manage.
pub const MAX_CORES: usize = 256;

/// Configuration for [`CorePool`](crate::CorePool).
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of logical cores, coordinator included. `None` = one per
    /// available hardware thread, clamped to `[1, MAX_CORES]`.
    pub core_count: Option<usize>,
    /// The core allowed to dispatch remotely. It gets no worker thread:
    /// any thread outside the pool acts as the coordinator. Default: core 0.
    pub coordinator: CoreId,
    /// Worker threads are named `{thread_name_prefix}-{core}`.
    /// Default: `"kvcore-core"`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_count: None,
            coordinator: CoreId::FIRST,
            thread_name_prefix: "kvcore-core".to_string(),
        }
    }
}

impl PoolConfig {
    /// A config for exactly `core_count` cores with core 0 as coordinator.
    pub fn with_cores(core_count: usize) -> Self {
        Self {
            core_count: Some(core_count),
            ..Self::default()
        }
    }

    /// Resolve the core count, applying auto-detection if `None`.
    ///
    /// Explicit values are returned as given; [`validate`](Self::validate)
    /// rejects the ones that are out of range.
    pub fn resolved_core_count(&self) -> usize {
        match self.core_count {
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .clamp(1, MAX_CORES),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let core_count = self.resolved_core_count();
        if core_count == 0 {
            return Err(ConfigError::NoCores);
        }
        if core_count > MAX_CORES {
            return Err(ConfigError::TooManyCores {
                configured: core_count,
                max: MAX_CORES,
            });
        }
        if self.coordinator.index() >= core_count {
            return Err(ConfigError::CoordinatorOutOfRange {
                coordinator: self.coordinator,
                core_count,
            });
        }
        if self.thread_name_prefix.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        Ok(())
    }
}

/// Errors detected while building a [`CorePool`](crate::CorePool).
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The pool must manage at least one core.
    NoCores,
    /// Core count is above [`MAX_CORES`].
    TooManyCores {
        /// The configured count.
        configured: usize,
        /// The supported maximum.
        max: usize,
    },
    /// The coordinator is not one of the pool's cores.
    CoordinatorOutOfRange {
        /// The configured coordinator.
        coordinator: CoreId,
        /// Number of cores in the pool.
        core_count: usize,
    },
    /// `thread_name_prefix` is empty.
    EmptyThreadName,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed and why.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCores => write!(f, "core_count must be at least 1"),
            Self::TooManyCores { configured, max } => {
                write!(f, "core_count {configured} exceeds maximum of {max}")
            }
            Self::CoordinatorOutOfRange {
                coordinator,
                core_count,
            } => {
                write!(
                    f,
                    "coordinator core {coordinator} is outside 0..{core_count}"
                )
            }
            Self::EmptyThreadName => write!(f, "thread_name_prefix must not be empty"),
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = PoolConfig::default();
        assert!(config.validate().is_ok());
        let n = config.resolved_core_count();
        assert!((1..=MAX_CORES).contains(&n));
    }

    #[test]
    fn zero_cores_rejected() {
        assert_eq!(PoolConfig::with_cores(0).validate(), Err(ConfigError::NoCores));
    }

    #[test]
    fn too_many_cores_rejected() {
        assert_eq!(
            PoolConfig::with_cores(MAX_CORES + 1).validate(),
            Err(ConfigError::TooManyCores {
                configured: MAX_CORES + 1,
                max: MAX_CORES,
            })
        );
    }

    #[test]
    fn coordinator_must_be_in_range() {
        let config = PoolConfig {
            coordinator: CoreId(4),
            ..PoolConfig::with_cores(4)
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::CoordinatorOutOfRange {
                coordinator: CoreId(4),
                core_count: 4,
            }
        );
        assert_eq!(err.to_string(), "coordinator core 4 is outside 0..4");
    }

    #[test]
    fn empty_thread_name_rejected() {
        let config = PoolConfig {
            thread_name_prefix: String::new(),
            ..PoolConfig::with_cores(2)
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyThreadName));
    }
}
