//! Context configuration, validation, and error types.

use std::error::Error;
use std::fmt;

/// Smallest stack a worker thread may be configured with.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Configuration for a [`Context`](crate::Context).
///
/// All fields have defaults matching a typical Unix host; validation runs
/// once in [`Context::new`](crate::Context::new).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextConfig {
    /// Ceiling on the number of worker threads, standing in for the
    /// platform's semaphore-count limit. Default: 1024.
    pub max_threads: usize,
    /// Processor count assumed when the OS cannot report one. Default: 4.
    pub fallback_cpus: usize,
    /// Worker thread names are `"{prefix}-{index}"`. Default: `"ar2s-lane"`.
    pub thread_name_prefix: String,
    /// Stack size for worker threads. `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl ContextConfig {
    /// Default thread ceiling.
    pub const DEFAULT_MAX_THREADS: usize = 1024;

    /// Default processor count when probing fails.
    pub const DEFAULT_FALLBACK_CPUS: usize = 4;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threads == 0 {
            return Err(ConfigError::MaxThreadsZero);
        }
        if self.fallback_cpus == 0 {
            return Err(ConfigError::FallbackCpusZero);
        }
        if self.thread_name_prefix.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(ConfigError::InvalidThreadName {
                name: self.thread_name_prefix.clone(),
            });
        }
        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(ConfigError::StackTooSmall { configured: size });
            }
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_threads: Self::DEFAULT_MAX_THREADS,
            fallback_cpus: Self::DEFAULT_FALLBACK_CPUS,
            thread_name_prefix: "ar2s-lane".to_string(),
            stack_size: None,
        }
    }
}

/// Errors detected by [`ContextConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_threads` is zero.
    MaxThreadsZero,
    /// `fallback_cpus` is zero.
    FallbackCpusZero,
    /// `thread_name_prefix` is empty.
    EmptyThreadName,
    /// `thread_name_prefix` contains a NUL byte.
    InvalidThreadName {
        /// The rejected prefix.
        name: String,
    },
    /// `stack_size` is below [`MIN_STACK_SIZE`].
    StackTooSmall {
        /// The configured size.
        configured: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxThreadsZero => write!(f, "max_threads must be at least 1"),
            Self::FallbackCpusZero => write!(f, "fallback_cpus must be at least 1"),
            Self::EmptyThreadName => write!(f, "thread_name_prefix must not be empty"),
            Self::InvalidThreadName { name } => {
                write!(f, "thread_name_prefix {name:?} contains a NUL byte")
            }
            Self::StackTooSmall { configured } => {
                write!(
                    f,
                    "stack_size {configured} is below minimum of {MIN_STACK_SIZE}"
                )
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
        assert_eq!(ContextConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_ceiling_and_fallback() {
        let mut c = ContextConfig::default();
        c.max_threads = 0;
        assert_eq!(c.validate(), Err(ConfigError::MaxThreadsZero));

        let mut c = ContextConfig::default();
        c.fallback_cpus = 0;
        assert_eq!(c.validate(), Err(ConfigError::FallbackCpusZero));
    }

    #[test]
    fn rejects_bad_thread_names() {
        let mut c = ContextConfig::default();
        c.thread_name_prefix.clear();
        assert_eq!(c.validate(), Err(ConfigError::EmptyThreadName));

        c.thread_name_prefix = "lane\0".into();
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidThreadName { .. })
        ));
    }

    #[test]
    fn rejects_tiny_stack() {
        let c = ContextConfig {
            stack_size: Some(4096),
            ..ContextConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::StackTooSmall { configured: 4096 })
        );
    }
}
