//! Typed errors per subsystem. File-level failures never carry these —
//! they are absorbed into the event stream as recoverable errors; these
//! types are for scan-level and store-level failures that reach callers.

pub mod error_code;

use self::error_code::VibeErrorCode;

/// Scan-level failures from the orchestrator and walker.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("insufficient memory: {available} bytes available, {required} required")]
    OutOfMemory { available: u64, required: u64 },

    #[error("scan exceeded timeout after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    #[error("scan interrupted")]
    Interrupted,

    #[error("walk failed: {message}")]
    Walk { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    State(#[from] StateError),
}

impl VibeErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => error_code::INVALID_INPUT,
            Self::OutOfMemory { .. } => error_code::OUT_OF_MEMORY,
            Self::Timeout { .. } => error_code::SCAN_TIMEOUT,
            Self::Interrupted => error_code::INTERRUPTED,
            Self::Walk { .. } | Self::Io(_) => error_code::IO_ERROR,
            Self::State(e) => e.error_code(),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Timeout { .. } => vec![
                "raise --timeout or scope the scan with include globs".to_string(),
                "enable incremental mode so unchanged files are skipped".to_string(),
            ],
            Self::OutOfMemory { .. } => {
                vec!["lower cache.memory_max_bytes or close other processes".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

/// Incremental-state load/save failures.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state belongs to {found}, expected {expected}")]
    ProjectMismatch { expected: String, found: String },

    #[error("state is {age_ms} ms old, max accepted age is {max_age_ms} ms")]
    Stale { age_ms: u64, max_age_ms: u64 },

    #[error("state file unreadable: {message}")]
    Unreadable { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VibeErrorCode for StateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ProjectMismatch { .. } => error_code::STATE_MISMATCH,
            Self::Stale { .. } | Self::Unreadable { .. } => error_code::CACHE_CORRUPT,
            Self::Io(_) => error_code::IO_ERROR,
        }
    }
}

/// Multi-level cache failures. Corrupt entries are deleted and surfaced as
/// misses; these errors reach callers only for store-level problems.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("corrupt cache entry {key}: {details}")]
    Corrupt { key: String, details: String },

    #[error("payload of {size} bytes exceeds the {limit}-byte cache ceiling")]
    TooLarge { size: u64, limit: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl VibeErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Corrupt { .. } => error_code::CACHE_CORRUPT,
            Self::TooLarge { .. } => error_code::INVALID_INPUT,
            Self::Io(_) | Self::Serde(_) => error_code::IO_ERROR,
        }
    }
}

/// Worker pool task failures, surfaced through task handles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("task queue full ({capacity} pending)")]
    QueueFull { capacity: usize },

    #[error("pool is shut down")]
    ShutDown,

    #[error("task cancelled")]
    Cancelled,

    #[error("task timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("task failed: {message}")]
    Failed { message: String },
}

impl VibeErrorCode for PoolError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::QueueFull { .. } => error_code::INVALID_INPUT,
            Self::ShutDown | Self::Cancelled => error_code::INTERRUPTED,
            Self::Timeout { .. } => error_code::TASK_TIMEOUT,
            Self::Failed { .. } => error_code::TASK_FAILED,
        }
    }
}

/// Drift detection failures.
#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    #[error("drift detection exceeded {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VibeErrorCode for DriftError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::SCAN_TIMEOUT,
            Self::Io(_) => error_code::IO_ERROR,
        }
    }
}

/// Claim verification failures.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid verifier config: {message}")]
    InvalidConfig { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VibeErrorCode for VerifyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => error_code::INVALID_INPUT,
            Self::Io(_) => error_code::IO_ERROR,
        }
    }
}

/// Ship scorer construction failures.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("score weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },
}

impl VibeErrorCode for ScoreError {
    fn error_code(&self) -> &'static str {
        error_code::INVALID_INPUT
    }
}

/// Autofix transaction failures.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    #[error("unknown transaction id: {id}")]
    UnknownTransaction { id: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VibeErrorCode for FixError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTransaction { .. } | Self::Validation { .. } => {
                error_code::VALIDATION_ERROR
            }
            Self::Io(_) => error_code::IO_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ScanError::Interrupted.error_code(), "INTERRUPTED");
        assert_eq!(
            ScanError::Timeout { elapsed_ms: 1 }.error_code(),
            "SCAN_TIMEOUT"
        );
        assert_eq!(
            PoolError::Timeout { timeout_ms: 1 }.error_code(),
            "TASK_TIMEOUT"
        );
        assert_eq!(
            PoolError::Failed {
                message: "x".into()
            }
            .error_code(),
            "TASK_FAILED"
        );
        assert_eq!(
            StateError::ProjectMismatch {
                expected: "/a".into(),
                found: "/b".into()
            }
            .error_code(),
            "STATE_MISMATCH"
        );
        assert_eq!(
            CacheError::Corrupt {
                key: "k".into(),
                details: "d".into()
            }
            .error_code(),
            "CACHE_CORRUPT"
        );
        assert_eq!(
            ScoreError::InvalidWeights { sum: 2.0 }.error_code(),
            "INVALID_INPUT"
        );
    }
}
