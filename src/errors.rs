//! Typed error hierarchy for the search daemon.
//!
//! Two enums cover the two failure classes:
//! - `ConfigError`: fatal before any phase runs (missing oracle, bad settings)
//! - `SearchError`: I/O and orchestration failures while phases run
//!
//! Oracle timeouts and non-zero exits are not errors here. They are
//! outcomes of a batch (see `oracle::OracleRun`), not failures of the daemon.

use std::path::PathBuf;
use thiserror::Error;

/// Errors detected while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Oracle binary not found at {0}")]
    MissingOracleBinary(PathBuf),

    #[error("Hash target file not found at {0}")]
    MissingHashFile(PathBuf),

    #[error("Invalid value for {name}: {value} (must be greater than 0)")]
    InvalidValue { name: &'static str, value: u64 },

    #[error("Failed to read config file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },
}

/// Errors raised while the phases run.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write artifact at {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to ledger at {path}: {source}")]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read ledger at {path}: {source}")]
    LedgerRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to record discovery at {path}: {source}")]
    DiscoveryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn oracle {binary}: {source}")]
    OracleSpawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Phase {phase} left {remaining} batch(es) without a checkpoint after {passes} pass(es)")]
    PhaseIncomplete {
        phase: u8,
        remaining: usize,
        passes: u32,
    },

    #[error("Another instance holds the lock at {path}")]
    AlreadyRunning { path: PathBuf },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_missing_binary_carries_path() {
        let err = ConfigError::MissingOracleBinary(PathBuf::from("/opt/john/run/john"));
        assert!(err.to_string().contains("/opt/john/run/john"));
    }

    #[test]
    fn search_error_converts_from_config_error() {
        let err: SearchError = ConfigError::MissingHashFile(PathBuf::from("hashes.txt")).into();
        match &err {
            SearchError::Config(ConfigError::MissingHashFile(p)) => {
                assert_eq!(p, &PathBuf::from("hashes.txt"));
            }
            _ => panic!("Expected SearchError::Config(MissingHashFile(..))"),
        }
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn search_error_artifact_write_is_matchable() {
        let io_err = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let err = SearchError::ArtifactWrite {
            path: PathBuf::from("tmp/phase1_batch_0_9.txt"),
            source: io_err,
        };
        match &err {
            SearchError::ArtifactWrite { path, source } => {
                assert!(path.ends_with("phase1_batch_0_9.txt"));
                assert_eq!(source.kind(), std::io::ErrorKind::StorageFull);
            }
            _ => panic!("Expected ArtifactWrite"),
        }
    }

    #[test]
    fn phase_incomplete_mentions_counts() {
        let err = SearchError::PhaseIncomplete {
            phase: 2,
            remaining: 3,
            passes: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Phase 2"));
        assert!(msg.contains("3 batch(es)"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ConfigError::InvalidValue {
            name: "phase1_batch_size",
            value: 0,
        });
        assert_std_error(&SearchError::AlreadyRunning {
            path: PathBuf::from(".seedsearch.lock"),
        });
    }
}
