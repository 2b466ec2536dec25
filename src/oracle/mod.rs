//! The external cracking oracle, injected as a capability.
//!
//! - `Oracle`: run one wordlist, report the result store
//! - `JohnOracle`: John the Ripper as a child process
//! - `CrackingAdapter`: snapshot/diff around each run and discovery handling
//! - `AlertSink`: out-of-band notification of discoveries

pub mod adapter;
pub mod alert;
pub mod john;

pub use adapter::{CrackingAdapter, Invocation};
pub use alert::{AlertSink, CommandAlert, LogAlert};
pub use john::JohnOracle;

use crate::errors::{ConfigError, SearchError};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// How one oracle invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleRun {
    /// Exit code 0.
    Completed { stdout: String },
    /// The wall-clock ceiling was hit and the process was killed.
    TimedOut { after: Duration },
    /// Non-zero exit, or killed by a signal (`exit_code: None`).
    Failed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl OracleRun {
    pub fn is_completed(&self) -> bool {
        matches!(self, OracleRun::Completed { .. })
    }
}

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Startup checks. The default accepts everything.
    fn preflight(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Test every line of `wordlist` against the targets.
    ///
    /// `Err` is reserved for failures to start the oracle at all; everything
    /// that happens after a successful start is an `OracleRun`.
    async fn crack(&self, wordlist: &Path) -> Result<OracleRun, SearchError>;

    /// Every entry currently in the persistent result store.
    fn solved(&self) -> BTreeSet<String>;
}

/// First `max` characters of `s` with surrounding whitespace removed.
pub fn preview(s: &str, max: usize) -> String {
    s.trim().chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_trims_and_truncates() {
        assert_eq!(preview("  hello world \n", 5), "hello");
        assert_eq!(preview("ab", 10), "ab");
        assert_eq!(preview("ééé", 2), "éé");
    }

    #[test]
    fn test_only_clean_exit_counts_as_completed() {
        assert!(OracleRun::Completed { stdout: String::new() }.is_completed());
        assert!(!OracleRun::TimedOut { after: Duration::from_secs(1) }.is_completed());
        assert!(
            !OracleRun::Failed {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: String::new(),
            }
            .is_completed()
        );
    }
}
