use super::{AlertSink, Oracle, OracleRun, preview};
use crate::errors::SearchError;
use crate::ledger::{CheckpointRecord, StateLedger};
use chrono::{Local, SecondsFormat};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const STDOUT_PREVIEW: usize = 200;
const STDERR_PREVIEW: usize = 400;

/// Result of one adapter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub run: OracleRun,
    /// Result-store entries that appeared during this invocation.
    pub found: Vec<String>,
}

impl Invocation {
    pub fn found_new_matches(&self) -> bool {
        !self.found.is_empty()
    }
}

/// Wraps an `Oracle` with result-store diffing and discovery handling.
pub struct CrackingAdapter {
    oracle: Box<dyn Oracle>,
    alerts: Box<dyn AlertSink>,
    discoveries: PathBuf,
}

impl CrackingAdapter {
    pub fn new(
        oracle: Box<dyn Oracle>,
        alerts: Box<dyn AlertSink>,
        discoveries: impl Into<PathBuf>,
    ) -> Self {
        Self {
            oracle,
            alerts,
            discoveries: discoveries.into(),
        }
    }

    pub fn oracle(&self) -> &dyn Oracle {
        self.oracle.as_ref()
    }

    /// Run the oracle on `artifact` and report what it newly solved.
    ///
    /// The result store is diffed whatever the run outcome, so an entry the
    /// oracle persisted before a timeout or crash is still reported. Marking
    /// the batch done is left to the caller.
    pub async fn invoke(
        &self,
        artifact: &Path,
        ledger: &StateLedger,
    ) -> Result<Invocation, SearchError> {
        let before = self.oracle.solved();
        let run = self.oracle.crack(artifact).await?;

        match &run {
            OracleRun::Completed { stdout } => {
                if !stdout.trim().is_empty() {
                    tracing::debug!(stdout = %preview(stdout, STDOUT_PREVIEW), "oracle output");
                }
            }
            OracleRun::TimedOut { after } => {
                ledger.warn(format!(
                    "Oracle timed out after {}s on {}",
                    after.as_secs(),
                    artifact.display()
                ));
            }
            OracleRun::Failed {
                exit_code,
                stdout,
                stderr,
            } => {
                let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                ledger.error(format!(
                    "Oracle exited with code {}. stderr={:?} stdout={:?}",
                    code,
                    preview(stderr, STDERR_PREVIEW),
                    preview(stdout, STDOUT_PREVIEW)
                ));
            }
        }

        let after = self.oracle.solved();
        let found: Vec<String> = after.difference(&before).cloned().collect();
        for entry in &found {
            self.record_discovery(entry, ledger).await?;
        }

        Ok(Invocation { run, found })
    }

    /// Discoveries file, then ledger, then alert. Only the alert may fail
    /// without failing the invocation.
    async fn record_discovery(&self, entry: &str, ledger: &StateLedger) -> Result<(), SearchError> {
        let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Millis, false);
        let bar = "!".repeat(70);
        tracing::warn!(
            "\n{bar}\n{bar}\n  FOUND A MATCH!\n  Time: {timestamp}\n  Result entry: {entry}\n{bar}\n{bar}"
        );

        self.append_discovery(&format!("{timestamp}: {entry}\n"))?;
        ledger.append(&CheckpointRecord::Found(entry.to_string()))?;

        let body = format!(
            "FOUND A MATCH!\n\nTime: {}\nResult entry: {}\n\nDiscoveries file: {}\n",
            timestamp,
            entry,
            self.discoveries.display()
        );
        if let Err(e) = self.alerts.send("seedsearch: match found", &body).await {
            ledger.warn(format!("Alert delivery failed: {:#}", e));
        }
        Ok(())
    }

    fn append_discovery(&self, line: &str) -> Result<(), SearchError> {
        let wrap = |source| SearchError::DiscoveryWrite {
            path: self.discoveries.clone(),
            source,
        };
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.discoveries)
            .map_err(wrap)?;
        file.write_all(line.as_bytes()).map_err(wrap)?;
        file.sync_data().map_err(wrap)?;
        Ok(())
    }
}
