use super::{Oracle, OracleRun};
use crate::config::OracleSettings;
use crate::errors::{ConfigError, SearchError};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// John the Ripper, invoked once per wordlist.
///
/// `<binary> --format=<format> --wordlist=<path> --rules=<rules> <hash_file>`
#[derive(Debug, Clone)]
pub struct JohnOracle {
    binary: PathBuf,
    hash_file: PathBuf,
    format: String,
    rules: String,
    timeout: Duration,
    pot_files: Vec<PathBuf>,
}

impl JohnOracle {
    pub fn new(settings: &OracleSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            hash_file: settings.hash_file.clone(),
            format: settings.format.clone(),
            rules: settings.rules.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            pot_files: settings.pot_files.clone(),
        }
    }

    fn args(&self, wordlist: &Path) -> Vec<String> {
        vec![
            format!("--format={}", self.format),
            format!("--wordlist={}", wordlist.display()),
            format!("--rules={}", self.rules),
            self.hash_file.display().to_string(),
        ]
    }
}

#[async_trait]
impl Oracle for JohnOracle {
    fn preflight(&self) -> Result<(), ConfigError> {
        if !self.binary.is_file() {
            return Err(ConfigError::MissingOracleBinary(self.binary.clone()));
        }
        if !self.hash_file.is_file() {
            return Err(ConfigError::MissingHashFile(self.hash_file.clone()));
        }
        Ok(())
    }

    async fn crack(&self, wordlist: &Path) -> Result<OracleRun, SearchError> {
        tracing::debug!(
            binary = %self.binary.display(),
            wordlist = %wordlist.display(),
            timeout_secs = self.timeout.as_secs(),
            "invoking oracle"
        );

        let child = Command::new(&self.binary)
            .args(self.args(wordlist))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SearchError::OracleSpawn {
                binary: self.binary.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Ok(OracleRun::Failed {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!("failed to collect oracle output: {}", e),
                });
            }
            Err(_) => return Ok(OracleRun::TimedOut { after: self.timeout }),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if output.status.success() {
            Ok(OracleRun::Completed { stdout })
        } else {
            Ok(OracleRun::Failed {
                exit_code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }

    /// Union of every readable pot file; missing files contribute nothing.
    fn solved(&self) -> BTreeSet<String> {
        let mut entries = BTreeSet::new();
        for pot in &self.pot_files {
            match std::fs::read(pot) {
                Ok(bytes) => entries.extend(
                    String::from_utf8_lossy(&bytes)
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                ),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::debug!(
                        pot = %pot.display(),
                        error = %e,
                        "skipping unreadable pot file"
                    )
                }
            }
        }
        entries
    }
}
