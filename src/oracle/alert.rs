use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Environment variable carrying the alert subject to `CommandAlert`.
pub const SUBJECT_ENV: &str = "SEEDSEARCH_ALERT_SUBJECT";

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}

/// Writes the alert to the journal only.
pub struct LogAlert;

#[async_trait]
impl AlertSink for LogAlert {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        tracing::warn!(subject, "{}", body);
        Ok(())
    }
}

/// Runs a shell command per alert: subject in the environment, body on stdin.
pub struct CommandAlert {
    command: String,
    timeout: Duration,
}

impl CommandAlert {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

#[async_trait]
impl AlertSink for CommandAlert {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env(SUBJECT_ENV, subject)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn alert command: {}", self.command))?;

        // A command that ignores stdin may exit before the body is written.
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(body.as_bytes()).await
        {
            tracing::debug!(error = %e, "alert command did not take the body");
        }

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                anyhow::anyhow!("Alert command timed out after {}s", self.timeout.as_secs())
            })?
            .context("Failed to wait for alert command")?;

        if !output.status.success() {
            anyhow::bail!(
                "Alert command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_command_alert_receives_subject_and_body() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("alert.txt");
        let alert = CommandAlert::new(
            format!("{{ echo \"$SEEDSEARCH_ALERT_SUBJECT\"; cat; }} > {}", out.display()),
            Duration::from_secs(5),
        );
        alert.send("match found", "Pot entry: abc:xyz\n").await.unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "match found\nPot entry: abc:xyz\n");
    }

    #[tokio::test]
    async fn test_command_alert_failure_is_error() {
        let alert = CommandAlert::new("echo nope >&2; exit 4", Duration::from_secs(5));
        let err = alert.send("s", "b").await.unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn test_command_alert_timeout() {
        let alert = CommandAlert::new("sleep 10", Duration::from_secs(1));
        let err = alert.send("s", "b").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_log_alert_never_fails() {
        LogAlert.send("subject", "body").await.unwrap();
    }
}
