use super::record::{CheckpointRecord, LedgerLine};
use super::state::ResumableState;
use crate::errors::SearchError;
use chrono::{Local, SecondsFormat};
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Append-only ledger file. Single writer.
pub struct StateLedger {
    path: PathBuf,
}

impl StateLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and sync it to disk before returning.
    ///
    /// A torn final fragment is terminated first so the new record starts on
    /// its own line.
    pub fn append(&self, record: &CheckpointRecord) -> Result<(), SearchError> {
        let wrap = |source| SearchError::LedgerWrite {
            path: self.path.clone(),
            source,
        };

        let mut file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(wrap)?;
        let mut line = String::new();
        if !ends_with_newline(&mut file).map_err(wrap)? {
            line.push('\n');
        }
        line.push_str(&format!("{}: {}\n", timestamp(), record));
        file.write_all(line.as_bytes()).map_err(wrap)?;
        file.sync_data().map_err(wrap)?;
        Ok(())
    }

    /// Free-text progress line. A failed write is logged and otherwise ignored.
    pub fn note(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.append_diagnostic(message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.append_diagnostic(format!("WARNING: {message}"));
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.append_diagnostic(format!("ERROR: {message}"));
    }

    fn append_diagnostic(&self, text: String) {
        if let Err(e) = self.append(&CheckpointRecord::Note(text)) {
            tracing::warn!(error = %e, "could not write to ledger");
        }
    }

    /// Every complete line in the ledger. A missing file is an empty ledger.
    ///
    /// A final segment without a trailing newline is a torn write and is
    /// dropped. Invalid UTF-8 is replaced rather than rejected.
    pub fn lines(&self) -> Result<Vec<LedgerLine>, SearchError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SearchError::LedgerRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let complete = match bytes.iter().rposition(|b| *b == b'\n') {
            Some(end) => &bytes[..end],
            None => return Ok(Vec::new()),
        };

        Ok(complete
            .split(|b| *b == b'\n')
            .map(String::from_utf8_lossy)
            .filter(|line| !line.trim().is_empty())
            .map(|line| LedgerLine::parse(&line))
            .collect())
    }

    /// Rebuild the resumable state from the whole ledger.
    pub fn replay(&self) -> Result<ResumableState, SearchError> {
        let lines = self.lines()?;
        Ok(ResumableState::fold(lines.iter().map(LedgerLine::record)))
    }
}

/// True for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut fs::File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}
