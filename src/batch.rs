//! Wordlist artifacts: one newline-delimited batch of candidates per file.

use crate::errors::SearchError;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Emit a progress line every this many candidates while spooling.
const PROGRESS_EVERY: u64 = 5_000_000;

/// A wordlist on disk. Lives for one oracle invocation, then is discarded.
#[derive(Debug)]
pub struct Artifact {
    pub path: PathBuf,
    pub candidates: u64,
    pub bytes: u64,
}

impl Artifact {
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / (1024.0 * 1024.0)
    }

    /// Delete the file. Failure is logged, never propagated.
    pub fn discard(self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to delete artifact");
        }
    }
}

/// Spools candidate streams into files under one artifact directory.
pub struct BatchWriter {
    dir: PathBuf,
}

impl BatchWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Write `candidates` to `<dir>/<name>`, one per line.
    ///
    /// Any I/O failure is fatal for the batch; the partial file is removed
    /// best-effort before the error is returned.
    pub fn write<I>(&self, name: &str, candidates: I) -> Result<Artifact, SearchError>
    where
        I: IntoIterator<Item = String>,
    {
        let path = self.dir.join(name);
        let wrap = |source| SearchError::ArtifactWrite {
            path: path.clone(),
            source,
        };

        let result = fs::File::create(&path).and_then(|file| {
            let mut out = BufWriter::new(file);
            let (candidates, bytes) = spool(&mut out, candidates, name)?;
            out.flush()?;
            Ok((candidates, bytes))
        });

        match result {
            Ok((candidates, bytes)) => Ok(Artifact {
                path,
                candidates,
                bytes,
            }),
            Err(e) => {
                let _ = fs::remove_file(&path);
                Err(wrap(e))
            }
        }
    }
}

/// Write each candidate followed by `\n`; returns (lines, bytes).
pub fn spool<W, I>(out: &mut W, candidates: I, label: &str) -> std::io::Result<(u64, u64)>
where
    W: Write,
    I: IntoIterator<Item = String>,
{
    let mut count = 0u64;
    let mut bytes = 0u64;
    for candidate in candidates {
        out.write_all(candidate.as_bytes())?;
        out.write_all(b"\n")?;
        count += 1;
        bytes += candidate.len() as u64 + 1;
        if count % PROGRESS_EVERY == 0 {
            tracing::info!(artifact = label, candidates = count, "spooling candidates");
        }
    }
    Ok((count, bytes))
}
