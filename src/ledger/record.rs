//! Ledger line grammar.
//!
//! Every line is `<timestamp>: <event>`. Events are classified by marker
//! prefix; anything unrecognized or malformed becomes `Note` and carries no
//! state.

use crate::variants::CounterRange;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime};
use std::fmt;

const PHASE1_BATCH_DONE: &str = "PHASE1_BATCH_DONE:";
const PHASE1_COMPLETE: &str = "PHASE1_COMPLETE";
const PHASE2_BATCH_DONE: &str = "PHASE2_BATCH_DONE:";
const PHASE2_BASE_DONE: &str = "PHASE2_BASE_DONE:";
const PHASE2_COMPLETE: &str = "PHASE2_COMPLETE";
const PHASE3_STATUS: &str = "PHASE3_STATUS:";
const FOUND: &str = "FOUND:";

/// Samples in status lines are cut to this many characters.
pub const SAMPLE_CHARS: usize = 80;

/// Cumulative Phase-3 liveness counters.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct Phase3Stats {
    pub batches: u64,
    pub generated: u64,
    pub elapsed_hours: f64,
    pub sample: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckpointRecord {
    Phase1BatchDone(CounterRange),
    Phase1Complete,
    /// `phrase` is `None` only for legacy lines that carried the index alone.
    Phase2BatchDone {
        index: usize,
        range: CounterRange,
        phrase: Option<String>,
    },
    Phase2BaseDone {
        index: usize,
        phrase: Option<String>,
    },
    Phase2Complete,
    Phase3Status(Phase3Stats),
    Found(String),
    Note(String),
}

impl CheckpointRecord {
    /// Classify one event string. Never fails.
    pub fn parse(event: &str) -> Self {
        let event = event.trim();
        Self::parse_marker(event).unwrap_or_else(|| CheckpointRecord::Note(event.to_string()))
    }

    fn parse_marker(event: &str) -> Option<Self> {
        if let Some(rest) = event.strip_prefix(PHASE1_BATCH_DONE) {
            let token = rest.split_whitespace().next()?;
            return Some(CheckpointRecord::Phase1BatchDone(parse_range(token)?));
        }
        if is_bare_marker(event, PHASE1_COMPLETE) {
            return Some(CheckpointRecord::Phase1Complete);
        }
        if let Some(rest) = event.strip_prefix(PHASE2_BATCH_DONE) {
            let mut parts = rest.splitn(3, ':');
            let index = parse_number(parts.next()?)?;
            let range = parse_range(parts.next()?.trim())?;
            let phrase = non_empty(parts.next());
            return Some(CheckpointRecord::Phase2BatchDone {
                index,
                range,
                phrase,
            });
        }
        if let Some(rest) = event.strip_prefix(PHASE2_BASE_DONE) {
            let mut parts = rest.splitn(2, ':');
            let index = parse_number(parts.next()?)?;
            let phrase = non_empty(parts.next());
            return Some(CheckpointRecord::Phase2BaseDone { index, phrase });
        }
        if is_bare_marker(event, PHASE2_COMPLETE) {
            return Some(CheckpointRecord::Phase2Complete);
        }
        if let Some(rest) = event.strip_prefix(PHASE3_STATUS) {
            return parse_status(rest).map(CheckpointRecord::Phase3Status);
        }
        if let Some(rest) = event.strip_prefix(FOUND) {
            let entry = rest.strip_prefix(' ').unwrap_or(rest);
            if entry.is_empty() {
                return None;
            }
            return Some(CheckpointRecord::Found(entry.to_string()));
        }
        None
    }

    pub fn is_checkpoint(&self) -> bool {
        !matches!(self, CheckpointRecord::Note(_))
    }
}

impl fmt::Display for CheckpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointRecord::Phase1BatchDone(range) => write!(f, "{PHASE1_BATCH_DONE}{range}"),
            CheckpointRecord::Phase1Complete => f.write_str(PHASE1_COMPLETE),
            CheckpointRecord::Phase2BatchDone {
                index,
                range,
                phrase: Some(phrase),
            } => write!(f, "{PHASE2_BATCH_DONE}{index}:{range}:{phrase}"),
            CheckpointRecord::Phase2BatchDone {
                index,
                range,
                phrase: None,
            } => write!(f, "{PHASE2_BATCH_DONE}{index}:{range}"),
            CheckpointRecord::Phase2BaseDone {
                index,
                phrase: Some(phrase),
            } => write!(f, "{PHASE2_BASE_DONE}{index}:{phrase}"),
            CheckpointRecord::Phase2BaseDone { index, phrase: None } => {
                write!(f, "{PHASE2_BASE_DONE}{index}")
            }
            CheckpointRecord::Phase2Complete => f.write_str(PHASE2_COMPLETE),
            CheckpointRecord::Phase3Status(stats) => {
                let sample: String = stats.sample.chars().take(SAMPLE_CHARS).collect();
                write!(
                    f,
                    "{PHASE3_STATUS} batches={}, generated={}, elapsed={:.1}h, sample={:?}",
                    stats.batches, stats.generated, stats.elapsed_hours, sample
                )
            }
            CheckpointRecord::Found(entry) => write!(f, "{FOUND} {entry}"),
            CheckpointRecord::Note(text) => f.write_str(text),
        }
    }
}

/// One physical ledger line, split into its timestamp and event text.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerLine {
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub event: String,
}

impl LedgerLine {
    /// Split at the first `": "` when the left side is a timestamp; otherwise
    /// the whole line is the event.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some((head, tail)) = line.split_once(": ")
            && let Some(timestamp) = parse_timestamp(head)
        {
            return Self {
                timestamp: Some(timestamp),
                event: tail.to_string(),
            };
        }
        Self {
            timestamp: None,
            event: line.to_string(),
        }
    }

    pub fn record(&self) -> CheckpointRecord {
        CheckpointRecord::parse(&self.event)
    }
}

/// RFC 3339, or an offset-less ISO-8601 form interpreted as local time.
fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts);
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|ts| ts.fixed_offset())
}

fn is_bare_marker(event: &str, marker: &str) -> bool {
    match event.strip_prefix(marker) {
        Some(rest) => {
            rest.is_empty() || rest.starts_with(':') || rest.starts_with(char::is_whitespace)
        }
        None => false,
    }
}

fn parse_number<T: std::str::FromStr>(s: &str) -> Option<T> {
    let digits: String = s.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    digits.parse().ok()
}

fn parse_range(s: &str) -> Option<CounterRange> {
    let (min, max) = s.split_once('-')?;
    let min: u32 = parse_number(min)?;
    let max: u32 = parse_number(max)?;
    (min <= max).then(|| CounterRange::new(min, max))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Parse `batches=N, generated=N, elapsed=X.Xh, sample=<quoted>`.
///
/// `sample` is last and may itself contain `", "`, so it is taken verbatim
/// from its key to the end of the line.
fn parse_status(rest: &str) -> Option<Phase3Stats> {
    let rest = rest.trim();
    let (fields, sample) = match rest.find("sample=") {
        Some(at) => (&rest[..at], Some(&rest[at + "sample=".len()..])),
        None => (rest, None),
    };

    let mut stats = Phase3Stats::default();
    let mut seen_batches = false;
    for field in fields.split(", ") {
        let Some((key, value)) = field.trim().trim_end_matches(',').split_once('=') else {
            continue;
        };
        match key.trim() {
            "batches" => {
                stats.batches = parse_number(value)?;
                seen_batches = true;
            }
            "generated" => stats.generated = parse_number(value)?,
            "elapsed" => stats.elapsed_hours = value.trim().trim_end_matches('h').parse().ok()?,
            _ => {}
        }
    }
    if !seen_batches {
        return None;
    }
    stats.sample = sample.map(unquote).unwrap_or_default();
    Some(stats)
}

/// Undo `{:?}` (or a single-quoted repr) on a sample string.
fn unquote(s: &str) -> String {
    let s = s.trim();
    let inner = ['"', '\'']
        .iter()
        .find_map(|q| s.strip_prefix(*q).and_then(|t| t.strip_suffix(*q)))
        .unwrap_or(s);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
