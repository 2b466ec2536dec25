//! Watcher view of a ledger: where the search is and what went wrong.

use crate::catalog::BasePhrase;
use crate::config::SearchSettings;
use crate::ledger::{LedgerLine, Phase3Stats, ResumableState};
use crate::variants::CounterRange;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::path::Path;

/// Problems shown in the report.
const RECENT_PROBLEMS: usize = 5;
/// Without a ledger line for this long the daemon is reported as possibly stopped.
const STALE_AFTER_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
    pub complete: bool,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.done as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub current_phase: u8,
    pub phase1: Progress,
    pub phase2: Progress,
    pub phase3: Option<Phase3Stats>,
    pub found: Vec<String>,
    pub discoveries_present: bool,
    pub recent_problems: Vec<String>,
    pub last_activity: Option<DateTime<FixedOffset>>,
    pub possibly_stopped: bool,
}

impl StatusReport {
    pub fn build(
        lines: &[LedgerLine],
        phrases: &[BasePhrase],
        search: &SearchSettings,
        discoveries: &Path,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let state = ResumableState::fold(lines.iter().map(LedgerLine::record));

        let phase1_ranges = CounterRange::partition(search.max_counter, search.phase1_batch_size);
        let phase1_done = phase1_ranges.iter().filter(|r| state.phase1_is_done(r)).count();

        let mut recent_problems: Vec<String> = lines
            .iter()
            .filter(|l| l.event.starts_with("ERROR") || l.event.starts_with("WARNING"))
            .map(|l| l.event.clone())
            .collect();
        let skip = recent_problems.len().saturating_sub(RECENT_PROBLEMS);
        recent_problems.drain(..skip);

        let last_activity = lines.iter().rev().find_map(|l| l.timestamp);
        let possibly_stopped = last_activity
            .map(|ts| (now - ts).num_seconds() >= STALE_AFTER_SECS)
            .unwrap_or(true);

        let discoveries_present = std::fs::metadata(discoveries)
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        Self {
            current_phase: state.current_phase(),
            phase1: Progress {
                done: phase1_done,
                total: phase1_ranges.len(),
                complete: state.phase1_complete,
            },
            phase2: Progress {
                done: state.phase2_phrases_done(phrases),
                total: phrases.len(),
                complete: state.phase2_complete,
            },
            phase3: state.last_phase3_status,
            found: state.found,
            discoveries_present,
            recent_problems,
            last_activity,
            possibly_stopped,
        }
    }

    /// Human-readable report for the terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let heading = console::style("Seed Search Status").bold().cyan();
        out.push_str(&format!("{}\n{}\n\n", heading, "=".repeat(50)));

        let running = if self.possibly_stopped {
            console::style("POSSIBLY STOPPED").yellow().bold().to_string()
        } else {
            console::style("Running").green().to_string()
        };
        out.push_str(&format!("Status: {}\n", running));
        out.push_str(&format!("Phase: {}\n", self.current_phase));
        match self.last_activity {
            Some(ts) => out.push_str(&format!("Last activity: {}\n", ts.to_rfc3339())),
            None => out.push_str("Last activity: unknown\n"),
        }

        out.push_str("\nProgress:\n");
        out.push_str(&format!("  Phase 1: {}\n", describe("batches", &self.phase1)));
        out.push_str(&format!("  Phase 2: {}\n", describe("base phrases", &self.phase2)));
        match &self.phase3 {
            Some(stats) => out.push_str(&format!(
                "  Phase 3: {} batches, {} candidates, {:.1}h elapsed, sample {:?}\n",
                stats.batches, stats.generated, stats.elapsed_hours, stats.sample
            )),
            None if self.phase2.complete => out.push_str("  Phase 3: running (no status yet)\n"),
            None => out.push_str("  Phase 3: not started\n"),
        }

        out.push_str(&format!("\nMatches found: {}\n", self.found.len()));
        if self.found.is_empty() {
            out.push_str("  (none yet)\n");
        } else {
            let warning = console::style("CHECK THE DISCOVERIES FILE").red().bold();
            out.push_str(&format!("{}\n", warning));
            for entry in &self.found {
                out.push_str(&format!("  - {}\n", entry));
            }
        }
        if self.discoveries_present && self.found.is_empty() {
            out.push_str("  Discoveries file is non-empty but the ledger has no FOUND entries\n");
        }

        if !self.recent_problems.is_empty() {
            out.push_str(&format!("\nRecent errors/warnings ({}):\n", self.recent_problems.len()));
            for line in &self.recent_problems {
                out.push_str(&format!("  - {}\n", line));
            }
        }
        out
    }
}

fn describe(unit: &str, progress: &Progress) -> String {
    if progress.complete {
        format!("complete ({} {})", progress.total, unit)
    } else if progress.done == 0 {
        format!("not started (0/{} {})", progress.total, unit)
    } else {
        format!(
            "{}/{} {} ({:.1}%)",
            progress.done,
            progress.total,
            unit,
            progress.percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lines(raw: &[&str]) -> Vec<LedgerLine> {
        raw.iter().map(|l| LedgerLine::parse(l)).collect()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn search() -> SearchSettings {
        SearchSettings {
            max_counter: 19,
            phase1_batch_size: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_report_summarises_progress() {
        let dir = tempdir().unwrap();
        let phrases = vec![BasePhrase::new(0, "a"), BasePhrase::new(1, "b")];
        let ledger = lines(&[
            "2026-01-01T00:00:00+00:00: PHASE1_BATCH_DONE:0-9",
            "2026-01-01T00:10:00+00:00: PHASE1_BATCH_DONE:10-19",
            "2026-01-01T00:10:01+00:00: PHASE1_COMPLETE",
            "2026-01-01T01:00:00+00:00: PHASE2_BASE_DONE:1:b",
            "2026-01-01T01:30:00+00:00: Phase 2: phrase 1 done (1/2)",
        ]);

        let report = StatusReport::build(
            &ledger,
            &phrases,
            &search(),
            &dir.path().join("FOUND.txt"),
            at("2026-01-01T02:00:00+00:00"),
        );
        assert_eq!(report.current_phase, 2);
        assert_eq!(report.phase1, Progress { done: 2, total: 2, complete: true });
        assert_eq!(report.phase2, Progress { done: 1, total: 2, complete: false });
        assert!(report.phase3.is_none());
        assert!(!report.possibly_stopped);
        assert_eq!(report.last_activity, Some(at("2026-01-01T01:30:00+00:00")));
        assert!(!report.discoveries_present);

        let text = report.render();
        assert!(text.contains("1/2 base phrases (50.0%)"));
        assert!(text.contains("Phase 3: not started"));
    }

    #[test]
    fn test_report_keeps_last_five_problems() {
        let dir = tempdir().unwrap();
        let raw: Vec<String> = (0..8)
            .map(|i| format!("2026-01-01T00:00:0{}+00:00: ERROR: failure {}", i, i))
            .collect();
        let ledger: Vec<LedgerLine> = raw.iter().map(|l| LedgerLine::parse(l)).collect();
        let report = StatusReport::build(
            &ledger,
            &[],
            &search(),
            &dir.path().join("F"),
            at("2026-01-03T00:00:00+00:00"),
        );

        assert_eq!(report.recent_problems.len(), 5);
        assert_eq!(report.recent_problems[0], "ERROR: failure 3");
        assert_eq!(report.recent_problems[4], "ERROR: failure 7");
        assert!(report.possibly_stopped);
    }

    #[test]
    fn test_report_shows_found_and_discoveries_file() {
        let dir = tempdir().unwrap();
        let discoveries = dir.path().join("FOUND.txt");
        std::fs::write(&discoveries, "2026-01-01T00:00:00+00:00: abc:We rule\n").unwrap();
        let ledger = lines(&[
            "2026-01-01T00:00:00+00:00: PHASE2_COMPLETE",
            "2026-01-01T00:00:00+00:00: FOUND: abc:We rule",
            "2026-01-01T04:00:00+00:00: PHASE3_STATUS: batches=10, generated=200000, elapsed=4.0h, sample=\"W#e rule\"",
        ]);

        let report = StatusReport::build(
            &ledger,
            &[],
            &search(),
            &discoveries,
            at("2026-01-01T04:10:00+00:00"),
        );
        assert_eq!(report.current_phase, 3);
        assert_eq!(report.found, vec!["abc:We rule".to_string()]);
        assert!(report.discoveries_present);
        assert_eq!(report.phase3.as_ref().map(|s| s.batches), Some(10));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["found"][0], "abc:We rule");
        assert_eq!(json["phase3"]["sample"], "W#e rule");
        assert!(report.render().contains("abc:We rule"));
    }

    #[test]
    fn test_empty_ledger_report() {
        let dir = tempdir().unwrap();
        let report = StatusReport::build(
            &[],
            &[],
            &search(),
            &dir.path().join("F"),
            at("2026-01-01T00:00:00+00:00"),
        );
        assert_eq!(report.current_phase, 1);
        assert!(report.last_activity.is_none());
        assert!(report.possibly_stopped);
        assert!(report.render().contains("Last activity: unknown"));
    }
}
