//! Phase sequencing: Phase 1 → Phase 2 → Phase 3, resumed from the ledger.
//!
//! A checkpoint is appended only after the oracle returned cleanly for that
//! batch. Timed-out and failed batches stay pending; they are retried up to
//! `retry_passes` times within one run and otherwise on the next start.

use crate::batch::{Artifact, BatchWriter};
use crate::catalog::BasePhrase;
use crate::config::SearchSettings;
use crate::errors::SearchError;
use crate::insertion::{Insertions, RandomInserter};
use crate::ledger::{CheckpointRecord, Phase3Stats, ResumableState, StateLedger};
use crate::oracle::{CrackingAdapter, Invocation};
use crate::variants::{CounterRange, expand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

const PHASE3_ARTIFACT: &str = "phase3_batch.txt";

/// Bounds on an otherwise open-ended run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    pub max_phase3_batches: Option<u64>,
}

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    MatchFound { phase: u8, entries: Vec<String> },
    Phase3LimitReached { batches: u64 },
    /// The catalog is empty, so Phase 3 has nothing to draw from.
    NothingToSearch,
}

pub struct PhaseController {
    search: SearchSettings,
    phrases: Vec<BasePhrase>,
    writer: BatchWriter,
    adapter: CrackingAdapter,
    ledger: StateLedger,
    limits: RunLimits,
}

impl PhaseController {
    pub fn new(
        search: SearchSettings,
        phrases: Vec<BasePhrase>,
        writer: BatchWriter,
        adapter: CrackingAdapter,
        ledger: StateLedger,
    ) -> Self {
        Self {
            search,
            phrases,
            writer,
            adapter,
            ledger,
            limits: RunLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn ledger(&self) -> &StateLedger {
        &self.ledger
    }

    /// Run every phase not yet complete.
    pub async fn run(&self) -> Result<RunOutcome, SearchError> {
        self.adapter.oracle().preflight()?;
        let state = self.ledger.replay()?;
        self.log_startup(&state);

        if state.phase1_complete {
            self.ledger.note("Phase 1 already complete, skipping");
        } else if let Some(outcome) = self.run_phase1(&state).await? {
            return Ok(outcome);
        }

        if state.phase2_complete {
            self.ledger.note("Phase 2 already complete, skipping");
        } else if let Some(outcome) = self.run_phase2(&state).await? {
            return Ok(outcome);
        }

        self.run_phase3().await
    }

    fn log_startup(&self, state: &ResumableState) {
        let phase1_total =
            CounterRange::partition(self.search.max_counter, self.search.phase1_batch_size);
        let phase1_done = phase1_total.iter().filter(|r| state.phase1_is_done(r)).count();
        self.ledger.note(format!(
            "Startup: {} base phrases, max_counter={}, phase 1 {}/{} batches done{}, \
             phase 2 {}/{} phrases done{}, {} FOUND entries",
            self.phrases.len(),
            self.search.max_counter,
            phase1_done,
            phase1_total.len(),
            if state.phase1_complete { " (complete)" } else { "" },
            state.phase2_phrases_done(&self.phrases),
            self.phrases.len(),
            if state.phase2_complete { " (complete)" } else { "" },
            state.found.len(),
        ));
    }

    async fn run_phase1(&self, state: &ResumableState) -> Result<Option<RunOutcome>, SearchError> {
        let ranges =
            CounterRange::partition(self.search.max_counter, self.search.phase1_batch_size);
        let mut pending: Vec<CounterRange> = ranges
            .iter()
            .filter(|r| !state.phase1_is_done(r))
            .copied()
            .collect();

        self.ledger.note("PHASE 1 START: base phrases with counter variants");
        self.ledger.note(format!(
            "Phase 1: {} base phrases, {} of {} batches pending",
            self.phrases.len(),
            pending.len(),
            ranges.len()
        ));

        for pass in 1..=self.search.retry_passes {
            if pending.is_empty() {
                break;
            }
            if pass > 1 {
                self.ledger
                    .warn(format!("Phase 1: retrying {} batch(es), pass {}", pending.len(), pass));
            }

            let mut unfinished = Vec::new();
            for range in pending {
                let name = format!("phase1_batch_{}_{}.txt", range.min, range.max);
                let candidates = self.phrases.iter().flat_map(move |p| expand(&p.text, range));
                let artifact = self.writer.write(&name, candidates)?;
                let label = format!("Phase 1 [{}]", range);
                let invocation = self.invoke(artifact, Some(&label)).await?;

                if invocation.run.is_completed() {
                    self.ledger.append(&CheckpointRecord::Phase1BatchDone(range))?;
                } else {
                    unfinished.push(range);
                }
                if invocation.found_new_matches() {
                    self.ledger.note(format!(
                        "Phase 1: !!! FOUND SOMETHING in batch {}! Check FOUND file !!!",
                        range
                    ));
                    if self.search.stop_on_match {
                        return Ok(Some(RunOutcome::MatchFound {
                            phase: 1,
                            entries: invocation.found,
                        }));
                    }
                }
            }
            pending = unfinished;
        }

        if !pending.is_empty() {
            return Err(SearchError::PhaseIncomplete {
                phase: 1,
                remaining: pending.len(),
                passes: self.search.retry_passes,
            });
        }

        self.ledger.append(&CheckpointRecord::Phase1Complete)?;
        tracing::info!("phase 1 complete");
        Ok(None)
    }

    async fn run_phase2(&self, state: &ResumableState) -> Result<Option<RunOutcome>, SearchError> {
        let ranges =
            CounterRange::partition(self.search.max_counter, self.search.phase2_batch_size);
        let total = self.phrases.len();
        let mut done = state.phase2_phrases_done(&self.phrases);

        // Phrases already fully done are skipped; the rest keep only the
        // ranges not yet checkpointed for that phrase.
        let mut pending: Vec<(&BasePhrase, Vec<CounterRange>)> = self
            .phrases
            .iter()
            .filter(|p| !state.phase2_phrase_done(p))
            .map(|p| {
                let finished = state.phase2_ranges_for(p);
                let left = ranges.iter().filter(|r| !finished.contains(r)).copied().collect();
                (p, left)
            })
            .collect();

        self.ledger.note("PHASE 2 START: single character insertion");
        self.ledger.note(format!(
            "Phase 2: {}/{} phrases already done, {} counter batches per phrase",
            done,
            total,
            ranges.len()
        ));

        for pass in 1..=self.search.retry_passes {
            if pending.is_empty() {
                break;
            }
            if pass > 1 {
                self.ledger
                    .warn(format!("Phase 2: retrying {} phrase(s), pass {}", pending.len(), pass));
            }

            let mut unfinished = Vec::new();
            for (phrase, phrase_ranges) in pending {
                let mut left = Vec::new();
                for range in phrase_ranges {
                    let name = format!(
                        "phase2_phrase_{}_batch_{}_{}.txt",
                        phrase.index, range.min, range.max
                    );
                    let candidates = expand(&phrase.text, range).flat_map(Insertions::new);
                    let artifact = self.writer.write(&name, candidates)?;
                    let label = format!("Phase 2 [{}:{}]", phrase.index, range);
                    let invocation = self.invoke(artifact, Some(&label)).await?;

                    if invocation.run.is_completed() {
                        self.ledger.append(&CheckpointRecord::Phase2BatchDone {
                            index: phrase.index,
                            range,
                            phrase: Some(phrase.text.clone()),
                        })?;
                    } else {
                        left.push(range);
                    }
                    if invocation.found_new_matches() {
                        self.ledger.note(format!(
                            "Phase 2: !!! FOUND SOMETHING on phrase {}! Check FOUND file !!!",
                            phrase.index
                        ));
                        if self.search.stop_on_match {
                            return Ok(Some(RunOutcome::MatchFound {
                                phase: 2,
                                entries: invocation.found,
                            }));
                        }
                    }
                }

                if left.is_empty() {
                    self.ledger.append(&CheckpointRecord::Phase2BaseDone {
                        index: phrase.index,
                        phrase: Some(phrase.text.clone()),
                    })?;
                    done += 1;
                    self.ledger.note(format!(
                        "Phase 2: phrase {} done ({}/{})",
                        phrase.index, done, total
                    ));
                } else {
                    unfinished.push((phrase, left));
                }
            }
            pending = unfinished;
        }

        if !pending.is_empty() {
            return Err(SearchError::PhaseIncomplete {
                phase: 2,
                remaining: pending.iter().map(|(_, left)| left.len()).sum(),
                passes: self.search.retry_passes,
            });
        }

        self.ledger.append(&CheckpointRecord::Phase2Complete)?;
        tracing::info!("phase 2 complete");
        Ok(None)
    }

    /// Random multi-insertion until a match or the batch limit.
    async fn run_phase3(&self) -> Result<RunOutcome, SearchError> {
        if self.phrases.is_empty() {
            self.ledger.warn("Phase 3: catalog is empty, nothing to search");
            return Ok(RunOutcome::NothingToSearch);
        }

        self.ledger.note("PHASE 3 START: random multi-character insertion");
        self.ledger.note(format!(
            "Phase 3: batch_size={}, status_interval={}s",
            self.search.phase3_batch_size, self.search.phase3_status_interval_secs
        ));

        let rng = match self.search.phase3_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut inserter = RandomInserter::new(rng);
        let interval = Duration::from_secs(self.search.phase3_status_interval_secs);
        let started = Instant::now();
        let mut last_status = started;
        let mut stats = Phase3Stats::default();
        // Batch count carried by the last status line.
        let mut reported = 0;

        loop {
            if let Some(max) = self.limits.max_phase3_batches
                && stats.batches >= max
            {
                if stats.batches > reported {
                    self.append_status(&mut stats, started)?;
                }
                self.ledger
                    .note(format!("Phase 3: stopping after {} batch(es) (limit)", stats.batches));
                return Ok(RunOutcome::Phase3LimitReached { batches: stats.batches });
            }

            let mut sample: Option<String> = None;
            let candidates = (0..self.search.phase3_batch_size)
                .filter_map(|_| inserter.candidate(&self.phrases))
                .inspect(|c| {
                    if sample.is_none() {
                        sample = Some(c.clone());
                    }
                });
            let artifact = self.writer.write(PHASE3_ARTIFACT, candidates)?;
            stats.batches += 1;
            stats.generated += artifact.candidates;
            if let Some(sample) = sample {
                stats.sample = sample;
            }

            let invocation = self.invoke(artifact, None).await?;
            if invocation.found_new_matches() {
                self.ledger.note(format!(
                    "Phase 3: !!! FOUND SOMETHING on batch {}! Check FOUND file !!!",
                    stats.batches
                ));
                self.append_status(&mut stats, started)?;
                return Ok(RunOutcome::MatchFound {
                    phase: 3,
                    entries: invocation.found,
                });
            }

            if last_status.elapsed() >= interval {
                self.append_status(&mut stats, started)?;
                reported = stats.batches;
                last_status = Instant::now();
            }
        }
    }

    fn append_status(&self, stats: &mut Phase3Stats, started: Instant) -> Result<(), SearchError> {
        stats.elapsed_hours = started.elapsed().as_secs_f64() / 3600.0;
        self.ledger.append(&CheckpointRecord::Phase3Status(stats.clone()))
    }

    /// Run the oracle on one artifact, then delete it whatever happened.
    ///
    /// With a `progress` label the candidate count and duration also go to
    /// the ledger. Phase 3 passes `None` and reports through status lines.
    async fn invoke(
        &self,
        artifact: Artifact,
        progress: Option<&str>,
    ) -> Result<Invocation, SearchError> {
        let name = artifact
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::info!(
            artifact = %name,
            candidates = artifact.candidates,
            megabytes = artifact.megabytes(),
            "running oracle"
        );
        if let Some(label) = progress {
            self.ledger.note(format!(
                "{}: Generated {} candidates ({:.1} MB), feeding to oracle",
                label,
                artifact.candidates,
                artifact.megabytes()
            ));
        }

        let started = Instant::now();
        let result = self.adapter.invoke(&artifact.path, &self.ledger).await;
        artifact.discard();
        let invocation = result?;

        tracing::info!(
            artifact = %name,
            elapsed_secs = started.elapsed().as_secs(),
            completed = invocation.run.is_completed(),
            "oracle returned"
        );
        if let Some(label) = progress {
            self.ledger.note(format!(
                "{}: Finished in {:.1} minutes",
                label,
                started.elapsed().as_secs_f64() / 60.0
            ));
        }
        Ok(invocation)
    }
}
