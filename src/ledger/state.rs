//! The resumable state: a pure fold over checkpoint records.

use super::record::{CheckpointRecord, Phase3Stats};
use crate::catalog::{BasePhrase, PhraseKey};
use crate::variants::CounterRange;
use std::collections::{BTreeMap, BTreeSet};

/// What the ledger says has already been attempted.
///
/// Phase-2 progress is tracked twice: by phrase key (from the phrase text in
/// each record) and by index. Lookups prefer the key; the index map only
/// answers for phrases whose records never carried text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumableState {
    pub phase1_complete: bool,
    pub phase1_done: BTreeSet<CounterRange>,
    pub phase2_ranges_by_key: BTreeMap<PhraseKey, BTreeSet<CounterRange>>,
    pub phase2_ranges_by_index: BTreeMap<usize, BTreeSet<CounterRange>>,
    pub phase2_done_keys: BTreeSet<PhraseKey>,
    pub phase2_done_indices: BTreeSet<usize>,
    /// Indices whose records carried no phrase text.
    legacy_indices: BTreeSet<usize>,
    pub phase2_complete: bool,
    pub last_phase3_status: Option<Phase3Stats>,
    pub found: Vec<String>,
}

impl ResumableState {
    pub fn fold<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CheckpointRecord>,
    {
        let mut state = Self::default();
        for record in records {
            state.apply(record);
        }
        state
    }

    /// Apply one record. Applying the same record twice is a no-op the
    /// second time, except `Found`, which keeps one entry per distinct value.
    pub fn apply(&mut self, record: CheckpointRecord) {
        match record {
            CheckpointRecord::Phase1BatchDone(range) => {
                self.phase1_done.insert(range);
            }
            CheckpointRecord::Phase1Complete => self.phase1_complete = true,
            CheckpointRecord::Phase2BatchDone {
                index,
                range,
                phrase,
            } => {
                self.phase2_ranges_by_index
                    .entry(index)
                    .or_default()
                    .insert(range);
                match phrase {
                    Some(text) => {
                        self.phase2_ranges_by_key
                            .entry(PhraseKey::of(&text))
                            .or_default()
                            .insert(range);
                    }
                    None => {
                        self.legacy_indices.insert(index);
                    }
                }
            }
            CheckpointRecord::Phase2BaseDone { index, phrase } => {
                self.phase2_done_indices.insert(index);
                match phrase {
                    Some(text) => {
                        self.phase2_done_keys.insert(PhraseKey::of(&text));
                    }
                    None => {
                        self.legacy_indices.insert(index);
                    }
                }
            }
            CheckpointRecord::Phase2Complete => self.phase2_complete = true,
            CheckpointRecord::Phase3Status(stats) => self.last_phase3_status = Some(stats),
            CheckpointRecord::Found(entry) => {
                if !self.found.contains(&entry) {
                    self.found.push(entry);
                }
            }
            CheckpointRecord::Note(_) => {}
        }
    }

    pub fn phase1_is_done(&self, range: &CounterRange) -> bool {
        self.phase1_done.contains(range)
    }

    /// Completed Phase-2 ranges for `phrase`.
    pub fn phase2_ranges_for(&self, phrase: &BasePhrase) -> BTreeSet<CounterRange> {
        let mut ranges = self
            .phase2_ranges_by_key
            .get(&phrase.key)
            .cloned()
            .unwrap_or_default();
        if self.legacy_indices.contains(&phrase.index)
            && let Some(legacy) = self.phase2_ranges_by_index.get(&phrase.index)
        {
            ranges.extend(legacy.iter().copied());
        }
        ranges
    }

    /// Completed Phase-2 ranges recorded under `index`, regardless of text.
    pub fn phase2_ranges_for_index(&self, index: usize) -> BTreeSet<CounterRange> {
        self.phase2_ranges_by_index
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn phase2_phrase_done(&self, phrase: &BasePhrase) -> bool {
        self.phase2_done_keys.contains(&phrase.key)
            || (self.legacy_indices.contains(&phrase.index)
                && self.phase2_done_indices.contains(&phrase.index))
    }

    /// Number of `phrases` fully done in Phase 2.
    pub fn phase2_phrases_done(&self, phrases: &[BasePhrase]) -> usize {
        phrases.iter().filter(|p| self.phase2_phrase_done(p)).count()
    }

    /// Highest phase with recorded progress: 1, 2, or 3.
    pub fn current_phase(&self) -> u8 {
        if self.phase2_complete || self.last_phase3_status.is_some() {
            3
        } else if self.phase1_complete {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PhraseCatalog;

    fn range(min: u32, max: u32) -> CounterRange {
        CounterRange::new(min, max)
    }

    #[test]
    fn test_single_phase2_batch_is_scoped_to_its_phrase() {
        let phrases = PhraseCatalog::builtin().generate();
        let five = &phrases[5];
        let state = ResumableState::fold([CheckpointRecord::Phase2BatchDone {
            index: 5,
            range: range(0, 9),
            phrase: Some(five.text.clone()),
        }]);

        let expected: BTreeSet<CounterRange> = [range(0, 9)].into_iter().collect();
        assert_eq!(state.phase2_ranges_for(five), expected);
        assert_eq!(state.phase2_ranges_for_index(5), expected);
        for phrase in phrases.iter().filter(|p| p.index != 5) {
            assert!(state.phase2_ranges_for(phrase).is_empty(), "phrase {}", phrase.index);
            assert!(state.phase2_ranges_for_index(phrase.index).is_empty());
        }
        assert!(!state.phase1_complete);
        assert!(!state.phase2_complete);
    }

    #[test]
    fn test_fold_is_idempotent() {
        let records = vec![
            CheckpointRecord::Phase1BatchDone(range(0, 9)),
            CheckpointRecord::Phase1BatchDone(range(10, 19)),
            CheckpointRecord::Phase1Complete,
            CheckpointRecord::Found("h:p".into()),
        ];
        let once = ResumableState::fold(records.clone());
        let twice = ResumableState::fold(records.iter().cloned().chain(records.iter().cloned()));
        assert_eq!(once, twice);
        assert_eq!(once.found, vec!["h:p".to_string()]);
    }

    #[test]
    fn test_notes_carry_no_state() {
        let state = ResumableState::fold([
            CheckpointRecord::Note("Phase 1 START".into()),
            CheckpointRecord::Note("ERROR: oracle exited 1".into()),
        ]);
        assert_eq!(state, ResumableState::default());
    }

    #[test]
    fn test_keys_follow_text_not_index() {
        let moved = BasePhrase::new(9, "Jerry rules");
        let state = ResumableState::fold([
            CheckpointRecord::Phase2BatchDone {
                index: 3,
                range: range(0, 499),
                phrase: Some("Jerry rules".into()),
            },
            CheckpointRecord::Phase2BaseDone {
                index: 3,
                phrase: Some("Jerry rules".into()),
            },
        ]);
        assert!(state.phase2_phrase_done(&moved));
        assert_eq!(state.phase2_ranges_for(&moved).len(), 1);

        // Whatever now sits at index 3 inherits nothing.
        let newcomer = BasePhrase::new(3, "Aardvarks rule");
        assert!(!state.phase2_phrase_done(&newcomer));
        assert!(state.phase2_ranges_for(&newcomer).is_empty());
    }

    #[test]
    fn test_legacy_index_records_fall_back_to_index() {
        let phrase = BasePhrase::new(4, "We rule");
        let state = ResumableState::fold([
            CheckpointRecord::Phase2BatchDone {
                index: 4,
                range: range(0, 499),
                phrase: None,
            },
            CheckpointRecord::Phase2BaseDone { index: 4, phrase: None },
        ]);
        assert!(state.phase2_phrase_done(&phrase));
        assert_eq!(state.phase2_ranges_for(&phrase).len(), 1);
    }

    #[test]
    fn test_current_phase() {
        let mut state = ResumableState::default();
        assert_eq!(state.current_phase(), 1);
        state.apply(CheckpointRecord::Phase1Complete);
        assert_eq!(state.current_phase(), 2);
        state.apply(CheckpointRecord::Phase2Complete);
        assert_eq!(state.current_phase(), 3);
    }

    #[test]
    fn test_last_status_wins() {
        let state = ResumableState::fold([
            CheckpointRecord::Phase3Status(Phase3Stats {
                batches: 1,
                ..Default::default()
            }),
            CheckpointRecord::Phase3Status(Phase3Stats {
                batches: 2,
                ..Default::default()
            }),
        ]);
        assert_eq!(state.last_phase3_status.map(|s| s.batches), Some(2));
    }
}
