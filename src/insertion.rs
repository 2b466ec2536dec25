//! Character insertion: exhaustive single insertion (Phase 2) and random
//! multi-character insertion (Phase 3).

use crate::catalog::BasePhrase;
use rand::Rng;
use rand::seq::SliceRandom;

/// Characters tried at every insertion point: ASCII letters, digits,
/// punctuation, then space and tab.
pub const INSERTABLE: &str = concat!(
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "0123456789",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    " \t",
);

pub fn alphabet() -> Vec<char> {
    INSERTABLE.chars().collect()
}

/// Every single-character insertion into one variant.
///
/// Iterates positions `0..=len` in order and, for each, every alphabet
/// character in order, so each `(position, char)` pair appears exactly once.
pub struct Insertions {
    variant: String,
    boundaries: Vec<usize>,
    alphabet: Vec<char>,
    position: usize,
    next_char: usize,
}

impl Insertions {
    pub fn new(variant: String) -> Self {
        Self::with_alphabet(variant, alphabet())
    }

    pub fn with_alphabet(variant: String, alphabet: Vec<char>) -> Self {
        let boundaries = variant
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(variant.len()))
            .collect();
        Self {
            variant,
            boundaries,
            alphabet,
            position: 0,
            next_char: 0,
        }
    }

    /// Total candidates this iterator yields: `(chars + 1) × alphabet`.
    pub fn total(&self) -> u64 {
        (self.boundaries.len() * self.alphabet.len()) as u64
    }
}

impl Iterator for Insertions {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.alphabet.is_empty() {
            return None;
        }
        if self.next_char == self.alphabet.len() {
            self.next_char = 0;
            self.position += 1;
        }
        let at = *self.boundaries.get(self.position)?;
        let ch = self.alphabet[self.next_char];
        self.next_char += 1;

        let mut out = String::with_capacity(self.variant.len() + ch.len_utf8());
        out.push_str(&self.variant[..at]);
        out.push(ch);
        out.push_str(&self.variant[at..]);
        Some(out)
    }
}

/// Random multi-character insertion over the whole phrase universe.
pub struct RandomInserter<R> {
    rng: R,
    alphabet: Vec<char>,
    min_insertions: usize,
    max_insertions: usize,
}

impl<R: Rng> RandomInserter<R> {
    /// Two to four insertions per candidate.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            alphabet: alphabet(),
            min_insertions: 2,
            max_insertions: 4,
        }
    }

    /// Pick a phrase uniformly, then insert 2–4 uniformly chosen characters
    /// at uniformly chosen positions of the growing string.
    pub fn candidate(&mut self, phrases: &[BasePhrase]) -> Option<String> {
        let phrase = phrases.choose(&mut self.rng)?;
        let count = self.rng.gen_range(self.min_insertions..=self.max_insertions);
        let mut chars: Vec<char> = phrase.text.chars().collect();
        for _ in 0..count {
            let pos = self.rng.gen_range(0..=chars.len());
            let ch = *self.alphabet.choose(&mut self.rng)?;
            chars.insert(pos, ch);
        }
        Some(chars.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_is_96_unique_chars() {
        let chars = alphabet();
        assert_eq!(chars.len(), 96);
        let unique: HashSet<char> = chars.iter().copied().collect();
        assert_eq!(unique.len(), 96);
        assert!(unique.contains(&'\t'));
        assert!(unique.contains(&' '));
        assert!(!unique.contains(&'\n'));
    }

    #[test]
    fn test_insertions_cover_every_pair_once() {
        let variant = "Bob 7".to_string();
        let len = variant.chars().count();
        let alphabet = alphabet();
        let insertions = Insertions::new(variant.clone());
        assert_eq!(insertions.total(), ((len + 1) * alphabet.len()) as u64);

        let produced: Vec<String> = insertions.collect();
        assert_eq!(produced.len(), (len + 1) * alphabet.len());

        let mut pairs = HashSet::new();
        for (i, candidate) in produced.iter().enumerate() {
            let pos = i / alphabet.len();
            let ch = alphabet[i % alphabet.len()];
            let mut expected = variant.clone();
            expected.insert(pos, ch);
            assert_eq!(candidate, &expected);
            assert!(pairs.insert((pos, ch)));
        }
        assert_eq!(pairs.len(), (len + 1) * alphabet.len());
    }

    #[test]
    fn test_insertions_order_position_then_char() {
        let mut it = Insertions::with_alphabet("xy".to_string(), vec!['a', 'b']);
        let all: Vec<String> = it.by_ref().collect();
        assert_eq!(all, vec!["axy", "bxy", "xay", "xby", "xya", "xyb"]);
        assert!(it.next().is_none());
    }

    #[test]
    fn test_insertions_empty_variant() {
        let all: Vec<String> = Insertions::with_alphabet(String::new(), vec!['a', 'b']).collect();
        assert_eq!(all, vec!["a", "b"]);
    }

    #[test]
    fn test_random_candidate_grows_by_two_to_four() {
        let phrases = vec![BasePhrase::new(0, "Jerry rules"), BasePhrase::new(1, "We rule")];
        let mut inserter = RandomInserter::new(StdRng::seed_from_u64(7));
        let allowed: HashSet<char> = alphabet().into_iter().collect();
        for _ in 0..500 {
            let candidate = inserter.candidate(&phrases).unwrap();
            let base = phrases
                .iter()
                .find(|p| is_subsequence(&p.text, &candidate))
                .expect("candidate must contain a base phrase as a subsequence");
            let added = candidate.chars().count() - base.text.chars().count();
            assert!((2..=4).contains(&added), "added {} chars", added);
            assert!(candidate.chars().all(|c| allowed.contains(&c)));
        }
    }

    #[test]
    fn test_random_candidate_is_seed_reproducible() {
        let phrases = vec![BasePhrase::new(0, "NSA was here")];
        let mut a = RandomInserter::new(StdRng::seed_from_u64(42));
        let mut b = RandomInserter::new(StdRng::seed_from_u64(42));
        for _ in 0..20 {
            assert_eq!(a.candidate(&phrases), b.candidate(&phrases));
        }
    }

    #[test]
    fn test_random_candidate_empty_universe() {
        let mut inserter = RandomInserter::new(StdRng::seed_from_u64(1));
        assert!(inserter.candidate(&[]).is_none());
    }

    fn is_subsequence(needle: &str, haystack: &str) -> bool {
        let mut hay = haystack.chars();
        needle.chars().all(|c| hay.any(|h| h == c))
    }
}
