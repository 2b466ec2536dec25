//! The base-phrase universe.
//!
//! The catalog is a pure cross product over static tables:
//! every (name pair × two-name template) and every (name × single-name
//! template), unioned with the standalone templates, deduplicated and sorted.
//! The sorted rank is the phrase's `index`; the `PhraseKey` is derived from
//! the text alone and is what Phase-2 checkpoints are matched against.

pub mod tables;

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Content-derived identity of a phrase: the first 8 bytes of SHA-256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PhraseKey(u64);

impl PhraseKey {
    pub fn of(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(prefix))
    }
}

impl fmt::Display for PhraseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A root phrase before counter or insertion expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasePhrase {
    pub index: usize,
    pub key: PhraseKey,
    pub text: String,
}

impl BasePhrase {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            key: PhraseKey::of(&text),
            text,
        }
    }
}

/// Name and template tables the catalog is built from.
#[derive(Debug, Clone, Default)]
pub struct PhraseTables {
    pub single_names: Vec<String>,
    pub name_pairs: Vec<(String, String)>,
    pub two_name_templates: Vec<String>,
    pub single_name_templates: Vec<String>,
    pub standalone: Vec<String>,
}

impl PhraseTables {
    /// The compiled-in tables.
    pub fn builtin() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            single_names: owned(tables::SINGLE_NAMES),
            name_pairs: tables::NAME_PAIRS
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            two_name_templates: owned(tables::TWO_NAME_TEMPLATES),
            single_name_templates: owned(tables::SINGLE_NAME_TEMPLATES),
            standalone: owned(tables::STANDALONE_TEMPLATES),
        }
    }
}

pub struct PhraseCatalog {
    tables: PhraseTables,
}

impl PhraseCatalog {
    pub fn new(tables: PhraseTables) -> Self {
        Self { tables }
    }

    pub fn builtin() -> Self {
        Self::new(PhraseTables::builtin())
    }

    /// Build the sorted, deduplicated phrase universe.
    pub fn generate(&self) -> Vec<BasePhrase> {
        let t = &self.tables;
        let mut phrases = BTreeSet::new();

        for (name1, name2) in &t.name_pairs {
            for template in &t.two_name_templates {
                phrases.insert(
                    template
                        .replace("{name1}", name1)
                        .replace("{name2}", name2),
                );
            }
        }

        for name in &t.single_names {
            for template in &t.single_name_templates {
                phrases.insert(template.replace("{name}", name));
            }
        }

        phrases.extend(t.standalone.iter().cloned());

        phrases
            .into_iter()
            .enumerate()
            .map(|(index, text)| BasePhrase::new(index, text))
            .collect()
    }
}
