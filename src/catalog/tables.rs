//! Static name and template tables for the built-in catalog.
//!
//! Adding, removing, or editing an entry shifts the sorted index of every
//! later phrase. Checkpoints survive such edits because progress is keyed by
//! `PhraseKey`, but the indices printed in old ledger lines will no longer
//! line up with `seedsearch phrases`.

pub const SINGLE_NAMES: &[&str] = &[
    "Jerry",
    "Bob",
    "Laurie",
    "Jerry Solinas",
    "Bob Reiter",
    "Laurie Law",
    "Solinas",
    "Reiter",
    "Law",
    "Jerome",
    "Robert",
    "Jerome Solinas",
    "Robert Reiter",
    "J. Solinas",
    "B. Reiter",
    "L. Law",
    "Jerome A. Solinas",
];

/// Ordered pairs; both orderings are listed where either could come first.
pub const NAME_PAIRS: &[(&str, &str)] = &[
    ("Jerry", "Bob"),
    ("Bob", "Jerry"),
    ("Jerry Solinas", "Bob Reiter"),
    ("Bob Reiter", "Jerry Solinas"),
    ("Solinas", "Reiter"),
    ("Reiter", "Solinas"),
    ("Jerry", "Laurie"),
    ("Laurie", "Jerry"),
    ("Jerry Solinas", "Laurie Law"),
    ("Laurie Law", "Jerry Solinas"),
    ("Solinas", "Law"),
    ("Law", "Solinas"),
    ("Bob", "Laurie"),
    ("Laurie", "Bob"),
    ("Bob Reiter", "Laurie Law"),
    ("Jerome", "Bob"),
    ("Jerome", "Robert"),
    ("Bob", "Jerome"),
    ("Robert", "Jerry"),
    ("Jerry", "Robert"),
    ("Jerome Solinas", "Bob Reiter"),
    ("Jerome Solinas", "Robert Reiter"),
];

/// Templates with `{name1}` and `{name2}` placeholders.
///
/// No case-only duplicates: case variation belongs to the oracle's rules.
pub const TWO_NAME_TEMPLATES: &[&str] = &[
    // raise
    "Give {name1} and {name2} a raise",
    "Give {name1} and {name2} raises",
    "Give {name1} & {name2} a raise",
    "{name1} and {name2} deserve a raise",
    "{name1} and {name2} deserve raises",
    "{name1} and {name2} need a raise",
    "{name1} and {name2} need raises",
    "{name1} and {name2} should get a raise",
    "{name1} & {name2} deserve a raise",
    "{name1} & {name2} need a raise",
    // rule
    "{name1} and {name2} rule",
    "{name1} & {name2} rule",
    "{name1} and {name2} rock",
    // pay
    "Pay {name1} and {name2} more",
    "{name1} and {name2} need more money",
    "{name1} and {name2} need better pay",
    "{name1} and {name2} are underpaid",
    // workplace
    "{name1} and {name2} were here",
    "{name1} and {name2} wuz here",
    "{name1} and {name2} made this",
    "{name1} and {name2} did this",
    "{name1} and {name2} built this",
    // credit
    "{name1} and {name2}'s excellent curve",
    "{name1} and {name2}'s excellent adventure",
    "{name1} and {name2}'s gift to cryptography",
    "{name1} and {name2}'s contribution",
    "A gift from {name1} and {name2}",
    "From {name1} and {name2}",
    "Made by {name1} and {name2}",
    // promotion
    "Promote {name1} and {name2}",
    "{name1} and {name2} for promotion",
    "{name1} and {name2} deserve a promotion",
];

/// Templates with a single `{name}` placeholder.
pub const SINGLE_NAME_TEMPLATES: &[&str] = &[
    "{name} deserves a raise",
    "{name} needs a raise",
    "Give {name} a raise",
    "{name} rules",
    "{name} rocks",
    "{name} was here",
    "{name} wuz here",
    "{name} made this",
    "{name} did this",
    "{name} built this",
    "Pay {name} more",
    "{name} is underpaid",
    "{name} needs more money",
    "{name} needs better pay",
    "{name} should get a raise",
    "Promote {name}",
    "{name} for promotion",
    "{name} for GS-15",
    "{name} for GS-14",
    "{name} for GS-13",
    "{name} deserves a promotion",
    "A gift from {name}",
    "{name}'s gift to cryptography",
    "{name}'s contribution",
    "{name}'s curve",
    "{name}'s excellent curve",
    "From {name}",
    "Made by {name}",
    "Generated by {name}",
    "{name} is the best",
    "{name} is the man",
    "Thank {name}",
    "Thanks {name}",
    "{name} saves the day",
    "{name} to the rescue",
];

/// Phrases used verbatim ("we" phrasing and the like).
pub const STANDALONE_TEMPLATES: &[&str] = &[
    "We deserve a raise",
    "We deserve raises",
    "We need a raise",
    "We need raises",
    "Give us a raise",
    "We rule",
    "We were here",
    "We built this",
    "We made this",
    "Our gift to cryptography",
    "NSA rules",
    "NSA was here",
];
