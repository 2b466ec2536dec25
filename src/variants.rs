//! Counter ranges and counter-suffixed variant expansion.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A closed interval `[min, max]` of counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CounterRange {
    pub min: u32,
    pub max: u32,
}

impl CounterRange {
    pub fn new(min: u32, max: u32) -> Self {
        debug_assert!(min <= max, "counter range {}-{} is inverted", min, max);
        Self { min, max }
    }

    /// Split `[0, max_counter]` into contiguous ranges of `batch_size` counters.
    ///
    /// The last range is truncated at `max_counter`. A `batch_size` of 0 is
    /// treated as 1; `Settings::validate` rejects it before we get here.
    pub fn partition(max_counter: u32, batch_size: u32) -> Vec<CounterRange> {
        let batch_size = batch_size.max(1);
        let mut ranges = Vec::new();
        let mut current: u32 = 0;
        loop {
            let end = current.saturating_add(batch_size - 1).min(max_counter);
            ranges.push(CounterRange::new(current, end));
            if end == max_counter {
                break;
            }
            current = end + 1;
        }
        ranges
    }

    pub fn len(&self) -> u64 {
        u64::from(self.max - self.min) + 1
    }
}

impl fmt::Display for CounterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for CounterRange {
    type Err = String;

    /// Parse `min-max`; rejects inverted ranges.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| format!("missing '-' in counter range '{}'", s))?;
        let min: u32 = min
            .trim()
            .parse()
            .map_err(|_| format!("bad range start in '{}'", s))?;
        let max: u32 = max
            .trim()
            .parse()
            .map_err(|_| format!("bad range end in '{}'", s))?;
        if min > max {
            return Err(format!("inverted counter range '{}'", s));
        }
        Ok(CounterRange { min, max })
    }
}

/// Every suffix form used for counter `n`, in fixed order.
pub fn counter_formats(n: u32) -> Vec<String> {
    let s = n.to_string();
    let mut formats = vec![
        s.clone(),
        format!(" {s}"),
        format!("_{s}"),
        format!("-{s}"),
        format!("({s})"),
        format!(" ({s})"),
        format!("#{s}"),
        format!(" #{s}"),
        format!(".{s}"),
    ];
    if n < 10 {
        formats.extend([
            format!("0{s}"),
            format!(" 0{s}"),
            format!("00{s}"),
            format!(" 00{s}"),
        ]);
    } else if n < 100 {
        formats.extend([format!("0{s}"), format!(" 0{s}")]);
    }
    formats
}

/// Lazily expand `phrase` over `range`.
///
/// Yields the bare phrase first when `range.min == 0`, then `phrase + format`
/// for each counter in ascending order and each format in `counter_formats`
/// order. The same inputs always produce the same sequence.
pub fn expand(phrase: &str, range: CounterRange) -> impl Iterator<Item = String> + '_ {
    let bare = (range.min == 0).then(|| phrase.to_string());
    bare.into_iter().chain((range.min..=range.max).flat_map(move |n| {
        counter_formats(n)
            .into_iter()
            .map(move |suffix| format!("{phrase}{suffix}"))
    }))
}

/// Number of variants `expand(phrase, range)` yields, without generating them.
pub fn variant_count(range: CounterRange) -> u64 {
    let bare = u64::from(range.min == 0);
    let counted: u64 = (range.min..=range.max)
        .map(|n| counter_formats_len(n) as u64)
        .sum();
    bare + counted
}

fn counter_formats_len(n: u32) -> usize {
    match n {
        0..=9 => 13,
        10..=99 => 11,
        _ => 9,
    }
}
