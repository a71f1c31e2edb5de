use aho_corasick::AhoCorasick;
use fnv::FnvHashSet;

use crate::Error;

/// Immutable multi-pattern index over a pooled set of peptide patterns.
///
/// Search cost is linear in the text plus the number of matches, independent
/// of how many patterns the index holds. Once built, the index is read-only
/// and may be queried from any number of threads.
pub struct PatternIndex {
    automaton: AhoCorasick,
    patterns: Vec<String>,
}

impl PatternIndex {
    /// Compile an index over `patterns`, deduplicated. An empty pattern set
    /// builds a valid index that never matches anything.
    pub fn build<I, S>(patterns: I) -> Result<PatternIndex, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        patterns.sort_unstable();
        patterns.dedup();

        let automaton = AhoCorasick::new(&patterns).map_err(Error::PatternIndex)?;
        Ok(PatternIndex {
            automaton,
            patterns,
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern(&self, id: usize) -> &str {
        &self.patterns[id]
    }

    /// Ids of every distinct pattern occurring in `text` as a substring.
    ///
    /// Overlapping search: nested and overlapping occurrences are all
    /// reported, so a text holding both `ILG` and `LG` yields both ids.
    pub fn matches(&self, text: &str) -> FnvHashSet<usize> {
        self.automaton
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .collect()
    }
}
