//! Selector specificity.
//!
//! A rank counts how many clauses of a matched selector were literal and how
//! many were wildcards. Literal matches dominate: one literal clause outranks
//! any number of wildcard clauses, and only among equal literal counts do
//! wildcard clauses break the tie. Ranks of a source match and a destination
//! match are combined by adding the counts.

use std::cmp::Ordering;

/// Specificity of a single selector match (or of a combination of matches).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SelectorRank {
    exact_matches: u32,
    wildcard_matches: u32,
}

impl SelectorRank {
    pub(crate) fn new(exact_matches: u32, wildcard_matches: u32) -> Self {
        Self {
            exact_matches,
            wildcard_matches,
        }
    }

    pub fn exact_matches(&self) -> u32 {
        self.exact_matches
    }

    pub fn wildcard_matches(&self) -> u32 {
        self.wildcard_matches
    }

    /// Aggregate of two independent matches (e.g. source and destination).
    #[must_use]
    pub fn combined_with(self, other: SelectorRank) -> SelectorRank {
        SelectorRank {
            exact_matches: self.exact_matches.saturating_add(other.exact_matches),
            wildcard_matches: self.wildcard_matches.saturating_add(other.wildcard_matches),
        }
    }
}

impl Ord for SelectorRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.exact_matches
            .cmp(&other.exact_matches)
            .then(self.wildcard_matches.cmp(&other.wildcard_matches))
    }
}

impl PartialOrd for SelectorRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-so-far fold over ranked items.
///
/// The running best is replaced only by a strictly greater rank, so among
/// equal ranks the first item seen is kept. Returns `None` for an empty input.
pub fn pick_highest<T>(ranked: impl IntoIterator<Item = (T, SelectorRank)>) -> Option<(T, SelectorRank)> {
    ranked.into_iter().fold(None, |best, (item, rank)| match best {
        Some((_, best_rank)) if rank <= best_rank => best,
        _ => Some((item, rank)),
    })
}
