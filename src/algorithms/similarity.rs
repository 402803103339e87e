use crate::models::{PreferenceSet, CATEGORIES};
use std::collections::BTreeSet;

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// Overlap counts accumulated across the category vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlap {
    pub matches: usize,
    pub total: usize,
}

impl Overlap {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matches as f64 / self.total as f64 * 100.0
        }
    }
}

/// Per-category denominator is `max(|A|, |B|)`, not the union size.
/// Categories empty on both sides are skipped.
pub fn overlap(a: &PreferenceSet, b: &PreferenceSet) -> Overlap {
    CATEGORIES.iter().fold(Overlap::default(), |mut acc, category| {
        let ours = a.interests(category).unwrap_or(&EMPTY);
        let theirs = b.interests(category).unwrap_or(&EMPTY);

        if !ours.is_empty() || !theirs.is_empty() {
            acc.matches += ours.intersection(theirs).count();
            acc.total += ours.len().max(theirs.len());
        }
        acc
    })
}

/// Unrounded compatibility in `[0, 100]`.
pub fn similarity_percent(a: &PreferenceSet, b: &PreferenceSet) -> f64 {
    overlap(a, b).percent()
}

/// Compatibility score in `[0, 100]`, rounded half up.
pub fn similarity(a: &PreferenceSet, b: &PreferenceSet) -> u32 {
    similarity_percent(a, b).round() as u32
}
