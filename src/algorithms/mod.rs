pub mod matching;
pub mod similarity;

pub use matching::{Seeker, TasteMatcher};
pub use similarity::{overlap, similarity, similarity_percent, Overlap};

use crate::models::PreferenceSet;

/// Scores two preference sets on a 0..=100 scale.
pub trait TasteScorer: Send + Sync {
    fn score(&self, a: &PreferenceSet, b: &PreferenceSet) -> f64;
}

/// Category overlap with a `max(|A|, |B|)` denominator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapScorer;

impl TasteScorer for OverlapScorer {
    fn score(&self, a: &PreferenceSet, b: &PreferenceSet) -> f64 {
        similarity_percent(a, b)
    }
}
