use crate::algorithms::TasteScorer;
use crate::config::MatchingConfig;
use crate::models::{CandidateProfile, PreferenceSet, TasteMatch};
use rayon::prelude::*;

/// The user on whose behalf candidates are ranked.
#[derive(Debug, Clone)]
pub struct Seeker<'a> {
    pub id: &'a str,
    pub archetype: Option<&'a str>,
    pub preferences: &'a PreferenceSet,
}

pub struct TasteMatcher<S> {
    scorer: S,
    top_k: usize,
    connection_threshold: f64,
}

impl<S: TasteScorer> TasteMatcher<S> {
    pub fn new(scorer: S, config: &MatchingConfig) -> Self {
        Self {
            scorer,
            top_k: config.top_k,
            connection_threshold: config.connection_threshold,
        }
    }

    /// Candidates sharing the seeker's archetype, best first.
    ///
    /// A seeker or candidate without an archetype never forms a twin.
    pub fn taste_twins(&self, seeker: &Seeker<'_>, candidates: &[CandidateProfile]) -> Vec<TasteMatch> {
        self.rank(seeker, candidates, |candidate, _| {
            matches!(
                (candidate.archetype.as_deref(), seeker.archetype),
                (Some(theirs), Some(ours)) if theirs == ours
            )
        })
    }

    /// Candidates with a different archetype who still overlap by more than
    /// the configured threshold.
    pub fn unexpected_connections(
        &self,
        seeker: &Seeker<'_>,
        candidates: &[CandidateProfile],
    ) -> Vec<TasteMatch> {
        self.rank(seeker, candidates, |candidate, percent| {
            candidate.archetype.as_deref() != seeker.archetype
                && percent > self.connection_threshold
        })
    }

    fn rank<F>(&self, seeker: &Seeker<'_>, candidates: &[CandidateProfile], keep: F) -> Vec<TasteMatch>
    where
        F: Fn(&CandidateProfile, f64) -> bool + Sync,
    {
        let mut matches: Vec<TasteMatch> = candidates
            .par_iter()
            .filter(|candidate| candidate.id != seeker.id)
            .filter_map(|candidate| {
                let preferences = candidate.preferences.as_ref()?;
                let percent = self.scorer.score(seeker.preferences, preferences);
                keep(candidate, percent).then(|| TasteMatch {
                    id: candidate.id.clone(),
                    name: candidate.name.clone(),
                    archetype: candidate.archetype.clone(),
                    similarity: percent.round() as u32,
                })
            })
            .collect();

        // par_iter().collect() keeps input order, so ties stay in candidate order
        matches.sort_by(|a, b| b.similarity.cmp(&a.similarity));
        matches.truncate(self.top_k);
        matches
    }
}
