use crate::errors::DataError;
use crate::traits::SequenceTransform;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::hash::{
    DefaultHasher,
    Hash,
    Hasher,
};
use std::sync::Arc;

pub type ModId = Arc<str>;

/// An unscored peptide hypothesis for one spectrum.
///
/// Drafts are immutable. Scoring does not write back into them; it wraps
/// them into a [`ScoredCandidate`] instead, so drafts can be shared freely
/// between the generator and the score pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDraft {
    sequence: Arc<str>,
    charge: u8,
    mod_counts: HashMap<ModId, u16>,
    mod_sites: HashMap<ModId, Vec<usize>>,
}

impl CandidateDraft {
    /// Every modification carrying an occurrence count must also come with
    /// its admissible site list.
    pub fn new(
        sequence: Arc<str>,
        charge: u8,
        mod_counts: HashMap<ModId, u16>,
        mod_sites: HashMap<ModId, Vec<usize>>,
    ) -> Result<Self, DataError> {
        for mod_id in mod_counts.keys() {
            if !mod_sites.contains_key(mod_id) {
                return Err(DataError::ModificationWithoutSites {
                    mod_id: mod_id.clone(),
                });
            }
        }
        Ok(Self {
            sequence,
            charge,
            mod_counts,
            mod_sites,
        })
    }

    pub fn unmodified(sequence: Arc<str>, charge: u8) -> Self {
        Self {
            sequence,
            charge,
            mod_counts: HashMap::new(),
            mod_sites: HashMap::new(),
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn charge(&self) -> u8 {
        self.charge
    }

    pub fn modification_count(&self, mod_id: &str) -> Option<u16> {
        self.mod_counts.get(mod_id).copied()
    }

    pub fn admissible_sites(&self, mod_id: &str) -> Option<&[usize]> {
        self.mod_sites.get(mod_id).map(Vec::as_slice)
    }

    pub fn with_score(self, raw_score: f64) -> ScoredCandidate {
        ScoredCandidate {
            draft: self,
            raw_score,
        }
    }
}

/// A draft plus the raw score it earned against one spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub draft: CandidateDraft,
    pub raw_score: f64,
}

impl ScoredCandidate {
    pub fn finalize(&self, final_score: f64) -> FinalizedMatch {
        FinalizedMatch {
            peptide: self.draft.sequence.clone(),
            charge: self.draft.charge,
            score: final_score,
        }
    }
}

/// The immutable end product of scoring: resolved peptide, charge and the
/// calibrated final score. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizedMatch {
    pub peptide: Arc<str>,
    pub charge: u8,
    pub score: f64,
}

/// Fixed-width dedup key for candidate drafts.
///
/// The key is a hash of the rendered canonical form, so two distinct
/// modification signatures on a sufficiently long sequence can in principle
/// collide. Callers that need exactness should keep the
/// [`CandidateKey::render`] output instead of the reduced key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateKey(u64);

impl CandidateKey {
    /// Canonical rendering: the transformed sequence, then `#<mod>x<count>`
    /// for each modification present on the draft, walked in the caller's
    /// fixed global modification order.
    pub fn render(
        draft: &CandidateDraft,
        transform: &dyn SequenceTransform,
        mod_order: &[ModId],
    ) -> String {
        let mut rendered = transform.canonicalize(&draft.sequence);
        for mod_id in mod_order {
            if let Some(count) = draft.modification_count(mod_id) {
                let _ = write!(rendered, "#{}x{}", mod_id, count);
            }
        }
        rendered
    }

    pub fn from_draft(
        draft: &CandidateDraft,
        transform: &dyn SequenceTransform,
        mod_order: &[ModId],
    ) -> Self {
        let rendered = Self::render(draft, transform, mod_order);
        let mut hasher = DefaultHasher::new();
        rendered.hash(&mut hasher);
        Self(hasher.finish())
    }

    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{
        LeuIleEquivalence,
        VerbatimTransform,
    };

    fn oxidized_draft(sequence: &str, count: u16) -> CandidateDraft {
        let mut counts = HashMap::new();
        counts.insert(ModId::from("ox"), count);
        let mut sites = HashMap::new();
        sites.insert(ModId::from("ox"), vec![1, 4, 6]);
        CandidateDraft::new(Arc::from(sequence), 2, counts, sites).unwrap()
    }

    #[test]
    fn test_count_without_sites_is_rejected() {
        let mut counts = HashMap::new();
        counts.insert(ModId::from("ox"), 1u16);
        let err = CandidateDraft::new(Arc::from("PEPTIDEM"), 2, counts, HashMap::new());
        assert!(matches!(
            err,
            Err(DataError::ModificationWithoutSites { .. })
        ));
    }

    #[test]
    fn test_render_appends_present_mods_in_global_order() {
        let order = [ModId::from("phospho"), ModId::from("ox")];
        let draft = oxidized_draft("MPEPTIDE", 2);
        // "phospho" is absent from the draft and must not show up.
        assert_eq!(
            CandidateKey::render(&draft, &VerbatimTransform, &order),
            "MPEPTIDE#oxx2",
        );
        let bare = CandidateDraft::unmodified(Arc::from("MPEPTIDE"), 2);
        assert_eq!(
            CandidateKey::render(&bare, &VerbatimTransform, &order),
            "MPEPTIDE"
        );
    }

    #[test]
    fn test_key_distinguishes_mod_signatures() {
        let order = [ModId::from("ox")];
        let once = CandidateKey::from_draft(&oxidized_draft("MPEPTIDE", 1), &VerbatimTransform, &order);
        let twice = CandidateKey::from_draft(&oxidized_draft("MPEPTIDE", 2), &VerbatimTransform, &order);
        assert_ne!(once, twice);
        // Same draft, same key.
        let again = CandidateKey::from_draft(&oxidized_draft("MPEPTIDE", 1), &VerbatimTransform, &order);
        assert_eq!(once, again);
    }

    #[test]
    fn test_key_respects_sequence_transform() {
        let order: [ModId; 0] = [];
        let ile = CandidateDraft::unmodified(Arc::from("PEPTIDE"), 2);
        let leu = CandidateDraft::unmodified(Arc::from("PEPTLDE"), 2);
        let verbatim_ile = CandidateKey::from_draft(&ile, &VerbatimTransform, &order);
        let verbatim_leu = CandidateKey::from_draft(&leu, &VerbatimTransform, &order);
        assert_ne!(verbatim_ile, verbatim_leu);
        let folded_ile = CandidateKey::from_draft(&ile, &LeuIleEquivalence, &order);
        let folded_leu = CandidateKey::from_draft(&leu, &LeuIleEquivalence, &order);
        assert_eq!(folded_ile, folded_leu);
    }

    #[test]
    fn test_finalize_carries_charge_and_score() {
        let scored = oxidized_draft("MPEPTIDE", 1).with_score(42.0);
        let finalized = scored.finalize(-3.5);
        assert_eq!(finalized.peptide.as_ref(), "MPEPTIDE");
        assert_eq!(finalized.charge, 2);
        assert_eq!(finalized.score, -3.5);
    }

    #[test]
    fn test_finalized_match_serializes() {
        let m = FinalizedMatch {
            peptide: Arc::from("MPEPTIDE"),
            charge: 2,
            score: 1.25,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(
            json,
            r#"{"peptide":"MPEPTIDE","charge":2,"score":1.25}"#
        );
    }
}
