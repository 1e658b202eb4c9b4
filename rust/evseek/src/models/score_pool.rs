use super::candidate::CandidateKey;
use std::collections::{
    HashMap,
    HashSet,
};
use std::sync::Arc;

/// Per-spectrum accumulation of candidate raw scores.
///
/// Built incrementally while candidates are being evaluated, then consumed
/// in bulk by calibration. Not meant to be touched once calibration starts.
#[derive(Debug, Default)]
pub struct ScorePool {
    spectra: HashMap<Arc<str>, SpectrumScores>,
}

#[derive(Debug, Default)]
struct SpectrumScores {
    raw_scores: Vec<f64>,
    seen: HashSet<CandidateKey>,
}

impl ScorePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one scored candidate. Returns `false` (and records nothing)
    /// when the same candidate key was already seen for this spectrum.
    pub fn record(&mut self, spectrum_id: &Arc<str>, key: CandidateKey, raw_score: f64) -> bool {
        let entry = self.spectra.entry(spectrum_id.clone()).or_default();
        if !entry.seen.insert(key) {
            return false;
        }
        entry.raw_scores.push(raw_score);
        true
    }

    pub fn raw_scores(&self, spectrum_id: &str) -> Option<&[f64]> {
        self.spectra
            .get(spectrum_id)
            .map(|x| x.raw_scores.as_slice())
    }

    /// Number of candidates recorded against one spectrum.
    pub fn candidate_count(&self, spectrum_id: &str) -> usize {
        self.spectra
            .get(spectrum_id)
            .map_or(0, |x| x.raw_scores.len())
    }

    pub fn spectrum_ids(&self) -> impl Iterator<Item = &Arc<str>> + '_ {
        self.spectra.keys()
    }

    pub fn num_spectra(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }
}
