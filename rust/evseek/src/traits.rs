//! Contracts for the collaborators the calibration core consumes.
//!
//! Spectrum storage, database digestion and the search orchestration layer
//! live outside this crate; everything they have to provide is captured by
//! the traits here. Shipped implementations are in [`crate::reporting`]
//! (progress/faults) and [`crate::scoring::hyperscore`] (score function).

use crate::errors::DataError;
use crate::scoring::TailCoefficients;
use std::sync::Arc;

/// Progress and cooperative cancellation for long-running passes.
///
/// `Sync` because calibration workers share one reporter across threads.
pub trait ProgressReporter: Sync {
    fn set_total(&self, total: u64);
    fn advance(&self, units: u64);
    fn cancelled(&self) -> bool;
    fn request_cancel(&self);
}

/// An error captured on a calibration worker thread.
#[derive(Debug)]
pub struct WorkerFault {
    pub spectrum_id: Arc<str>,
    pub source: DataError,
}

pub trait FaultReporter: Sync {
    fn report(&self, fault: WorkerFault);
}

/// Canonicalization of a peptide sequence for dedup-key rendering.
pub trait SequenceTransform {
    fn canonicalize(&self, sequence: &str) -> String;
}

/// Renders sequences unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerbatimTransform;

impl SequenceTransform for VerbatimTransform {
    fn canonicalize(&self, sequence: &str) -> String {
        sequence.to_string()
    }
}

/// Folds isoleucine into leucine. The two residues are isobaric, so
/// fragment matching cannot tell them apart and their candidates should
/// share a dedup key.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeuIleEquivalence;

impl SequenceTransform for LeuIleEquivalence {
    fn canonicalize(&self, sequence: &str) -> String {
        sequence.replace('I', "L")
    }
}

/// The raw scoring contract: produce a match score from one candidate's
/// matched fragment evidence, and fit the calibration tail over one
/// spectrum's collected raw scores.
pub trait ScoreFunction: Sync {
    /// Raw match score over matched fragment intensities. `grouping` labels
    /// each intensity with its ion series; `None` treats the slice as a
    /// single series.
    fn raw_score(&self, intensities: &[f32], grouping: Option<&[u8]>) -> f64;

    /// Tail fit over one spectrum's raw scores. `Ok(None)` means the sample
    /// is too small or non-discriminating to support a fit, which is not an
    /// error; corrupt score data is.
    fn fit_tail(&self, scores: &[f64]) -> std::result::Result<Option<TailCoefficients>, DataError>;
}
