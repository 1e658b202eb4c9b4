pub mod errors;
pub mod models;
pub mod modifications;
pub mod reporting;
pub mod scoring;
pub mod traits;
pub mod utils;

pub use models::{
    CandidateDraft,
    CandidateKey,
    FinalizedMatch,
    ModId,
    ScorePool,
    ScoredCandidate,
};
pub use modifications::SiteEnumerator;
pub use scoring::{
    EValueEstimator,
    Hyperscore,
    TailCoefficients,
    TailInterpolation,
};
