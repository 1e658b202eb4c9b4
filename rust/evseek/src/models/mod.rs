mod candidate;
mod score_pool;

pub use candidate::{
    CandidateDraft,
    CandidateKey,
    FinalizedMatch,
    ModId,
    ScoredCandidate,
};
pub use score_pool::ScorePool;
