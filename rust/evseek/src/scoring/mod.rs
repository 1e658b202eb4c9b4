mod evalue;
mod hyperscore;
mod tail_fit;
mod work_queue;

pub use evalue::{
    EValueEstimator,
    TailInterpolation,
};
pub use hyperscore::Hyperscore;
pub use tail_fit::{
    TailCoefficients,
    default_coefficients,
    fit_survival_tail,
};
pub use work_queue::SpectrumWorkQueue;
