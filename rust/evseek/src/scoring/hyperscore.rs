use super::tail_fit::{
    TailCoefficients,
    fit_survival_tail,
};
use crate::errors::DataError;
use crate::traits::ScoreFunction;
use crate::utils::math::lnfact;
use std::cmp::Ordering;

/// X!Tandem-style hyperscore over matched fragment intensities.
///
/// `ln(1 + sum I_g)` plus `ln(N_g!)` per ion-series group, summed over the
/// groups. A candidate with no peaks above the count threshold scores
/// exactly 0.0, which the e-value estimator treats as its
/// no-discriminating-score sentinel.
#[derive(Debug, Clone, Copy)]
pub struct Hyperscore {
    pub count_threshold: f32,
}

impl Default for Hyperscore {
    fn default() -> Self {
        Self {
            count_threshold: 0.0,
        }
    }
}

impl ScoreFunction for Hyperscore {
    fn raw_score(&self, intensities: &[f32], grouping: Option<&[u8]>) -> f64 {
        let min_group = grouping.map_or(0, |g| g.iter().min().copied().unwrap_or(0));
        let max_group = grouping.map_or(0, |g| g.iter().max().copied().unwrap_or(0));

        let mut score = 0.0;
        for group in min_group..=max_group {
            let mut group_sum = 0.0f64;
            let mut group_count: u16 = 0;
            for (ix, intensity) in intensities.iter().enumerate() {
                if group != grouping.map_or(0, |g| g[ix]) {
                    continue;
                }
                // Not-greater is different from smaller because of NaNs.
                match intensity.partial_cmp(&self.count_threshold) {
                    Some(Ordering::Greater) => {}
                    _ => continue,
                }
                group_sum += f64::from(*intensity);
                group_count += 1;
            }
            score += lnfact(group_count);
            score += group_sum.ln_1p();
        }
        score
    }

    fn fit_tail(&self, scores: &[f64]) -> Result<Option<TailCoefficients>, DataError> {
        fit_survival_tail(scores)
    }
}
