use crate::errors::DataError;
use crate::utils::math::{
    linear_fit,
    median,
};
use serde::Serialize;

/// Log-linear survival-tail coefficients for one spectrum's score
/// distribution. Read-only once calibration has produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TailCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

impl TailCoefficients {
    /// Linear evaluation at `log10(raw_score)`. The slope of a survival fit
    /// is negative, so larger scores come out smaller (more significant).
    pub fn evaluate(&self, raw_score: f64) -> f64 {
        self.slope * raw_score.log10() + self.intercept
    }
}

/// Fits `log10(count of scores >= x)` against `log10(x)` over the
/// discriminating upper half of the distinct-score distribution.
///
/// The low-score bulk is dominated by random matches and does not separate
/// true hits, so it is excluded from the regression. `Ok(None)` marks a
/// sample too small or too flat to fit; scores of exactly zero (the
/// no-discriminating-score sentinel) are ignored. Negative or non-finite
/// scores are upstream corruption and surface as an error.
pub fn fit_survival_tail(raw_scores: &[f64]) -> Result<Option<TailCoefficients>, DataError> {
    let mut scores = Vec::with_capacity(raw_scores.len());
    for &score in raw_scores {
        if !score.is_finite() || score < 0.0 {
            return Err(DataError::ExpectedFiniteScore {
                value: score,
                context: String::new(),
            });
        }
        if score > 0.0 {
            scores.push(score);
        }
    }
    if scores.len() < 2 {
        return Ok(None);
    }
    scores.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());

    // Survival count at each distinct score: how many scores are >= it.
    let total = scores.len();
    let mut points: Vec<(f64, f64)> = Vec::new();
    let mut ix = 0;
    while ix < total {
        let value = scores[ix];
        let survival = (total - ix) as f64;
        points.push((value.log10(), survival.log10()));
        while ix < total && scores[ix] == value {
            ix += 1;
        }
    }
    if points.len() < 2 {
        // All candidates scored identically; nothing discriminates.
        return Ok(None);
    }

    let tail_start = (points.len() / 2).min(points.len() - 2);
    let tail = &points[tail_start..];
    let xs: Vec<f64> = tail.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = tail.iter().map(|p| p.1).collect();
    Ok(linear_fit(&xs, &ys).map(|(slope, intercept)| TailCoefficients { slope, intercept }))
}

/// Element-wise median pair over all fitted spectra. Sorting inside
/// [`median`] makes the result independent of merge order, so thread
/// scheduling cannot change the default.
pub fn default_coefficients(
    fitted: impl Iterator<Item = TailCoefficients>,
) -> Option<TailCoefficients> {
    let mut slopes = Vec::new();
    let mut intercepts = Vec::new();
    for pair in fitted {
        slopes.push(pair.slope);
        intercepts.push(pair.intercept);
    }
    Some(TailCoefficients {
        slope: median(&slopes)?,
        intercept: median(&intercepts)?,
    })
}
