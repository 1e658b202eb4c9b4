use super::tail_fit::{
    TailCoefficients,
    default_coefficients,
};
use super::work_queue::SpectrumWorkQueue;
use crate::errors::{
    CalibrationError,
    ConfigError,
    DataError,
    Result,
};
use crate::models::ScorePool;
use crate::traits::{
    FaultReporter,
    ProgressReporter,
    ScoreFunction,
    WorkerFault,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use tracing::{
    debug,
    warn,
};

/// Significance estimation over raw match scores. Smaller output means
/// more significant.
#[derive(Debug)]
pub enum EValueEstimator {
    /// Calibration-free baseline: the negated raw score.
    Negation,
    /// Per-spectrum survival-tail interpolation, hyperscore style. Built
    /// through [`TailInterpolation::calibrate`], so a value of this variant
    /// is always fully calibrated.
    TailInterpolation(TailInterpolation),
}

impl EValueEstimator {
    pub fn estimate(&self, spectrum_id: &str, raw_score: f64) -> f64 {
        match self {
            Self::Negation => -raw_score,
            Self::TailInterpolation(model) => model.estimate(spectrum_id, raw_score),
        }
    }
}

/// Calibrated per-spectrum tail coefficients plus the global fallback
/// pair. Immutable after calibration; queries need no synchronization.
#[derive(Debug)]
pub struct TailInterpolation {
    coefficients: HashMap<Arc<str>, TailCoefficients>,
    default: TailCoefficients,
    candidate_counts: HashMap<Arc<str>, usize>,
}

struct WorkerOutcome {
    fitted: HashMap<Arc<str>, TailCoefficients>,
    fault: Option<(Arc<str>, DataError)>,
}

impl TailInterpolation {
    /// Fits per-spectrum tail coefficients over `num_threads` worker
    /// threads.
    ///
    /// Spectra are claimed exactly once through a [`SpectrumWorkQueue`];
    /// each worker accumulates into its own map and the maps are
    /// concatenated after the join, which keeps the result structure free
    /// of locks. A fault on any worker flips the shared cancellation flag:
    /// the other workers stop claiming between spectra, in-flight fits
    /// finish, and the call surfaces the failure instead of returning a
    /// partially calibrated estimator.
    pub fn calibrate<S: ScoreFunction>(
        pool: &ScorePool,
        num_threads: usize,
        score_function: &S,
        progress: &dyn ProgressReporter,
        faults: &dyn FaultReporter,
    ) -> Result<Self> {
        if num_threads == 0 {
            return Err(ConfigError::ExpectedPositiveThreadCount.into());
        }
        if pool.is_empty() {
            return Err(CalibrationError::EmptyScorePool.into());
        }

        let queue = SpectrumWorkQueue::new(pool.spectrum_ids().cloned());
        progress.set_total(queue.len() as u64);
        let cancelled = AtomicBool::new(false);

        let outcomes: Vec<WorkerOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..num_threads)
                .map(|_| {
                    scope.spawn(|| {
                        let mut fitted: HashMap<Arc<str>, TailCoefficients> = HashMap::new();
                        loop {
                            if cancelled.load(Ordering::Relaxed) || progress.cancelled() {
                                return WorkerOutcome {
                                    fitted,
                                    fault: None,
                                };
                            }
                            let Some(spectrum_id) = queue.next() else {
                                return WorkerOutcome {
                                    fitted,
                                    fault: None,
                                };
                            };
                            let scores = pool.raw_scores(&spectrum_id).unwrap_or(&[]);
                            if scores.len() > 1 {
                                match score_function.fit_tail(scores) {
                                    Ok(Some(pair)) => {
                                        fitted.insert(spectrum_id.clone(), pair);
                                    }
                                    // Too few or non-discriminating scores;
                                    // the default pair covers this spectrum.
                                    Ok(None) => {}
                                    Err(source) => {
                                        cancelled.store(true, Ordering::Relaxed);
                                        let source = source.append_to_context(&format!(
                                            "spectrum {}",
                                            spectrum_id
                                        ));
                                        faults.report(WorkerFault {
                                            spectrum_id: spectrum_id.clone(),
                                            source: source.clone(),
                                        });
                                        progress.advance(1);
                                        return WorkerOutcome {
                                            fitted,
                                            fault: Some((spectrum_id, source)),
                                        };
                                    }
                                }
                            }
                            progress.advance(1);
                        }
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("calibration worker panicked"))
                .collect()
        });

        let mut fitted_all: HashMap<Arc<str>, TailCoefficients> = HashMap::new();
        let mut first_fault: Option<(Arc<str>, DataError)> = None;
        for outcome in outcomes {
            // Key sets are disjoint: every spectrum was claimed by exactly
            // one worker.
            fitted_all.extend(outcome.fitted);
            if first_fault.is_none() {
                first_fault = outcome.fault;
            }
        }
        if let Some((spectrum_id, source)) = first_fault {
            return Err(CalibrationError::WorkerFault {
                spectrum_id,
                source,
            }
            .into());
        }
        if progress.cancelled() {
            return Err(CalibrationError::Cancelled {
                fitted: fitted_all.len(),
            }
            .into());
        }

        let Some(default) = default_coefficients(fitted_all.values().copied()) else {
            warn!("no spectrum produced a survival fit; refusing to calibrate");
            return Err(CalibrationError::NoFittedSpectra.into());
        };
        debug!(
            "calibrated {}/{} spectra (default slope {:.4}, intercept {:.4})",
            fitted_all.len(),
            pool.num_spectra(),
            default.slope,
            default.intercept
        );

        let candidate_counts = pool
            .spectrum_ids()
            .map(|id| (id.clone(), pool.candidate_count(id)))
            .collect();
        Ok(Self {
            coefficients: fitted_all,
            default,
            candidate_counts,
        })
    }

    /// A raw score of exactly 0.0 is the reserved no-discriminating-score
    /// sentinel: the reply is the candidate count recorded for that
    /// spectrum, not a cross-spectrum-comparable significance. Any other
    /// score is evaluated against the spectrum's fitted pair, or the
    /// default pair when the fit was skipped.
    pub fn estimate(&self, spectrum_id: &str, raw_score: f64) -> f64 {
        if raw_score == 0.0 {
            return self
                .candidate_counts
                .get(spectrum_id)
                .copied()
                .unwrap_or(0) as f64;
        }
        self.coefficients
            .get(spectrum_id)
            .unwrap_or(&self.default)
            .evaluate(raw_score)
    }

    pub fn coefficients(&self, spectrum_id: &str) -> Option<TailCoefficients> {
        self.coefficients.get(spectrum_id).copied()
    }

    pub fn default_coefficients(&self) -> TailCoefficients {
        self.default
    }

    pub fn num_fitted(&self) -> usize {
        self.coefficients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateKey;
    use crate::reporting::{
        CollectingFaults,
        SilentProgress,
        TracingFaults,
    };
    use crate::scoring::Hyperscore;
    use crate::traits::ProgressReporter;

    fn pooled(entries: &[(&str, &[f64])]) -> ScorePool {
        let mut pool = ScorePool::new();
        for (spectrum, scores) in entries {
            let id: Arc<str> = Arc::from(*spectrum);
            for (ix, score) in scores.iter().enumerate() {
                pool.record(&id, CandidateKey::from_raw(ix as u64), *score);
            }
        }
        pool
    }

    fn calibrated(pool: &ScorePool, num_threads: usize) -> TailInterpolation {
        TailInterpolation::calibrate(
            pool,
            num_threads,
            &Hyperscore::default(),
            &SilentProgress,
            &TracingFaults,
        )
        .unwrap()
    }

    #[test]
    fn test_negation_estimator() {
        let estimator = EValueEstimator::Negation;
        for score in [-3.5, 0.0, 1.0, 42.25] {
            assert_eq!(estimator.estimate("anything", score), -score);
        }
    }

    #[test]
    fn test_thread_count_does_not_change_coefficients() {
        let pool = pooled(&[
            ("A", &[10.0, 20.0, 30.0, 40.0, 100.0]),
            ("B", &[55.0]),
            ("C", &[5.0, 9.0, 14.0, 18.0, 33.0, 60.0]),
            ("D", &[2.0, 4.0, 8.0, 16.0]),
        ]);
        let serial = calibrated(&pool, 1);
        let threaded = calibrated(&pool, 4);
        for spectrum in ["A", "B", "C", "D"] {
            assert_eq!(
                serial.coefficients(spectrum),
                threaded.coefficients(spectrum),
                "spectrum {}",
                spectrum
            );
        }
        assert_eq!(
            serial.default_coefficients(),
            threaded.default_coefficients()
        );
    }

    #[test]
    fn test_larger_score_is_more_significant() {
        let pool = pooled(&[("A", &[10.0, 20.0, 30.0, 40.0, 100.0])]);
        let model = calibrated(&pool, 1);
        assert!(model.coefficients("A").is_some());
        assert!(model.estimate("A", 100.0) < model.estimate("A", 10.0));
        let scores = [10.0, 20.0, 30.0, 40.0, 100.0];
        for pair in scores.windows(2) {
            assert!(model.estimate("A", pair[1]) < model.estimate("A", pair[0]));
        }
    }

    #[test]
    fn test_single_candidate_spectrum_uses_default() {
        let pool = pooled(&[
            ("A", &[10.0, 20.0, 30.0, 40.0, 100.0]),
            ("B", &[55.0]),
        ]);
        let model = calibrated(&pool, 2);
        assert!(model.coefficients("B").is_none());
        assert_eq!(
            model.estimate("B", 55.0),
            model.default_coefficients().evaluate(55.0)
        );
    }

    #[test]
    fn test_zero_score_sentinel_returns_candidate_count() {
        let pool = pooled(&[
            ("A", &[10.0, 20.0, 30.0, 40.0, 100.0]),
            ("B", &[55.0]),
        ]);
        let model = calibrated(&pool, 1);
        let estimator = EValueEstimator::TailInterpolation(model);
        assert_eq!(estimator.estimate("A", 0.0), 5.0);
        assert_eq!(estimator.estimate("B", 0.0), 1.0);
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let pool = ScorePool::new();
        let result = TailInterpolation::calibrate(
            &pool,
            1,
            &Hyperscore::default(),
            &SilentProgress,
            &TracingFaults,
        );
        assert!(matches!(
            result,
            Err(crate::errors::EvseekError::Calibration(
                CalibrationError::EmptyScorePool
            ))
        ));
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let pool = pooled(&[("A", &[1.0, 2.0])]);
        let result = TailInterpolation::calibrate(
            &pool,
            0,
            &Hyperscore::default(),
            &SilentProgress,
            &TracingFaults,
        );
        assert!(matches!(
            result,
            Err(crate::errors::EvseekError::Config(
                ConfigError::ExpectedPositiveThreadCount
            ))
        ));
    }

    #[test]
    fn test_no_fitted_spectra_fails_loudly() {
        // Two candidates but identical scores on the only spectrum: the fit
        // is degenerate everywhere and no default can be computed.
        let pool = pooled(&[("A", &[7.0, 7.0])]);
        let result = TailInterpolation::calibrate(
            &pool,
            1,
            &Hyperscore::default(),
            &SilentProgress,
            &TracingFaults,
        );
        assert!(matches!(
            result,
            Err(crate::errors::EvseekError::Calibration(
                CalibrationError::NoFittedSpectra
            ))
        ));
    }

    #[test]
    fn test_worker_fault_is_reported_and_cancels() {
        let pool = pooled(&[
            ("A", &[10.0, 20.0, 30.0]),
            ("BAD", &[1.0, f64::NAN]),
        ]);
        let faults = CollectingFaults::new();
        let result = TailInterpolation::calibrate(
            &pool,
            2,
            &Hyperscore::default(),
            &SilentProgress,
            &faults,
        );
        assert!(matches!(
            result,
            Err(crate::errors::EvseekError::Calibration(
                CalibrationError::WorkerFault { .. }
            ))
        ));
        let recorded = faults.take();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].spectrum_id.as_ref(), "BAD");
    }

    #[test]
    fn test_external_cancellation_surfaces() {
        struct PreCancelled;
        impl ProgressReporter for PreCancelled {
            fn set_total(&self, _total: u64) {}
            fn advance(&self, _units: u64) {}
            fn cancelled(&self) -> bool {
                true
            }
            fn request_cancel(&self) {}
        }

        let pool = pooled(&[("A", &[10.0, 20.0, 30.0])]);
        let result = TailInterpolation::calibrate(
            &pool,
            2,
            &Hyperscore::default(),
            &PreCancelled,
            &TracingFaults,
        );
        assert!(matches!(
            result,
            Err(crate::errors::EvseekError::Calibration(
                CalibrationError::Cancelled { .. }
            ))
        ));
    }
}
