//! Shipped implementations of the progress and fault contracts.

use crate::traits::{
    FaultReporter,
    ProgressReporter,
    WorkerFault,
};
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use std::sync::Mutex;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use tracing::error;

/// Terminal progress bar with a cancellation flag.
pub struct IndicatifProgress {
    bar: ProgressBar,
    cancel: AtomicBool,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap();
        Self {
            bar: ProgressBar::no_length().with_style(style),
            cancel: AtomicBool::new(false),
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn advance(&self, units: u64) {
        self.bar.inc(units);
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// No-op reporter for headless callers and tests. Never cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn set_total(&self, _total: u64) {}

    fn advance(&self, _units: u64) {}

    fn cancelled(&self) -> bool {
        false
    }

    fn request_cancel(&self) {}
}

/// Logs worker faults through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaults;

impl FaultReporter for TracingFaults {
    fn report(&self, fault: WorkerFault) {
        error!(
            "worker fault on spectrum {}: {:?}",
            fault.spectrum_id, fault.source
        );
    }
}

/// Accumulates worker faults for later inspection.
#[derive(Debug, Default)]
pub struct CollectingFaults {
    faults: Mutex<Vec<WorkerFault>>,
}

impl CollectingFaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<WorkerFault> {
        std::mem::take(&mut *self.faults.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.faults.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FaultReporter for CollectingFaults {
    fn report(&self, fault: WorkerFault) {
        self.faults.lock().unwrap().push(fault);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DataError;
    use std::sync::Arc;

    #[test]
    fn test_indicatif_progress_cancellation_flag() {
        let progress = IndicatifProgress::new();
        progress.set_total(10);
        progress.advance(3);
        assert!(!progress.cancelled());
        progress.request_cancel();
        assert!(progress.cancelled());
    }

    #[test]
    fn test_silent_progress_never_cancels() {
        let progress = SilentProgress;
        progress.request_cancel();
        assert!(!progress.cancelled());
    }

    #[test]
    fn test_collecting_faults_records_and_drains() {
        let faults = CollectingFaults::new();
        assert!(faults.is_empty());
        faults.report(WorkerFault {
            spectrum_id: Arc::from("a"),
            source: DataError::ExpectedFiniteScore {
                value: f64::NAN,
                context: String::new(),
            },
        });
        assert_eq!(faults.len(), 1);
        let drained = faults.take();
        assert_eq!(drained.len(), 1);
        assert!(faults.is_empty());
    }
}
