use std::sync::Arc;

/// Contract violations in caller-supplied configuration. Never recovered
/// from; surfaced before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSamplingBudget {
        budget: usize,
    },
    InvalidStride {
        stride: usize,
    },
    ExpectedPositiveModificationCount,
    ExpectedPositiveThreadCount,
}

#[derive(Debug, Clone)]
pub enum DataError {
    ModificationWithoutSites {
        mod_id: Arc<str>,
    },
    ExpectedFiniteScore {
        value: f64,
        context: String,
    },
}

impl DataError {
    pub fn append_to_context(mut self, extra: &str) -> Self {
        if let DataError::ExpectedFiniteScore { context, .. } = &mut self {
            if !context.is_empty() {
                context.push_str("; ");
            }
            context.push_str(extra);
        }
        self
    }
}

#[derive(Debug)]
pub enum CalibrationError {
    /// A worker hit corrupt score data; calibration was cancelled
    /// cooperatively and must not be retried on the same pool.
    WorkerFault {
        spectrum_id: Arc<str>,
        source: DataError,
    },
    Cancelled {
        fitted: usize,
    },
    EmptyScorePool,
    /// No spectrum produced a usable tail fit, so there is no default
    /// coefficient pair to fall back on.
    NoFittedSpectra,
}

#[derive(Debug)]
pub enum EvseekError {
    Config(ConfigError),
    Data(DataError),
    Calibration(CalibrationError),
}

impl std::fmt::Display for EvseekError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, EvseekError>;

impl From<ConfigError> for EvseekError {
    fn from(x: ConfigError) -> Self {
        Self::Config(x)
    }
}

impl From<DataError> for EvseekError {
    fn from(x: DataError) -> Self {
        Self::Data(x)
    }
}

impl From<CalibrationError> for EvseekError {
    fn from(x: CalibrationError) -> Self {
        Self::Calibration(x)
    }
}
