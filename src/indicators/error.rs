use thiserror::Error;

/// Shape problems found while preparing indicator inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("series length mismatch: closes={closes}, highs={highs}, lows={lows}")]
    MismatchedSeries {
        closes: usize,
        highs: usize,
        lows: usize,
    },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}
