use std::path::PathBuf;

use rust_decimal::Decimal;
use scenario_core::FederalFilingStatus;
use thiserror::Error;

/// Errors raised while loading or validating reference tables.
#[derive(Debug, Error)]
pub enum TablesError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tables config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("bracket row for tax year {found} in a {expected} table")]
    TaxYearMismatch { expected: i32, found: i32 },

    #[error("no bracket schedule for filing status {0}")]
    MissingSchedule(FederalFilingStatus),

    #[error("bracket schedule for {status} is malformed: {reason}")]
    MalformedSchedule {
        status: FederalFilingStatus,
        reason: &'static str,
    },

    #[error("state {0} appears more than once")]
    DuplicateState(String),

    #[error("unrecognized state code '{0}'")]
    UnknownState(String),

    #[error("{field} must be {expectation}, got {value}")]
    OutOfRange {
        field: &'static str,
        expectation: &'static str,
        value: Decimal,
    },
}

impl From<csv::Error> for TablesError {
    fn from(err: csv::Error) -> Self {
        TablesError::CsvParse(err.to_string())
    }
}
