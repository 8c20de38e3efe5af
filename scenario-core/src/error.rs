use thiserror::Error;

use crate::models::Money;
use crate::services::TaxServiceError;

/// Broad classification of a [`ScenarioError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inputs that upstream validation should have rejected, or a service
    /// not configured for the requested jurisdiction or year.
    Configuration,
    /// A tax service rejected the figures it was given, or the figures
    /// overflowed decimal arithmetic.
    Computation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("unrecognized filing status '{0}'")]
    UnknownFilingStatus(String),

    #[error("unrecognized state code '{0}'")]
    UnknownStateCode(String),

    #[error("totals do not reconcile: {federal_tax} + {state_tax} != {total_tax}")]
    UnbalancedTotals {
        federal_tax: Money,
        state_tax: Money,
        total_tax: Money,
    },

    #[error("{operation} overflowed")]
    Overflow { operation: &'static str },

    #[error("federal tax service failed")]
    Federal(#[source] TaxServiceError),

    #[error("state tax service failed")]
    State(#[source] TaxServiceError),
}

impl ScenarioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFilingStatus(_)
            | Self::UnknownStateCode(_)
            | Self::UnbalancedTotals { .. } => ErrorKind::Configuration,
            Self::Overflow { .. } => ErrorKind::Computation,
            Self::Federal(source) | Self::State(source) => {
                if source.is_configuration() {
                    ErrorKind::Configuration
                } else {
                    ErrorKind::Computation
                }
            }
        }
    }

    /// The untouched collaborator error, if a tax service raised this.
    pub fn service_error(&self) -> Option<&TaxServiceError> {
        match self {
            Self::Federal(source) | Self::State(source) => Some(source),
            _ => None,
        }
    }
}
