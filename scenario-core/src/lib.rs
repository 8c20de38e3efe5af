//! Deterministic tax scenario recomputation.
//!
//! Given a baseline tax position and a low/base/high range of changes to
//! taxable income, [`ScenarioEngine`] recomputes federal, state and total
//! tax at each point using caller-supplied [`services`].

pub mod calculations;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

pub use calculations::{AgiSource, BaselineAgi, NormalizedFilingStatus};
pub use engine::{
    ScenarioEngine, ScenarioReport, ScenarioRequest, ScenarioResult, recompute_scenario,
};
pub use error::{ErrorKind, ScenarioError};
pub use models::*;
pub use services::{FederalTaxService, StateTaxService, TaxServiceError};
