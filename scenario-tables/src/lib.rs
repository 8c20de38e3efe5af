//! Table-driven reference implementations of the federal and state tax
//! services consumed by `scenario-core`.
//!
//! Tables come from two files: a TOML file with deductions, credit
//! parameters and state rates ([`TablesConfig`]), and a CSV of federal
//! bracket schedules ([`TaxBracketLoader`]).

pub mod brackets;
pub mod config;
pub mod error;
pub mod federal;
pub mod loader;
pub mod state;

use std::io::Read;
use std::path::Path;

pub use brackets::{BracketSchedule, TaxBracket};
pub use config::{ByFilingStatus, ChildTaxCreditConfig, StateRateConfig, TablesConfig};
pub use error::TablesError;
pub use federal::TableFederalService;
pub use loader::{FederalBracketTable, TaxBracketLoader, TaxBracketRecord};
use scenario_core::ScenarioEngine;
pub use state::TableStateService;

/// Both reference services for one tax year.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    tax_year: i32,
    federal: TableFederalService,
    state: TableStateService,
}

impl ReferenceTables {
    /// Builds both services from an already parsed config and a bracket CSV.
    pub fn from_sources<R: Read>(
        config: TablesConfig,
        brackets_csv: R,
    ) -> Result<Self, TablesError> {
        let tax_year = config.tax_year;
        let brackets = TaxBracketLoader::load(tax_year, brackets_csv)?;
        Self::assemble(config, brackets)
    }

    /// Reads the tables file and bracket CSV from disk.
    pub fn load(
        config_path: &Path,
        brackets_path: &Path,
    ) -> Result<Self, TablesError> {
        let config = TablesConfig::load(config_path)?;
        let brackets = TaxBracketLoader::load_file(config.tax_year, brackets_path)?;
        Self::assemble(config, brackets)
    }

    fn assemble(
        config: TablesConfig,
        brackets: FederalBracketTable,
    ) -> Result<Self, TablesError> {
        let state = TableStateService::new(config.tax_year, &config.states)?;
        let federal =
            TableFederalService::new(brackets, config.standard_deduction, config.child_tax_credit);

        Ok(Self {
            tax_year: config.tax_year,
            federal,
            state,
        })
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn federal(&self) -> &TableFederalService {
        &self.federal
    }

    pub fn state(&self) -> &TableStateService {
        &self.state
    }

    /// A scenario engine borrowing these services.
    pub fn engine(&self) -> ScenarioEngine<&TableFederalService, &TableStateService> {
        ScenarioEngine::new(&self.federal, &self.state, self.tax_year)
    }
}
