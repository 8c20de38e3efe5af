use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use scenario_core::FederalFilingStatus;
use serde::Deserialize;
use tracing::debug;

use crate::brackets::{BracketSchedule, TaxBracket};
use crate::error::TablesError;

/// Maps IRS schedule codes to federal filing status codes.
///
/// - Schedule X → Single (S)
/// - Schedule Y-1 → Married Filing Jointly (MFJ)
/// - Schedule Y-2 → Married Filing Separately (MFS)
/// - Schedule Z → Head of Household (HOH)
fn schedule_to_filing_status(schedule: &str) -> Result<FederalFilingStatus, TablesError> {
    match schedule {
        "X" => Ok(FederalFilingStatus::Single),
        "Y-1" => Ok(FederalFilingStatus::MarriedFilingJointly),
        "Y-2" => Ok(FederalFilingStatus::MarriedFilingSeparately),
        "Z" => Ok(FederalFilingStatus::HeadOfHousehold),
        _ => Err(TablesError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: The base tax amount for this bracket
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Federal bracket schedules for every filing status of one tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederalBracketTable {
    tax_year: i32,
    schedules: BTreeMap<FederalFilingStatus, BracketSchedule>,
}

impl FederalBracketTable {
    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn schedule(
        &self,
        status: FederalFilingStatus,
    ) -> Option<&BracketSchedule> {
        self.schedules.get(&status)
    }
}

/// Loader for federal bracket data from CSV files.
///
/// The CSV uses IRS schedule codes (X, Y-1, Y-2, Z) which are mapped to
/// federal filing status codes. Every filing status must end up with a
/// complete schedule.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// Returns a vector of parsed records. The reader can be any type that
    /// implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TablesError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build the bracket table for `tax_year` from parsed records.
    ///
    /// # Errors
    ///
    /// * [`TablesError::TaxYearMismatch`] if any record is for another year.
    /// * [`TablesError::InvalidSchedule`] for an unknown schedule code.
    /// * [`TablesError::MissingSchedule`] if a filing status has no rows.
    /// * [`TablesError::MalformedSchedule`] if a schedule is not contiguous.
    pub fn build(
        tax_year: i32,
        records: &[TaxBracketRecord],
    ) -> Result<FederalBracketTable, TablesError> {
        let mut groups: BTreeMap<FederalFilingStatus, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            if record.tax_year != tax_year {
                return Err(TablesError::TaxYearMismatch {
                    expected: tax_year,
                    found: record.tax_year,
                });
            }
            let filing_status = schedule_to_filing_status(&record.schedule)?;
            groups.entry(filing_status).or_default().push(TaxBracket {
                tax_year: record.tax_year,
                filing_status,
                min_income: record.min_income,
                max_income: record.max_income,
                tax_rate: record.rate,
                base_tax: record.base_tax,
            });
        }

        let mut schedules = BTreeMap::new();
        for status in [
            FederalFilingStatus::Single,
            FederalFilingStatus::MarriedFilingJointly,
            FederalFilingStatus::MarriedFilingSeparately,
            FederalFilingStatus::HeadOfHousehold,
        ] {
            let brackets = groups
                .remove(&status)
                .ok_or(TablesError::MissingSchedule(status))?;
            debug!(
                tax_year,
                filing_status = %status,
                brackets = brackets.len(),
                "loaded bracket schedule"
            );
            schedules.insert(status, BracketSchedule::new(status, brackets)?);
        }

        Ok(FederalBracketTable {
            tax_year,
            schedules,
        })
    }

    /// Parse and build in one step.
    pub fn load<R: Read>(
        tax_year: i32,
        reader: R,
    ) -> Result<FederalBracketTable, TablesError> {
        let records = Self::parse(reader)?;
        Self::build(tax_year, &records)
    }

    /// Read a bracket CSV from disk.
    pub fn load_file(
        tax_year: i32,
        path: &Path,
    ) -> Result<FederalBracketTable, TablesError> {
        let file = File::open(path).map_err(|source| TablesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(tax_year, file)
    }
}
