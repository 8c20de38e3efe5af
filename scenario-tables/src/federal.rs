//! Table-driven federal income tax service.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Tax on ordinary taxable income from the rate schedule |
//! | 2    | Child Tax Credit: amount per child × qualifying children |
//! | 3    | Phaseout: reduce the credit per step (or part) of AGI over threshold |
//! | 4    | Nonrefundable limit: credit cannot exceed the step 1 tax |
//! | 5    | Income tax after CTC = step 1 − limited credit |

use rust_decimal::Decimal;
use scenario_core::calculations::common::{clamp_non_negative, round_half_up};
use scenario_core::services::{FederalTaxInput, FederalTaxOutput, FederalTaxService};
use scenario_core::{FederalFilingStatus, Money, TaxServiceError};
use tracing::debug;

use crate::config::{ByFilingStatus, ChildTaxCreditConfig};
use crate::loader::FederalBracketTable;

#[derive(Debug, Clone)]
pub struct TableFederalService {
    brackets: FederalBracketTable,
    standard_deduction: ByFilingStatus<Money>,
    child_tax_credit: ChildTaxCreditConfig,
}

impl TableFederalService {
    pub fn new(
        brackets: FederalBracketTable,
        standard_deduction: ByFilingStatus<Money>,
        child_tax_credit: ChildTaxCreditConfig,
    ) -> Self {
        Self {
            brackets,
            standard_deduction,
            child_tax_credit,
        }
    }

    pub fn tax_year(&self) -> i32 {
        self.brackets.tax_year()
    }

    /// Child Tax Credit after phaseout, before the nonrefundable limit.
    fn child_tax_credit(
        &self,
        filing_status: FederalFilingStatus,
        agi: Money,
        qualifying_children: u32,
    ) -> Money {
        let ctc = &self.child_tax_credit;
        let full_credit = ctc.amount_per_child * Decimal::from(qualifying_children);
        if full_credit == Decimal::ZERO {
            return Decimal::ZERO;
        }

        let excess = clamp_non_negative(agi - ctc.phaseout_threshold.get(filing_status));
        let steps = (excess / ctc.phaseout_step).ceil();
        let reduction = steps * ctc.phaseout_reduction_per_step;

        clamp_non_negative(full_credit - reduction)
    }

    fn check_non_negative(
        field: &'static str,
        value: Money,
    ) -> Result<(), TaxServiceError> {
        if value < Decimal::ZERO {
            return Err(TaxServiceError::InvalidInput { field, value });
        }
        Ok(())
    }
}

impl FederalTaxService for TableFederalService {
    fn compute_federal_baseline(
        &self,
        input: &FederalTaxInput,
    ) -> Result<FederalTaxOutput, TaxServiceError> {
        Self::check_non_negative("agi", input.agi)?;
        Self::check_non_negative(
            "taxable_ordinary_income_after_deduction",
            input.taxable_ordinary_income_after_deduction,
        )?;
        if input.taxable_preferential_income_after_deduction != Decimal::ZERO {
            // No qualified dividend / capital gain worksheet here.
            return Err(TaxServiceError::InvalidInput {
                field: "taxable_preferential_income_after_deduction",
                value: input.taxable_preferential_income_after_deduction,
            });
        }

        let schedule = self
            .brackets
            .schedule(input.filing_status)
            .ok_or_else(|| TaxServiceError::MissingTable(format!(
                "{} {} rate schedule",
                self.tax_year(),
                input.filing_status
            )))?;

        let tax_before_credits = schedule.tax_on(input.taxable_ordinary_income_after_deduction)?;
        let credit = self.child_tax_credit(
            input.filing_status,
            input.agi,
            input.qualifying_children_under_17,
        );
        let allowed_credit = credit.min(tax_before_credits);
        let income_tax_after_ctc = round_half_up(tax_before_credits - allowed_credit);

        debug!(
            filing_status = %input.filing_status,
            agi = %input.agi,
            tax_before_credits = %tax_before_credits,
            child_tax_credit = %credit,
            allowed_credit = %allowed_credit,
            "computed federal income tax"
        );

        Ok(FederalTaxOutput {
            income_tax_after_ctc,
        })
    }

    fn standard_deduction(
        &self,
        filing_status: FederalFilingStatus,
    ) -> Result<Money, TaxServiceError> {
        Ok(self.standard_deduction.get(filing_status))
    }
}
