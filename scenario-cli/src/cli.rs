use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use scenario_core::{FilingStatus, Range, ScenarioReport, ScenarioRequest, StateCode, Totals};
use scenario_tables::ReferenceTables;
use tracing::{debug, info};

use crate::utils::{
    parse_decimal, parse_filing_status, parse_non_negative_decimal, parse_state_code,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Recomputes federal and state income tax for a taxable-income change.
///
/// Loads the reference tables, establishes a baseline (given or computed),
/// and prints the revised position and tax delta at the low, base and high
/// points of the delta range as JSON.
#[derive(Debug, Parser)]
#[command(name = "scenario")]
pub struct Cli {
    /// Tables file with deductions, credit parameters and state rates.
    #[arg(long)]
    pub tables: PathBuf,

    /// Federal bracket schedules CSV.
    #[arg(long)]
    pub brackets: PathBuf,

    /// Intake filing status, e.g. `SINGLE` or `married-filing-jointly`.
    #[arg(long, value_parser = parse_filing_status)]
    pub filing_status: FilingStatus,

    /// Two-letter state code.
    #[arg(long, value_parser = parse_state_code)]
    pub state: StateCode,

    /// Baseline taxable income. Must not be negative.
    #[arg(long, value_parser = parse_non_negative_decimal, allow_hyphen_values = true)]
    pub taxable_income: Decimal,

    /// Baseline federal tax. Computed from the tables when omitted.
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true, requires = "state_tax")]
    pub federal_tax: Option<Decimal>,

    /// Baseline state tax. Computed from the tables when omitted.
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true, requires = "federal_tax")]
    pub state_tax: Option<Decimal>,

    /// Low end of the taxable-income change.
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true)]
    pub delta_low: Decimal,

    /// Most likely taxable-income change.
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true)]
    pub delta_base: Decimal,

    /// High end of the taxable-income change.
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true)]
    pub delta_high: Decimal,

    /// Qualifying children under 17.
    #[arg(long, default_value = "0")]
    pub children: u32,

    /// Known baseline AGI, used instead of the taxable income plus
    /// standard deduction approximation.
    #[arg(long, value_parser = parse_decimal, allow_hyphen_values = true)]
    pub agi_override: Option<Decimal>,

    /// Log filter, e.g. `debug`. Overrides `RUST_LOG`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Append log output to this file as well as stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn taxable_income_delta(&self) -> Range<Decimal> {
        Range::new(self.delta_low, self.delta_base, self.delta_high)
    }
}

// ─── run ─────────────────────────────────────────────────────────────────────

/// Loads the tables and runs one scenario.
///
/// The report carries the result plus how the baseline AGI was obtained.
pub fn run(cli: &Cli) -> Result<ScenarioReport> {
    let tables = ReferenceTables::load(&cli.tables, &cli.brackets).with_context(|| {
        format!(
            "loading tables from '{}' and '{}'",
            cli.tables.display(),
            cli.brackets.display()
        )
    })?;
    debug!(tax_year = tables.tax_year(), "reference tables loaded");

    let engine = tables.engine();

    let baseline = match (cli.federal_tax, cli.state_tax) {
        (Some(federal_tax), Some(state_tax)) => {
            Totals::try_new(federal_tax, state_tax, cli.taxable_income)
                .context("reading baseline tax")?
        }
        _ => engine
            .compute_baseline(cli.filing_status, cli.state, cli.taxable_income, cli.children)
            .context("computing baseline tax")?,
    };

    let request = ScenarioRequest {
        baseline,
        filing_status: cli.filing_status,
        state: cli.state,
        taxable_income_delta: cli.taxable_income_delta(),
        qualifying_children_under_17: cli.children,
        agi_override: cli.agi_override,
    };

    let report = engine.report(&request).context("recomputing scenario")?;

    info!(
        filing_status = %cli.filing_status,
        state = %cli.state,
        baseline_total = %report.result.baseline.total_tax(),
        revised_total = %report.result.revised.total_tax(),
        agi_approximated = report.baseline_agi.is_approximation(),
        "scenario recomputed"
    );

    Ok(report)
}
