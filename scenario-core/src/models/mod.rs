mod filing_status;
mod range;
mod state_code;
mod totals;

pub use filing_status::{FederalFilingStatus, FilingStatus, StateFilingStatus};
pub use range::Range;
pub use state_code::StateCode;
pub use totals::Totals;

/// A signed dollar amount.
pub type Money = rust_decimal::Decimal;
