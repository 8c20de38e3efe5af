//! The scenario pipeline components.
//!
//! Each module is a pure function (or a borrowing calculator) over
//! already-normalized inputs; none of them keeps state between calls.

pub mod agi_proxy;
pub mod common;
pub mod delta;
pub mod evaluator;
pub mod normalizer;
pub mod range_propagation;

pub use agi_proxy::{AgiSource, BaselineAgi, derive_baseline_agi};
pub use delta::{assemble, total_tax_delta};
pub use evaluator::ScenarioEvaluator;
pub use normalizer::{NormalizedFilingStatus, normalize, normalize_filing_status};
pub use range_propagation::propagate_range;
