//! Tax computation modules.
//!
//! Each module covers one stage of the return and is usable on its own;
//! [`resolver::resolve_return`] chains them into a single pass.

pub mod brackets;
pub mod common;
pub mod credits;
pub mod deduction;
pub mod income;
pub mod resolver;
pub mod self_emp;
pub mod state;

pub use brackets::{FederalBracketCalculator, marginal_rate, tax_from_brackets};
pub use credits::{CreditEngine, CreditFamily, CreditResult, IneligibilityReason};
pub use deduction::{DeductionMethod, DeductionResolver, DeductionResult};
pub use income::{IncomeTotals, aggregate_income};
pub use resolver::{ComputationResult, resolve_return};
pub use self_emp::{SeNotice, SeTaxConfig, SeTaxResult, SelfEmploymentTax};
pub use state::{
    RegimeResolution, StateRole, StateTable, StateTaxCalculator, StateTaxResult, StateTaxRule,
    StateTaxSummary,
};
